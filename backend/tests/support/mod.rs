#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use chrono::{NaiveDate, NaiveDateTime};
use slotbook::db::LocalRepository;
use slotbook::models::{ConflictPolicy, EventType, EventTypeId, HostId, NewEventType, TimeOfDay};
use slotbook::services::event_types::create_event_type;
use slotbook::services::{BookingContext, BookingRequest};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// This is panic-safe (restores variables on unwind) and also serializes access to
/// process-global env vars to avoid flaky tests when Rust runs tests in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

// =============================================================================
// Booking fixtures
// =============================================================================

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at(day: NaiveDate, hour: u32, minute: u32) -> NaiveDateTime {
    day.and_hms_opt(hour, minute, 0).unwrap()
}

pub fn hm(hour: u32, minute: u32) -> TimeOfDay {
    TimeOfDay::new(hour, minute).unwrap()
}

/// Wednesday used by most scenarios.
pub fn wednesday() -> NaiveDate {
    date(2026, 10, 21)
}

/// Monday 08:00 of the same week.
pub fn monday_morning() -> NaiveDateTime {
    at(date(2026, 10, 19), 8, 0)
}

pub fn ctx_at(now: NaiveDateTime) -> BookingContext {
    BookingContext::new(HostId::default(), ConflictPolicy::default(), now)
}

pub fn ctx() -> BookingContext {
    ctx_at(monday_morning())
}

pub async fn seed_event_type(repo: &LocalRepository, slug: &str, minutes: u32) -> EventType {
    create_event_type(
        repo,
        HostId::default(),
        &NewEventType::new(format!("Meeting {}", slug), slug, minutes),
    )
    .await
    .unwrap()
}

pub fn request(event_type_id: EventTypeId, start: NaiveDateTime) -> BookingRequest {
    BookingRequest {
        event_type_id,
        start_time: start,
        invitee_name: "Ada Lovelace".to_string(),
        invitee_email: "ada@example.com".to_string(),
        notes: None,
    }
}
