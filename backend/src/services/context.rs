//! Per-request booking context and the clock that feeds it.

use chrono::{Local, NaiveDate, NaiveDateTime};

use crate::models::{ConflictPolicy, HostId};

/// Who is being booked, which statuses block, and what time it is.
///
/// Services never read the system clock; "now" always comes from here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingContext {
    pub host_id: HostId,
    pub policy: ConflictPolicy,
    pub now: NaiveDateTime,
}

impl BookingContext {
    pub fn new(host_id: HostId, policy: ConflictPolicy, now: NaiveDateTime) -> Self {
        Self {
            host_id,
            policy,
            now,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.now.date()
    }
}

/// Source of the current wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall-clock time of the server.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock frozen at a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
