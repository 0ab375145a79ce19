//! Bookings, their lifecycle statuses and the policy deciding which ones block a slot.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BookingId, EventTypeId, HostId};

/// Lifecycle status of a booking.
///
/// `confirmed -> cancelled`, `confirmed -> rescheduled`, `rescheduled -> rescheduled`
/// and `rescheduled -> cancelled` are the only transitions. Bookings are never deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
    Rescheduled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Rescheduled => "rescheduled",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirmed" => Ok(BookingStatus::Confirmed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            "rescheduled" => Ok(BookingStatus::Rescheduled),
            other => Err(format!("Unknown booking status: {}", other)),
        }
    }
}

/// Which booking statuses occupy their time range.
///
/// Under `ConfirmedOnly` a rescheduled booking stops blocking its new slot.
/// `IncludeRescheduled` treats a rescheduled booking as
/// the live, confirmed-equivalent record. Cancelled bookings never block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    ConfirmedOnly,
    #[default]
    IncludeRescheduled,
}

impl ConflictPolicy {
    pub fn blocking_statuses(&self) -> &'static [BookingStatus] {
        match self {
            ConflictPolicy::ConfirmedOnly => &[BookingStatus::Confirmed],
            ConflictPolicy::IncludeRescheduled => {
                &[BookingStatus::Confirmed, BookingStatus::Rescheduled]
            }
        }
    }

    pub fn blocks(&self, status: BookingStatus) -> bool {
        self.blocking_statuses().contains(&status)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictPolicy::ConfirmedOnly => "confirmed_only",
            ConflictPolicy::IncludeRescheduled => "include_rescheduled",
        }
    }
}

impl FromStr for ConflictPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "confirmed_only" | "confirmed" => Ok(ConflictPolicy::ConfirmedOnly),
            "include_rescheduled" | "active" => Ok(ConflictPolicy::IncludeRescheduled),
            other => Err(format!("Unknown conflict policy: {}", other)),
        }
    }
}

/// A booking record.
///
/// The event type name and duration are copied at creation so the booking stays
/// meaningful after its event type is edited or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub host_id: HostId,
    pub event_type_id: EventTypeId,
    pub event_type_name: String,
    pub duration_minutes: u32,
    pub invitee_name: String,
    pub invitee_email: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub status: BookingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn is_cancelled(&self) -> bool {
        self.status == BookingStatus::Cancelled
    }
}

/// A booking about to be inserted, already carrying its computed end time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBooking {
    pub host_id: HostId,
    pub event_type_id: EventTypeId,
    pub event_type_name: String,
    pub duration_minutes: u32,
    pub invitee_name: String,
    pub invitee_email: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub notes: Option<String>,
}

/// Outcome of an atomic check-and-write against the booking store.
#[derive(Debug, Clone, PartialEq)]
pub enum Reservation {
    /// The write happened; carries the stored booking.
    Reserved(Booking),
    /// Nothing was written; carries the booking that occupies the range.
    Conflict(Booking),
    /// Nothing was written; the booking being moved is cancelled.
    Cancelled(Booking),
}

/// Outcome of an atomic status transition.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusChange {
    Applied(Booking),
    /// The booking already had the target status.
    Unchanged(Booking),
}

/// A bookable candidate window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    /// Start time rendered as `HH:mm`.
    pub formatted: String,
}

impl Slot {
    pub fn new(start_time: NaiveDateTime, end_time: NaiveDateTime) -> Self {
        Self {
            start_time,
            end_time,
            formatted: start_time
                .format(super::time::TIME_OF_DAY_FORMAT)
                .to_string(),
        }
    }
}
