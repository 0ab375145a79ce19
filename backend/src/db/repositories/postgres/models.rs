use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use diesel::prelude::*;

use super::schema::{availabilities, availability_rules, bookings, date_overrides, event_types};
use crate::db::repository::{ErrorContext, RepositoryError, RepositoryResult};
use crate::models::{
    AvailabilityRule, Booking, BookingId, DateOverride, EventType, EventTypeId, HostId,
    NewAvailabilityRule, NewBooking, NewDateOverride, NewEventType, OverrideId, RuleId, TimeOfDay,
};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = event_types)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct EventTypeRow {
    pub id: i64,
    pub host_id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub duration_minutes: i32,
    pub is_active: bool,
    pub color: String,
    pub created_at: DateTime<Utc>,
}

impl From<EventTypeRow> for EventType {
    fn from(row: EventTypeRow) -> Self {
        EventType {
            id: EventTypeId(row.id),
            host_id: HostId(row.host_id),
            name: row.name,
            slug: row.slug,
            description: row.description,
            duration_minutes: row.duration_minutes.max(0) as u32,
            is_active: row.is_active,
            color: row.color,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = event_types)]
pub struct NewEventTypeRow {
    pub host_id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub duration_minutes: i32,
    pub is_active: bool,
    pub color: String,
}

impl NewEventTypeRow {
    pub fn new(host_id: HostId, event_type: &NewEventType) -> Self {
        Self {
            host_id: host_id.value(),
            name: event_type.name.clone(),
            slug: event_type.slug.clone(),
            description: event_type.description.clone(),
            duration_minutes: event_type.duration_minutes as i32,
            is_active: event_type.is_active,
            color: event_type.color_or_default(),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = availabilities)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[allow(dead_code)] // created_at only drives ordering
pub struct AvailabilityRow {
    pub id: i64,
    pub host_id: i64,
    pub name: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = availabilities)]
pub struct NewAvailabilityRow {
    pub host_id: i64,
    pub name: String,
    pub is_default: bool,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = availability_rules)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RuleRow {
    pub id: i64,
    pub availability_id: i64,
    pub day_of_week: i16,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl From<RuleRow> for AvailabilityRule {
    fn from(row: RuleRow) -> Self {
        AvailabilityRule {
            id: RuleId(row.id),
            day_of_week: row.day_of_week.clamp(0, 6) as u8,
            start_time: TimeOfDay::from_naive(row.start_time),
            end_time: TimeOfDay::from_naive(row.end_time),
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = availability_rules)]
pub struct NewRuleRow {
    pub availability_id: i64,
    pub day_of_week: i16,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl NewRuleRow {
    pub fn new(availability_id: i64, rule: &NewAvailabilityRule) -> Self {
        Self {
            availability_id,
            day_of_week: i16::from(rule.day_of_week),
            start_time: rule.start_time.as_naive(),
            end_time: rule.end_time.as_naive(),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = date_overrides)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OverrideRow {
    pub id: i64,
    pub availability_id: i64,
    pub override_date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub is_unavailable: bool,
}

impl From<OverrideRow> for DateOverride {
    fn from(row: OverrideRow) -> Self {
        DateOverride {
            id: OverrideId(row.id),
            date: row.override_date,
            start_time: row.start_time.map(TimeOfDay::from_naive),
            end_time: row.end_time.map(TimeOfDay::from_naive),
            is_unavailable: row.is_unavailable,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = date_overrides)]
pub struct NewOverrideRow {
    pub availability_id: i64,
    pub override_date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub is_unavailable: bool,
}

impl NewOverrideRow {
    pub fn new(availability_id: i64, date_override: &NewDateOverride) -> Self {
        let normalized = date_override.normalized();
        Self {
            availability_id,
            override_date: normalized.date,
            start_time: normalized.start_time.map(|t| t.as_naive()),
            end_time: normalized.end_time.map(|t| t.as_naive()),
            is_unavailable: normalized.is_unavailable,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = bookings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BookingRow {
    pub id: i64,
    pub host_id: i64,
    pub event_type_id: i64,
    pub event_type_name: String,
    pub duration_minutes: i32,
    pub invitee_name: String,
    pub invitee_email: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl BookingRow {
    pub fn into_booking(self) -> RepositoryResult<Booking> {
        let status = self.status.parse().map_err(|e: String| {
            RepositoryError::internal_with_context(
                e,
                ErrorContext::new("decode_booking")
                    .with_entity("booking")
                    .with_entity_id(self.id),
            )
        })?;
        Ok(Booking {
            id: BookingId(self.id),
            host_id: HostId(self.host_id),
            event_type_id: EventTypeId(self.event_type_id),
            event_type_name: self.event_type_name,
            duration_minutes: self.duration_minutes.max(0) as u32,
            invitee_name: self.invitee_name,
            invitee_email: self.invitee_email,
            start_time: self.start_time,
            end_time: self.end_time,
            status,
            notes: self.notes,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = bookings)]
pub struct NewBookingRow {
    pub host_id: i64,
    pub event_type_id: i64,
    pub event_type_name: String,
    pub duration_minutes: i32,
    pub invitee_name: String,
    pub invitee_email: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub status: String,
    pub notes: Option<String>,
}

impl From<&NewBooking> for NewBookingRow {
    fn from(booking: &NewBooking) -> Self {
        Self {
            host_id: booking.host_id.value(),
            event_type_id: booking.event_type_id.value(),
            event_type_name: booking.event_type_name.clone(),
            duration_minutes: booking.duration_minutes as i32,
            invitee_name: booking.invitee_name.clone(),
            invitee_email: booking.invitee_email.clone(),
            start_time: booking.start_time,
            end_time: booking.end_time,
            status: crate::models::BookingStatus::Confirmed.as_str().to_string(),
            notes: booking.notes.clone(),
        }
    }
}
