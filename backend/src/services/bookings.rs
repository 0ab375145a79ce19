//! Booking lifecycle: slot listing, create, cancel and reschedule.
//!
//! ```text
//! confirmed ──cancel──▶ cancelled (terminal)
//!     │                     ▲
//!  reschedule             cancel
//!     ▼                     │
//! rescheduled ──reschedule──┘ (may repeat)
//! ```

use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::availability::get_default_availability;
use super::context::BookingContext;
use super::error::{BookingError, BookingResult};
use super::validation::validate_input;
use crate::db::repository::FullRepository;
use crate::models::{
    day_bounds, minutes, Booking, BookingId, EventType, EventTypeId, NewBooking, Reservation,
    Slot, StatusChange,
};
use crate::scheduling::{filter_available, generate_slots, resolve_window};

/// Invitee input for a new booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct BookingRequest {
    pub event_type_id: EventTypeId,
    pub start_time: NaiveDateTime,
    #[validate(
        length(min = 1, max = 100, message = "must be 1 to 100 characters"),
        custom(function = "crate::models::checks::not_blank")
    )]
    pub invitee_name: String,
    #[validate(
        email(message = "is not a valid email address"),
        length(max = 254, message = "must be at most 254 characters")
    )]
    pub invitee_email: String,
    #[serde(default)]
    #[validate(length(max = 1000, message = "must be at most 1000 characters"))]
    pub notes: Option<String>,
}

/// `start + duration`, rejecting starts too close to the end of the calendar.
fn end_of(start: NaiveDateTime, duration_minutes: u32) -> BookingResult<NaiveDateTime> {
    start
        .checked_add_signed(minutes(duration_minutes))
        .ok_or_else(|| {
            BookingError::Validation(format!(
                "start_time {start} plus {duration_minutes} minutes is out of range"
            ))
        })
}

fn ensure_active(event_type: &EventType) -> BookingResult<()> {
    if event_type.is_active {
        Ok(())
    } else {
        Err(BookingError::Inactive(event_type.slug.clone()))
    }
}

/// Bookable slots for the event type `slug` on `date`.
///
/// Past dates yield nothing; for today only slots starting strictly after
/// `ctx.now` are returned.
pub async fn get_available_slots<R: FullRepository + ?Sized>(
    repo: &R,
    ctx: &BookingContext,
    slug: &str,
    date: NaiveDate,
) -> BookingResult<Vec<Slot>> {
    let event_type = repo
        .get_event_type_by_slug(ctx.host_id, slug)
        .await?
        .ok_or_else(|| BookingError::not_found("event type", slug))?;
    ensure_active(&event_type)?;

    if date < ctx.today() {
        debug!("Slots requested for past date {} ('{}')", date, slug);
        return Ok(Vec::new());
    }

    let availability = get_default_availability(repo, ctx.host_id).await?;
    let Some(window) = resolve_window(&availability, date) else {
        debug!("Host {} unavailable on {}", ctx.host_id, date);
        return Ok(Vec::new());
    };

    let candidates = generate_slots(
        date,
        window.start_time,
        window.end_time,
        event_type.duration_minutes,
    );
    let (day_start, next_day) = day_bounds(date);
    let booked = repo
        .fetch_bookings_starting_between(event_type.id, day_start, next_day, ctx.policy)
        .await?;

    let mut available = filter_available(candidates, &booked);
    if date == ctx.today() {
        available.retain(|slot| slot.start_time > ctx.now);
    }

    debug!(
        "{} slots free for '{}' on {} ({} bookings)",
        available.len(),
        slug,
        date,
        booked.len()
    );
    Ok(available)
}

/// Book `[start, start + duration)` for an invitee.
///
/// The overlap check and the insert happen in one store operation, so racing
/// requests for one slot produce a single confirmed booking.
pub async fn create_booking<R: FullRepository + ?Sized>(
    repo: &R,
    ctx: &BookingContext,
    request: &BookingRequest,
) -> BookingResult<Booking> {
    validate_input(request)?;

    let event_type = repo.get_event_type(request.event_type_id).await?;
    ensure_active(&event_type)?;
    let end_time = end_of(request.start_time, event_type.duration_minutes)?;

    let new_booking = NewBooking {
        host_id: event_type.host_id,
        event_type_id: event_type.id,
        event_type_name: event_type.name.clone(),
        duration_minutes: event_type.duration_minutes,
        invitee_name: request.invitee_name.trim().to_string(),
        invitee_email: request.invitee_email.trim().to_string(),
        start_time: request.start_time,
        end_time,
        notes: request.notes.clone(),
    };

    match repo.insert_booking_if_free(&new_booking, ctx.policy).await? {
        Reservation::Reserved(booking) => {
            info!(
                "Booked '{}' at {} for {} (booking {})",
                event_type.slug, booking.start_time, booking.invitee_email, booking.id
            );
            Ok(booking)
        }
        Reservation::Conflict(existing) => {
            warn!(
                "Slot {} for '{}' taken by booking {}",
                new_booking.start_time, event_type.slug, existing.id
            );
            Err(BookingError::SlotUnavailable {
                conflicting: Some(existing.id),
            })
        }
        Reservation::Cancelled(booking) => Err(BookingError::AlreadyCancelled(booking.id)),
    }
}

pub async fn get_booking<R: FullRepository + ?Sized>(
    repo: &R,
    booking_id: BookingId,
) -> BookingResult<Booking> {
    Ok(repo.get_booking(booking_id).await?)
}

/// Cancel a booking. Cancelling twice is rejected.
pub async fn cancel_booking<R: FullRepository + ?Sized>(
    repo: &R,
    booking_id: BookingId,
) -> BookingResult<Booking> {
    match repo.cancel_booking(booking_id).await? {
        None => Err(BookingError::not_found("booking", booking_id)),
        Some(StatusChange::Unchanged(_)) => Err(BookingError::AlreadyCancelled(booking_id)),
        Some(StatusChange::Applied(booking)) => {
            info!("Cancelled booking {}", booking_id);
            Ok(booking)
        }
    }
}

/// Move a booking to `new_start`.
///
/// The new window uses the event type's current duration, or the booking's
/// snapshot when the event type has been deleted. On conflict the booking is
/// left untouched.
pub async fn reschedule_booking<R: FullRepository + ?Sized>(
    repo: &R,
    ctx: &BookingContext,
    booking_id: BookingId,
    new_start: NaiveDateTime,
) -> BookingResult<Booking> {
    let booking = repo.get_booking(booking_id).await?;
    if booking.is_cancelled() {
        return Err(BookingError::AlreadyCancelled(booking_id));
    }

    let duration_minutes = match repo.get_event_type(booking.event_type_id).await {
        Ok(event_type) => event_type.duration_minutes,
        Err(err) if err.is_not_found() => {
            debug!(
                "Event type {} of booking {} is gone; keeping {} minutes",
                booking.event_type_id, booking_id, booking.duration_minutes
            );
            booking.duration_minutes
        }
        Err(err) => return Err(err.into()),
    };
    let new_end = end_of(new_start, duration_minutes)?;

    match repo
        .reschedule_booking_if_free(booking_id, new_start, new_end, ctx.policy)
        .await?
    {
        Reservation::Reserved(updated) => {
            info!(
                "Rescheduled booking {} from {} to {}",
                booking_id, booking.start_time, updated.start_time
            );
            Ok(updated)
        }
        Reservation::Conflict(existing) => {
            warn!(
                "Cannot move booking {} to {}: overlaps booking {}",
                booking_id, new_start, existing.id
            );
            Err(BookingError::SlotUnavailable {
                conflicting: Some(existing.id),
            })
        }
        Reservation::Cancelled(_) => {
            warn!("Booking {} was cancelled before it could be moved", booking_id);
            Err(BookingError::AlreadyCancelled(booking_id))
        }
    }
}

/// Whether `[start, end)` overlaps a blocking booking of the event type.
pub async fn has_conflict<R: FullRepository + ?Sized>(
    repo: &R,
    ctx: &BookingContext,
    event_type_id: EventTypeId,
    start: NaiveDateTime,
    end: NaiveDateTime,
    exclude: Option<BookingId>,
) -> BookingResult<bool> {
    Ok(repo
        .find_conflicting_booking(event_type_id, start, end, exclude, ctx.policy)
        .await?
        .is_some())
}
