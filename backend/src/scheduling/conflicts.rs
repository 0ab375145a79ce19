//! Overlap predicate and booking conflict filters.

use chrono::NaiveDateTime;

use crate::models::{Booking, BookingId, ConflictPolicy, EventTypeId, Slot};

/// Half-open interval overlap: `[start_a, end_a)` and `[start_b, end_b)` intersect.
///
/// Touching intervals (`end_a == start_b`) do not overlap.
pub fn overlaps<T: PartialOrd>(start_a: T, end_a: T, start_b: T, end_b: T) -> bool {
    start_a < end_b && end_a > start_b
}

/// Keep the slots that overlap none of the given bookings.
///
/// Callers pass only blocking bookings; statuses are not re-checked here.
pub fn filter_available(slots: Vec<Slot>, booked: &[Booking]) -> Vec<Slot> {
    slots
        .into_iter()
        .filter(|slot| {
            !booked.iter().any(|booking| {
                overlaps(
                    slot.start_time,
                    slot.end_time,
                    booking.start_time,
                    booking.end_time,
                )
            })
        })
        .collect()
}

/// First booking that blocks `[start, end)` for the event type under `policy`,
/// skipping `exclude` (the booking being rescheduled).
pub fn find_conflict<'a, I>(
    bookings: I,
    event_type_id: EventTypeId,
    start: NaiveDateTime,
    end: NaiveDateTime,
    exclude: Option<BookingId>,
    policy: ConflictPolicy,
) -> Option<&'a Booking>
where
    I: IntoIterator<Item = &'a Booking>,
{
    bookings.into_iter().find(|booking| {
        booking.event_type_id == event_type_id
            && Some(booking.id) != exclude
            && policy.blocks(booking.status)
            && overlaps(start, end, booking.start_time, booking.end_time)
    })
}

pub fn has_conflict<'a, I>(
    bookings: I,
    event_type_id: EventTypeId,
    start: NaiveDateTime,
    end: NaiveDateTime,
    exclude: Option<BookingId>,
    policy: ConflictPolicy,
) -> bool
where
    I: IntoIterator<Item = &'a Booking>,
{
    find_conflict(bookings, event_type_id, start, end, exclude, policy).is_some()
}
