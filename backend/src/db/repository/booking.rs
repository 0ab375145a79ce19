//! Booking repository trait.
//!
//! Besides plain reads, this trait carries the store's atomic check-and-write
//! operations. `insert_booking_if_free` and `reschedule_booking_if_free` must run
//! the conflict query and the write as one unit: two callers racing for the same
//! interval can never both receive [`Reservation::Reserved`]. A reschedule that
//! finds the booking cancelled inside that unit reports [`Reservation::Cancelled`].

use async_trait::async_trait;
use chrono::NaiveDateTime;

use super::error::RepositoryResult;
use crate::models::{
    Booking, BookingId, ConflictPolicy, EventTypeId, HostId, NewBooking, Reservation, StatusChange,
};

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Check if the store is reachable.
    ///
    /// # Returns
    /// - `Ok(true)` if the store is healthy
    /// - `Ok(false)` if it is unhealthy but no error occurred
    /// - `Err(RepositoryError)` if the check itself failed
    async fn health_check(&self) -> RepositoryResult<bool>;

    async fn get_booking(&self, id: BookingId) -> RepositoryResult<Booking>;

    /// Every booking of a host regardless of status, ordered by start time.
    async fn list_bookings_for_host(&self, host_id: HostId) -> RepositoryResult<Vec<Booking>>;

    /// Bookings of an event type whose start lies in `[from, to)` and whose status
    /// blocks under `policy`, ordered by start time.
    async fn fetch_bookings_starting_between(
        &self,
        event_type_id: EventTypeId,
        from: NaiveDateTime,
        to: NaiveDateTime,
        policy: ConflictPolicy,
    ) -> RepositoryResult<Vec<Booking>>;

    /// First blocking booking of the event type overlapping `[start, end)`,
    /// skipping `exclude`.
    async fn find_conflicting_booking(
        &self,
        event_type_id: EventTypeId,
        start: NaiveDateTime,
        end: NaiveDateTime,
        exclude: Option<BookingId>,
        policy: ConflictPolicy,
    ) -> RepositoryResult<Option<Booking>>;

    /// Insert a confirmed booking unless a blocking booking overlaps it.
    async fn insert_booking_if_free(
        &self,
        booking: &NewBooking,
        policy: ConflictPolicy,
    ) -> RepositoryResult<Reservation>;

    /// Move a booking to `[start, end)` and mark it rescheduled unless another
    /// blocking booking overlaps the new interval.
    ///
    /// Returns `Err(RepositoryError::NotFound)` when the booking does not exist.
    async fn reschedule_booking_if_free(
        &self,
        id: BookingId,
        start: NaiveDateTime,
        end: NaiveDateTime,
        policy: ConflictPolicy,
    ) -> RepositoryResult<Reservation>;

    /// Set the status to cancelled.
    ///
    /// Returns `Ok(None)` when the booking does not exist and
    /// `StatusChange::Unchanged` when it was already cancelled.
    async fn cancel_booking(&self, id: BookingId) -> RepositoryResult<Option<StatusChange>>;
}
