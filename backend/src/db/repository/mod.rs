//! Repository trait definitions for the booking store.
//!
//! Storage is split across focused traits, one per aggregate. Implementations
//! usually provide all of them; use [`FullRepository`] as the bound when a
//! service needs more than one.
//!
//! - [`error`]: Error types for repository operations
//! - [`event_type`]: Event type CRUD and slug lookup
//! - [`availability`]: Weekly schedules, rules and date overrides
//! - [`booking`]: Booking reads plus the atomic check-and-write operations
//!
//! ```ignore
//! async fn my_service<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<()> {
//!     let event_type = repo.get_event_type_by_slug(host_id, "intro").await?;
//!     let schedule = repo.get_default_availability(host_id).await?;
//!     Ok(())
//! }
//! ```

pub mod availability;
pub mod booking;
pub mod error;
pub mod event_type;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

pub use availability::AvailabilityRepository;
pub use booking::BookingRepository;
pub use event_type::EventTypeRepository;

/// Composite trait bound for a complete repository implementation.
///
/// Implemented automatically for any type that implements all three repository traits.
pub trait FullRepository: EventTypeRepository + AvailabilityRepository + BookingRepository {}

impl<T> FullRepository for T where
    T: EventTypeRepository + AvailabilityRepository + BookingRepository
{
}
