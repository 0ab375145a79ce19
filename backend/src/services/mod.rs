//! Service layer: booking lifecycle and host-side management.
//!
//! Functions here are generic over any [`FullRepository`](crate::db::FullRepository)
//! and take time and host identity from a [`BookingContext`] instead of global state.

pub mod availability;
pub mod bookings;
pub mod context;
pub mod error;
pub mod event_types;
pub mod meetings;
pub mod validation;

pub use bookings::{
    cancel_booking, create_booking, get_available_slots, get_booking, has_conflict,
    reschedule_booking, BookingRequest,
};
pub use context::{BookingContext, Clock, FixedClock, SystemClock};
pub use error::{BookingError, BookingResult};
pub use meetings::{MeetingCounts, MeetingFilter};
