//! Domain model for event types, availability schedules and bookings.

pub mod availability;
pub mod booking;
pub mod checks;
pub mod event_type;
pub mod macros;
pub mod time;

pub use availability::*;
pub use booking::*;
pub use event_type::*;
pub use time::*;

use crate::define_id_type;

define_id_type!(i64, HostId);
define_id_type!(i64, EventTypeId);
define_id_type!(i64, AvailabilityId);
define_id_type!(i64, RuleId);
define_id_type!(i64, OverrideId);
define_id_type!(i64, BookingId);

impl Default for HostId {
    fn default() -> Self {
        HostId(1)
    }
}
