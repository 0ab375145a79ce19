//! Pure slot computation and conflict logic.
//!
//! Nothing in this module touches the store or the clock; callers pass in the
//! schedule, the existing bookings and "now".
//!
//! - [`resolver`]: effective working window for a date (overrides over weekly rules)
//! - [`slots`]: back-to-back fixed-length candidate slots inside a window
//! - [`conflicts`]: half-open overlap predicate and booking filters

pub mod conflicts;
pub mod resolver;
pub mod slots;

pub use conflicts::{filter_available, find_conflict, has_conflict, overlaps};
pub use resolver::{find_override, resolve_window};
pub use slots::{generate_slots, SlotIter};
