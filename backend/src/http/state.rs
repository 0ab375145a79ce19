//! Application state for the HTTP server.

use std::sync::Arc;

use crate::config::BookingSettings;
use crate::db::repository::FullRepository;
use crate::services::{BookingContext, Clock, SystemClock};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for database operations
    pub repository: Arc<dyn FullRepository>,
    pub clock: Arc<dyn Clock>,
    pub booking: BookingSettings,
}

impl AppState {
    /// State with the system clock and default booking settings.
    pub fn new(repository: Arc<dyn FullRepository>) -> Self {
        Self {
            repository,
            clock: Arc::new(SystemClock),
            booking: BookingSettings::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_booking_settings(mut self, booking: BookingSettings) -> Self {
        self.booking = booking;
        self
    }

    /// Context for one request, stamped with the current time.
    pub fn context(&self) -> BookingContext {
        BookingContext::new(
            self.booking.host_id,
            self.booking.conflict_policy,
            self.clock.now(),
        )
    }
}
