//! Data Transfer Objects for the HTTP API.
//!
//! Domain types already derive Serialize/Deserialize and are re-exported here;
//! this module only adds request shapes and the response envelope.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub use crate::models::{
    Availability, AvailabilityUpdate, Booking, DateOverride, EventType, EventTypeUpdate,
    NewAvailability, NewDateOverride, NewEventType, Slot,
};
pub use crate::services::{BookingRequest as CreateBookingRequest, MeetingCounts};

/// Success envelope: `{ "data": ..., "message"?: ... }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            message: None,
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleRequest {
    #[serde(alias = "start_time")]
    pub new_start_time: NaiveDateTime,
}

/// Query parameters for `GET /api/meetings`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeetingsQuery {
    #[serde(default)]
    pub filter: Option<String>,
}

/// Query parameters for `GET /api/event-types/check-slug`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlugQuery {
    pub slug: String,
    #[serde(default)]
    pub exclude_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlugAvailability {
    pub slug: String,
    pub available: bool,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
}
