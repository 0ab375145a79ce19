//! Event types: the bookable meeting kinds a host offers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{EventTypeId, HostId};

/// Color assigned when a host does not pick one.
pub const DEFAULT_EVENT_COLOR: &str = "#0069ff";

/// Shortest and longest allowed meeting durations, in minutes.
pub const MIN_DURATION_MINUTES: u32 = 5;
pub const MAX_DURATION_MINUTES: u32 = 480;

/// A bookable meeting kind, addressed publicly through its slug.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventType {
    pub id: EventTypeId,
    pub host_id: HostId,
    pub name: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub duration_minutes: u32,
    pub is_active: bool,
    pub color: String,
    pub created_at: DateTime<Utc>,
}

/// Input for creating an event type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct NewEventType {
    #[validate(
        length(min = 1, max = 100, message = "must be 1 to 100 characters"),
        custom(function = "super::checks::not_blank")
    )]
    pub name: String,
    #[validate(
        length(min = 1, max = 100, message = "must be 1 to 100 characters"),
        custom(function = "super::checks::slug_chars")
    )]
    pub slug: String,
    #[serde(default)]
    #[validate(length(max = 500, message = "must be at most 500 characters"))]
    pub description: Option<String>,
    #[validate(range(min = 5, max = 480, message = "must be between 5 and 480 minutes"))]
    pub duration_minutes: u32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    #[validate(custom(function = "super::checks::hex_color"))]
    pub color: Option<String>,
}

fn default_true() -> bool {
    true
}

impl NewEventType {
    pub fn new(name: impl Into<String>, slug: impl Into<String>, duration_minutes: u32) -> Self {
        Self {
            name: name.into(),
            slug: slug.into(),
            description: None,
            duration_minutes,
            is_active: true,
            color: None,
        }
    }

    /// Color to persist, falling back to [`DEFAULT_EVENT_COLOR`].
    pub fn color_or_default(&self) -> String {
        self.color
            .clone()
            .unwrap_or_else(|| DEFAULT_EVENT_COLOR.to_string())
    }
}

/// Partial update of an event type; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct EventTypeUpdate {
    #[serde(default)]
    #[validate(
        length(min = 1, max = 100, message = "must be 1 to 100 characters"),
        custom(function = "super::checks::not_blank")
    )]
    pub name: Option<String>,
    #[serde(default)]
    #[validate(
        length(min = 1, max = 100, message = "must be 1 to 100 characters"),
        custom(function = "super::checks::slug_chars")
    )]
    pub slug: Option<String>,
    #[serde(default)]
    #[validate(length(max = 500, message = "must be at most 500 characters"))]
    pub description: Option<String>,
    #[serde(default)]
    #[validate(range(min = 5, max = 480, message = "must be between 5 and 480 minutes"))]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    #[validate(custom(function = "super::checks::hex_color"))]
    pub color: Option<String>,
}

impl EventTypeUpdate {
    /// Apply the update in place.
    pub fn apply_to(&self, event_type: &mut EventType) {
        if let Some(name) = &self.name {
            event_type.name = name.clone();
        }
        if let Some(slug) = &self.slug {
            event_type.slug = slug.clone();
        }
        if let Some(description) = &self.description {
            event_type.description = Some(description.clone());
        }
        if let Some(duration) = self.duration_minutes {
            event_type.duration_minutes = duration;
        }
        if let Some(is_active) = self.is_active {
            event_type.is_active = is_active;
        }
        if let Some(color) = &self.color {
            event_type.color = color.clone();
        }
    }
}
