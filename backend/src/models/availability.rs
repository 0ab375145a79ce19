//! Availability schedules: weekly rules plus date-specific overrides.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::time::TimeOfDay;
use super::{AvailabilityId, HostId, OverrideId, RuleId};

/// Name given to the schedule created for a host on first access.
pub const DEFAULT_SCHEDULE_NAME: &str = "Working Hours";

/// A recurring weekly window. `day_of_week` uses Sunday = 0 .. Saturday = 6.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityRule {
    pub id: RuleId,
    pub day_of_week: u8,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "super::checks::rule_window"))]
pub struct NewAvailabilityRule {
    #[validate(range(max = 6, message = "must be between 0 and 6"))]
    pub day_of_week: u8,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
}

impl NewAvailabilityRule {
    pub fn new(day_of_week: u8, start_time: TimeOfDay, end_time: TimeOfDay) -> Self {
        Self {
            day_of_week,
            start_time,
            end_time,
        }
    }
}

/// A date-specific replacement window, or a full-day block when `is_unavailable`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateOverride {
    pub id: OverrideId,
    pub date: NaiveDate,
    pub start_time: Option<TimeOfDay>,
    pub end_time: Option<TimeOfDay>,
    pub is_unavailable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "super::checks::override_window"))]
pub struct NewDateOverride {
    pub date: NaiveDate,
    #[serde(default)]
    pub start_time: Option<TimeOfDay>,
    #[serde(default)]
    pub end_time: Option<TimeOfDay>,
    #[serde(default)]
    pub is_unavailable: bool,
}

impl NewDateOverride {
    /// Block the whole date.
    pub fn unavailable(date: NaiveDate) -> Self {
        Self {
            date,
            start_time: None,
            end_time: None,
            is_unavailable: true,
        }
    }

    /// Replace the recurring window for the date.
    pub fn window(date: NaiveDate, start_time: TimeOfDay, end_time: TimeOfDay) -> Self {
        Self {
            date,
            start_time: Some(start_time),
            end_time: Some(end_time),
            is_unavailable: false,
        }
    }

    /// Unavailable overrides never keep times.
    pub fn normalized(&self) -> Self {
        if self.is_unavailable {
            Self::unavailable(self.date)
        } else {
            self.clone()
        }
    }
}

/// A named collection of rules and overrides owned by a host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    pub id: AvailabilityId,
    pub host_id: HostId,
    pub name: String,
    pub is_default: bool,
    pub rules: Vec<AvailabilityRule>,
    pub overrides: Vec<DateOverride>,
}

impl Availability {
    /// Rules ordered by weekday; rules on the same day keep insertion order.
    pub fn sort_children(&mut self) {
        self.rules.sort_by_key(|rule| rule.day_of_week);
        self.overrides.sort_by_key(|o| o.date);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct NewAvailability {
    #[validate(
        length(min = 1, max = 100, message = "must be 1 to 100 characters"),
        custom(function = "super::checks::not_blank")
    )]
    pub name: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub rules: Vec<NewAvailabilityRule>,
}

impl NewAvailability {
    /// Monday to Friday, 09:00-17:00, marked default.
    pub fn working_hours() -> Self {
        let rules = TimeOfDay::new(9, 0)
            .zip(TimeOfDay::new(17, 0))
            .map(|(start, end)| {
                (1..=5)
                    .map(|day| NewAvailabilityRule::new(day, start, end))
                    .collect()
            })
            .unwrap_or_default();
        Self {
            name: DEFAULT_SCHEDULE_NAME.to_string(),
            is_default: true,
            rules,
        }
    }
}

/// Partial update; `rules` replaces the full rule set when present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct AvailabilityUpdate {
    #[serde(default)]
    #[validate(
        length(min = 1, max = 100, message = "must be 1 to 100 characters"),
        custom(function = "super::checks::not_blank")
    )]
    pub name: Option<String>,
    #[serde(default)]
    pub is_default: Option<bool>,
    #[serde(default)]
    pub rules: Option<Vec<NewAvailabilityRule>>,
}
