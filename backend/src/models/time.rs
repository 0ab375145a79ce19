//! Naive wall-clock time handling.
//!
//! Every time value in the booking domain is a naive wall-clock value: rules
//! carry `HH:mm` strings, overrides carry calendar dates and bookings carry
//! naive timestamps. Host and invitee time zones never take part in slot or
//! conflict arithmetic.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Format used when rendering a [`TimeOfDay`] or a slot label.
pub const TIME_OF_DAY_FORMAT: &str = "%H:%M";

/// Format used for calendar dates in paths and payloads.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Error raised when a wall-clock string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time of day '{input}': expected HH:mm (24-hour)")]
pub struct TimeParseError {
    pub input: String,
}

/// A wall-clock time with minute precision, persisted as `HH:mm`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    /// Build a time of day, returning `None` for out-of-range components.
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    /// Parse an `H:mm` or `HH:mm` string.
    ///
    /// Hours accept one or two digits (0-23); minutes need exactly two (00-59).
    pub fn parse(input: &str) -> Result<Self, TimeParseError> {
        let err = || TimeParseError {
            input: input.to_string(),
        };

        let (hours, minutes) = input.split_once(':').ok_or_else(err)?;
        let valid_digits = |s: &str, min: usize, max: usize| {
            (min..=max).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit())
        };
        if !valid_digits(hours, 1, 2) || !valid_digits(minutes, 2, 2) {
            return Err(err());
        }

        let hour: u32 = hours.parse().map_err(|_| err())?;
        let minute: u32 = minutes.parse().map_err(|_| err())?;
        Self::new(hour, minute).ok_or_else(err)
    }

    /// Wrap a chrono time, dropping seconds and sub-second precision.
    pub fn from_naive(time: NaiveTime) -> Self {
        Self::new(time.hour(), time.minute()).unwrap_or(Self(time))
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    pub fn as_naive(&self) -> NaiveTime {
        self.0
    }

    /// Anchor this wall-clock time on a calendar date.
    pub fn on(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(self.0)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(TIME_OF_DAY_FORMAT))
    }
}

impl FromStr for TimeOfDay {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// The effective working window for a single date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayWindow {
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
}

impl DayWindow {
    pub fn new(start_time: TimeOfDay, end_time: TimeOfDay) -> Self {
        Self {
            start_time,
            end_time,
        }
    }

    /// Length of the window; zero or negative when the bounds are inverted.
    pub fn length(&self) -> Duration {
        self.end_time.as_naive() - self.start_time.as_naive()
    }
}

/// Day of week with Sunday = 0 through Saturday = 6.
pub fn day_of_week(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// Half-open bounds `[start_of_day, start_of_next_day)` for a calendar date.
pub fn day_bounds(date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let start = date.and_time(NaiveTime::MIN);
    (start, start + Duration::days(1))
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(input: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT)
}

/// Convert a minute count into a chrono duration.
pub fn minutes(count: u32) -> Duration {
    Duration::minutes(i64::from(count))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_24_hour_values() {
        assert_eq!(TimeOfDay::parse("09:00").unwrap(), TimeOfDay::new(9, 0).unwrap());
        assert_eq!(TimeOfDay::parse("9:30").unwrap(), TimeOfDay::new(9, 30).unwrap());
        assert_eq!(TimeOfDay::parse("23:59").unwrap(), TimeOfDay::new(23, 59).unwrap());
        assert_eq!(TimeOfDay::parse("00:00").unwrap(), TimeOfDay::new(0, 0).unwrap());
    }

    #[test]
    fn test_parse_rejects_malformed_values() {
        for input in [
            "24:00", "12:60", "12:5", "1200", "", "ab:cd", "123:00", " 9:00", "09:00:00",
        ] {
            assert!(TimeOfDay::parse(input).is_err(), "accepted {input:?}");
        }
    }

    #[test]
    fn test_display_pads_to_hh_mm() {
        assert_eq!(TimeOfDay::new(9, 5).unwrap().to_string(), "09:05");
    }

    #[test]
    fn test_serde_uses_hh_mm_strings() {
        let time = TimeOfDay::new(17, 0).unwrap();
        assert_eq!(serde_json::to_string(&time).unwrap(), "\"17:00\"");
        let parsed: TimeOfDay = serde_json::from_str("\"8:15\"").unwrap();
        assert_eq!(parsed, TimeOfDay::new(8, 15).unwrap());
        assert!(serde_json::from_str::<TimeOfDay>("\"25:00\"").is_err());
    }

    #[test]
    fn test_day_of_week_starts_on_sunday() {
        let sunday = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let wednesday = NaiveDate::from_ymd_opt(2026, 10, 21).unwrap();
        let saturday = NaiveDate::from_ymd_opt(2026, 10, 24).unwrap();
        assert_eq!(day_of_week(sunday), 0);
        assert_eq!(day_of_week(wednesday), 3);
        assert_eq!(day_of_week(saturday), 6);
    }

    #[test]
    fn test_day_bounds_are_half_open() {
        let date = NaiveDate::from_ymd_opt(2026, 12, 31).unwrap();
        let (start, end) = day_bounds(date);
        assert_eq!(start.to_string(), "2026-12-31 00:00:00");
        assert_eq!(end.to_string(), "2027-01-01 00:00:00");
    }

    #[test]
    fn test_window_length() {
        let window = DayWindow::new(TimeOfDay::new(9, 0).unwrap(), TimeOfDay::new(17, 0).unwrap());
        assert_eq!(window.length(), Duration::hours(8));
    }
}
