//! Availability resolution for a single calendar date.

use chrono::NaiveDate;

use crate::models::{day_of_week, Availability, DateOverride, DayWindow};

/// Find the override stored for `date`, compared at day granularity.
pub fn find_override(overrides: &[DateOverride], date: NaiveDate) -> Option<&DateOverride> {
    overrides.iter().find(|o| o.date == date)
}

/// Resolve the working window for `date`, or `None` when the host is unavailable.
///
/// An override for the date wins outright: an unavailable override blocks the day,
/// otherwise its own window is used. Without an override, the first rule for the
/// weekday applies. An override that is neither unavailable nor carries both times
/// blocks the day.
pub fn resolve_window(availability: &Availability, date: NaiveDate) -> Option<DayWindow> {
    if let Some(date_override) = find_override(&availability.overrides, date) {
        if date_override.is_unavailable {
            return None;
        }
        return date_override
            .start_time
            .zip(date_override.end_time)
            .map(|(start, end)| DayWindow::new(start, end));
    }

    let weekday = day_of_week(date);
    availability
        .rules
        .iter()
        .find(|rule| rule.day_of_week == weekday)
        .map(|rule| DayWindow::new(rule.start_time, rule.end_time))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AvailabilityId, AvailabilityRule, HostId, OverrideId, RuleId, TimeOfDay,
    };

    fn t(hour: u32, minute: u32) -> TimeOfDay {
        TimeOfDay::new(hour, minute).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn weekday_schedule() -> Availability {
        Availability {
            id: AvailabilityId(1),
            host_id: HostId(1),
            name: "Working Hours".into(),
            is_default: true,
            rules: (1..=5)
                .map(|day| AvailabilityRule {
                    id: RuleId(day as i64),
                    day_of_week: day,
                    start_time: t(9, 0),
                    end_time: t(17, 0),
                })
                .collect(),
            overrides: vec![],
        }
    }

    #[test]
    fn test_rule_applies_on_matching_weekday() {
        let window = resolve_window(&weekday_schedule(), date(2026, 10, 19)).unwrap();
        assert_eq!(window, DayWindow::new(t(9, 0), t(17, 0)));
    }

    #[test]
    fn test_no_rule_means_unavailable() {
        // Sunday and Saturday have no rules.
        assert_eq!(resolve_window(&weekday_schedule(), date(2026, 10, 18)), None);
        assert_eq!(resolve_window(&weekday_schedule(), date(2026, 10, 24)), None);
    }

    #[test]
    fn test_unavailable_override_beats_rule() {
        let mut schedule = weekday_schedule();
        schedule.overrides.push(DateOverride {
            id: OverrideId(1),
            date: date(2026, 10, 19),
            start_time: None,
            end_time: None,
            is_unavailable: true,
        });
        assert_eq!(resolve_window(&schedule, date(2026, 10, 19)), None);
        // The following Monday still follows the rule.
        assert!(resolve_window(&schedule, date(2026, 10, 26)).is_some());
    }

    #[test]
    fn test_window_override_replaces_rule_times() {
        let mut schedule = weekday_schedule();
        schedule.overrides.push(DateOverride {
            id: OverrideId(1),
            date: date(2026, 10, 21),
            start_time: Some(t(12, 0)),
            end_time: Some(t(14, 30)),
            is_unavailable: false,
        });
        assert_eq!(
            resolve_window(&schedule, date(2026, 10, 21)),
            Some(DayWindow::new(t(12, 0), t(14, 30)))
        );
    }

    #[test]
    fn test_override_opens_a_day_without_rules() {
        let mut schedule = weekday_schedule();
        schedule.overrides.push(DateOverride {
            id: OverrideId(1),
            date: date(2026, 10, 24),
            start_time: Some(t(10, 0)),
            end_time: Some(t(12, 0)),
            is_unavailable: false,
        });
        assert_eq!(
            resolve_window(&schedule, date(2026, 10, 24)),
            Some(DayWindow::new(t(10, 0), t(12, 0)))
        );
    }

    #[test]
    fn test_override_without_times_blocks_day() {
        let mut schedule = weekday_schedule();
        schedule.overrides.push(DateOverride {
            id: OverrideId(1),
            date: date(2026, 10, 20),
            start_time: Some(t(10, 0)),
            end_time: None,
            is_unavailable: false,
        });
        assert_eq!(resolve_window(&schedule, date(2026, 10, 20)), None);
    }

    #[test]
    fn test_first_rule_wins_for_split_days() {
        let mut schedule = weekday_schedule();
        schedule.rules.retain(|r| r.day_of_week != 3);
        schedule.rules.push(AvailabilityRule {
            id: RuleId(10),
            day_of_week: 3,
            start_time: t(8, 0),
            end_time: t(11, 0),
        });
        schedule.rules.push(AvailabilityRule {
            id: RuleId(11),
            day_of_week: 3,
            start_time: t(13, 0),
            end_time: t(18, 0),
        });
        assert_eq!(
            resolve_window(&schedule, date(2026, 10, 21)),
            Some(DayWindow::new(t(8, 0), t(11, 0)))
        );
    }
}
