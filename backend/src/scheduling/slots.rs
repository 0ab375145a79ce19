//! Fixed-length slot generation.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::models::{minutes, DayWindow, Slot, TimeOfDay};

/// Iterator over back-to-back slots `[cursor, cursor + duration)` that fit entirely
/// before the window end. No partial trailing slot is produced.
#[derive(Debug, Clone)]
pub struct SlotIter {
    cursor: NaiveDateTime,
    end: NaiveDateTime,
    step: Duration,
}

impl SlotIter {
    pub fn new(
        date: NaiveDate,
        window_start: TimeOfDay,
        window_end: TimeOfDay,
        duration_minutes: u32,
    ) -> Self {
        Self {
            cursor: window_start.on(date),
            end: window_end.on(date),
            step: minutes(duration_minutes),
        }
    }

    pub fn for_window(date: NaiveDate, window: &DayWindow, duration_minutes: u32) -> Self {
        Self::new(date, window.start_time, window.end_time, duration_minutes)
    }
}

impl Iterator for SlotIter {
    type Item = Slot;

    fn next(&mut self) -> Option<Slot> {
        // A zero step would never advance.
        if self.step <= Duration::zero() {
            return None;
        }
        let slot_end = self.cursor + self.step;
        if slot_end > self.end {
            return None;
        }
        let slot = Slot::new(self.cursor, slot_end);
        self.cursor = slot_end;
        Some(slot)
    }
}

/// Generate the ordered candidate slots for a window on `date`.
pub fn generate_slots(
    date: NaiveDate,
    window_start: TimeOfDay,
    window_end: TimeOfDay,
    duration_minutes: u32,
) -> Vec<Slot> {
    SlotIter::new(date, window_start, window_end, duration_minutes).collect()
}
