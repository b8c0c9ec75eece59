//! Candidate slot generation.
//!
//! Expands a tutor's recurring weekly availability, date-specific
//! exceptions, and a student's day preferences into an ordered sequence
//! of fixed-length candidate slots over a date range. The sequence is
//! lazy, finite, and restartable: the same inputs (plus `today`, which
//! anchors the advance-booking clamp) always yield the same slots.

use std::collections::VecDeque;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};

use crate::models::{
    availability::{AvailabilityException, RecurringAvailability},
    booking::StudentAvailabilityPreference,
    preferences::ModuleTutorPreferences,
    slot::CandidateSlot,
};
use crate::validation::MINIMUM_ADVANCE_DAYS;

/// Generates candidate slots for one (tutor, module) pair.
///
/// Construction clamps the requested range to the platform-wide
/// 7-day advance floor; if the range collapses entirely, the end is
/// widened so at least one week of candidates is produced.
pub struct SlotGenerator<'a> {
    module_id: i32,
    range_start: NaiveDate,
    range_end: NaiveDate,
    recurring: &'a [RecurringAvailability],
    exceptions: &'a [AvailabilityException],
    student_prefs: &'a StudentAvailabilityPreference,
    preferences: &'a ModuleTutorPreferences,
}

impl<'a> SlotGenerator<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        module_id: i32,
        range_start: NaiveDate,
        range_end: NaiveDate,
        today: NaiveDate,
        recurring: &'a [RecurringAvailability],
        exceptions: &'a [AvailabilityException],
        student_prefs: &'a StudentAvailabilityPreference,
        preferences: &'a ModuleTutorPreferences,
    ) -> Self {
        let floor = today + Duration::days(MINIMUM_ADVANCE_DAYS);
        let start = range_start.max(floor);
        let end = if range_end < start {
            // Range collapsed under the clamp; show a week from the floor.
            start + Duration::days(7)
        } else {
            range_end
        };

        Self {
            module_id,
            range_start: start,
            range_end: end,
            recurring,
            exceptions,
            student_prefs,
            preferences,
        }
    }

    /// The date range actually walked, after the advance-floor clamp.
    pub fn clamped_range(&self) -> (NaiveDate, NaiveDate) {
        (self.range_start, self.range_end)
    }

    /// Lazy iteration over candidate slots, in chronological order.
    /// Calling `iter` again restarts the sequence.
    pub fn iter(&self) -> SlotIter<'_> {
        SlotIter {
            generator: self,
            next_date: Some(self.range_start),
            pending: VecDeque::new(),
        }
    }

    /// Collects the whole sequence.
    pub fn generate(&self) -> Vec<CandidateSlot> {
        self.iter().collect()
    }

    /// Availability windows in force on `date`, as wall-clock intervals.
    ///
    /// Module-specific recurring rows fully override module-agnostic
    /// rows for the same day (most-specific-wins). An exception with
    /// `is_available = false` blanks the whole day; one with explicit
    /// times replaces each window's times for that date only.
    fn windows_for_date(&self, date: NaiveDate) -> Vec<(NaiveTime, NaiveTime)> {
        let day_of_week = date.weekday().num_days_from_sunday() as u8;
        if !self.student_prefs.preferred_days.contains(&day_of_week) {
            return Vec::new();
        }

        let exception = self
            .exceptions
            .iter()
            .find(|e| e.exception_date == date);
        if let Some(e) = exception {
            if !e.is_available {
                return Vec::new();
            }
        }

        let day_rows: Vec<&RecurringAvailability> = self
            .recurring
            .iter()
            .filter(|r| r.day_of_week == day_of_week && r.covers(date))
            .collect();
        let has_module_specific = day_rows
            .iter()
            .any(|r| r.module_id == Some(self.module_id));

        let mut windows: Vec<(NaiveTime, NaiveTime)> = day_rows
            .into_iter()
            .filter(|r| {
                if has_module_specific {
                    r.module_id == Some(self.module_id)
                } else {
                    r.module_id.is_none()
                }
            })
            .map(|r| match exception {
                Some(e) if e.is_available => match (e.start_time, e.end_time) {
                    (Some(start), Some(end)) => (start, end),
                    _ => (r.start_time, r.end_time),
                },
                _ => (r.start_time, r.end_time),
            })
            .collect();

        windows.sort();
        windows.dedup();
        windows
    }

    /// Walks each window in slot-length increments. No partial trailing
    /// slots: a slot is emitted only if it fits entirely in the window.
    fn slots_for_date(&self, date: NaiveDate) -> Vec<CandidateSlot> {
        if self.preferences.slot_length_minutes <= 0 {
            // Defective preferences are rejected upstream; this guard
            // keeps the walk finite.
            return Vec::new();
        }
        let step = Duration::minutes(self.preferences.slot_length_minutes as i64);

        let mut slots = Vec::new();
        for (window_start, window_end) in self.windows_for_date(date) {
            let window_start: DateTime<Utc> = date.and_time(window_start).and_utc();
            let window_end: DateTime<Utc> = date.and_time(window_end).and_utc();

            let mut start = window_start;
            while start + step <= window_end {
                slots.push(CandidateSlot {
                    start,
                    end: start + step,
                });
                start += step;
            }
        }
        slots
    }
}

/// Iterator over a [`SlotGenerator`]'s candidate slots. Dates are
/// expanded one at a time, so the sequence is produced lazily.
pub struct SlotIter<'a> {
    generator: &'a SlotGenerator<'a>,
    next_date: Option<NaiveDate>,
    pending: VecDeque<CandidateSlot>,
}

impl Iterator for SlotIter<'_> {
    type Item = CandidateSlot;

    fn next(&mut self) -> Option<CandidateSlot> {
        loop {
            if let Some(slot) = self.pending.pop_front() {
                return Some(slot);
            }

            let date = self.next_date?;
            if date > self.generator.range_end {
                self.next_date = None;
                return None;
            }
            self.pending = self.generator.slots_for_date(date).into();
            self.next_date = date.succ_opt();
        }
    }
}
