//! Ordered business-constraint validation of candidate slots.
//!
//! The six checks run in a fixed order and short-circuit on the first
//! failure, so a given slot always reports the same reason code. The
//! codes are stable strings consumed by the UI and by tests; their
//! meaning must not change across versions.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{
    booking::{StudentAvailabilityPreference, TimeOfDay},
    preferences::ModuleTutorPreferences,
    session::Session,
    slot::CandidateSlot,
};

/// Platform-wide floor on how far ahead a slot must be, in days.
/// Independent of tutor preferences.
pub const MINIMUM_ADVANCE_DAYS: i64 = 7;

/// Why a candidate slot was rejected. Serialized through the stable
/// wire codes, so the enum and the strings cannot drift apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectionReason {
    #[serde(rename = "MINIMUM_ADVANCE_NOT_MET")]
    MinimumAdvanceNotMet,
    #[serde(rename = "LEAD_TIME_NOT_MET")]
    LeadTimeNotMet,
    #[serde(rename = "BOOKING_WINDOW_EXCEEDED")]
    BookingWindowExceeded,
    #[serde(rename = "DAILY_LIMIT_REACHED")]
    DailyLimitReached,
    #[serde(rename = "BUFFER_CONFLICT")]
    BufferConflict,
    #[serde(rename = "STUDENT_PREFERENCE_MISMATCH")]
    StudentPreferenceMismatch,
}

impl RejectionReason {
    pub fn as_code(&self) -> &'static str {
        match self {
            RejectionReason::MinimumAdvanceNotMet => "MINIMUM_ADVANCE_NOT_MET",
            RejectionReason::LeadTimeNotMet => "LEAD_TIME_NOT_MET",
            RejectionReason::BookingWindowExceeded => "BOOKING_WINDOW_EXCEEDED",
            RejectionReason::DailyLimitReached => "DAILY_LIMIT_REACHED",
            RejectionReason::BufferConflict => "BUFFER_CONFLICT",
            RejectionReason::StudentPreferenceMismatch => "STUDENT_PREFERENCE_MISMATCH",
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_code())
    }
}

/// Validates one candidate slot against the full battery of booking
/// constraints.
///
/// `existing_sessions` is the non-cancelled session set covering the
/// slot's date range, for both the tutor and the student. `today` and
/// `now` are explicit so callers (and tests) control the clock.
///
/// Check order, short-circuiting on first failure:
///
/// 1. Minimum advance: at least [`MINIMUM_ADVANCE_DAYS`] calendar days
///    between today and the slot's date.
/// 2. Lead time: at least `lead_time_hours` between now and the slot.
/// 3. Booking window: no further out than `booking_window_days`.
/// 4. Daily cap: the tutor's non-cancelled sessions on the slot's date
///    must be below `max_sessions_per_day`.
/// 5. Buffer conflict: the slot expanded by `buffer_minutes` on both
///    ends must not overlap any non-cancelled session of the tutor or
///    the student.
/// 6. Student time-of-day preference.
pub fn validate_slot(
    slot: &CandidateSlot,
    tutor_id: i32,
    student_id: i32,
    student_prefs: &StudentAvailabilityPreference,
    existing_sessions: &[Session],
    prefs: &ModuleTutorPreferences,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> Result<(), RejectionReason> {
    let slot_date = slot.start.date_naive();
    let days_until_slot = (slot_date - today).num_days();

    if days_until_slot < MINIMUM_ADVANCE_DAYS {
        return Err(RejectionReason::MinimumAdvanceNotMet);
    }

    if slot.start - now < Duration::hours(prefs.lead_time_hours as i64) {
        return Err(RejectionReason::LeadTimeNotMet);
    }

    if days_until_slot > prefs.booking_window_days as i64 {
        return Err(RejectionReason::BookingWindowExceeded);
    }

    let tutor_sessions_on_date = existing_sessions
        .iter()
        .filter(|s| {
            !s.is_cancelled() && s.tutor_id == tutor_id && s.scheduled_start.date_naive() == slot_date
        })
        .count();
    if tutor_sessions_on_date >= prefs.max_sessions_per_day as usize {
        return Err(RejectionReason::DailyLimitReached);
    }

    let expanded_start = slot.start - Duration::minutes(prefs.buffer_minutes as i64);
    let expanded_end = slot.end + Duration::minutes(prefs.buffer_minutes as i64);
    let has_conflict = existing_sessions.iter().any(|s| {
        !s.is_cancelled()
            && (s.tutor_id == tutor_id || s.student_id == student_id)
            && s.scheduled_start < expanded_end
            && s.scheduled_end > expanded_start
    });
    if has_conflict {
        return Err(RejectionReason::BufferConflict);
    }

    let time_of_day = TimeOfDay::from_time(slot.start.time());
    if !student_prefs.preferred_times.contains(&time_of_day) {
        return Err(RejectionReason::StudentPreferenceMismatch);
    }

    Ok(())
}
