use serde::{Deserialize, Serialize};

use crate::errors::{BookingError, BookingResult};

/// Per (tutor, module) scheduling preferences. One logical record per
/// pair; when no record exists the [`SchedulingDefaults`] apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleTutorPreferences {
    pub tutor_id: i32,
    pub module_id: i32,
    pub slot_length_minutes: i32,
    pub buffer_minutes: i32,
    pub lead_time_hours: i32,
    pub booking_window_days: i32,
    pub max_sessions_per_day: i32,
    pub cancellation_cutoff_hours: i32,
}

impl ModuleTutorPreferences {
    /// Rejects defective preference rows. A bad row is a data defect,
    /// not something to paper over with defaults.
    pub fn validate(&self) -> BookingResult<()> {
        if self.slot_length_minutes <= 0 {
            return Err(BookingError::Invariant(format!(
                "slot_length_minutes must be positive, got {}",
                self.slot_length_minutes
            )));
        }
        if self.buffer_minutes < 0 {
            return Err(BookingError::Invariant(format!(
                "buffer_minutes must be non-negative, got {}",
                self.buffer_minutes
            )));
        }
        Ok(())
    }
}

/// Default scheduling preferences, applied when a tutor has no
/// preference row for a module.
///
/// This is an explicit, injectable configuration value rather than a
/// set of inlined constants, so tests and deployments can override it
/// without touching global state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingDefaults {
    pub slot_length_minutes: i32,
    pub buffer_minutes: i32,
    pub lead_time_hours: i32,
    pub booking_window_days: i32,
    pub max_sessions_per_day: i32,
    pub cancellation_cutoff_hours: i32,
}

impl Default for SchedulingDefaults {
    fn default() -> Self {
        Self {
            slot_length_minutes: 60,
            buffer_minutes: 15,
            lead_time_hours: 24,
            booking_window_days: 30,
            max_sessions_per_day: 4,
            cancellation_cutoff_hours: 12,
        }
    }
}

impl SchedulingDefaults {
    /// Materializes preferences for a (tutor, module) pair that has no
    /// stored row.
    pub fn preferences_for(&self, tutor_id: i32, module_id: i32) -> ModuleTutorPreferences {
        ModuleTutorPreferences {
            tutor_id,
            module_id,
            slot_length_minutes: self.slot_length_minutes,
            buffer_minutes: self.buffer_minutes,
            lead_time_hours: self.lead_time_hours,
            booking_window_days: self.booking_window_days,
            max_sessions_per_day: self.max_sessions_per_day,
            cancellation_cutoff_hours: self.cancellation_cutoff_hours,
        }
    }
}
