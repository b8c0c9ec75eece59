use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A tutor's standing weekly availability window.
///
/// `module_id = None` means the window applies to every module the
/// tutor teaches; a `Some` value scopes it to one module. Days use
/// 0 = Sunday .. 6 = Saturday.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringAvailability {
    pub availability_id: Uuid,
    pub tutor_id: i32,
    pub module_id: Option<i32>,
    pub day_of_week: u8,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub effective_from: NaiveDate,
    pub effective_until: Option<NaiveDate>,
}

impl RecurringAvailability {
    /// Whether this window is in effect on the given calendar date.
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.effective_from <= date && self.effective_until.map_or(true, |until| until >= date)
    }
}

/// A one-day override of the recurring availability.
///
/// `is_available = false` blocks the whole day. `is_available = true`
/// with explicit start/end times replaces the recurring window's times
/// for that date only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityException {
    pub exception_id: Uuid,
    pub tutor_id: i32,
    pub exception_date: NaiveDate,
    pub is_available: bool,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub reason: Option<String>,
}

// Wire types for the availability endpoints.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityBlockInput {
    pub module_id: Option<i32>,
    pub day_of_week: u8,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub effective_from: NaiveDate,
    pub effective_until: Option<NaiveDate>,
}

/// Full replacement of a tutor's recurring availability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplaceAvailabilityPayload {
    pub blocks: Vec<AvailabilityBlockInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddExceptionPayload {
    pub exception_date: NaiveDate,
    pub is_available: bool,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub reason: Option<String>,
}
