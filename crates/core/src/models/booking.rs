use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validation::RejectionReason;

/// Days before an unanswered booking request expires and stops being
/// shown to tutors.
pub const REQUEST_EXPIRY_DAYS: i64 = 7;

/// Hour at which Morning ends and Afternoon begins.
pub const MORNING_END_HOUR: u32 = 12;
/// Hour at which Afternoon ends and Evening begins.
pub const AFTERNOON_END_HOUR: u32 = 17;

/// Coarse time-of-day bucket used for student preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
}

impl TimeOfDay {
    /// Buckets a wall-clock time: before 12:00 is Morning, 12:00–16:59
    /// is Afternoon, 17:00 onwards is Evening.
    pub fn from_time(time: NaiveTime) -> Self {
        if time.hour() < MORNING_END_HOUR {
            TimeOfDay::Morning
        } else if time.hour() < AFTERNOON_END_HOUR {
            TimeOfDay::Afternoon
        } else {
            TimeOfDay::Evening
        }
    }
}

/// A student's day/time preferences, supplied per booking attempt and
/// snapshotted onto the booking request for later re-validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentAvailabilityPreference {
    /// Preferred days of week, 0 = Sunday .. 6 = Saturday.
    pub preferred_days: BTreeSet<u8>,
    pub preferred_times: BTreeSet<TimeOfDay>,
}

impl StudentAvailabilityPreference {
    pub fn new(
        days: impl IntoIterator<Item = u8>,
        times: impl IntoIterator<Item = TimeOfDay>,
    ) -> Self {
        Self {
            preferred_days: days.into_iter().collect(),
            preferred_times: times.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingStatus {
    Pending,
    Approved,
    Rejected,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Approved => "Approved",
            BookingStatus::Rejected => "Rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(BookingStatus::Pending),
            "Approved" => Some(BookingStatus::Approved),
            "Rejected" => Some(BookingStatus::Rejected),
            _ => None,
        }
    }
}

/// A student-submitted batch of candidate slots awaiting tutor
/// decision. Mutated only by the booking lifecycle; expiry is enforced
/// at read time, so an expired Pending request is treated as Rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    pub request_id: Uuid,
    pub student_id: i32,
    pub tutor_id: i32,
    pub module_id: i32,
    pub status: BookingStatus,
    /// Requested slot starts, in the order the student submitted them.
    pub requested_slot_starts: Vec<DateTime<Utc>>,
    pub student_preferences: StudentAvailabilityPreference,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}

impl BookingRequest {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Whether a tutor may still act on this request.
    pub fn is_actionable(&self, now: DateTime<Utc>) -> bool {
        self.status == BookingStatus::Pending && !self.is_expired(now)
    }
}

// Wire types for the booking endpoints.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewSlotsRequest {
    pub student_id: i32,
    pub tutor_id: i32,
    pub module_id: i32,
    pub range_start: NaiveDate,
    pub range_end: NaiveDate,
    pub student_preferences: StudentAvailabilityPreference,
}

/// One previewed slot: every candidate is returned, with the rejection
/// reason attached when it failed validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookableSlot {
    pub slot_start: DateTime<Utc>,
    pub slot_end: DateTime<Utc>,
    pub is_available: bool,
    pub unavailable_reason: Option<RejectionReason>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingRequestPayload {
    pub student_id: i32,
    pub tutor_id: i32,
    pub module_id: i32,
    pub requested_slot_starts: Vec<DateTime<Utc>>,
    pub student_preferences: StudentAvailabilityPreference,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmBookingPayload {
    pub tutor_id: i32,
    pub approved_slot_starts: Vec<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectBookingPayload {
    pub tutor_id: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockSlotPayload {
    pub student_id: i32,
    pub tutor_id: i32,
    pub module_id: i32,
    pub slot_start: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockSlotResponse {
    /// False means another student currently holds the slot; the caller
    /// may retry after the lock TTL.
    pub acquired: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseLockPayload {
    pub student_id: i32,
    pub tutor_id: i32,
    pub slot_start: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseAllLocksPayload {
    pub student_id: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelSessionPayload {
    pub user_id: i32,
    pub reason: String,
}
