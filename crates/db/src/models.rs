use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use eyre::{eyre, Result};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use tutorbook_core::models::{
    availability::{AvailabilityException, RecurringAvailability},
    booking::{BookingRequest, BookingStatus, StudentAvailabilityPreference},
    preferences::ModuleTutorPreferences,
    session::{Session, SessionStatus},
    slot_lock::SlotLock,
};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbRecurringAvailability {
    pub availability_id: Uuid,
    pub tutor_id: i32,
    pub module_id: Option<i32>,
    pub day_of_week: i16,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub effective_from: NaiveDate,
    pub effective_until: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbRecurringAvailability {
    pub fn to_core(&self) -> RecurringAvailability {
        RecurringAvailability {
            availability_id: self.availability_id,
            tutor_id: self.tutor_id,
            module_id: self.module_id,
            day_of_week: self.day_of_week as u8,
            start_time: self.start_time,
            end_time: self.end_time,
            effective_from: self.effective_from,
            effective_until: self.effective_until,
        }
    }
}

/// Input row for replacing a tutor's availability in one call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRecurringAvailability {
    pub module_id: Option<i32>,
    pub day_of_week: i16,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub effective_from: NaiveDate,
    pub effective_until: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAvailabilityException {
    pub exception_id: Uuid,
    pub tutor_id: i32,
    pub exception_date: NaiveDate,
    pub is_available: bool,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl DbAvailabilityException {
    pub fn to_core(&self) -> AvailabilityException {
        AvailabilityException {
            exception_id: self.exception_id,
            tutor_id: self.tutor_id,
            exception_date: self.exception_date,
            is_available: self.is_available,
            start_time: self.start_time,
            end_time: self.end_time,
            reason: self.reason.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAvailabilityException {
    pub exception_date: NaiveDate,
    pub is_available: bool,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbModuleTutorPreferences {
    pub preference_id: Uuid,
    pub tutor_id: i32,
    pub module_id: i32,
    pub slot_length_minutes: i32,
    pub buffer_minutes: i32,
    pub lead_time_hours: i32,
    pub booking_window_days: i32,
    pub max_sessions_per_day: i32,
    pub cancellation_cutoff_hours: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbModuleTutorPreferences {
    pub fn to_core(&self) -> ModuleTutorPreferences {
        ModuleTutorPreferences {
            tutor_id: self.tutor_id,
            module_id: self.module_id,
            slot_length_minutes: self.slot_length_minutes,
            buffer_minutes: self.buffer_minutes,
            lead_time_hours: self.lead_time_hours,
            booking_window_days: self.booking_window_days,
            max_sessions_per_day: self.max_sessions_per_day,
            cancellation_cutoff_hours: self.cancellation_cutoff_hours,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbBookingRequest {
    pub request_id: Uuid,
    pub student_id: i32,
    pub tutor_id: i32,
    pub module_id: i32,
    pub status: String,
    /// JSONB: ordered array of slot-start timestamps.
    pub requested_slots: serde_json::Value,
    /// JSONB: the student's availability snapshot.
    pub student_preferences: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}

impl DbBookingRequest {
    pub fn to_core(&self) -> Result<BookingRequest> {
        let status = BookingStatus::parse(&self.status)
            .ok_or_else(|| eyre!("unknown booking request status: {}", self.status))?;
        let requested_slot_starts: Vec<DateTime<Utc>> =
            serde_json::from_value(self.requested_slots.clone())?;
        let student_preferences: StudentAvailabilityPreference =
            serde_json::from_value(self.student_preferences.clone())?;

        Ok(BookingRequest {
            request_id: self.request_id,
            student_id: self.student_id,
            tutor_id: self.tutor_id,
            module_id: self.module_id,
            status,
            requested_slot_starts,
            student_preferences,
            created_at: self.created_at,
            expires_at: self.expires_at,
            responded_at: self.responded_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbSession {
    pub session_id: Uuid,
    pub booking_request_id: Uuid,
    pub student_id: i32,
    pub tutor_id: i32,
    pub module_id: i32,
    pub scheduled_start: DateTime<Utc>,
    pub scheduled_end: DateTime<Utc>,
    pub status: String,
    pub cancellation_reason: Option<String>,
    pub cancelled_by: Option<i32>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbSession {
    pub fn to_core(&self) -> Result<Session> {
        let status = SessionStatus::parse(&self.status)
            .ok_or_else(|| eyre!("unknown session status: {}", self.status))?;

        Ok(Session {
            session_id: self.session_id,
            booking_request_id: self.booking_request_id,
            student_id: self.student_id,
            tutor_id: self.tutor_id,
            module_id: self.module_id,
            scheduled_start: self.scheduled_start,
            scheduled_end: self.scheduled_end,
            status,
            cancellation_reason: self.cancellation_reason.clone(),
            cancelled_by: self.cancelled_by,
            cancelled_at: self.cancelled_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbSlotLock {
    pub lock_id: Uuid,
    pub tutor_id: i32,
    pub slot_start: DateTime<Utc>,
    pub slot_end: DateTime<Utc>,
    pub locked_by_student_id: i32,
    pub locked_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl DbSlotLock {
    pub fn to_core(&self) -> SlotLock {
        SlotLock {
            lock_id: self.lock_id,
            tutor_id: self.tutor_id,
            slot_start: self.slot_start,
            slot_end: self.slot_end,
            locked_by_student_id: self.locked_by_student_id,
            locked_at: self.locked_at,
            expires_at: self.expires_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbNotification {
    pub notification_id: Uuid,
    pub user_id: i32,
    pub kind: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}
