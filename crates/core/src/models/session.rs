use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Confirmed,
    Cancelled,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Confirmed => "Confirmed",
            SessionStatus::Cancelled => "Cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Confirmed" => Some(SessionStatus::Confirmed),
            "Cancelled" => Some(SessionStatus::Cancelled),
            _ => None,
        }
    }
}

/// A confirmed, scheduled tutoring appointment. Created only by
/// confirming a booking request slot; cancelled sessions drop out of
/// conflict checks but are retained for audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub session_id: Uuid,
    pub booking_request_id: Uuid,
    pub student_id: i32,
    pub tutor_id: i32,
    pub module_id: i32,
    pub scheduled_start: DateTime<Utc>,
    /// Always scheduled_start + the slot length in force at creation
    /// time, frozen thereafter.
    pub scheduled_end: DateTime<Utc>,
    pub status: SessionStatus,
    pub cancellation_reason: Option<String>,
    pub cancelled_by: Option<i32>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn is_cancelled(&self) -> bool {
        self.status == SessionStatus::Cancelled
    }
}
