use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How long a slot lock is honored before it self-expires.
pub const SLOT_LOCK_TTL_MINUTES: i64 = 10;

/// An ephemeral, advisory reservation marker on `(tutor_id, slot_start)`.
///
/// At most one unexpired lock per key is honored. Locks reduce but do
/// not eliminate the double-booking race; confirmation always
/// re-validates against current sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotLock {
    pub lock_id: Uuid,
    pub tutor_id: i32,
    pub slot_start: DateTime<Utc>,
    pub slot_end: DateTime<Utc>,
    pub locked_by_student_id: i32,
    pub locked_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SlotLock {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}
