//! Acquire decision logic for advisory slot locks.
//!
//! The lock key is `(tutor_id, slot_start)`. The persistence layer
//! sweeps expired rows for the key and then applies [`evaluate_acquire`]
//! to whatever survives. Locks are advisory: they shrink the
//! preview-to-commit race window but the booking lifecycle still
//! re-validates every slot before writing a session.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::models::slot_lock::{SlotLock, SLOT_LOCK_TTL_MINUTES};

/// Outcome of an acquire attempt against the current lock state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// No live lock existed; a fresh one should be inserted.
    Granted(SlotLock),
    /// The same student already holds the lock; its expiry is renewed
    /// to the returned instant. Supports a hold-then-confirm UI flow
    /// without losing the reservation.
    Extended(DateTime<Utc>),
    /// Another student holds an unexpired lock. The slot is being
    /// claimed, not hard-unavailable; callers may retry after the TTL.
    Denied,
}

/// Decides an acquire attempt. An expired `existing` lock is treated as
/// absent.
pub fn evaluate_acquire(
    existing: Option<&SlotLock>,
    tutor_id: i32,
    slot_start: DateTime<Utc>,
    slot_end: DateTime<Utc>,
    student_id: i32,
    now: DateTime<Utc>,
) -> AcquireOutcome {
    let expires_at = now + Duration::minutes(SLOT_LOCK_TTL_MINUTES);

    match existing {
        Some(lock) if !lock.is_expired(now) => {
            if lock.locked_by_student_id == student_id {
                AcquireOutcome::Extended(expires_at)
            } else {
                AcquireOutcome::Denied
            }
        }
        _ => AcquireOutcome::Granted(SlotLock {
            lock_id: Uuid::new_v4(),
            tutor_id,
            slot_start,
            slot_end,
            locked_by_student_id: student_id,
            locked_at: now,
            expires_at,
        }),
    }
}
