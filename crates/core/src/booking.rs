//! Confirmation planning for booking requests.
//!
//! Confirming a request re-runs the full slot validation against the
//! *current* session set, closing the race window between the preview a
//! student saw and the tutor's approval. Planning is all-or-nothing: if
//! any approved slot fails, no sessions are created from the call.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use uuid::Uuid;

use crate::models::{
    booking::{BookingRequest, StudentAvailabilityPreference},
    preferences::ModuleTutorPreferences,
    session::{Session, SessionStatus},
    slot::CandidateSlot,
};
use crate::validation::{validate_slot, RejectionReason};

/// A slot that survived re-validation and is ready to be written as a
/// confirmed session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedSession {
    pub scheduled_start: DateTime<Utc>,
    pub scheduled_end: DateTime<Utc>,
}

/// The slot that sank a confirmation, with its reason code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotRejection {
    pub slot_start: DateTime<Utc>,
    pub reason: RejectionReason,
}

/// Re-validates the approved slots, in the order supplied, against the
/// current existing-session snapshot.
///
/// Slots accepted earlier in the same call count as existing sessions
/// for the later ones, so a single confirmation cannot double-book
/// itself. The first failing slot aborts the whole plan; callers must
/// write zero session rows in that case.
pub fn plan_confirmation(
    request: &BookingRequest,
    approved_slot_starts: &[DateTime<Utc>],
    student_prefs: &StudentAvailabilityPreference,
    existing_sessions: &[Session],
    prefs: &ModuleTutorPreferences,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> Result<Vec<PlannedSession>, SlotRejection> {
    let slot_length = Duration::minutes(prefs.slot_length_minutes as i64);

    // Working copy: grows with each accepted slot so later slots see
    // the earlier ones as occupied.
    let mut sessions = existing_sessions.to_vec();
    let mut planned = Vec::with_capacity(approved_slot_starts.len());

    for &slot_start in approved_slot_starts {
        let slot = CandidateSlot {
            start: slot_start,
            end: slot_start + slot_length,
        };

        validate_slot(
            &slot,
            request.tutor_id,
            request.student_id,
            student_prefs,
            &sessions,
            prefs,
            today,
            now,
        )
        .map_err(|reason| SlotRejection { slot_start, reason })?;

        sessions.push(Session {
            session_id: Uuid::new_v4(),
            booking_request_id: request.request_id,
            student_id: request.student_id,
            tutor_id: request.tutor_id,
            module_id: request.module_id,
            scheduled_start: slot.start,
            scheduled_end: slot.end,
            status: SessionStatus::Confirmed,
            cancellation_reason: None,
            cancelled_by: None,
            cancelled_at: None,
        });
        planned.push(PlannedSession {
            scheduled_start: slot.start,
            scheduled_end: slot.end,
        });
    }

    Ok(planned)
}
