//! # Booking Handlers
//!
//! The booking lifecycle: previewing bookable slots, submitting a request,
//! the tutor's confirm/reject decision, and the advisory slot locks that
//! shrink the preview-to-commit race window.
//!
//! Confirmation is all-or-nothing. Every approved slot is re-validated
//! against the current session set before any row is written; if an insert
//! still loses a race (the unique index on confirmed tutor slots), the
//! sessions already written by the same call are removed and the whole
//! confirmation fails with a buffer-conflict rejection.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::sync::Arc;
use tutorbook_core::{
    booking::plan_confirmation,
    errors::BookingError,
    models::{
        booking::{
            BookableSlot, BookingRequest, BookingStatus, ConfirmBookingPayload,
            CreateBookingRequestPayload, LockSlotPayload, LockSlotResponse, PreviewSlotsRequest,
            RejectBookingPayload, ReleaseAllLocksPayload, ReleaseLockPayload,
        },
        preferences::ModuleTutorPreferences,
        session::Session,
    },
    slots::SlotGenerator,
    validation::{validate_slot, RejectionReason, MINIMUM_ADVANCE_DAYS},
};
use uuid::Uuid;

use crate::{middleware::error_handling::AppError, ApiState};

/// Loads the preferences in force for a (tutor, module) pair, falling
/// back to the configured defaults when no row exists.
async fn load_preferences(
    state: &ApiState,
    tutor_id: i32,
    module_id: i32,
) -> Result<ModuleTutorPreferences, BookingError> {
    let stored = tutorbook_db::repositories::preferences::get_preferences(
        &state.db_pool,
        tutor_id,
        module_id,
    )
    .await
    .map_err(BookingError::Store)?;

    let prefs = match stored {
        Some(row) => row.to_core(),
        None => state.defaults.preferences_for(tutor_id, module_id),
    };
    prefs.validate()?;

    Ok(prefs)
}

#[axum::debug_handler]
pub async fn preview_slots(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<PreviewSlotsRequest>,
) -> Result<Json<Vec<BookableSlot>>, AppError> {
    let now = Utc::now();
    let today = now.date_naive();

    let prefs = load_preferences(&state, payload.tutor_id, payload.module_id).await?;

    // Mirror the generator's clamp so the fetched exceptions and sessions
    // cover the range it will actually walk.
    let floor = today + Duration::days(MINIMUM_ADVANCE_DAYS);
    let range_start = payload.range_start.max(floor);
    let range_end = if payload.range_end < range_start {
        range_start + Duration::days(7)
    } else {
        payload.range_end
    };

    let recurring: Vec<_> = tutorbook_db::repositories::availability::get_recurring_availability(
        &state.db_pool,
        payload.tutor_id,
        Some(payload.module_id),
    )
    .await
    .map_err(BookingError::Store)?
    .iter()
    .map(|r| r.to_core())
    .collect();

    let exceptions: Vec<_> = tutorbook_db::repositories::availability::get_exceptions(
        &state.db_pool,
        payload.tutor_id,
        range_start,
        range_end,
    )
    .await
    .map_err(BookingError::Store)?
    .iter()
    .map(|e| e.to_core())
    .collect();

    let existing_sessions =
        fetch_session_snapshot(&state, payload.tutor_id, payload.student_id, range_start, range_end)
            .await?;

    let generator = SlotGenerator::new(
        payload.module_id,
        payload.range_start,
        payload.range_end,
        today,
        &recurring,
        &exceptions,
        &payload.student_preferences,
        &prefs,
    );

    let slots = generator
        .iter()
        .map(|slot| {
            let verdict = validate_slot(
                &slot,
                payload.tutor_id,
                payload.student_id,
                &payload.student_preferences,
                &existing_sessions,
                &prefs,
                today,
                now,
            );
            BookableSlot {
                slot_start: slot.start,
                slot_end: slot.end,
                is_available: verdict.is_ok(),
                unavailable_reason: verdict.err(),
            }
        })
        .collect();

    Ok(Json(slots))
}

#[axum::debug_handler]
pub async fn create_booking_request(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<CreateBookingRequestPayload>,
) -> Result<Json<BookingRequest>, AppError> {
    if payload.requested_slot_starts.is_empty() {
        return Err(AppError(BookingError::Validation(
            "a booking request needs at least one slot".to_string(),
        )));
    }

    let row = tutorbook_db::repositories::booking_request::create_booking_request(
        &state.db_pool,
        payload.student_id,
        payload.tutor_id,
        payload.module_id,
        &payload.requested_slot_starts,
        &payload.student_preferences,
    )
    .await
    .map_err(BookingError::Store)?;

    // The request snapshots the slots, so the advisory locks on them have
    // done their job.
    tutorbook_db::repositories::slot_lock::release_for_slots(
        &state.db_pool,
        payload.student_id,
        payload.tutor_id,
        &payload.requested_slot_starts,
    )
    .await
    .map_err(BookingError::Store)?;

    Ok(Json(row.to_core()?))
}

#[axum::debug_handler]
pub async fn list_pending_requests(
    State(state): State<Arc<ApiState>>,
    Path(tutor_id): Path<i32>,
) -> Result<Json<Vec<BookingRequest>>, AppError> {
    let rows = tutorbook_db::repositories::booking_request::list_pending_for_tutor(
        &state.db_pool,
        tutor_id,
        Utc::now(),
    )
    .await
    .map_err(BookingError::Store)?;

    let mut requests = Vec::with_capacity(rows.len());
    for row in rows {
        requests.push(row.to_core()?);
    }

    Ok(Json(requests))
}

#[axum::debug_handler]
pub async fn confirm_booking(
    State(state): State<Arc<ApiState>>,
    Path(request_id): Path<Uuid>,
    Json(payload): Json<ConfirmBookingPayload>,
) -> Result<Json<Vec<Session>>, AppError> {
    let now = Utc::now();
    let today = now.date_naive();

    let request = fetch_actionable_request(&state, request_id, payload.tutor_id, now).await?;

    if payload.approved_slot_starts.is_empty() {
        return Err(AppError(BookingError::Validation(
            "at least one approved slot is required".to_string(),
        )));
    }
    for slot_start in &payload.approved_slot_starts {
        if !request.requested_slot_starts.contains(slot_start) {
            return Err(AppError(BookingError::Validation(format!(
                "slot {} was not part of the request",
                slot_start
            ))));
        }
    }

    let prefs = load_preferences(&state, request.tutor_id, request.module_id).await?;

    let earliest = payload
        .approved_slot_starts
        .iter()
        .min()
        .copied()
        .unwrap_or(now);
    let latest = payload
        .approved_slot_starts
        .iter()
        .max()
        .copied()
        .unwrap_or(now);
    let existing_sessions = fetch_session_snapshot(
        &state,
        request.tutor_id,
        request.student_id,
        (earliest - Duration::days(1)).date_naive(),
        (latest + Duration::days(1)).date_naive(),
    )
    .await?;

    let plan = plan_confirmation(
        &request,
        &payload.approved_slot_starts,
        &request.student_preferences,
        &existing_sessions,
        &prefs,
        today,
        now,
    )
    .map_err(|rejection| BookingError::Rejected(rejection.reason))?;

    // Writes happen only after the whole plan validated. A unique-index
    // violation here means a concurrent confirmation won the slot; unwind
    // this call's inserts and report it as a conflict.
    let mut created = Vec::with_capacity(plan.len());
    for planned in &plan {
        let inserted = tutorbook_db::repositories::session::insert_session(
            &state.db_pool,
            request.request_id,
            request.student_id,
            request.tutor_id,
            request.module_id,
            planned.scheduled_start,
            planned.scheduled_end,
        )
        .await;

        match inserted {
            Ok(row) => created.push(row),
            Err(err) => {
                let lost_race = tutorbook_db::repositories::session::is_duplicate_slot(&err);
                for row in &created {
                    if let Err(cleanup_err) = tutorbook_db::repositories::session::delete_session(
                        &state.db_pool,
                        row.session_id,
                    )
                    .await
                    {
                        tracing::error!(
                            "Failed to unwind session {} after aborted confirmation: {cleanup_err:?}",
                            row.session_id
                        );
                    }
                }
                if lost_race {
                    return Err(AppError(BookingError::Rejected(
                        RejectionReason::BufferConflict,
                    )));
                }
                return Err(AppError(BookingError::Store(err.into())));
            }
        }
    }

    tutorbook_db::repositories::booking_request::update_status(
        &state.db_pool,
        request.request_id,
        BookingStatus::Approved,
        now,
    )
    .await
    .map_err(BookingError::Store)?;

    tutorbook_db::repositories::slot_lock::release_for_slots(
        &state.db_pool,
        request.student_id,
        request.tutor_id,
        &request.requested_slot_starts,
    )
    .await
    .map_err(BookingError::Store)?;

    notify(
        &state,
        request.student_id,
        "booking_approved",
        &format!("Your booking request {} was approved", request.request_id),
    )
    .await;

    let mut sessions = Vec::with_capacity(created.len());
    for row in created {
        sessions.push(row.to_core()?);
    }

    Ok(Json(sessions))
}

#[axum::debug_handler]
pub async fn reject_booking(
    State(state): State<Arc<ApiState>>,
    Path(request_id): Path<Uuid>,
    Json(payload): Json<RejectBookingPayload>,
) -> Result<Json<BookingRequest>, AppError> {
    let now = Utc::now();

    let mut request = fetch_actionable_request(&state, request_id, payload.tutor_id, now).await?;

    tutorbook_db::repositories::booking_request::update_status(
        &state.db_pool,
        request.request_id,
        BookingStatus::Rejected,
        now,
    )
    .await
    .map_err(BookingError::Store)?;

    notify(
        &state,
        request.student_id,
        "booking_rejected",
        &format!("Your booking request {} was declined", request.request_id),
    )
    .await;

    request.status = BookingStatus::Rejected;
    request.responded_at = Some(now);

    Ok(Json(request))
}

#[axum::debug_handler]
pub async fn lock_slot(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<LockSlotPayload>,
) -> Result<Json<LockSlotResponse>, AppError> {
    let prefs = load_preferences(&state, payload.tutor_id, payload.module_id).await?;
    let slot_end = payload.slot_start + Duration::minutes(prefs.slot_length_minutes as i64);

    let acquired = tutorbook_db::repositories::slot_lock::try_acquire(
        &state.db_pool,
        payload.tutor_id,
        payload.slot_start,
        slot_end,
        payload.student_id,
    )
    .await
    .map_err(BookingError::Store)?;

    Ok(Json(LockSlotResponse { acquired }))
}

#[axum::debug_handler]
pub async fn release_lock(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<ReleaseLockPayload>,
) -> Result<Json<serde_json::Value>, AppError> {
    tutorbook_db::repositories::slot_lock::release(
        &state.db_pool,
        payload.tutor_id,
        payload.slot_start,
        payload.student_id,
    )
    .await
    .map_err(BookingError::Store)?;

    Ok(Json(serde_json::json!({ "released": true })))
}

#[axum::debug_handler]
pub async fn release_all_locks(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<ReleaseAllLocksPayload>,
) -> Result<Json<serde_json::Value>, AppError> {
    let released = tutorbook_db::repositories::slot_lock::release_all_for_student(
        &state.db_pool,
        payload.student_id,
    )
    .await
    .map_err(BookingError::Store)?;

    Ok(Json(serde_json::json!({ "released": released })))
}

/// Fetches a request scoped to the acting tutor and checks that it can
/// still be acted on. An expired request reads as rejected.
async fn fetch_actionable_request(
    state: &ApiState,
    request_id: Uuid,
    tutor_id: i32,
    now: DateTime<Utc>,
) -> Result<BookingRequest, AppError> {
    let row = tutorbook_db::repositories::booking_request::get_request_for_tutor(
        &state.db_pool,
        request_id,
        tutor_id,
    )
    .await
    .map_err(BookingError::Store)?
    .ok_or_else(|| BookingError::NotFound(format!("Booking request {} not found", request_id)))?;

    let request = row.to_core()?;

    if request.status != BookingStatus::Pending {
        return Err(AppError(BookingError::Validation(
            "request has already been responded to".to_string(),
        )));
    }
    if request.is_expired(now) {
        return Err(AppError(BookingError::Validation(
            "request has expired".to_string(),
        )));
    }

    Ok(request)
}

/// Non-cancelled sessions of the tutor or the student over a date range.
async fn fetch_session_snapshot(
    state: &ApiState,
    tutor_id: i32,
    student_id: i32,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<Session>, AppError> {
    let from = from
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .unwrap_or_else(Utc::now);
    let to = (to + Duration::days(1))
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .unwrap_or_else(Utc::now);

    let rows = tutorbook_db::repositories::session::get_existing_sessions(
        &state.db_pool,
        tutor_id,
        student_id,
        from,
        to,
    )
    .await
    .map_err(BookingError::Store)?;

    let mut sessions = Vec::with_capacity(rows.len());
    for row in rows {
        sessions.push(row.to_core()?);
    }

    Ok(sessions)
}

/// Fire-and-forget outbound notification. Failures are logged, never
/// surfaced to the caller.
async fn notify(state: &ApiState, user_id: i32, kind: &str, body: &str) {
    if let Err(err) = tutorbook_db::repositories::notification::insert_notification(
        &state.db_pool,
        user_id,
        kind,
        body,
    )
    .await
    {
        tracing::warn!("Failed to record {kind} notification for user {user_id}: {err:?}");
    }
}
