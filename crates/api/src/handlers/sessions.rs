//! # Session Handlers
//!
//! Read and cancel confirmed sessions. Only a participant may cancel, and
//! only up to the tutor's cancellation cutoff before the scheduled start.
//! Cancelled sessions keep their row with the audit fields filled in.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{Duration, Utc};
use std::sync::Arc;
use tutorbook_core::{
    errors::BookingError,
    models::{
        booking::CancelSessionPayload,
        session::Session,
    },
};
use uuid::Uuid;

use crate::{middleware::error_handling::AppError, ApiState};

#[axum::debug_handler]
pub async fn list_user_sessions(
    State(state): State<Arc<ApiState>>,
    Path(user_id): Path<i32>,
) -> Result<Json<Vec<Session>>, AppError> {
    let rows = tutorbook_db::repositories::session::list_user_sessions(
        &state.db_pool,
        user_id,
        Utc::now(),
    )
    .await
    .map_err(BookingError::Store)?;

    let mut sessions = Vec::with_capacity(rows.len());
    for row in rows {
        sessions.push(row.to_core()?);
    }

    Ok(Json(sessions))
}

#[axum::debug_handler]
pub async fn get_session(
    State(state): State<Arc<ApiState>>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Session>, AppError> {
    let row = tutorbook_db::repositories::session::get_session_by_id(&state.db_pool, session_id)
        .await
        .map_err(BookingError::Store)?
        .ok_or_else(|| BookingError::NotFound(format!("Session {} not found", session_id)))?;

    Ok(Json(row.to_core()?))
}

#[axum::debug_handler]
pub async fn cancel_session(
    State(state): State<Arc<ApiState>>,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<CancelSessionPayload>,
) -> Result<Json<Session>, AppError> {
    let now = Utc::now();

    let row = tutorbook_db::repositories::session::get_session_by_id(&state.db_pool, session_id)
        .await
        .map_err(BookingError::Store)?
        .ok_or_else(|| BookingError::NotFound(format!("Session {} not found", session_id)))?;
    let session = row.to_core()?;

    if payload.user_id != session.tutor_id && payload.user_id != session.student_id {
        return Err(AppError(BookingError::PermissionDenied(
            "only a session participant may cancel it".to_string(),
        )));
    }
    if session.is_cancelled() {
        return Err(AppError(BookingError::Validation(
            "session is already cancelled".to_string(),
        )));
    }

    let stored = tutorbook_db::repositories::preferences::get_preferences(
        &state.db_pool,
        session.tutor_id,
        session.module_id,
    )
    .await
    .map_err(BookingError::Store)?;
    let prefs = match stored {
        Some(row) => row.to_core(),
        None => state
            .defaults
            .preferences_for(session.tutor_id, session.module_id),
    };

    let cutoff = Duration::hours(prefs.cancellation_cutoff_hours as i64);
    if session.scheduled_start - now < cutoff {
        return Err(AppError(BookingError::Validation(format!(
            "sessions must be cancelled at least {} hours in advance",
            prefs.cancellation_cutoff_hours
        ))));
    }

    tutorbook_db::repositories::session::cancel_session(
        &state.db_pool,
        session.session_id,
        payload.user_id,
        Some(payload.reason.as_str()),
        now,
    )
    .await
    .map_err(BookingError::Store)?;

    // Tell the other participant.
    let counterparty = if payload.user_id == session.tutor_id {
        session.student_id
    } else {
        session.tutor_id
    };
    if let Err(err) = tutorbook_db::repositories::notification::insert_notification(
        &state.db_pool,
        counterparty,
        "session_cancelled",
        &format!(
            "Session {} on {} was cancelled",
            session.session_id, session.scheduled_start
        ),
    )
    .await
    {
        tracing::warn!(
            "Failed to record cancellation notification for user {counterparty}: {err:?}"
        );
    }

    let updated =
        tutorbook_db::repositories::session::get_session_by_id(&state.db_pool, session_id)
            .await
            .map_err(BookingError::Store)?
            .ok_or_else(|| BookingError::NotFound(format!("Session {} not found", session_id)))?;

    Ok(Json(updated.to_core()?))
}
