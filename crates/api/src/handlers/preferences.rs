//! # Preferences Handlers
//!
//! Per (tutor, module) scheduling preferences. A pair with no stored row
//! reads back as the configured defaults, so callers never have to apply
//! the fallback themselves.

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use tutorbook_core::{errors::BookingError, models::preferences::ModuleTutorPreferences};

use crate::{middleware::error_handling::AppError, ApiState};

#[axum::debug_handler]
pub async fn get_preferences(
    State(state): State<Arc<ApiState>>,
    Path((tutor_id, module_id)): Path<(i32, i32)>,
) -> Result<Json<ModuleTutorPreferences>, AppError> {
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

    Ok(Json(prefs))
}

#[axum::debug_handler]
pub async fn upsert_preferences(
    State(state): State<Arc<ApiState>>,
    Path((tutor_id, module_id)): Path<(i32, i32)>,
    Json(payload): Json<ModuleTutorPreferences>,
) -> Result<Json<ModuleTutorPreferences>, AppError> {
    if payload.tutor_id != tutor_id || payload.module_id != module_id {
        return Err(AppError(BookingError::Validation(
            "payload tutor/module must match the path".to_string(),
        )));
    }
    // A defective row in the store is an invariant violation, but here it
    // is still just bad input.
    payload
        .validate()
        .map_err(|e| BookingError::Validation(e.to_string()))?;

    let row =
        tutorbook_db::repositories::preferences::upsert_preferences(&state.db_pool, &payload)
            .await
            .map_err(BookingError::Store)?;

    Ok(Json(row.to_core()))
}
