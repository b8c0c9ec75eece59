//! # Availability Handlers
//!
//! Handlers for managing a tutor's recurring weekly availability and
//! date-specific exceptions. Recurring rows describe the standing weekly
//! pattern; exceptions override single dates, either blocking them or
//! replacing the times in force.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use tutorbook_core::{
    errors::BookingError,
    models::availability::{
        AddExceptionPayload, AvailabilityException, RecurringAvailability,
        ReplaceAvailabilityPayload,
    },
};
use tutorbook_db::models::{NewAvailabilityException, NewRecurringAvailability};
use uuid::Uuid;

use crate::{middleware::error_handling::AppError, ApiState};

/// Optional module filter for the get-availability endpoint.
#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub module_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct ExceptionRangeQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[axum::debug_handler]
pub async fn get_availability(
    State(state): State<Arc<ApiState>>,
    Path(tutor_id): Path<i32>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Vec<RecurringAvailability>>, AppError> {
    let rows = tutorbook_db::repositories::availability::get_recurring_availability(
        &state.db_pool,
        tutor_id,
        query.module_id,
    )
    .await
    .map_err(BookingError::Store)?;

    Ok(Json(rows.iter().map(|r| r.to_core()).collect()))
}

#[axum::debug_handler]
pub async fn replace_availability(
    State(state): State<Arc<ApiState>>,
    Path(tutor_id): Path<i32>,
    Json(payload): Json<ReplaceAvailabilityPayload>,
) -> Result<Json<Vec<RecurringAvailability>>, AppError> {
    for block in &payload.blocks {
        if block.day_of_week > 6 {
            return Err(AppError(BookingError::Validation(format!(
                "day_of_week must be 0-6, got {}",
                block.day_of_week
            ))));
        }
        if block.end_time <= block.start_time {
            return Err(AppError(BookingError::Validation(
                "end_time must be after start_time".to_string(),
            )));
        }
    }

    let blocks: Vec<NewRecurringAvailability> = payload
        .blocks
        .iter()
        .map(|b| NewRecurringAvailability {
            module_id: b.module_id,
            day_of_week: b.day_of_week as i16,
            start_time: b.start_time,
            end_time: b.end_time,
            effective_from: b.effective_from,
            effective_until: b.effective_until,
        })
        .collect();

    let rows = tutorbook_db::repositories::availability::replace_tutor_availability(
        &state.db_pool,
        tutor_id,
        &blocks,
    )
    .await
    .map_err(BookingError::Store)?;

    Ok(Json(rows.iter().map(|r| r.to_core()).collect()))
}

#[axum::debug_handler]
pub async fn add_exception(
    State(state): State<Arc<ApiState>>,
    Path(tutor_id): Path<i32>,
    Json(payload): Json<AddExceptionPayload>,
) -> Result<Json<AvailabilityException>, AppError> {
    // An available exception needs both times or neither; one without the
    // other is ambiguous.
    if payload.is_available && payload.start_time.is_some() != payload.end_time.is_some() {
        return Err(AppError(BookingError::Validation(
            "start_time and end_time must be provided together".to_string(),
        )));
    }

    let exception = NewAvailabilityException {
        exception_date: payload.exception_date,
        is_available: payload.is_available,
        start_time: payload.start_time,
        end_time: payload.end_time,
        reason: payload.reason,
    };

    let row = tutorbook_db::repositories::availability::add_exception(
        &state.db_pool,
        tutor_id,
        &exception,
    )
    .await
    .map_err(BookingError::Store)?;

    Ok(Json(row.to_core()))
}

#[axum::debug_handler]
pub async fn get_exceptions(
    State(state): State<Arc<ApiState>>,
    Path(tutor_id): Path<i32>,
    Query(query): Query<ExceptionRangeQuery>,
) -> Result<Json<Vec<AvailabilityException>>, AppError> {
    let rows = tutorbook_db::repositories::availability::get_exceptions(
        &state.db_pool,
        tutor_id,
        query.from,
        query.to,
    )
    .await
    .map_err(BookingError::Store)?;

    Ok(Json(rows.iter().map(|r| r.to_core()).collect()))
}

#[axum::debug_handler]
pub async fn delete_availability(
    State(state): State<Arc<ApiState>>,
    Path(availability_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    tutorbook_db::repositories::availability::delete_availability(&state.db_pool, availability_id)
        .await
        .map_err(BookingError::Store)?;

    Ok(Json(serde_json::json!({ "deleted": true })))
}

#[axum::debug_handler]
pub async fn delete_exception(
    State(state): State<Arc<ApiState>>,
    Path(exception_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    tutorbook_db::repositories::availability::delete_exception(&state.db_pool, exception_id)
        .await
        .map_err(BookingError::Store)?;

    Ok(Json(serde_json::json!({ "deleted": true })))
}
