use crate::models::DbBookingRequest;
use chrono::{DateTime, Duration, Utc};
use eyre::Result;
use sqlx::{Pool, Postgres};
use tutorbook_core::models::booking::{
    BookingStatus, StudentAvailabilityPreference, REQUEST_EXPIRY_DAYS,
};
use uuid::Uuid;

pub async fn create_booking_request(
    pool: &Pool<Postgres>,
    student_id: i32,
    tutor_id: i32,
    module_id: i32,
    requested_slot_starts: &[DateTime<Utc>],
    student_preferences: &StudentAvailabilityPreference,
) -> Result<DbBookingRequest> {
    let now = Utc::now();

    let row = sqlx::query_as::<_, DbBookingRequest>(
        r#"
        INSERT INTO booking_requests
            (request_id, student_id, tutor_id, module_id, status, requested_slots,
             student_preferences, created_at, expires_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING request_id, student_id, tutor_id, module_id, status, requested_slots,
                  student_preferences, created_at, expires_at, responded_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(student_id)
    .bind(tutor_id)
    .bind(module_id)
    .bind(BookingStatus::Pending.as_str())
    .bind(serde_json::to_value(requested_slot_starts)?)
    .bind(serde_json::to_value(student_preferences)?)
    .bind(now)
    .bind(now + Duration::days(REQUEST_EXPIRY_DAYS))
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Fetches a request scoped to the acting tutor. A request that exists
/// but belongs to another tutor comes back as `None`, so callers
/// surface it as not-found rather than leaking ownership.
pub async fn get_request_for_tutor(
    pool: &Pool<Postgres>,
    request_id: Uuid,
    tutor_id: i32,
) -> Result<Option<DbBookingRequest>> {
    let row = sqlx::query_as::<_, DbBookingRequest>(
        r#"
        SELECT request_id, student_id, tutor_id, module_id, status, requested_slots,
               student_preferences, created_at, expires_at, responded_at
        FROM booking_requests
        WHERE request_id = $1 AND tutor_id = $2
        "#,
    )
    .bind(request_id)
    .bind(tutor_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Pending, unexpired requests for a tutor, newest first. Expiry is
/// enforced here at read time: expired requests never reach a tutor.
pub async fn list_pending_for_tutor(
    pool: &Pool<Postgres>,
    tutor_id: i32,
    now: DateTime<Utc>,
) -> Result<Vec<DbBookingRequest>> {
    let rows = sqlx::query_as::<_, DbBookingRequest>(
        r#"
        SELECT request_id, student_id, tutor_id, module_id, status, requested_slots,
               student_preferences, created_at, expires_at, responded_at
        FROM booking_requests
        WHERE tutor_id = $1 AND status = 'Pending' AND expires_at > $2
        ORDER BY created_at DESC
        "#,
    )
    .bind(tutor_id)
    .bind(now)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn update_status(
    pool: &Pool<Postgres>,
    request_id: Uuid,
    status: BookingStatus,
    responded_at: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE booking_requests
        SET status = $2, responded_at = $3
        WHERE request_id = $1
        "#,
    )
    .bind(request_id)
    .bind(status.as_str())
    .bind(responded_at)
    .execute(pool)
    .await?;

    Ok(())
}
