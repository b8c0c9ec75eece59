use crate::models::DbSession;
use chrono::{DateTime, Utc};
use eyre::Result;
use sqlx::{Pool, Postgres};
use tutorbook_core::models::session::SessionStatus;
use uuid::Uuid;

/// Inserts a confirmed session. Returns the raw `sqlx::Error` so callers
/// can distinguish a unique-index violation (a concurrent confirmation
/// won the slot) from other failures; see [`is_duplicate_slot`].
pub async fn insert_session(
    pool: &Pool<Postgres>,
    booking_request_id: Uuid,
    student_id: i32,
    tutor_id: i32,
    module_id: i32,
    scheduled_start: DateTime<Utc>,
    scheduled_end: DateTime<Utc>,
) -> Result<DbSession, sqlx::Error> {
    let now = Utc::now();

    sqlx::query_as::<_, DbSession>(
        r#"
        INSERT INTO sessions
            (session_id, booking_request_id, student_id, tutor_id, module_id,
             scheduled_start, scheduled_end, status, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
        RETURNING session_id, booking_request_id, student_id, tutor_id, module_id,
                  scheduled_start, scheduled_end, status, cancellation_reason,
                  cancelled_by, cancelled_at, created_at, updated_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(booking_request_id)
    .bind(student_id)
    .bind(tutor_id)
    .bind(module_id)
    .bind(scheduled_start)
    .bind(scheduled_end)
    .bind(SessionStatus::Confirmed.as_str())
    .bind(now)
    .fetch_one(pool)
    .await
}

/// True when the insert failed because another confirmed session already
/// holds the same (tutor, start) pair.
pub fn is_duplicate_slot(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

/// All non-cancelled sessions overlapping `[from, to)` where either the
/// tutor or the student is a participant. This is the conflict snapshot
/// the validator runs against.
pub async fn get_existing_sessions(
    pool: &Pool<Postgres>,
    tutor_id: i32,
    student_id: i32,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Vec<DbSession>> {
    let rows = sqlx::query_as::<_, DbSession>(
        r#"
        SELECT session_id, booking_request_id, student_id, tutor_id, module_id,
               scheduled_start, scheduled_end, status, cancellation_reason,
               cancelled_by, cancelled_at, created_at, updated_at
        FROM sessions
        WHERE (tutor_id = $1 OR student_id = $2)
          AND status <> 'Cancelled'
          AND scheduled_start < $4
          AND scheduled_end > $3
        ORDER BY scheduled_start
        "#,
    )
    .bind(tutor_id)
    .bind(student_id)
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn get_session_by_id(
    pool: &Pool<Postgres>,
    session_id: Uuid,
) -> Result<Option<DbSession>> {
    let row = sqlx::query_as::<_, DbSession>(
        r#"
        SELECT session_id, booking_request_id, student_id, tutor_id, module_id,
               scheduled_start, scheduled_end, status, cancellation_reason,
               cancelled_by, cancelled_at, created_at, updated_at
        FROM sessions
        WHERE session_id = $1
        "#,
    )
    .bind(session_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

pub async fn cancel_session(
    pool: &Pool<Postgres>,
    session_id: Uuid,
    cancelled_by: i32,
    reason: Option<&str>,
    cancelled_at: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE sessions
        SET status = 'Cancelled',
            cancellation_reason = $2,
            cancelled_by = $3,
            cancelled_at = $4,
            updated_at = $4
        WHERE session_id = $1
        "#,
    )
    .bind(session_id)
    .bind(reason)
    .bind(cancelled_by)
    .bind(cancelled_at)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn list_user_sessions(
    pool: &Pool<Postgres>,
    user_id: i32,
    from: DateTime<Utc>,
) -> Result<Vec<DbSession>> {
    let rows = sqlx::query_as::<_, DbSession>(
        r#"
        SELECT session_id, booking_request_id, student_id, tutor_id, module_id,
               scheduled_start, scheduled_end, status, cancellation_reason,
               cancelled_by, cancelled_at, created_at, updated_at
        FROM sessions
        WHERE (tutor_id = $1 OR student_id = $1) AND scheduled_end >= $2
        ORDER BY scheduled_start
        "#,
    )
    .bind(user_id)
    .bind(from)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Removes a session row. Used to unwind the earlier inserts of a
/// confirmation that failed partway through.
pub async fn delete_session(pool: &Pool<Postgres>, session_id: Uuid) -> Result<()> {
    sqlx::query("DELETE FROM sessions WHERE session_id = $1")
        .bind(session_id)
        .execute(pool)
        .await?;

    Ok(())
}
