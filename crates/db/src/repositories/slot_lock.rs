use crate::models::DbSlotLock;
use chrono::{DateTime, Utc};
use eyre::Result;
use sqlx::{Pool, Postgres};
use tutorbook_core::locks::{evaluate_acquire, AcquireOutcome};

/// Attempts to take the advisory lock on `(tutor_id, slot_start)` for
/// `student_id`. Returns `Ok(true)` when the student holds the lock
/// afterwards (fresh grant or extension of their own lock), `Ok(false)`
/// when another student holds an unexpired lock.
pub async fn try_acquire(
    pool: &Pool<Postgres>,
    tutor_id: i32,
    slot_start: DateTime<Utc>,
    slot_end: DateTime<Utc>,
    student_id: i32,
) -> Result<bool> {
    let now = Utc::now();

    // Clear any expired lock on this slot so the insert below can land.
    sqlx::query(
        r#"
        DELETE FROM slot_locks
        WHERE tutor_id = $1 AND slot_start = $2 AND expires_at < $3
        "#,
    )
    .bind(tutor_id)
    .bind(slot_start)
    .bind(now)
    .execute(pool)
    .await?;

    let existing = sqlx::query_as::<_, DbSlotLock>(
        r#"
        SELECT lock_id, tutor_id, slot_start, slot_end, locked_by_student_id,
               locked_at, expires_at
        FROM slot_locks
        WHERE tutor_id = $1 AND slot_start = $2
        "#,
    )
    .bind(tutor_id)
    .bind(slot_start)
    .fetch_optional(pool)
    .await?;

    let existing_core = existing.as_ref().map(|l| l.to_core());
    match evaluate_acquire(
        existing_core.as_ref(),
        tutor_id,
        slot_start,
        slot_end,
        student_id,
        now,
    ) {
        AcquireOutcome::Granted(lock) => {
            let inserted = sqlx::query(
                r#"
                INSERT INTO slot_locks
                    (lock_id, tutor_id, slot_start, slot_end, locked_by_student_id,
                     locked_at, expires_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (tutor_id, slot_start) DO NOTHING
                "#,
            )
            .bind(lock.lock_id)
            .bind(lock.tutor_id)
            .bind(lock.slot_start)
            .bind(lock.slot_end)
            .bind(lock.locked_by_student_id)
            .bind(lock.locked_at)
            .bind(lock.expires_at)
            .execute(pool)
            .await?;

            // Zero rows means a concurrent acquirer slipped in between
            // our read and the insert. They hold the lock, not us.
            Ok(inserted.rows_affected() == 1)
        }
        AcquireOutcome::Extended(expires_at) => {
            sqlx::query(
                r#"
                UPDATE slot_locks
                SET expires_at = $4
                WHERE tutor_id = $1 AND slot_start = $2 AND locked_by_student_id = $3
                "#,
            )
            .bind(tutor_id)
            .bind(slot_start)
            .bind(student_id)
            .bind(expires_at)
            .execute(pool)
            .await?;
            Ok(true)
        }
        AcquireOutcome::Denied => Ok(false),
    }
}

/// Releases a single lock. Only the holder can release it.
pub async fn release(
    pool: &Pool<Postgres>,
    tutor_id: i32,
    slot_start: DateTime<Utc>,
    student_id: i32,
) -> Result<()> {
    sqlx::query(
        r#"
        DELETE FROM slot_locks
        WHERE tutor_id = $1 AND slot_start = $2 AND locked_by_student_id = $3
        "#,
    )
    .bind(tutor_id)
    .bind(slot_start)
    .bind(student_id)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn release_all_for_student(pool: &Pool<Postgres>, student_id: i32) -> Result<u64> {
    let result = sqlx::query("DELETE FROM slot_locks WHERE locked_by_student_id = $1")
        .bind(student_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Releases the student's locks on a specific set of slot starts, used
/// after a booking request snapshots them.
pub async fn release_for_slots(
    pool: &Pool<Postgres>,
    student_id: i32,
    tutor_id: i32,
    slot_starts: &[DateTime<Utc>],
) -> Result<()> {
    sqlx::query(
        r#"
        DELETE FROM slot_locks
        WHERE locked_by_student_id = $1 AND tutor_id = $2 AND slot_start = ANY($3)
        "#,
    )
    .bind(student_id)
    .bind(tutor_id)
    .bind(slot_starts)
    .execute(pool)
    .await?;

    Ok(())
}

/// Drops every expired lock. Run opportunistically; correctness never
/// depends on it because readers check `expires_at` themselves.
pub async fn sweep_expired(pool: &Pool<Postgres>, now: DateTime<Utc>) -> Result<u64> {
    let result = sqlx::query("DELETE FROM slot_locks WHERE expires_at < $1")
        .bind(now)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
