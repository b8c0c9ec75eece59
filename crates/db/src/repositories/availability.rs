use crate::models::{
    DbAvailabilityException, DbRecurringAvailability, NewAvailabilityException,
    NewRecurringAvailability,
};
use chrono::{NaiveDate, Utc};
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

/// Returns a tutor's recurring availability. With a module filter, both
/// module-specific and module-agnostic rows are returned; precedence
/// between them is decided by the slot generator.
pub async fn get_recurring_availability(
    pool: &Pool<Postgres>,
    tutor_id: i32,
    module_id: Option<i32>,
) -> Result<Vec<DbRecurringAvailability>> {
    let rows = match module_id {
        Some(module_id) => {
            sqlx::query_as::<_, DbRecurringAvailability>(
                r#"
                SELECT availability_id, tutor_id, module_id, day_of_week, start_time, end_time,
                       effective_from, effective_until, created_at, updated_at
                FROM recurring_availability
                WHERE tutor_id = $1 AND (module_id = $2 OR module_id IS NULL)
                ORDER BY day_of_week, start_time
                "#,
            )
            .bind(tutor_id)
            .bind(module_id)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, DbRecurringAvailability>(
                r#"
                SELECT availability_id, tutor_id, module_id, day_of_week, start_time, end_time,
                       effective_from, effective_until, created_at, updated_at
                FROM recurring_availability
                WHERE tutor_id = $1
                ORDER BY day_of_week, start_time
                "#,
            )
            .bind(tutor_id)
            .fetch_all(pool)
            .await?
        }
    };

    Ok(rows)
}

/// Replaces the tutor's whole availability set in one call: delete
/// everything, then insert the new blocks.
pub async fn replace_tutor_availability(
    pool: &Pool<Postgres>,
    tutor_id: i32,
    blocks: &[NewRecurringAvailability],
) -> Result<Vec<DbRecurringAvailability>> {
    sqlx::query("DELETE FROM recurring_availability WHERE tutor_id = $1")
        .bind(tutor_id)
        .execute(pool)
        .await?;

    let mut inserted = Vec::with_capacity(blocks.len());
    for block in blocks {
        let row = sqlx::query_as::<_, DbRecurringAvailability>(
            r#"
            INSERT INTO recurring_availability
                (availability_id, tutor_id, module_id, day_of_week, start_time, end_time,
                 effective_from, effective_until, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            RETURNING availability_id, tutor_id, module_id, day_of_week, start_time, end_time,
                      effective_from, effective_until, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(tutor_id)
        .bind(block.module_id)
        .bind(block.day_of_week)
        .bind(block.start_time)
        .bind(block.end_time)
        .bind(block.effective_from)
        .bind(block.effective_until)
        .bind(Utc::now())
        .fetch_one(pool)
        .await?;
        inserted.push(row);
    }

    Ok(inserted)
}

pub async fn delete_availability(pool: &Pool<Postgres>, availability_id: Uuid) -> Result<()> {
    sqlx::query("DELETE FROM recurring_availability WHERE availability_id = $1")
        .bind(availability_id)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn add_exception(
    pool: &Pool<Postgres>,
    tutor_id: i32,
    exception: &NewAvailabilityException,
) -> Result<DbAvailabilityException> {
    let row = sqlx::query_as::<_, DbAvailabilityException>(
        r#"
        INSERT INTO availability_exceptions
            (exception_id, tutor_id, exception_date, is_available, start_time, end_time, reason, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING exception_id, tutor_id, exception_date, is_available, start_time, end_time, reason, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(tutor_id)
    .bind(exception.exception_date)
    .bind(exception.is_available)
    .bind(exception.start_time)
    .bind(exception.end_time)
    .bind(&exception.reason)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    Ok(row)
}

pub async fn get_exceptions(
    pool: &Pool<Postgres>,
    tutor_id: i32,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<DbAvailabilityException>> {
    let rows = sqlx::query_as::<_, DbAvailabilityException>(
        r#"
        SELECT exception_id, tutor_id, exception_date, is_available, start_time, end_time, reason, created_at
        FROM availability_exceptions
        WHERE tutor_id = $1 AND exception_date >= $2 AND exception_date <= $3
        ORDER BY exception_date
        "#,
    )
    .bind(tutor_id)
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn delete_exception(pool: &Pool<Postgres>, exception_id: Uuid) -> Result<()> {
    sqlx::query("DELETE FROM availability_exceptions WHERE exception_id = $1")
        .bind(exception_id)
        .execute(pool)
        .await?;

    Ok(())
}
