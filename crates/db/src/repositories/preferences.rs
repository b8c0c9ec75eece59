use crate::models::DbModuleTutorPreferences;
use chrono::Utc;
use eyre::Result;
use sqlx::{Pool, Postgres};
use tutorbook_core::models::preferences::ModuleTutorPreferences;
use uuid::Uuid;

/// Returns the preference row for a (tutor, module) pair, or `None`
/// when the tutor has never set preferences for the module. Callers
/// substitute the configured defaults in the `None` case.
pub async fn get_preferences(
    pool: &Pool<Postgres>,
    tutor_id: i32,
    module_id: i32,
) -> Result<Option<DbModuleTutorPreferences>> {
    let row = sqlx::query_as::<_, DbModuleTutorPreferences>(
        r#"
        SELECT preference_id, tutor_id, module_id, slot_length_minutes, buffer_minutes,
               lead_time_hours, booking_window_days, max_sessions_per_day,
               cancellation_cutoff_hours, created_at, updated_at
        FROM module_tutor_preferences
        WHERE tutor_id = $1 AND module_id = $2
        "#,
    )
    .bind(tutor_id)
    .bind(module_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

pub async fn upsert_preferences(
    pool: &Pool<Postgres>,
    prefs: &ModuleTutorPreferences,
) -> Result<DbModuleTutorPreferences> {
    let now = Utc::now();

    let row = sqlx::query_as::<_, DbModuleTutorPreferences>(
        r#"
        INSERT INTO module_tutor_preferences
            (preference_id, tutor_id, module_id, slot_length_minutes, buffer_minutes,
             lead_time_hours, booking_window_days, max_sessions_per_day,
             cancellation_cutoff_hours, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
        ON CONFLICT (tutor_id, module_id) DO UPDATE SET
            slot_length_minutes = EXCLUDED.slot_length_minutes,
            buffer_minutes = EXCLUDED.buffer_minutes,
            lead_time_hours = EXCLUDED.lead_time_hours,
            booking_window_days = EXCLUDED.booking_window_days,
            max_sessions_per_day = EXCLUDED.max_sessions_per_day,
            cancellation_cutoff_hours = EXCLUDED.cancellation_cutoff_hours,
            updated_at = EXCLUDED.updated_at
        RETURNING preference_id, tutor_id, module_id, slot_length_minutes, buffer_minutes,
                  lead_time_hours, booking_window_days, max_sessions_per_day,
                  cancellation_cutoff_hours, created_at, updated_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(prefs.tutor_id)
    .bind(prefs.module_id)
    .bind(prefs.slot_length_minutes)
    .bind(prefs.buffer_minutes)
    .bind(prefs.lead_time_hours)
    .bind(prefs.booking_window_days)
    .bind(prefs.max_sessions_per_day)
    .bind(prefs.cancellation_cutoff_hours)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(row)
}
