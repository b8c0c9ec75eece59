use crate::models::DbNotification;
use chrono::Utc;
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn insert_notification(
    pool: &Pool<Postgres>,
    user_id: i32,
    kind: &str,
    body: &str,
) -> Result<DbNotification> {
    let row = sqlx::query_as::<_, DbNotification>(
        r#"
        INSERT INTO notifications (notification_id, user_id, kind, body, created_at)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING notification_id, user_id, kind, body, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(kind)
    .bind(body)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    Ok(row)
}

pub async fn list_notifications_for_user(
    pool: &Pool<Postgres>,
    user_id: i32,
) -> Result<Vec<DbNotification>> {
    let rows = sqlx::query_as::<_, DbNotification>(
        r#"
        SELECT notification_id, user_id, kind, body, created_at
        FROM notifications
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
