use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // Create recurring_availability table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS recurring_availability (
            availability_id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            tutor_id INTEGER NOT NULL,
            module_id INTEGER NULL,
            day_of_week SMALLINT NOT NULL CHECK (day_of_week BETWEEN 0 AND 6),
            start_time TIME NOT NULL,
            end_time TIME NOT NULL,
            effective_from DATE NOT NULL,
            effective_until DATE NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_window CHECK (end_time > start_time)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create availability_exceptions table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS availability_exceptions (
            exception_id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            tutor_id INTEGER NOT NULL,
            exception_date DATE NOT NULL,
            is_available BOOLEAN NOT NULL,
            start_time TIME NULL,
            end_time TIME NULL,
            reason TEXT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create module_tutor_preferences table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS module_tutor_preferences (
            preference_id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            tutor_id INTEGER NOT NULL,
            module_id INTEGER NOT NULL,
            slot_length_minutes INTEGER NOT NULL CHECK (slot_length_minutes > 0),
            buffer_minutes INTEGER NOT NULL CHECK (buffer_minutes >= 0),
            lead_time_hours INTEGER NOT NULL,
            booking_window_days INTEGER NOT NULL,
            max_sessions_per_day INTEGER NOT NULL,
            cancellation_cutoff_hours INTEGER NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            UNIQUE (tutor_id, module_id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create booking_requests table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS booking_requests (
            request_id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            student_id INTEGER NOT NULL,
            tutor_id INTEGER NOT NULL,
            module_id INTEGER NOT NULL,
            status VARCHAR(32) NOT NULL,
            requested_slots JSONB NOT NULL,
            student_preferences JSONB NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            expires_at TIMESTAMP WITH TIME ZONE NOT NULL,
            responded_at TIMESTAMP WITH TIME ZONE NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create sessions table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            session_id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            booking_request_id UUID NOT NULL REFERENCES booking_requests(request_id),
            student_id INTEGER NOT NULL,
            tutor_id INTEGER NOT NULL,
            module_id INTEGER NOT NULL,
            scheduled_start TIMESTAMP WITH TIME ZONE NOT NULL,
            scheduled_end TIMESTAMP WITH TIME ZONE NOT NULL,
            status VARCHAR(32) NOT NULL,
            cancellation_reason TEXT NULL,
            cancelled_by INTEGER NULL,
            cancelled_at TIMESTAMP WITH TIME ZONE NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_session_range CHECK (scheduled_end > scheduled_start)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Uniqueness backstop against concurrent confirmations: at most one
    // confirmed session per tutor and start time. A violation is mapped
    // to a buffer-conflict rejection, not a fatal error.
    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS uniq_confirmed_tutor_slot
            ON sessions (tutor_id, scheduled_start)
            WHERE status = 'Confirmed';
        "#,
    )
    .execute(pool)
    .await?;

    // Create slot_locks table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS slot_locks (
            lock_id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            tutor_id INTEGER NOT NULL,
            slot_start TIMESTAMP WITH TIME ZONE NOT NULL,
            slot_end TIMESTAMP WITH TIME ZONE NOT NULL,
            locked_by_student_id INTEGER NOT NULL,
            locked_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            expires_at TIMESTAMP WITH TIME ZONE NOT NULL,
            UNIQUE (tutor_id, slot_start)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create notifications table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS notifications (
            notification_id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            user_id INTEGER NOT NULL,
            kind VARCHAR(64) NOT NULL,
            body TEXT NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_recurring_availability_tutor ON recurring_availability(tutor_id);
        CREATE INDEX IF NOT EXISTS idx_availability_exceptions_tutor_date ON availability_exceptions(tutor_id, exception_date);
        CREATE INDEX IF NOT EXISTS idx_booking_requests_tutor_status ON booking_requests(tutor_id, status);
        CREATE INDEX IF NOT EXISTS idx_sessions_tutor_start ON sessions(tutor_id, scheduled_start);
        CREATE INDEX IF NOT EXISTS idx_sessions_student_start ON sessions(student_id, scheduled_start);
        CREATE INDEX IF NOT EXISTS idx_slot_locks_expires_at ON slot_locks(expires_at);
        CREATE INDEX IF NOT EXISTS idx_notifications_user ON notifications(user_id);
        "#,
    )
    .execute(pool)
    .await?;

    info!("Database schema initialized successfully.");
    Ok(())
}
