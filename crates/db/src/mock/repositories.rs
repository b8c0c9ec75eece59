use chrono::{DateTime, NaiveDate, Utc};
use mockall::mock;
use uuid::Uuid;

use crate::models::{
    DbAvailabilityException, DbBookingRequest, DbModuleTutorPreferences, DbNotification,
    DbRecurringAvailability, DbSession, NewAvailabilityException, NewRecurringAvailability,
};
use tutorbook_core::models::booking::{BookingStatus, StudentAvailabilityPreference};
use tutorbook_core::models::preferences::ModuleTutorPreferences;

// Mock repositories for testing
mock! {
    pub AvailabilityRepo {
        pub async fn get_recurring_availability(
            &self,
            tutor_id: i32,
            module_id: Option<i32>,
        ) -> eyre::Result<Vec<DbRecurringAvailability>>;

        pub async fn replace_tutor_availability(
            &self,
            tutor_id: i32,
            blocks: Vec<NewRecurringAvailability>,
        ) -> eyre::Result<Vec<DbRecurringAvailability>>;

        pub async fn get_exceptions(
            &self,
            tutor_id: i32,
            from: NaiveDate,
            to: NaiveDate,
        ) -> eyre::Result<Vec<DbAvailabilityException>>;

        pub async fn add_exception(
            &self,
            tutor_id: i32,
            exception: NewAvailabilityException,
        ) -> eyre::Result<DbAvailabilityException>;
    }
}

mock! {
    pub PreferencesRepo {
        pub async fn get_preferences(
            &self,
            tutor_id: i32,
            module_id: i32,
        ) -> eyre::Result<Option<DbModuleTutorPreferences>>;

        pub async fn upsert_preferences(
            &self,
            prefs: ModuleTutorPreferences,
        ) -> eyre::Result<DbModuleTutorPreferences>;
    }
}

mock! {
    pub BookingRequestRepo {
        pub async fn create_booking_request(
            &self,
            student_id: i32,
            tutor_id: i32,
            module_id: i32,
            requested_slot_starts: Vec<DateTime<Utc>>,
            student_preferences: StudentAvailabilityPreference,
        ) -> eyre::Result<DbBookingRequest>;

        pub async fn get_request_for_tutor(
            &self,
            request_id: Uuid,
            tutor_id: i32,
        ) -> eyre::Result<Option<DbBookingRequest>>;

        pub async fn list_pending_for_tutor(
            &self,
            tutor_id: i32,
            now: DateTime<Utc>,
        ) -> eyre::Result<Vec<DbBookingRequest>>;

        pub async fn update_status(
            &self,
            request_id: Uuid,
            status: BookingStatus,
            responded_at: DateTime<Utc>,
        ) -> eyre::Result<()>;
    }
}

mock! {
    pub SessionRepo {
        pub async fn insert_session(
            &self,
            booking_request_id: Uuid,
            student_id: i32,
            tutor_id: i32,
            module_id: i32,
            scheduled_start: DateTime<Utc>,
            scheduled_end: DateTime<Utc>,
        ) -> Result<DbSession, sqlx::Error>;

        pub async fn get_existing_sessions(
            &self,
            tutor_id: i32,
            student_id: i32,
            from: DateTime<Utc>,
            to: DateTime<Utc>,
        ) -> eyre::Result<Vec<DbSession>>;

        pub async fn get_session_by_id(
            &self,
            session_id: Uuid,
        ) -> eyre::Result<Option<DbSession>>;

        pub async fn cancel_session(
            &self,
            session_id: Uuid,
            cancelled_by: i32,
            reason: Option<&'static str>,
            cancelled_at: DateTime<Utc>,
        ) -> eyre::Result<()>;

        pub async fn delete_session(&self, session_id: Uuid) -> eyre::Result<()>;
    }
}

mock! {
    pub SlotLockRepo {
        pub async fn try_acquire(
            &self,
            tutor_id: i32,
            slot_start: DateTime<Utc>,
            slot_end: DateTime<Utc>,
            student_id: i32,
        ) -> eyre::Result<bool>;

        pub async fn release(
            &self,
            tutor_id: i32,
            slot_start: DateTime<Utc>,
            student_id: i32,
        ) -> eyre::Result<()>;

        pub async fn release_all_for_student(
            &self,
            student_id: i32,
        ) -> eyre::Result<u64>;

        pub async fn release_for_slots(
            &self,
            student_id: i32,
            tutor_id: i32,
            slot_starts: Vec<DateTime<Utc>>,
        ) -> eyre::Result<()>;
    }
}

mock! {
    pub NotificationRepo {
        pub async fn insert_notification(
            &self,
            user_id: i32,
            kind: &'static str,
            body: &'static str,
        ) -> eyre::Result<DbNotification>;
    }
}
