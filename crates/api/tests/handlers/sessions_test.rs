use axum::Json;
use chrono::{DateTime, Duration, Utc};
use mockall::predicate;
use tutorbook_api::middleware::error_handling::AppError;
use tutorbook_core::{
    errors::BookingError,
    models::{booking::CancelSessionPayload, session::Session},
};
use tutorbook_db::models::DbSession;
use uuid::Uuid;

use crate::test_utils::TestContext;

const TUTOR: i32 = 42;
const STUDENT: i32 = 1;
const MODULE: i32 = 7;

fn confirmed_session(session_id: Uuid, start: DateTime<Utc>) -> DbSession {
    let now = Utc::now();
    DbSession {
        session_id,
        booking_request_id: Uuid::new_v4(),
        student_id: STUDENT,
        tutor_id: TUTOR,
        module_id: MODULE,
        scheduled_start: start,
        scheduled_end: start + Duration::minutes(60),
        status: "Confirmed".to_string(),
        cancellation_reason: None,
        cancelled_by: None,
        cancelled_at: None,
        created_at: now,
        updated_at: now,
    }
}

// Test wrapper mirroring the cancel handler flow against the mocks.
async fn cancel_session_wrapper(
    ctx: &mut TestContext,
    session_id: Uuid,
    payload: CancelSessionPayload,
) -> Result<Json<Session>, AppError> {
    let now = Utc::now();

    let row = ctx
        .session_repo
        .get_session_by_id(session_id)
        .await
        .map_err(BookingError::Store)?
        .ok_or_else(|| BookingError::NotFound(format!("Session {} not found", session_id)))?;
    let session = row.to_core()?;

    if payload.user_id != session.tutor_id && payload.user_id != session.student_id {
        return Err(AppError(BookingError::PermissionDenied(
            "only a session participant may cancel it".to_string(),
        )));
    }
    if session.is_cancelled() {
        return Err(AppError(BookingError::Validation(
            "session is already cancelled".to_string(),
        )));
    }

    let prefs = match ctx
        .preferences_repo
        .get_preferences(session.tutor_id, session.module_id)
        .await
        .map_err(BookingError::Store)?
    {
        Some(row) => row.to_core(),
        None => ctx.defaults.preferences_for(session.tutor_id, session.module_id),
    };

    let cutoff = Duration::hours(prefs.cancellation_cutoff_hours as i64);
    if session.scheduled_start - now < cutoff {
        return Err(AppError(BookingError::Validation(format!(
            "sessions must be cancelled at least {} hours in advance",
            prefs.cancellation_cutoff_hours
        ))));
    }

    ctx.session_repo
        .cancel_session(
            session.session_id,
            payload.user_id,
            Some(Box::leak(payload.reason.clone().into_boxed_str())),
            now,
        )
        .await
        .map_err(BookingError::Store)?;

    let counterparty = if payload.user_id == session.tutor_id {
        session.student_id
    } else {
        session.tutor_id
    };
    let _ = ctx
        .notification_repo
        .insert_notification(counterparty, "session_cancelled", "cancelled")
        .await;

    let updated = ctx
        .session_repo
        .get_session_by_id(session_id)
        .await
        .map_err(BookingError::Store)?
        .ok_or_else(|| BookingError::NotFound(format!("Session {} not found", session_id)))?;

    Ok(Json(updated.to_core()?))
}

#[tokio::test]
async fn test_cancel_session_success() {
    let mut ctx = TestContext::new();
    let session_id = Uuid::new_v4();
    // Well outside the default 12 hour cutoff.
    let start = Utc::now() + Duration::days(9);

    let row = confirmed_session(session_id, start);
    ctx.session_repo
        .expect_get_session_by_id()
        .with(predicate::eq(session_id))
        .times(1)
        .returning(move |_| Ok(Some(row.clone())));

    ctx.preferences_repo
        .expect_get_preferences()
        .with(predicate::eq(TUTOR), predicate::eq(MODULE))
        .returning(|_, _| Ok(None));

    ctx.session_repo
        .expect_cancel_session()
        .with(
            predicate::eq(session_id),
            predicate::eq(STUDENT),
            predicate::eq(Some("schedule clash")),
            predicate::always(),
        )
        .times(1)
        .returning(|_, _, _, _| Ok(()));

    // The tutor hears about the student's cancellation.
    ctx.notification_repo
        .expect_insert_notification()
        .with(
            predicate::eq(TUTOR),
            predicate::always(),
            predicate::always(),
        )
        .times(1)
        .returning(|user_id, kind, body| {
            Ok(tutorbook_db::models::DbNotification {
                notification_id: Uuid::new_v4(),
                user_id,
                kind: kind.to_string(),
                body: body.to_string(),
                created_at: Utc::now(),
            })
        });

    let mut cancelled = confirmed_session(session_id, start);
    cancelled.status = "Cancelled".to_string();
    cancelled.cancellation_reason = Some("schedule clash".to_string());
    cancelled.cancelled_by = Some(STUDENT);
    cancelled.cancelled_at = Some(Utc::now());
    ctx.session_repo
        .expect_get_session_by_id()
        .times(1)
        .returning(move |_| Ok(Some(cancelled.clone())));

    let payload = CancelSessionPayload {
        user_id: STUDENT,
        reason: "schedule clash".to_string(),
    };
    let result = cancel_session_wrapper(&mut ctx, session_id, payload).await;

    let session = result.expect("cancellation should succeed").0;
    assert_eq!(session.cancelled_by, Some(STUDENT));
    assert_eq!(session.cancellation_reason.as_deref(), Some("schedule clash"));
}

#[tokio::test]
async fn test_cancel_session_inside_cutoff() {
    let mut ctx = TestContext::new();
    let session_id = Uuid::new_v4();
    // Six hours out, default cutoff is twelve.
    let start = Utc::now() + Duration::hours(6);

    let row = confirmed_session(session_id, start);
    ctx.session_repo
        .expect_get_session_by_id()
        .returning(move |_| Ok(Some(row.clone())));

    ctx.preferences_repo
        .expect_get_preferences()
        .returning(|_, _| Ok(None));

    ctx.session_repo.expect_cancel_session().times(0);

    let payload = CancelSessionPayload {
        user_id: STUDENT,
        reason: "too late".to_string(),
    };
    let result = cancel_session_wrapper(&mut ctx, session_id, payload).await;

    match result.expect_err("late cancellation must fail").0 {
        BookingError::Validation(message) => assert!(message.contains("12 hours")),
        e => panic!("Expected Validation error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_cancel_session_requires_participant() {
    let mut ctx = TestContext::new();
    let session_id = Uuid::new_v4();
    let start = Utc::now() + Duration::days(9);

    let row = confirmed_session(session_id, start);
    ctx.session_repo
        .expect_get_session_by_id()
        .returning(move |_| Ok(Some(row.clone())));

    ctx.session_repo.expect_cancel_session().times(0);

    let payload = CancelSessionPayload {
        user_id: 999,
        reason: "not mine".to_string(),
    };
    let result = cancel_session_wrapper(&mut ctx, session_id, payload).await;

    match result.expect_err("outsider must not cancel").0 {
        BookingError::PermissionDenied(_) => {}
        e => panic!("Expected PermissionDenied error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_cancel_session_already_cancelled() {
    let mut ctx = TestContext::new();
    let session_id = Uuid::new_v4();
    let start = Utc::now() + Duration::days(9);

    let mut row = confirmed_session(session_id, start);
    row.status = "Cancelled".to_string();
    row.cancelled_by = Some(TUTOR);
    ctx.session_repo
        .expect_get_session_by_id()
        .returning(move |_| Ok(Some(row.clone())));

    ctx.session_repo.expect_cancel_session().times(0);

    let payload = CancelSessionPayload {
        user_id: STUDENT,
        reason: "again".to_string(),
    };
    let result = cancel_session_wrapper(&mut ctx, session_id, payload).await;

    match result.expect_err("double cancellation must fail").0 {
        BookingError::Validation(message) => assert!(message.contains("already cancelled")),
        e => panic!("Expected Validation error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_cancel_session_not_found() {
    let mut ctx = TestContext::new();
    let session_id = Uuid::new_v4();

    ctx.session_repo
        .expect_get_session_by_id()
        .returning(|_| Ok(None));

    let payload = CancelSessionPayload {
        user_id: STUDENT,
        reason: "gone".to_string(),
    };
    let result = cancel_session_wrapper(&mut ctx, session_id, payload).await;

    match result.expect_err("missing session must fail").0 {
        BookingError::NotFound(_) => {}
        e => panic!("Expected NotFound error, got: {:?}", e),
    }
}
