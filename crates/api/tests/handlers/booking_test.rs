use axum::Json;
use chrono::{DateTime, Duration, Utc};
use mockall::predicate;
use tutorbook_api::middleware::error_handling::AppError;
use tutorbook_core::{
    booking::plan_confirmation,
    errors::BookingError,
    models::{
        booking::{
            BookingRequest, BookingStatus, ConfirmBookingPayload, LockSlotPayload,
            LockSlotResponse, RejectBookingPayload, StudentAvailabilityPreference, TimeOfDay,
        },
        session::Session,
    },
    validation::RejectionReason,
};
use tutorbook_db::models::{DbBookingRequest, DbSession};
use uuid::Uuid;

use crate::test_utils::TestContext;

const TUTOR: i32 = 42;
const STUDENT: i32 = 1;
const MODULE: i32 = 7;

fn all_buckets() -> StudentAvailabilityPreference {
    StudentAvailabilityPreference::new(
        0..=6,
        [TimeOfDay::Morning, TimeOfDay::Afternoon, TimeOfDay::Evening],
    )
}

fn db_request(request_id: Uuid, slot_starts: &[DateTime<Utc>]) -> DbBookingRequest {
    let now = Utc::now();
    DbBookingRequest {
        request_id,
        student_id: STUDENT,
        tutor_id: TUTOR,
        module_id: MODULE,
        status: "Pending".to_string(),
        requested_slots: serde_json::to_value(slot_starts).unwrap(),
        student_preferences: serde_json::to_value(all_buckets()).unwrap(),
        created_at: now,
        expires_at: now + Duration::days(7),
        responded_at: None,
    }
}

fn db_session(request_id: Uuid, start: DateTime<Utc>, end: DateTime<Utc>) -> DbSession {
    let now = Utc::now();
    DbSession {
        session_id: Uuid::new_v4(),
        booking_request_id: request_id,
        student_id: STUDENT,
        tutor_id: TUTOR,
        module_id: MODULE,
        scheduled_start: start,
        scheduled_end: end,
        status: "Confirmed".to_string(),
        cancellation_reason: None,
        cancelled_by: None,
        cancelled_at: None,
        created_at: now,
        updated_at: now,
    }
}

// Test wrapper mirroring the confirm handler flow against the mocks.
async fn confirm_booking_wrapper(
    ctx: &mut TestContext,
    request_id: Uuid,
    payload: ConfirmBookingPayload,
) -> Result<Json<Vec<Session>>, AppError> {
    let now = Utc::now();
    let today = now.date_naive();

    let row = ctx
        .booking_request_repo
        .get_request_for_tutor(request_id, payload.tutor_id)
        .await
        .map_err(BookingError::Store)?
        .ok_or_else(|| {
            BookingError::NotFound(format!("Booking request {} not found", request_id))
        })?;
    let request = row.to_core()?;

    if request.status != BookingStatus::Pending {
        return Err(AppError(BookingError::Validation(
            "request has already been responded to".to_string(),
        )));
    }
    if request.is_expired(now) {
        return Err(AppError(BookingError::Validation(
            "request has expired".to_string(),
        )));
    }
    for slot_start in &payload.approved_slot_starts {
        if !request.requested_slot_starts.contains(slot_start) {
            return Err(AppError(BookingError::Validation(format!(
                "slot {} was not part of the request",
                slot_start
            ))));
        }
    }

    let prefs = match ctx
        .preferences_repo
        .get_preferences(request.tutor_id, request.module_id)
        .await
        .map_err(BookingError::Store)?
    {
        Some(row) => row.to_core(),
        None => ctx.defaults.preferences_for(request.tutor_id, request.module_id),
    };
    prefs.validate()?;

    let earliest = payload.approved_slot_starts.iter().min().copied().unwrap_or(now);
    let latest = payload.approved_slot_starts.iter().max().copied().unwrap_or(now);
    let session_rows = ctx
        .session_repo
        .get_existing_sessions(
            request.tutor_id,
            request.student_id,
            earliest - Duration::days(1),
            latest + Duration::days(1),
        )
        .await
        .map_err(BookingError::Store)?;
    let mut existing_sessions = Vec::with_capacity(session_rows.len());
    for row in session_rows {
        existing_sessions.push(row.to_core()?);
    }

    let plan = plan_confirmation(
        &request,
        &payload.approved_slot_starts,
        &request.student_preferences,
        &existing_sessions,
        &prefs,
        today,
        now,
    )
    .map_err(|rejection| BookingError::Rejected(rejection.reason))?;

    let mut created = Vec::with_capacity(plan.len());
    for planned in &plan {
        let row = ctx
            .session_repo
            .insert_session(
                request.request_id,
                request.student_id,
                request.tutor_id,
                request.module_id,
                planned.scheduled_start,
                planned.scheduled_end,
            )
            .await
            .map_err(|err| BookingError::Store(err.into()))?;
        created.push(row);
    }

    ctx.booking_request_repo
        .update_status(request.request_id, BookingStatus::Approved, now)
        .await
        .map_err(BookingError::Store)?;

    ctx.slot_lock_repo
        .release_for_slots(
            request.student_id,
            request.tutor_id,
            request.requested_slot_starts.clone(),
        )
        .await
        .map_err(BookingError::Store)?;

    let _ = ctx
        .notification_repo
        .insert_notification(request.student_id, "booking_approved", "approved")
        .await;

    let mut sessions = Vec::with_capacity(created.len());
    for row in created {
        sessions.push(row.to_core()?);
    }

    Ok(Json(sessions))
}

// Test wrapper mirroring the reject handler flow against the mocks.
async fn reject_booking_wrapper(
    ctx: &mut TestContext,
    request_id: Uuid,
    payload: RejectBookingPayload,
) -> Result<Json<BookingRequest>, AppError> {
    let now = Utc::now();

    let row = ctx
        .booking_request_repo
        .get_request_for_tutor(request_id, payload.tutor_id)
        .await
        .map_err(BookingError::Store)?
        .ok_or_else(|| {
            BookingError::NotFound(format!("Booking request {} not found", request_id))
        })?;
    let mut request = row.to_core()?;

    if request.status != BookingStatus::Pending {
        return Err(AppError(BookingError::Validation(
            "request has already been responded to".to_string(),
        )));
    }
    if request.is_expired(now) {
        return Err(AppError(BookingError::Validation(
            "request has expired".to_string(),
        )));
    }

    ctx.booking_request_repo
        .update_status(request.request_id, BookingStatus::Rejected, now)
        .await
        .map_err(BookingError::Store)?;

    let _ = ctx
        .notification_repo
        .insert_notification(request.student_id, "booking_rejected", "declined")
        .await;

    request.status = BookingStatus::Rejected;
    request.responded_at = Some(now);

    Ok(Json(request))
}

async fn lock_slot_wrapper(
    ctx: &mut TestContext,
    payload: LockSlotPayload,
) -> Result<Json<LockSlotResponse>, AppError> {
    let prefs = match ctx
        .preferences_repo
        .get_preferences(payload.tutor_id, payload.module_id)
        .await
        .map_err(BookingError::Store)?
    {
        Some(row) => row.to_core(),
        None => ctx.defaults.preferences_for(payload.tutor_id, payload.module_id),
    };
    let slot_end = payload.slot_start + Duration::minutes(prefs.slot_length_minutes as i64);

    let acquired = ctx
        .slot_lock_repo
        .try_acquire(payload.tutor_id, payload.slot_start, slot_end, payload.student_id)
        .await
        .map_err(BookingError::Store)?;

    Ok(Json(LockSlotResponse { acquired }))
}

#[tokio::test]
async fn test_confirm_booking_success() {
    let mut ctx = TestContext::new();
    let request_id = Uuid::new_v4();
    let slot_a = Utc::now() + Duration::days(9);
    let slot_b = Utc::now() + Duration::days(10);
    let slots = vec![slot_a, slot_b];

    let request_row = db_request(request_id, &slots);
    ctx.booking_request_repo
        .expect_get_request_for_tutor()
        .with(predicate::eq(request_id), predicate::eq(TUTOR))
        .returning(move |_, _| Ok(Some(request_row.clone())));

    // No stored preferences: the configured defaults apply.
    ctx.preferences_repo
        .expect_get_preferences()
        .with(predicate::eq(TUTOR), predicate::eq(MODULE))
        .returning(|_, _| Ok(None));

    ctx.session_repo
        .expect_get_existing_sessions()
        .returning(|_, _, _, _| Ok(vec![]));

    ctx.session_repo
        .expect_insert_session()
        .times(2)
        .returning(|request_id, _, _, _, start, end| Ok(db_session(request_id, start, end)));

    ctx.booking_request_repo
        .expect_update_status()
        .with(
            predicate::eq(request_id),
            predicate::eq(BookingStatus::Approved),
            predicate::always(),
        )
        .times(1)
        .returning(|_, _, _| Ok(()));

    ctx.slot_lock_repo
        .expect_release_for_slots()
        .with(
            predicate::eq(STUDENT),
            predicate::eq(TUTOR),
            predicate::eq(slots.clone()),
        )
        .times(1)
        .returning(|_, _, _| Ok(()));

    ctx.notification_repo
        .expect_insert_notification()
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

    let payload = ConfirmBookingPayload {
        tutor_id: TUTOR,
        approved_slot_starts: slots,
    };
    let result = confirm_booking_wrapper(&mut ctx, request_id, payload).await;

    let sessions = result.expect("confirmation should succeed").0;
    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0].scheduled_start, slot_a);
    assert_eq!(
        sessions[0].scheduled_end - sessions[0].scheduled_start,
        Duration::minutes(60)
    );
    assert_eq!(sessions[1].scheduled_start, slot_b);
}

#[tokio::test]
async fn test_confirm_booking_conflict_writes_nothing() {
    let mut ctx = TestContext::new();
    let request_id = Uuid::new_v4();
    let slot = Utc::now() + Duration::days(9);
    let slots = vec![slot];

    let request_row = db_request(request_id, &slots);
    ctx.booking_request_repo
        .expect_get_request_for_tutor()
        .returning(move |_, _| Ok(Some(request_row.clone())));

    ctx.preferences_repo
        .expect_get_preferences()
        .returning(|_, _| Ok(None));

    // Another booking claimed the same hour since the preview.
    ctx.session_repo
        .expect_get_existing_sessions()
        .returning(move |_, _, _, _| {
            let mut row = db_session(Uuid::new_v4(), slot, slot + Duration::minutes(60));
            row.student_id = 99;
            Ok(vec![row])
        });

    // The plan fails before any write.
    ctx.session_repo.expect_insert_session().times(0);
    ctx.booking_request_repo.expect_update_status().times(0);

    let payload = ConfirmBookingPayload {
        tutor_id: TUTOR,
        approved_slot_starts: slots,
    };
    let result = confirm_booking_wrapper(&mut ctx, request_id, payload).await;

    match result.expect_err("conflicting slot must fail").0 {
        BookingError::Rejected(reason) => assert_eq!(reason, RejectionReason::BufferConflict),
        e => panic!("Expected Rejected error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_confirm_booking_not_found() {
    let mut ctx = TestContext::new();
    let request_id = Uuid::new_v4();

    // Wrong tutor or unknown id both surface as a plain miss.
    ctx.booking_request_repo
        .expect_get_request_for_tutor()
        .returning(|_, _| Ok(None));

    let payload = ConfirmBookingPayload {
        tutor_id: TUTOR,
        approved_slot_starts: vec![Utc::now() + Duration::days(9)],
    };
    let result = confirm_booking_wrapper(&mut ctx, request_id, payload).await;

    match result.expect_err("missing request must fail").0 {
        BookingError::NotFound(_) => {}
        e => panic!("Expected NotFound error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_confirm_booking_expired_request() {
    let mut ctx = TestContext::new();
    let request_id = Uuid::new_v4();
    let slot = Utc::now() + Duration::days(9);

    let mut request_row = db_request(request_id, &[slot]);
    request_row.expires_at = Utc::now() - Duration::hours(1);
    ctx.booking_request_repo
        .expect_get_request_for_tutor()
        .returning(move |_, _| Ok(Some(request_row.clone())));

    let payload = ConfirmBookingPayload {
        tutor_id: TUTOR,
        approved_slot_starts: vec![slot],
    };
    let result = confirm_booking_wrapper(&mut ctx, request_id, payload).await;

    match result.expect_err("expired request must fail").0 {
        BookingError::Validation(message) => assert!(message.contains("expired")),
        e => panic!("Expected Validation error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_confirm_booking_rejects_foreign_slot() {
    let mut ctx = TestContext::new();
    let request_id = Uuid::new_v4();
    let requested = Utc::now() + Duration::days(9);

    let request_row = db_request(request_id, &[requested]);
    ctx.booking_request_repo
        .expect_get_request_for_tutor()
        .returning(move |_, _| Ok(Some(request_row.clone())));

    // Approving a slot the student never asked for is invalid.
    let payload = ConfirmBookingPayload {
        tutor_id: TUTOR,
        approved_slot_starts: vec![requested + Duration::hours(2)],
    };
    let result = confirm_booking_wrapper(&mut ctx, request_id, payload).await;

    match result.expect_err("foreign slot must fail").0 {
        BookingError::Validation(_) => {}
        e => panic!("Expected Validation error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_reject_booking_success() {
    let mut ctx = TestContext::new();
    let request_id = Uuid::new_v4();
    let slot = Utc::now() + Duration::days(9);

    let request_row = db_request(request_id, &[slot]);
    ctx.booking_request_repo
        .expect_get_request_for_tutor()
        .with(predicate::eq(request_id), predicate::eq(TUTOR))
        .returning(move |_, _| Ok(Some(request_row.clone())));

    ctx.booking_request_repo
        .expect_update_status()
        .with(
            predicate::eq(request_id),
            predicate::eq(BookingStatus::Rejected),
            predicate::always(),
        )
        .times(1)
        .returning(|_, _, _| Ok(()));

    // A rejection never writes sessions.
    ctx.session_repo.expect_insert_session().times(0);

    // The student hears about the decision.
    ctx.notification_repo
        .expect_insert_notification()
        .with(
            predicate::eq(STUDENT),
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

    let payload = RejectBookingPayload { tutor_id: TUTOR };
    let result = reject_booking_wrapper(&mut ctx, request_id, payload).await;

    let request = result.expect("rejection should succeed").0;
    assert_eq!(request.status, BookingStatus::Rejected);
    assert!(request.responded_at.is_some());
}

#[tokio::test]
async fn test_reject_booking_already_responded() {
    let mut ctx = TestContext::new();
    let request_id = Uuid::new_v4();
    let slot = Utc::now() + Duration::days(9);

    let mut request_row = db_request(request_id, &[slot]);
    request_row.status = "Rejected".to_string();
    request_row.responded_at = Some(Utc::now() - Duration::hours(1));
    ctx.booking_request_repo
        .expect_get_request_for_tutor()
        .returning(move |_, _| Ok(Some(request_row.clone())));

    ctx.booking_request_repo.expect_update_status().times(0);

    let payload = RejectBookingPayload { tutor_id: TUTOR };
    let result = reject_booking_wrapper(&mut ctx, request_id, payload).await;

    match result.expect_err("second response must fail").0 {
        BookingError::Validation(message) => assert!(message.contains("already been responded")),
        e => panic!("Expected Validation error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_lock_slot_acquired() {
    let mut ctx = TestContext::new();
    let slot_start = Utc::now() + Duration::days(9);

    ctx.preferences_repo
        .expect_get_preferences()
        .returning(|_, _| Ok(None));

    // Default slot length determines the lock's end.
    ctx.slot_lock_repo
        .expect_try_acquire()
        .with(
            predicate::eq(TUTOR),
            predicate::eq(slot_start),
            predicate::eq(slot_start + Duration::minutes(60)),
            predicate::eq(STUDENT),
        )
        .returning(|_, _, _, _| Ok(true));

    let payload = LockSlotPayload {
        student_id: STUDENT,
        tutor_id: TUTOR,
        module_id: MODULE,
        slot_start,
    };
    let result = lock_slot_wrapper(&mut ctx, payload).await;

    assert!(result.expect("lock attempt should succeed").0.acquired);
}

#[tokio::test]
async fn test_lock_slot_held_by_other_student() {
    let mut ctx = TestContext::new();
    let slot_start = Utc::now() + Duration::days(9);

    ctx.preferences_repo
        .expect_get_preferences()
        .returning(|_, _| Ok(None));

    ctx.slot_lock_repo
        .expect_try_acquire()
        .returning(|_, _, _, _| Ok(false));

    let payload = LockSlotPayload {
        student_id: STUDENT,
        tutor_id: TUTOR,
        module_id: MODULE,
        slot_start,
    };
    let result = lock_slot_wrapper(&mut ctx, payload).await;

    // Denied is a normal response, not an error.
    assert!(!result.expect("lock attempt should succeed").0.acquired);
}
