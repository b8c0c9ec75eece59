use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/slots/preview", post(handlers::booking::preview_slots))
        .route(
            "/api/bookings",
            post(handlers::booking::create_booking_request),
        )
        .route(
            "/api/tutors/:tutor_id/bookings/pending",
            get(handlers::booking::list_pending_requests),
        )
        .route(
            "/api/bookings/:request_id/confirm",
            post(handlers::booking::confirm_booking),
        )
        .route(
            "/api/bookings/:request_id/reject",
            post(handlers::booking::reject_booking),
        )
        .route("/api/locks", post(handlers::booking::lock_slot))
        .route("/api/locks", delete(handlers::booking::release_lock))
        .route(
            "/api/locks/release-all",
            post(handlers::booking::release_all_locks),
        )
}
