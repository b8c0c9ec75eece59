use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/tutors/:tutor_id/availability",
            get(handlers::availability::get_availability),
        )
        .route(
            "/api/tutors/:tutor_id/availability",
            put(handlers::availability::replace_availability),
        )
        .route(
            "/api/availability/:availability_id",
            delete(handlers::availability::delete_availability),
        )
        .route(
            "/api/tutors/:tutor_id/exceptions",
            post(handlers::availability::add_exception),
        )
        .route(
            "/api/tutors/:tutor_id/exceptions",
            get(handlers::availability::get_exceptions),
        )
        .route(
            "/api/exceptions/:exception_id",
            delete(handlers::availability::delete_exception),
        )
}
