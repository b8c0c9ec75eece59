use axum::{
    routing::{get, put},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/tutors/:tutor_id/modules/:module_id/preferences",
            get(handlers::preferences::get_preferences),
        )
        .route(
            "/api/tutors/:tutor_id/modules/:module_id/preferences",
            put(handlers::preferences::upsert_preferences),
        )
}
