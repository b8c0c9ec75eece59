use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/users/:user_id/sessions",
            get(handlers::sessions::list_user_sessions),
        )
        .route(
            "/api/sessions/:session_id",
            get(handlers::sessions::get_session),
        )
        .route(
            "/api/sessions/:session_id/cancel",
            post(handlers::sessions::cancel_session),
        )
}
