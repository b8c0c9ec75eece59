use axum::{
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

use crate::ApiState;

const SERVICE_NAME: &str = "tutorbook";

#[derive(Serialize)]
struct HealthResponse {
    service: String,
    status: String,
}

#[derive(Serialize)]
struct VersionResponse {
    service: String,
    version: String,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        service: SERVICE_NAME.to_string(),
        status: "ok".to_string(),
    })
}

async fn version() -> Json<VersionResponse> {
    Json(VersionResponse {
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/health", get(health_check))
        .route("/version", get(version))
}
