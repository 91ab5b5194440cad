use axum::{Json, Router, routing::get};
use bizagent_core::response::ApiResponse;
use serde::Serialize;
use std::sync::Arc;

use crate::ApiState;

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

#[derive(Serialize)]
struct VersionResponse {
    version: String,
}

async fn health_check() -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::ok(HealthResponse {
        status: "ok".to_string(),
    }))
}

async fn version() -> Json<ApiResponse<VersionResponse>> {
    Json(ApiResponse::ok(VersionResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/health", get(health_check))
        .route("/version", get(version))
}
