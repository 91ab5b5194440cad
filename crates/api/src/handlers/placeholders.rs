//! Endpoints reserved for the dashboard that have no backing feature yet.

use axum::Json;
use bizagent_core::response::{ApiResponse, Placeholder};

pub async fn analytics_overview() -> Json<ApiResponse<Placeholder>> {
    Json(ApiResponse::ok(Placeholder::coming_soon()))
}

pub async fn email_queue() -> Json<ApiResponse<Placeholder>> {
    Json(ApiResponse::ok(Placeholder::coming_soon()))
}

pub async fn templates() -> Json<ApiResponse<Placeholder>> {
    Json(ApiResponse::ok(Placeholder::coming_soon()))
}
