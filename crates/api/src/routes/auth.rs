use axum::{Router, routing::get};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/auth/google", get(handlers::auth::google_auth_url))
        .route(
            "/api/auth/google/callback",
            get(handlers::auth::google_callback),
        )
        .route("/api/auth/status", get(handlers::auth::auth_status))
        .route("/api/auth/test", get(handlers::auth::test_auth))
}
