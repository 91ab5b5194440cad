use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/email/test-connection",
            get(handlers::email::test_connection),
        )
        .route("/api/email/stats", get(handlers::email::stats))
        .route("/api/email/events", post(handlers::email::events))
}
