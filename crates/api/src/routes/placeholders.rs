use axum::{Router, routing::get};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/analytics/overview",
            get(handlers::placeholders::analytics_overview),
        )
        .route("/api/email/queue", get(handlers::placeholders::email_queue))
        .route("/api/templates", get(handlers::placeholders::templates))
}
