use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/campaigns", get(handlers::campaigns::list_campaigns))
        .route("/api/campaigns/:id", get(handlers::campaigns::get_campaign))
        .route(
            "/api/campaigns/:id/stats",
            get(handlers::campaigns::get_campaign_stats),
        )
}

/// The sending workflow waits between sends and runs past the request timeout.
pub fn paced_routes() -> Router<Arc<ApiState>> {
    Router::new().route("/api/campaigns/run", post(handlers::campaigns::run_campaigns))
}
