use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/calendar/get-events", get(handlers::calendar::get_events))
        .route(
            "/api/calendar/delete-event",
            post(handlers::calendar::delete_event),
        )
}

/// Batch endpoints paced between calendar calls; not bound by the request timeout.
pub fn paced_routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/calendar/clear-all-slots",
            post(handlers::calendar::clear_all_slots),
        )
        .route(
            "/api/calendar/create-100-slots",
            post(handlers::calendar::create_100_slots),
        )
        .route(
            "/api/calendar/create-clean-slots",
            post(handlers::calendar::create_clean_slots),
        )
}
