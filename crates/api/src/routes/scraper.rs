use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/scraper/scrape", post(handlers::scraper::scrape))
        .route("/api/scraper/search", get(handlers::scraper::search))
}

pub fn paced_routes() -> Router<Arc<ApiState>> {
    Router::new().route("/api/scraper/batch", post(handlers::scraper::batch_scrape))
}
