use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json,
    extract::{Query, State},
};
use bizagent_core::{
    errors::BizError,
    models::contact::{BatchScrapeRequest, ScrapeRequest, ScrapeResult, SearchHit},
    response::ApiResponse,
};
use serde::Deserialize;
use tracing::info;

use crate::{ApiState, middleware::error_handling::AppError};

const MAX_BATCH_URLS: usize = 50;
const DEFAULT_BATCH_DELAY_MS: u64 = 1000;
const MAX_BATCH_DELAY_MS: u64 = 10_000;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    pub num: Option<u8>,
}

/// Scrapes one site. With `companyId`, the first contact of each kind is
/// written onto that company.
#[axum::debug_handler]
pub async fn scrape(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<ScrapeRequest>,
) -> Result<Json<ApiResponse<ScrapeResult>>, AppError> {
    if payload.url.trim().is_empty() {
        return Err(BizError::Validation("url is required".to_string()).into());
    }

    if let Some(company_id) = payload.company_id {
        state
            .companies
            .get_company_by_id(company_id)
            .await?
            .ok_or_else(|| BizError::NotFound(format!("Company {} not found", company_id)))?;
    }

    let contacts = state
        .scraper
        .scrape(&payload.url)
        .await
        .map_err(|e| BizError::External(format!("{:#}", e)))?;

    if let Some(company_id) = payload.company_id {
        if !contacts.is_empty() {
            state
                .companies
                .update_contact_info(company_id, &contacts.to_contact_update())
                .await?;
            info!("Stored scraped contacts on company {}", company_id);
        }
    }

    Ok(Json(ApiResponse::ok(ScrapeResult {
        url: payload.url,
        contacts,
        error: None,
    })))
}

#[axum::debug_handler]
pub async fn batch_scrape(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<BatchScrapeRequest>,
) -> Result<Json<ApiResponse<Vec<ScrapeResult>>>, AppError> {
    if payload.urls.is_empty() || payload.urls.len() > MAX_BATCH_URLS {
        return Err(BizError::Validation(format!(
            "urls must contain between 1 and {} entries",
            MAX_BATCH_URLS
        ))
        .into());
    }

    let delay_ms = payload.delay_ms.unwrap_or(DEFAULT_BATCH_DELAY_MS);
    if delay_ms > MAX_BATCH_DELAY_MS {
        return Err(BizError::Validation(format!(
            "delayMs must be at most {}",
            MAX_BATCH_DELAY_MS
        ))
        .into());
    }

    let delay = Duration::from_millis(delay_ms);
    let results = state.scraper.scrape_many(&payload.urls, delay).await;
    Ok(Json(ApiResponse::ok(results)))
}

pub async fn search(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<SearchHit>>>, AppError> {
    if query.q.trim().is_empty() {
        return Err(BizError::Validation("q is required".to_string()).into());
    }

    let client = state.search.as_ref().ok_or_else(|| {
        BizError::Validation("Google search is not configured".to_string())
    })?;

    let hits = client
        .search(&query.q, query.num.unwrap_or(10))
        .await
        .map_err(|e| BizError::External(format!("{:#}", e)))?;
    Ok(Json(ApiResponse::ok(hits)))
}
