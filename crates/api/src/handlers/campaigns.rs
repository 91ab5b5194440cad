use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use bizagent_core::{
    models::campaign::{
        Campaign, CampaignDetail, CampaignStats, CampaignStatus, CampaignsQuery, RunSummary,
    },
    response::ApiResponse,
};
use uuid::Uuid;

use crate::{ApiState, middleware::error_handling::AppError};

#[axum::debug_handler]
pub async fn list_campaigns(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<CampaignsQuery>,
) -> Result<Json<ApiResponse<Vec<Campaign>>>, AppError> {
    let status = query
        .status
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(str::parse::<CampaignStatus>)
        .transpose()?;

    let campaigns = state.campaigns.get_campaigns(status).await?;
    Ok(Json(ApiResponse::ok(campaigns)))
}

#[axum::debug_handler]
pub async fn get_campaign(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<CampaignDetail>>, AppError> {
    let detail = state.campaigns.get_campaign_by_id(id).await?;
    Ok(Json(ApiResponse::ok(detail)))
}

#[axum::debug_handler]
pub async fn get_campaign_stats(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<CampaignStats>>, AppError> {
    let stats = state.campaigns.get_campaign_stats(id).await?;
    Ok(Json(ApiResponse::ok(stats)))
}

/// Runs the sending workflow immediately instead of waiting for the schedule.
#[axum::debug_handler]
pub async fn run_campaigns(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<ApiResponse<RunSummary>>, AppError> {
    let summary = state.campaigns.run_active_campaigns().await?;
    Ok(Json(ApiResponse::ok(summary)))
}
