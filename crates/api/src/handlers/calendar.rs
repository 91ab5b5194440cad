use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
};
use bizagent_core::{
    errors::BizError,
    models::time_slot::{
        CalendarEvent, CleanSlotsSummary, ClearSlotsSummary, CreateSlotsRequest,
        CreateSlotsSummary, DeleteEventRequest, EventsQuery,
    },
    response::ApiResponse,
};
use serde::Serialize;

use crate::{ApiState, middleware::error_handling::AppError};

const DEFAULT_SLOT_COUNT: usize = 100;
const MAX_SLOT_COUNT: usize = 1000;
const DEFAULT_EVENT_DAYS: i64 = 30;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedEvent {
    pub event_id: String,
}

pub async fn clear_all_slots(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<ApiResponse<ClearSlotsSummary>>, AppError> {
    let summary = state.slots.clear_all_slots().await?;
    Ok(Json(ApiResponse::ok(summary)))
}

pub async fn create_100_slots(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<ApiResponse<CreateSlotsSummary>>, AppError> {
    let summary = state.slots.create_slots(DEFAULT_SLOT_COUNT).await?;
    Ok(Json(ApiResponse::ok(summary)))
}

/// Body is optional; `count` defaults to 100.
pub async fn create_clean_slots(
    State(state): State<Arc<ApiState>>,
    payload: Option<Json<CreateSlotsRequest>>,
) -> Result<Json<ApiResponse<CleanSlotsSummary>>, AppError> {
    let count = payload
        .and_then(|Json(request)| request.count)
        .unwrap_or(DEFAULT_SLOT_COUNT);
    if count == 0 || count > MAX_SLOT_COUNT {
        return Err(BizError::Validation(format!(
            "count must be between 1 and {}, got {}",
            MAX_SLOT_COUNT, count
        ))
        .into());
    }

    let summary = state.slots.create_clean_slots(count).await?;
    Ok(Json(ApiResponse::ok(summary)))
}

pub async fn get_events(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<ApiResponse<Vec<CalendarEvent>>>, AppError> {
    let events = state
        .slots
        .get_events(query.days.unwrap_or(DEFAULT_EVENT_DAYS))
        .await?;
    Ok(Json(ApiResponse::ok(events)))
}

pub async fn delete_event(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<DeleteEventRequest>,
) -> Result<Json<ApiResponse<DeletedEvent>>, AppError> {
    state.slots.delete_event(&payload.event_id).await?;
    Ok(Json(ApiResponse::ok(DeletedEvent {
        event_id: payload.event_id,
    })))
}
