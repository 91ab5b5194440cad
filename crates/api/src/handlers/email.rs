use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
};
use bizagent_core::{
    errors::BizError,
    models::{
        campaign::DeliveryEvent,
        email::{ConnectionStatus, SendingStats},
    },
    response::ApiResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::{ApiState, middleware::error_handling::AppError};

const DEFAULT_STATS_DAYS: u32 = 30;

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub days: Option<u32>,
}

/// Outcome of one webhook delivery.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsAck {
    pub received: usize,
    pub applied: usize,
    pub ignored: usize,
}

pub async fn test_connection(
    State(state): State<Arc<ApiState>>,
) -> Json<ApiResponse<ConnectionStatus>> {
    let connected = state.transport.test_connection().await;
    Json(ApiResponse::ok(ConnectionStatus {
        provider: state.transport.name().to_string(),
        connected,
    }))
}

pub async fn stats(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<ApiResponse<SendingStats>>, AppError> {
    let days = query.days.unwrap_or(DEFAULT_STATS_DAYS);
    if !(1..=365).contains(&days) {
        return Err(BizError::Validation(format!("days must be between 1 and 365, got {}", days)).into());
    }

    let stats = state
        .transport
        .get_sending_stats(days)
        .await
        .map_err(|e| BizError::External(format!("{:#}", e)))?;

    Ok(Json(ApiResponse::ok(stats)))
}

/// Pulls `(event, message id)` out of one Mailjet event object.
fn parse_event(item: &Value) -> Option<(String, String)> {
    let event = item.get("event")?.as_str()?.to_string();
    let message_id = match item.get("MessageID").or_else(|| item.get("messageId"))? {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    Some((event, message_id))
}

/// Mailjet event webhook. Accepts a single event or a batch; events that are
/// not tracked, or match no recipient, are counted as ignored.
pub async fn events(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<Value>,
) -> Result<Json<ApiResponse<EventsAck>>, AppError> {
    let items = match payload {
        Value::Array(items) => items,
        Value::Object(_) => vec![payload],
        _ => {
            return Err(
                BizError::Validation("Expected an event object or array".to_string()).into(),
            );
        }
    };

    let mut ack = EventsAck {
        received: items.len(),
        ..Default::default()
    };

    for item in &items {
        let Some((name, message_id)) = parse_event(item) else {
            ack.ignored += 1;
            continue;
        };
        let Ok(event) = name.parse::<DeliveryEvent>() else {
            debug!("Ignoring untracked event {}", name);
            ack.ignored += 1;
            continue;
        };

        if state.campaigns.record_event(&message_id, event).await? {
            ack.applied += 1;
        } else {
            ack.ignored += 1;
        }
    }

    info!(
        "Processed {} delivery events ({} applied)",
        ack.received, ack.applied
    );
    Ok(Json(ApiResponse::ok(ack)))
}
