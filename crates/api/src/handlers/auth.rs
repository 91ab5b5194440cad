//! Google OAuth endpoints. All of them except `status` need the OAuth
//! client to be configured.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
};
use bizagent_core::{
    errors::BizError,
    models::{
        email::ConnectionStatus,
        oauth::{AuthStatusResponse, AuthUrlResponse, CallbackQuery},
    },
    response::ApiResponse,
};
use bizagent_services::OAuthService;

use crate::{ApiState, middleware::error_handling::AppError};

fn oauth(state: &ApiState) -> Result<&Arc<OAuthService>, AppError> {
    state.oauth.as_ref().ok_or_else(|| {
        AppError(BizError::Validation(
            "Google OAuth is not configured".to_string(),
        ))
    })
}

async fn status_of(oauth: &OAuthService) -> Result<AuthStatusResponse, AppError> {
    let token = oauth.load_tokens().await?;
    Ok(AuthStatusResponse {
        authenticated: oauth.is_authenticated().await,
        expires_at: token.as_ref().and_then(|t| t.expires_at),
        scopes: token.map(|t| t.scopes).unwrap_or_default(),
    })
}

pub async fn google_auth_url(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<ApiResponse<AuthUrlResponse>>, AppError> {
    let auth_url = oauth(&state)?.get_auth_url();
    Ok(Json(ApiResponse::ok(AuthUrlResponse { auth_url })))
}

pub async fn google_callback(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<CallbackQuery>,
) -> Result<Json<ApiResponse<AuthStatusResponse>>, AppError> {
    let oauth = oauth(&state)?;

    if let Some(error) = query.error {
        return Err(BizError::Authentication(format!("Google denied access: {}", error)).into());
    }
    let code = query
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| BizError::Validation("Missing authorization code".to_string()))?;

    if !oauth.handle_callback(&code).await {
        return Err(BizError::Authentication(
            "Failed to exchange authorization code".to_string(),
        )
        .into());
    }

    Ok(Json(ApiResponse::ok(status_of(oauth).await?)))
}

pub async fn auth_status(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<ApiResponse<AuthStatusResponse>>, AppError> {
    let status = match &state.oauth {
        Some(oauth) => status_of(oauth).await?,
        None => AuthStatusResponse {
            authenticated: false,
            expires_at: None,
            scopes: Vec::new(),
        },
    };
    Ok(Json(ApiResponse::ok(status)))
}

pub async fn test_auth(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<ApiResponse<ConnectionStatus>>, AppError> {
    let connected = oauth(&state)?.test_connection().await;
    Ok(Json(ApiResponse::ok(ConnectionStatus {
        provider: "google".to_string(),
        connected,
    })))
}
