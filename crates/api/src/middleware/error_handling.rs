//! # Error Handling Middleware
//!
//! Maps domain errors to HTTP status codes and the standard
//! `{success: false, error}` envelope.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bizagent_core::{errors::BizError, response::ApiResponse};
use tracing::error;

/// Application error wrapper that provides HTTP status code mapping
///
/// Handlers return `Result<_, AppError>` and use `?` on anything that
/// converts into a `BizError`.
#[derive(Debug)]
pub struct AppError(pub BizError);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            BizError::NotFound(_) => StatusCode::NOT_FOUND,
            BizError::Validation(_) => StatusCode::BAD_REQUEST,
            BizError::Authentication(_) => StatusCode::UNAUTHORIZED,
            BizError::Conflict(_) => StatusCode::CONFLICT,
            BizError::External(_) => StatusCode::BAD_GATEWAY,
            BizError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            BizError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {:?}", self.0);
        }

        let body = Json(ApiResponse::<()>::failure(self.0.to_string()));
        (status, body).into_response()
    }
}

/// Allows `?` on `BizResult` inside handlers.
impl From<BizError> for AppError {
    fn from(err: BizError) -> Self {
        AppError(err)
    }
}

/// Untyped failures from repositories surface as database errors.
impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(BizError::Database(err))
    }
}

pub fn map_error(err: BizError) -> Response {
    AppError(err).into_response()
}
