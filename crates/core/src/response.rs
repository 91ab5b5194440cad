use serde::{Deserialize, Serialize};

/// JSON envelope returned by every endpoint: `{success, data?, error?}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

/// Body for endpoints that are wired up but not implemented yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Placeholder {
    pub message: String,
}

impl Placeholder {
    pub fn coming_soon() -> Self {
        Self {
            message: "coming soon".to_string(),
        }
    }
}
