use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailTemplate {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub subject: String,
    pub html_content: String,
    pub text_content: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEmailTemplate {
    pub name: String,
    pub category: String,
    pub subject: String,
    pub html_content: String,
    pub text_content: Option<String>,
}
