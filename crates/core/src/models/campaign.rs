use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{company::Company, template::EmailTemplate};
use crate::errors::BizError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CampaignStatus {
    Draft,
    Active,
    Paused,
    Completed,
    Cancelled,
}

impl CampaignStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignStatus::Draft => "DRAFT",
            CampaignStatus::Active => "ACTIVE",
            CampaignStatus::Paused => "PAUSED",
            CampaignStatus::Completed => "COMPLETED",
            CampaignStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CampaignStatus {
    type Err = BizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DRAFT" => Ok(CampaignStatus::Draft),
            "ACTIVE" => Ok(CampaignStatus::Active),
            "PAUSED" => Ok(CampaignStatus::Paused),
            "COMPLETED" => Ok(CampaignStatus::Completed),
            "CANCELLED" => Ok(CampaignStatus::Cancelled),
            other => Err(BizError::Validation(format!(
                "Unknown campaign status: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub status: CampaignStatus,
    pub template_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCampaign {
    pub name: String,
    pub description: Option<String>,
    pub template_id: Uuid,
}

/// One company targeted by a campaign, with its per-recipient send state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignRecipient {
    pub id: Uuid,
    pub company: Company,
    pub sent: bool,
    pub sent_at: Option<DateTime<Utc>>,
    pub message_id: Option<String>,
    pub error: Option<String>,
    pub delivered: bool,
    pub opened: bool,
    pub clicked: bool,
    pub bounced: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignDetail {
    #[serde(flatten)]
    pub campaign: Campaign,
    pub template: Option<EmailTemplate>,
    pub recipients: Vec<CampaignRecipient>,
}

/// Counts derived from the campaign's recipient rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignStats {
    pub total_recipients: u64,
    pub sent: u64,
    pub delivered: u64,
    pub opened: u64,
    pub clicked: u64,
    pub bounced: u64,
    pub failed: u64,
    pub delivery_rate: f64,
    pub open_rate: f64,
    pub click_rate: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CampaignsQuery {
    pub status: Option<String>,
}

/// Engagement events reported back by the mail provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryEvent {
    Delivered,
    Opened,
    Clicked,
    Bounced,
}

impl FromStr for DeliveryEvent {
    type Err = BizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Mailjet event names: sent, open, click, bounce, blocked, spam, unsub
        match s.trim().to_ascii_lowercase().as_str() {
            "sent" | "delivered" => Ok(DeliveryEvent::Delivered),
            "open" | "opened" => Ok(DeliveryEvent::Opened),
            "click" | "clicked" => Ok(DeliveryEvent::Clicked),
            "bounce" | "bounced" | "blocked" => Ok(DeliveryEvent::Bounced),
            other => Err(BizError::Validation(format!(
                "Unsupported delivery event: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignRunSummary {
    pub campaign_id: Uuid,
    pub attempted: u64,
    pub sent: u64,
    pub failed: u64,
    pub skipped: u64,
    pub completed: bool,
}

/// Aggregate outcome of one pass of the sending workflow.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub campaigns: Vec<CampaignRunSummary>,
    pub total_sent: u64,
    pub total_failed: u64,
    pub limit_reached: bool,
}
