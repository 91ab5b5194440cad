use std::str::FromStr;

use bizagent_core::models::{
    campaign::{Campaign, CampaignStatus},
    company::Company,
    oauth::OAuthToken,
    template::EmailTemplate,
    time_slot::TimeSlot,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbCompany {
    pub id: Uuid,
    pub name: String,
    pub website: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub contact_person: Option<String>,
    pub industry: Option<String>,
    pub size: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbEmailTemplate {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub subject: String,
    pub html_content: String,
    pub text_content: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbCampaign {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub template_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbCampaignCompany {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub company_id: Uuid,
    pub sent: bool,
    pub sent_at: Option<DateTime<Utc>>,
    pub message_id: Option<String>,
    pub error: Option<String>,
    pub delivered: bool,
    pub opened: bool,
    pub clicked: bool,
    pub bounced: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbTimeSlot {
    pub id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub calendar_event_id: Option<String>,
    pub is_booked: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTimeSlot {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub calendar_event_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbOAuthToken {
    pub provider: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub scopes: Vec<String>,
    pub token_type: String,
    pub updated_at: DateTime<Utc>,
}

impl From<DbCompany> for Company {
    fn from(row: DbCompany) -> Self {
        Company {
            id: row.id,
            name: row.name,
            website: row.website,
            email: row.email,
            phone: row.phone,
            address: row.address,
            contact_person: row.contact_person,
            industry: row.industry,
            size: row.size,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<DbEmailTemplate> for EmailTemplate {
    fn from(row: DbEmailTemplate) -> Self {
        EmailTemplate {
            id: row.id,
            name: row.name,
            category: row.category,
            subject: row.subject,
            html_content: row.html_content,
            text_content: row.text_content,
            created_at: row.created_at,
        }
    }
}

impl TryFrom<DbCampaign> for Campaign {
    type Error = eyre::Report;

    fn try_from(row: DbCampaign) -> Result<Self, Self::Error> {
        let status = CampaignStatus::from_str(&row.status)
            .map_err(|e| eyre::eyre!("Campaign {} has invalid status: {}", row.id, e))?;

        Ok(Campaign {
            id: row.id,
            name: row.name,
            description: row.description,
            status,
            template_id: row.template_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl From<DbTimeSlot> for TimeSlot {
    fn from(row: DbTimeSlot) -> Self {
        TimeSlot {
            id: row.id,
            start_time: row.start_time,
            end_time: row.end_time,
            calendar_event_id: row.calendar_event_id,
            is_booked: row.is_booked,
            created_at: row.created_at,
        }
    }
}

impl From<DbOAuthToken> for OAuthToken {
    fn from(row: DbOAuthToken) -> Self {
        OAuthToken {
            provider: row.provider,
            access_token: row.access_token,
            refresh_token: row.refresh_token,
            expires_at: row.expires_at,
            scopes: row.scopes,
            token_type: row.token_type,
            updated_at: row.updated_at,
        }
    }
}
