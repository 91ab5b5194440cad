//! Repository traits and their PostgreSQL implementation.
//!
//! Services depend on these traits rather than on a pool so they can run
//! against the in-memory store in tests.

use async_trait::async_trait;
use bizagent_core::models::{
    campaign::{CampaignStatus, DeliveryEvent, NewCampaign},
    company::{ContactUpdate, NewCompany},
    oauth::OAuthToken,
    template::NewEmailTemplate,
};
use eyre::Result;
use uuid::Uuid;

use crate::{
    DbPool,
    models::{
        DbCampaign, DbCampaignCompany, DbCompany, DbEmailTemplate, DbOAuthToken, DbTimeSlot,
        NewTimeSlot,
    },
    repositories,
};

#[async_trait]
pub trait CompanyRepository: Send + Sync {
    async fn create_company(&self, company: &NewCompany) -> Result<DbCompany>;
    async fn get_company_by_id(&self, id: Uuid) -> Result<Option<DbCompany>>;
    async fn list_companies(&self) -> Result<Vec<DbCompany>>;
    async fn update_contact_info(&self, id: Uuid, contact: &ContactUpdate) -> Result<DbCompany>;
}

#[async_trait]
pub trait TemplateRepository: Send + Sync {
    async fn create_template(&self, template: &NewEmailTemplate) -> Result<DbEmailTemplate>;
    async fn get_template_by_id(&self, id: Uuid) -> Result<Option<DbEmailTemplate>>;
    async fn list_templates(&self) -> Result<Vec<DbEmailTemplate>>;
}

/// Campaigns and their recipient (campaign/company join) rows.
#[async_trait]
pub trait CampaignRepository: Send + Sync {
    async fn create_campaign(&self, campaign: &NewCampaign) -> Result<DbCampaign>;
    async fn get_campaigns(&self, status: Option<CampaignStatus>) -> Result<Vec<DbCampaign>>;
    async fn get_campaign_by_id(&self, id: Uuid) -> Result<Option<DbCampaign>>;
    async fn update_campaign_status(&self, id: Uuid, status: CampaignStatus)
    -> Result<DbCampaign>;
    async fn add_company(&self, campaign_id: Uuid, company_id: Uuid) -> Result<DbCampaignCompany>;
    async fn get_campaign_companies(&self, campaign_id: Uuid) -> Result<Vec<DbCampaignCompany>>;
    async fn mark_sent(&self, id: Uuid, message_id: Option<String>) -> Result<DbCampaignCompany>;
    async fn mark_failed(&self, id: Uuid, error: &str) -> Result<DbCampaignCompany>;
    async fn record_event(
        &self,
        message_id: &str,
        event: DeliveryEvent,
    ) -> Result<Option<DbCampaignCompany>>;
}

#[async_trait]
pub trait TimeSlotRepository: Send + Sync {
    async fn create_time_slot(&self, slot: &NewTimeSlot) -> Result<DbTimeSlot>;
    async fn list_time_slots(&self) -> Result<Vec<DbTimeSlot>>;
    async fn delete_all_time_slots(&self) -> Result<u64>;
    async fn count_time_slots(&self) -> Result<i64>;
}

#[async_trait]
pub trait OAuthTokenRepository: Send + Sync {
    async fn save_token(&self, token: &OAuthToken) -> Result<DbOAuthToken>;
    async fn load_token(&self, provider: &str) -> Result<Option<DbOAuthToken>>;
}

/// Repository implementation backed by the shared connection pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl CompanyRepository for PgStore {
    async fn create_company(&self, company: &NewCompany) -> Result<DbCompany> {
        repositories::company::create_company(&self.pool, company).await
    }

    async fn get_company_by_id(&self, id: Uuid) -> Result<Option<DbCompany>> {
        repositories::company::get_company_by_id(&self.pool, id).await
    }

    async fn list_companies(&self) -> Result<Vec<DbCompany>> {
        repositories::company::list_companies(&self.pool).await
    }

    async fn update_contact_info(&self, id: Uuid, contact: &ContactUpdate) -> Result<DbCompany> {
        repositories::company::update_contact_info(&self.pool, id, contact).await
    }
}

#[async_trait]
impl TemplateRepository for PgStore {
    async fn create_template(&self, template: &NewEmailTemplate) -> Result<DbEmailTemplate> {
        repositories::template::create_template(&self.pool, template).await
    }

    async fn get_template_by_id(&self, id: Uuid) -> Result<Option<DbEmailTemplate>> {
        repositories::template::get_template_by_id(&self.pool, id).await
    }

    async fn list_templates(&self) -> Result<Vec<DbEmailTemplate>> {
        repositories::template::list_templates(&self.pool).await
    }
}

#[async_trait]
impl CampaignRepository for PgStore {
    async fn create_campaign(&self, campaign: &NewCampaign) -> Result<DbCampaign> {
        repositories::campaign::create_campaign(&self.pool, campaign).await
    }

    async fn get_campaigns(&self, status: Option<CampaignStatus>) -> Result<Vec<DbCampaign>> {
        repositories::campaign::get_campaigns(&self.pool, status).await
    }

    async fn get_campaign_by_id(&self, id: Uuid) -> Result<Option<DbCampaign>> {
        repositories::campaign::get_campaign_by_id(&self.pool, id).await
    }

    async fn update_campaign_status(
        &self,
        id: Uuid,
        status: CampaignStatus,
    ) -> Result<DbCampaign> {
        repositories::campaign::update_campaign_status(&self.pool, id, status).await
    }

    async fn add_company(&self, campaign_id: Uuid, company_id: Uuid) -> Result<DbCampaignCompany> {
        repositories::campaign_company::add_company_to_campaign(&self.pool, campaign_id, company_id)
            .await
    }

    async fn get_campaign_companies(&self, campaign_id: Uuid) -> Result<Vec<DbCampaignCompany>> {
        repositories::campaign_company::get_campaign_companies(&self.pool, campaign_id).await
    }

    async fn mark_sent(&self, id: Uuid, message_id: Option<String>) -> Result<DbCampaignCompany> {
        repositories::campaign_company::mark_sent(&self.pool, id, message_id.as_deref()).await
    }

    async fn mark_failed(&self, id: Uuid, error: &str) -> Result<DbCampaignCompany> {
        repositories::campaign_company::mark_failed(&self.pool, id, error).await
    }

    async fn record_event(
        &self,
        message_id: &str,
        event: DeliveryEvent,
    ) -> Result<Option<DbCampaignCompany>> {
        repositories::campaign_company::record_event(&self.pool, message_id, event).await
    }
}

#[async_trait]
impl TimeSlotRepository for PgStore {
    async fn create_time_slot(&self, slot: &NewTimeSlot) -> Result<DbTimeSlot> {
        repositories::time_slot::create_time_slot(&self.pool, slot).await
    }

    async fn list_time_slots(&self) -> Result<Vec<DbTimeSlot>> {
        repositories::time_slot::list_time_slots(&self.pool).await
    }

    async fn delete_all_time_slots(&self) -> Result<u64> {
        repositories::time_slot::delete_all_time_slots(&self.pool).await
    }

    async fn count_time_slots(&self) -> Result<i64> {
        repositories::time_slot::count_time_slots(&self.pool).await
    }
}

#[async_trait]
impl OAuthTokenRepository for PgStore {
    async fn save_token(&self, token: &OAuthToken) -> Result<DbOAuthToken> {
        repositories::oauth_token::save_token(&self.pool, token).await
    }

    async fn load_token(&self, provider: &str) -> Result<Option<DbOAuthToken>> {
        repositories::oauth_token::load_token(&self.pool, provider).await
    }
}
