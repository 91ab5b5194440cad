use async_trait::async_trait;
use bizagent_core::models::{
    campaign::{CampaignStatus, DeliveryEvent, NewCampaign},
    company::{ContactUpdate, NewCompany},
    oauth::OAuthToken,
    template::NewEmailTemplate,
};
use mockall::mock;
use uuid::Uuid;

use crate::models::{
    DbCampaign, DbCampaignCompany, DbCompany, DbEmailTemplate, DbOAuthToken, DbTimeSlot,
    NewTimeSlot,
};
use crate::store::{
    CampaignRepository, CompanyRepository, OAuthTokenRepository, TemplateRepository,
    TimeSlotRepository,
};

// Mock repositories for testing
mock! {
    pub CompanyRepo {}

    #[async_trait]
    impl CompanyRepository for CompanyRepo {
        async fn create_company(&self, company: &NewCompany) -> eyre::Result<DbCompany>;
        async fn get_company_by_id(&self, id: Uuid) -> eyre::Result<Option<DbCompany>>;
        async fn list_companies(&self) -> eyre::Result<Vec<DbCompany>>;
        async fn update_contact_info(
            &self,
            id: Uuid,
            contact: &ContactUpdate,
        ) -> eyre::Result<DbCompany>;
    }
}

mock! {
    pub TemplateRepo {}

    #[async_trait]
    impl TemplateRepository for TemplateRepo {
        async fn create_template(&self, template: &NewEmailTemplate) -> eyre::Result<DbEmailTemplate>;
        async fn get_template_by_id(&self, id: Uuid) -> eyre::Result<Option<DbEmailTemplate>>;
        async fn list_templates(&self) -> eyre::Result<Vec<DbEmailTemplate>>;
    }
}

mock! {
    pub CampaignRepo {}

    #[async_trait]
    impl CampaignRepository for CampaignRepo {
        async fn create_campaign(&self, campaign: &NewCampaign) -> eyre::Result<DbCampaign>;
        async fn get_campaigns(
            &self,
            status: Option<CampaignStatus>,
        ) -> eyre::Result<Vec<DbCampaign>>;
        async fn get_campaign_by_id(&self, id: Uuid) -> eyre::Result<Option<DbCampaign>>;
        async fn update_campaign_status(
            &self,
            id: Uuid,
            status: CampaignStatus,
        ) -> eyre::Result<DbCampaign>;
        async fn add_company(
            &self,
            campaign_id: Uuid,
            company_id: Uuid,
        ) -> eyre::Result<DbCampaignCompany>;
        async fn get_campaign_companies(
            &self,
            campaign_id: Uuid,
        ) -> eyre::Result<Vec<DbCampaignCompany>>;
        async fn mark_sent(
            &self,
            id: Uuid,
            message_id: Option<String>,
        ) -> eyre::Result<DbCampaignCompany>;
        async fn mark_failed(&self, id: Uuid, error: &str) -> eyre::Result<DbCampaignCompany>;
        async fn record_event(
            &self,
            message_id: &str,
            event: DeliveryEvent,
        ) -> eyre::Result<Option<DbCampaignCompany>>;
    }
}

mock! {
    pub TimeSlotRepo {}

    #[async_trait]
    impl TimeSlotRepository for TimeSlotRepo {
        async fn create_time_slot(&self, slot: &NewTimeSlot) -> eyre::Result<DbTimeSlot>;
        async fn list_time_slots(&self) -> eyre::Result<Vec<DbTimeSlot>>;
        async fn delete_all_time_slots(&self) -> eyre::Result<u64>;
        async fn count_time_slots(&self) -> eyre::Result<i64>;
    }
}

mock! {
    pub OAuthTokenRepo {}

    #[async_trait]
    impl OAuthTokenRepository for OAuthTokenRepo {
        async fn save_token(&self, token: &OAuthToken) -> eyre::Result<DbOAuthToken>;
        async fn load_token(&self, provider: &str) -> eyre::Result<Option<DbOAuthToken>>;
    }
}
