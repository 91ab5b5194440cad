//! In-memory implementation of every repository trait.
//!
//! Mirrors the constraints the Postgres schema enforces (foreign keys, the
//! unique campaign/company pair) so service tests exercise the same failure
//! paths without a database.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use bizagent_core::models::{
    campaign::{CampaignStatus, DeliveryEvent, NewCampaign},
    company::{ContactUpdate, NewCompany},
    oauth::OAuthToken,
    template::NewEmailTemplate,
};
use chrono::Utc;
use eyre::{eyre, Result};
use uuid::Uuid;

use crate::models::{
    DbCampaign, DbCampaignCompany, DbCompany, DbEmailTemplate, DbOAuthToken, DbTimeSlot,
    NewTimeSlot,
};
use crate::store::{
    CampaignRepository, CompanyRepository, OAuthTokenRepository, TemplateRepository,
    TimeSlotRepository,
};

#[derive(Debug, Default)]
struct Tables {
    companies: HashMap<Uuid, DbCompany>,
    templates: HashMap<Uuid, DbEmailTemplate>,
    campaigns: HashMap<Uuid, DbCampaign>,
    recipients: Vec<DbCampaignCompany>,
    time_slots: Vec<DbTimeSlot>,
    tokens: HashMap<String, DbOAuthToken>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| eyre!("memory store lock poisoned"))
    }
}

#[async_trait]
impl CompanyRepository for MemoryStore {
    async fn create_company(&self, company: &NewCompany) -> Result<DbCompany> {
        let now = Utc::now();
        let row = DbCompany {
            id: Uuid::new_v4(),
            name: company.name.clone(),
            website: company.website.clone(),
            email: company.email.clone(),
            phone: company.phone.clone(),
            address: company.address.clone(),
            contact_person: company.contact_person.clone(),
            industry: company.industry.clone(),
            size: company.size.clone(),
            created_at: now,
            updated_at: now,
        };
        self.tables()?.companies.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get_company_by_id(&self, id: Uuid) -> Result<Option<DbCompany>> {
        Ok(self.tables()?.companies.get(&id).cloned())
    }

    async fn list_companies(&self) -> Result<Vec<DbCompany>> {
        let mut rows: Vec<_> = self.tables()?.companies.values().cloned().collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn update_contact_info(&self, id: Uuid, contact: &ContactUpdate) -> Result<DbCompany> {
        let mut tables = self.tables()?;
        let row = tables
            .companies
            .get_mut(&id)
            .ok_or_else(|| eyre!("Company not found"))?;

        if let Some(email) = &contact.email {
            row.email = Some(email.clone());
        }
        if let Some(phone) = &contact.phone {
            row.phone = Some(phone.clone());
        }
        if let Some(address) = &contact.address {
            row.address = Some(address.clone());
        }
        if let Some(person) = &contact.contact_person {
            row.contact_person = Some(person.clone());
        }
        row.updated_at = Utc::now();

        Ok(row.clone())
    }
}

#[async_trait]
impl TemplateRepository for MemoryStore {
    async fn create_template(&self, template: &NewEmailTemplate) -> Result<DbEmailTemplate> {
        let row = DbEmailTemplate {
            id: Uuid::new_v4(),
            name: template.name.clone(),
            category: template.category.clone(),
            subject: template.subject.clone(),
            html_content: template.html_content.clone(),
            text_content: template.text_content.clone(),
            created_at: Utc::now(),
        };
        self.tables()?.templates.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get_template_by_id(&self, id: Uuid) -> Result<Option<DbEmailTemplate>> {
        Ok(self.tables()?.templates.get(&id).cloned())
    }

    async fn list_templates(&self) -> Result<Vec<DbEmailTemplate>> {
        let mut rows: Vec<_> = self.tables()?.templates.values().cloned().collect();
        rows.sort_by(|a, b| (&a.category, &a.name).cmp(&(&b.category, &b.name)));
        Ok(rows)
    }
}

#[async_trait]
impl CampaignRepository for MemoryStore {
    async fn create_campaign(&self, campaign: &NewCampaign) -> Result<DbCampaign> {
        let mut tables = self.tables()?;
        if !tables.templates.contains_key(&campaign.template_id) {
            return Err(eyre!(
                "Template {} does not exist",
                campaign.template_id
            ));
        }

        let now = Utc::now();
        let row = DbCampaign {
            id: Uuid::new_v4(),
            name: campaign.name.clone(),
            description: campaign.description.clone(),
            status: CampaignStatus::Draft.as_str().to_string(),
            template_id: campaign.template_id,
            created_at: now,
            updated_at: now,
        };
        tables.campaigns.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get_campaigns(&self, status: Option<CampaignStatus>) -> Result<Vec<DbCampaign>> {
        let mut rows: Vec<_> = self
            .tables()?
            .campaigns
            .values()
            .filter(|c| status.is_none_or(|s| c.status == s.as_str()))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn get_campaign_by_id(&self, id: Uuid) -> Result<Option<DbCampaign>> {
        Ok(self.tables()?.campaigns.get(&id).cloned())
    }

    async fn update_campaign_status(
        &self,
        id: Uuid,
        status: CampaignStatus,
    ) -> Result<DbCampaign> {
        let mut tables = self.tables()?;
        let row = tables
            .campaigns
            .get_mut(&id)
            .ok_or_else(|| eyre!("Campaign not found"))?;
        row.status = status.as_str().to_string();
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn add_company(&self, campaign_id: Uuid, company_id: Uuid) -> Result<DbCampaignCompany> {
        let mut tables = self.tables()?;
        if !tables.campaigns.contains_key(&campaign_id) {
            return Err(eyre!("Campaign {} does not exist", campaign_id));
        }
        if !tables.companies.contains_key(&company_id) {
            return Err(eyre!("Company {} does not exist", company_id));
        }
        if tables
            .recipients
            .iter()
            .any(|r| r.campaign_id == campaign_id && r.company_id == company_id)
        {
            return Err(eyre!(
                "Company {} is already part of campaign {}",
                company_id,
                campaign_id
            ));
        }

        let row = DbCampaignCompany {
            id: Uuid::new_v4(),
            campaign_id,
            company_id,
            sent: false,
            sent_at: None,
            message_id: None,
            error: None,
            delivered: false,
            opened: false,
            clicked: false,
            bounced: false,
            created_at: Utc::now(),
        };
        tables.recipients.push(row.clone());
        Ok(row)
    }

    async fn get_campaign_companies(&self, campaign_id: Uuid) -> Result<Vec<DbCampaignCompany>> {
        Ok(self
            .tables()?
            .recipients
            .iter()
            .filter(|r| r.campaign_id == campaign_id)
            .cloned()
            .collect())
    }

    async fn mark_sent(&self, id: Uuid, message_id: Option<String>) -> Result<DbCampaignCompany> {
        let mut tables = self.tables()?;
        let row = tables
            .recipients
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| eyre!("Campaign recipient not found"))?;
        row.sent = true;
        row.sent_at = Some(Utc::now());
        row.message_id = message_id;
        row.error = None;
        Ok(row.clone())
    }

    async fn mark_failed(&self, id: Uuid, error: &str) -> Result<DbCampaignCompany> {
        let mut tables = self.tables()?;
        let row = tables
            .recipients
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| eyre!("Campaign recipient not found"))?;
        row.error = Some(error.to_string());
        Ok(row.clone())
    }

    async fn record_event(
        &self,
        message_id: &str,
        event: DeliveryEvent,
    ) -> Result<Option<DbCampaignCompany>> {
        let mut tables = self.tables()?;
        let Some(row) = tables
            .recipients
            .iter_mut()
            .find(|r| r.message_id.as_deref() == Some(message_id))
        else {
            return Ok(None);
        };

        match event {
            DeliveryEvent::Delivered => row.delivered = true,
            DeliveryEvent::Opened => row.opened = true,
            DeliveryEvent::Clicked => row.clicked = true,
            DeliveryEvent::Bounced => row.bounced = true,
        }
        Ok(Some(row.clone()))
    }
}

#[async_trait]
impl TimeSlotRepository for MemoryStore {
    async fn create_time_slot(&self, slot: &NewTimeSlot) -> Result<DbTimeSlot> {
        if slot.end_time <= slot.start_time {
            return Err(eyre!("Time slot must end after it starts"));
        }

        let row = DbTimeSlot {
            id: Uuid::new_v4(),
            start_time: slot.start_time,
            end_time: slot.end_time,
            calendar_event_id: slot.calendar_event_id.clone(),
            is_booked: false,
            created_at: Utc::now(),
        };
        self.tables()?.time_slots.push(row.clone());
        Ok(row)
    }

    async fn list_time_slots(&self) -> Result<Vec<DbTimeSlot>> {
        let mut rows = self.tables()?.time_slots.clone();
        rows.sort_by_key(|s| s.start_time);
        Ok(rows)
    }

    async fn delete_all_time_slots(&self) -> Result<u64> {
        let mut tables = self.tables()?;
        let deleted = tables.time_slots.len() as u64;
        tables.time_slots.clear();
        Ok(deleted)
    }

    async fn count_time_slots(&self) -> Result<i64> {
        Ok(self.tables()?.time_slots.len() as i64)
    }
}

#[async_trait]
impl OAuthTokenRepository for MemoryStore {
    async fn save_token(&self, token: &OAuthToken) -> Result<DbOAuthToken> {
        let row = DbOAuthToken {
            provider: token.provider.clone(),
            access_token: token.access_token.clone(),
            refresh_token: token.refresh_token.clone(),
            expires_at: token.expires_at,
            scopes: token.scopes.clone(),
            token_type: token.token_type.clone(),
            updated_at: token.updated_at,
        };
        self.tables()?
            .tokens
            .insert(row.provider.clone(), row.clone());
        Ok(row)
    }

    async fn load_token(&self, provider: &str) -> Result<Option<DbOAuthToken>> {
        Ok(self.tables()?.tokens.get(provider).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::{Fake, faker::company::en::CompanyName};
    use pretty_assertions::assert_eq;

    async fn seed_campaign(store: &MemoryStore) -> DbCampaign {
        let template = store
            .create_template(&NewEmailTemplate {
                name: "Intro".to_string(),
                category: "outreach".to_string(),
                subject: "Hello".to_string(),
                html_content: "<p>Hi</p>".to_string(),
                text_content: None,
            })
            .await
            .unwrap();

        store
            .create_campaign(&NewCampaign {
                name: "Q3 outreach".to_string(),
                description: None,
                template_id: template.id,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_campaign_requires_existing_template() {
        let store = MemoryStore::new();
        let result = store
            .create_campaign(&NewCampaign {
                name: "Orphan".to_string(),
                description: None,
                template_id: Uuid::new_v4(),
            })
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_recipient_pair_is_unique() {
        let store = MemoryStore::new();
        let campaign = seed_campaign(&store).await;
        let company = store
            .create_company(&NewCompany {
                name: CompanyName().fake(),
                ..Default::default()
            })
            .await
            .unwrap();

        store.add_company(campaign.id, company.id).await.unwrap();
        assert!(store.add_company(campaign.id, company.id).await.is_err());
        assert!(store.add_company(campaign.id, Uuid::new_v4()).await.is_err());
    }

    #[tokio::test]
    async fn test_status_filter() {
        let store = MemoryStore::new();
        let first = seed_campaign(&store).await;
        seed_campaign(&store).await;
        store
            .update_campaign_status(first.id, CampaignStatus::Active)
            .await
            .unwrap();

        let active = store.get_campaigns(Some(CampaignStatus::Active)).await.unwrap();
        let all = store.get_campaigns(None).await.unwrap();

        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, first.id);
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_record_event_by_message_id() {
        let store = MemoryStore::new();
        let campaign = seed_campaign(&store).await;
        let company = store
            .create_company(&NewCompany {
                name: CompanyName().fake(),
                ..Default::default()
            })
            .await
            .unwrap();
        let recipient = store.add_company(campaign.id, company.id).await.unwrap();
        store
            .mark_sent(recipient.id, Some("msg-42".to_string()))
            .await
            .unwrap();

        let updated = store
            .record_event("msg-42", DeliveryEvent::Opened)
            .await
            .unwrap()
            .unwrap();
        assert!(updated.opened);
        assert!(!updated.clicked);

        let unknown = store.record_event("msg-404", DeliveryEvent::Opened).await.unwrap();
        assert!(unknown.is_none());
    }

    #[tokio::test]
    async fn test_contact_update_keeps_missing_fields() {
        let store = MemoryStore::new();
        let company = store
            .create_company(&NewCompany {
                name: "Acme".to_string(),
                phone: Some("+1 555 010 0000".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        let updated = store
            .update_contact_info(
                company.id,
                &ContactUpdate {
                    email: Some("info@acme.io".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.email.as_deref(), Some("info@acme.io"));
        assert_eq!(updated.phone.as_deref(), Some("+1 555 010 0000"));
    }
}
