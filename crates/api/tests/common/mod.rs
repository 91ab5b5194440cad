use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum_test::TestServer;
use bizagent_api::{ApiState, build_router};
use bizagent_core::models::{
    campaign::{CampaignStatus, NewCampaign},
    company::NewCompany,
    template::NewEmailTemplate,
    time_slot::CalendarEvent,
};
use bizagent_db::{
    mock::memory::MemoryStore,
    store::{CampaignRepository, CompanyRepository, TemplateRepository},
};
use bizagent_services::{
    CalendarApi, CampaignService, ContactScraper, OAuthService, SlotService,
    config::{CalendarConfig, CampaignConfig, DEFAULT_SCOPES, GoogleOAuthConfig, MockMailConfig},
    mail::MockTransport,
    oauth::{TokenEndpoint, TokenGrant},
};
use chrono::{DateTime, Utc};
use eyre::{Result, eyre};
use uuid::Uuid;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Token endpoint that accepts the code "valid" only.
pub struct FakeTokenEndpoint;

#[async_trait]
impl TokenEndpoint for FakeTokenEndpoint {
    async fn exchange_code(&self, code: &str) -> Result<TokenGrant> {
        if code != "valid" {
            return Err(eyre!("invalid_grant"));
        }
        Ok(TokenGrant {
            access_token: "access".to_string(),
            refresh_token: Some("refresh".to_string()),
            expires_in: Some(3600),
            scope: None,
            token_type: Some("Bearer".to_string()),
        })
    }

    async fn refresh(&self, _refresh_token: &str) -> Result<TokenGrant> {
        Err(eyre!("not expected"))
    }

    async fn verify(&self, _access_token: &str) -> Result<bool> {
        Ok(true)
    }
}

/// Calendar that remembers created event ids.
#[derive(Default)]
pub struct RecordingCalendar {
    pub created: Mutex<Vec<String>>,
}

#[async_trait]
impl CalendarApi for RecordingCalendar {
    async fn list_events(
        &self,
        _time_min: DateTime<Utc>,
        _time_max: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>> {
        Ok(Vec::new())
    }

    async fn create_event(
        &self,
        _summary: &str,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> Result<String> {
        let mut created = self.created.lock().unwrap();
        let id = format!("evt-{}", created.len());
        created.push(id.clone());
        Ok(id)
    }

    async fn delete_event(&self, _event_id: &str) -> Result<()> {
        Ok(())
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub store: Arc<MemoryStore>,
}

pub fn test_app() -> TestApp {
    test_app_with_calendar(None, Duration::ZERO)
}

/// Router behind the production request timeout, optionally with a
/// connected calendar paced at `pacing`.
pub fn test_app_with_calendar(
    calendar: Option<Arc<dyn CalendarApi>>,
    pacing: Duration,
) -> TestApp {
    let store = Arc::new(MemoryStore::new());

    let transport = Arc::new(MockTransport::with_seed(
        MockMailConfig {
            min_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            failure_rate: 0.0,
        },
        1,
    ));

    let campaigns = CampaignService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        transport.clone(),
        CampaignConfig {
            send_delay: Duration::ZERO,
            max_per_run: 50,
        },
    );

    let slots = SlotService::new(
        store.clone(),
        calendar,
        CalendarConfig {
            pacing,
            ..CalendarConfig::default()
        },
    );

    let oauth = OAuthService::new(
        GoogleOAuthConfig {
            client_id: "client-id".to_string(),
            client_secret: "client-secret".to_string(),
            redirect_uri: "http://localhost:3000/api/auth/google/callback".to_string(),
            scopes: DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
        },
        store.clone(),
        Arc::new(FakeTokenEndpoint),
    );

    let state = Arc::new(ApiState {
        companies: store.clone(),
        transport,
        campaigns: Arc::new(campaigns),
        slots: Arc::new(slots),
        scraper: Arc::new(ContactScraper::new().expect("scraper client")),
        oauth: Some(Arc::new(oauth)),
        search: None,
    });

    TestApp {
        server: TestServer::new(build_router(state, REQUEST_TIMEOUT)).expect("test server"),
        store,
    }
}

/// Seeds an ACTIVE campaign with one reachable company and returns its id.
pub async fn seed_active_campaign(store: &MemoryStore) -> Uuid {
    let template = store
        .create_template(&NewEmailTemplate {
            name: "Intro".to_string(),
            category: "outreach".to_string(),
            subject: "Hello {{company_name}}".to_string(),
            html_content: "<p>Hi {{contact_name}}</p>".to_string(),
            text_content: Some("Hi {{contact_name}}".to_string()),
        })
        .await
        .unwrap();

    let campaign = store
        .create_campaign(&NewCampaign {
            name: "Launch".to_string(),
            description: Some("First wave".to_string()),
            template_id: template.id,
        })
        .await
        .unwrap();

    let company = store
        .create_company(&NewCompany {
            name: "Acme".to_string(),
            email: Some("ceo@acme.io".to_string()),
            contact_person: Some("Jane Doe".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    store.add_company(campaign.id, company.id).await.unwrap();
    store
        .update_campaign_status(campaign.id, CampaignStatus::Active)
        .await
        .unwrap();

    campaign.id
}
