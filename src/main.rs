use std::sync::Arc;

use bizagent_api::{ApiState, config::ApiConfig};
use bizagent_db::{create_pool, schema::initialize_database, store::PgStore};
use bizagent_services::{
    AccessTokenSource, CalendarApi, CampaignService, ContactScraper, CronDriver,
    GoogleCalendarClient, GoogleSearchClient, GoogleTokenEndpoint, OAuthService, SlotService,
    build_transport,
    config::{
        CalendarConfig, CampaignConfig, CronConfig, GoogleOAuthConfig, SearchConfig, SenderConfig,
    },
};
use color_eyre::eyre::Result;
use dotenv::dotenv;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    let config = ApiConfig::from_env()?;
    bizagent_api::init_tracing(config.log_level)?;

    let db_pool = create_pool(&config.database_url).await?;
    initialize_database(&db_pool).await?;
    let store = Arc::new(PgStore::new(db_pool.clone()));

    // Optional integrations are disabled, not fatal, when unconfigured.
    let oauth = match GoogleOAuthConfig::from_env() {
        Ok(oauth_config) => {
            let endpoint = Arc::new(GoogleTokenEndpoint::new(oauth_config.clone())?);
            Some(Arc::new(OAuthService::new(oauth_config, store.clone(), endpoint)))
        }
        Err(e) => {
            warn!("Google OAuth disabled: {}", e);
            None
        }
    };
    let tokens = oauth
        .clone()
        .map(|oauth| oauth as Arc<dyn AccessTokenSource>);

    let sender = SenderConfig::from_env()
        .map_err(|e| warn!("Sender identity not configured: {}", e))
        .ok();
    let transport = build_transport(config.mail_provider, sender, tokens.clone())?;

    let calendar_config = CalendarConfig::from_env()?;
    let calendar = match &tokens {
        Some(tokens) => Some(Arc::new(GoogleCalendarClient::new(
            calendar_config.calendar_id.clone(),
            tokens.clone(),
        )?) as Arc<dyn CalendarApi>),
        None => None,
    };

    let search = match SearchConfig::from_env() {
        Ok(search_config) => Some(Arc::new(GoogleSearchClient::new(search_config))),
        Err(e) => {
            warn!("Google search disabled: {}", e);
            None
        }
    };

    let campaigns = Arc::new(CampaignService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        transport.clone(),
        CampaignConfig::from_env()?,
    ));

    let cron_config = CronConfig::from_env()?;
    let mut cron = if cron_config.enabled {
        let mut driver = CronDriver::new(&cron_config.schedule, campaigns.clone())?;
        driver.start();
        Some(driver)
    } else {
        info!("Scheduled campaign sending disabled");
        None
    };

    let state = Arc::new(ApiState {
        companies: store.clone(),
        transport,
        campaigns,
        slots: Arc::new(SlotService::new(store.clone(), calendar, calendar_config)),
        scraper: Arc::new(ContactScraper::new()?),
        oauth,
        search,
    });

    let served = bizagent_api::start_server(&config, state).await;

    if let Some(driver) = cron.as_mut() {
        driver.stop().await;
    }
    db_pool.close().await;
    info!("Shutdown complete");

    served
}
