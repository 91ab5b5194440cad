//! # Biz-Agent API
//!
//! The web server for the Biz-Agent outreach backend: campaigns, email
//! delivery, Google OAuth, calendar slot maintenance and contact scraping.
//!
//! ## Architecture
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Validate input and call into the service layer
//! - **Middleware**: Error mapping to the `{success, data?, error?}` envelope
//! - **Config**: Environment configuration for the server
//!
//! Handlers never touch the database pool directly. They go through the
//! services and repository traits held in [`ApiState`], which lets tests run
//! the full router against in-memory stores.

/// Configuration module for API settings
pub mod config;
/// Request handlers
pub mod handlers;
/// Error handling middleware
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
};
use bizagent_db::store::CompanyRepository;
use bizagent_services::{
    CampaignService, ContactScraper, GoogleSearchClient, MailTransport, OAuthService, SlotService,
};
use eyre::Result;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Shared application state that is accessible to all request handlers
///
/// Optional members are integrations that are only enabled when their
/// credentials are configured.
pub struct ApiState {
    pub companies: Arc<dyn CompanyRepository>,
    pub transport: Arc<dyn MailTransport>,
    pub campaigns: Arc<CampaignService>,
    pub slots: Arc<SlotService>,
    pub scraper: Arc<ContactScraper>,
    pub oauth: Option<Arc<OAuthService>>,
    pub search: Option<Arc<GoogleSearchClient>>,
}

/// Installs the global tracing subscriber at `level`.
pub fn init_tracing(level: Level) -> Result<()> {
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Builds the router with every endpoint and request tracing.
///
/// `request_timeout` bounds the request/response endpoints. The paced batch
/// endpoints sleep between external calls and are left unbounded.
pub fn build_router(state: Arc<ApiState>, request_timeout: Duration) -> Router {
    let timed = Router::new()
        .merge(routes::health::routes())
        .merge(routes::placeholders::routes())
        .merge(routes::email::routes())
        .merge(routes::campaigns::routes())
        .merge(routes::auth::routes())
        .merge(routes::calendar::routes())
        .merge(routes::scraper::routes())
        .layer(ServiceBuilder::new().layer(TimeoutLayer::new(request_timeout)));

    let paced = Router::new()
        .merge(routes::campaigns::paced_routes())
        .merge(routes::calendar::paced_routes())
        .merge(routes::scraper::paced_routes());

    timed
        .merge(paced)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_origin(origins)
        .allow_credentials(true)
}

/// Resolves on Ctrl-C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}

/// Serves the API until a shutdown signal arrives.
///
/// # Example
///
/// ```ignore
/// let config = ApiConfig::from_env()?;
/// start_server(&config, state).await?;
/// ```
pub async fn start_server(config: &config::ApiConfig, state: Arc<ApiState>) -> Result<()> {
    let app = build_router(state, Duration::from_secs(config.request_timeout));

    let app = match &config.cors_origins {
        Some(origins) => app.layer(cors_layer(origins)),
        None => app,
    };

    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
