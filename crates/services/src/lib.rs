pub mod calendar;
pub mod campaign;
pub mod config;
pub mod cron;
pub mod mail;
pub mod oauth;
pub mod scraper;
pub mod search;
pub mod slots;

pub use calendar::{CalendarApi, GoogleCalendarClient};
pub use campaign::CampaignService;
pub use cron::{CronDriver, CronJob};
pub use mail::{MailTransport, build_transport};
pub use oauth::{AccessTokenSource, GoogleTokenEndpoint, OAuthService, TokenEndpoint};
pub use scraper::ContactScraper;
pub use search::GoogleSearchClient;
pub use slots::SlotService;
