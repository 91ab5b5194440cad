//! # Service Configuration
//!
//! Credentials and tuning knobs for the outbound integrations, read from
//! environment variables. Every loader returns an error naming the missing
//! variable so the server can decide which integrations to enable.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use eyre::{eyre, Result};

/// Google OAuth scopes requested at consent time.
pub const DEFAULT_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/gmail.send",
    "https://www.googleapis.com/auth/gmail.readonly",
    "https://www.googleapis.com/auth/calendar",
];

fn required(name: &str) -> Result<String> {
    env::var(name).map_err(|_| eyre!("{} environment variable not set", name))
}

fn parse_or<T: FromStr>(name: &str, default: T) -> Result<T> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| eyre!("Invalid {} value: {}", name, value)),
        Err(_) => Ok(default),
    }
}

/// Which transport sends outreach email.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailProvider {
    Gmail,
    Mailjet,
    Mock,
}

impl FromStr for MailProvider {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gmail" => Ok(MailProvider::Gmail),
            "mailjet" => Ok(MailProvider::Mailjet),
            "mock" => Ok(MailProvider::Mock),
            other => Err(eyre!("Unknown MAIL_PROVIDER: {}", other)),
        }
    }
}

/// Sender identity shared by every transport.
#[derive(Debug, Clone)]
pub struct SenderConfig {
    pub from_email: String,
    pub from_name: String,
}

impl SenderConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            from_email: required("FROM_EMAIL")?,
            from_name: env::var("FROM_NAME").unwrap_or_else(|_| "Biz-Agent".to_string()),
        })
    }
}

#[derive(Debug, Clone)]
pub struct MailjetConfig {
    pub api_key: String,
    pub secret_key: String,
}

impl MailjetConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            api_key: required("MAILJET_API_KEY")?,
            secret_key: required("MAILJET_SECRET_KEY")?,
        })
    }
}

/// Behaviour of the simulated transport.
#[derive(Debug, Clone)]
pub struct MockMailConfig {
    pub min_delay: Duration,
    pub max_delay: Duration,
    pub failure_rate: f64,
}

impl Default for MockMailConfig {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(500),
            failure_rate: 0.05,
        }
    }
}

impl MockMailConfig {
    pub fn from_env() -> Result<Self> {
        Self {
            min_delay: Duration::from_millis(parse_or("MOCK_MAIL_MIN_DELAY_MS", 100u64)?),
            max_delay: Duration::from_millis(parse_or("MOCK_MAIL_MAX_DELAY_MS", 500u64)?),
            failure_rate: parse_or("MOCK_MAIL_FAILURE_RATE", 0.05f64)?,
        }
        .validated()
    }

    pub fn validated(self) -> Result<Self> {
        if !(0.0..=1.0).contains(&self.failure_rate) {
            return Err(eyre!(
                "MOCK_MAIL_FAILURE_RATE must be between 0 and 1, got {}",
                self.failure_rate
            ));
        }
        if self.min_delay > self.max_delay {
            return Err(eyre!("MOCK_MAIL_MIN_DELAY_MS exceeds MOCK_MAIL_MAX_DELAY_MS"));
        }
        Ok(self)
    }
}

#[derive(Debug, Clone)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
}

impl GoogleOAuthConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            client_id: required("GOOGLE_CLIENT_ID")?,
            client_secret: required("GOOGLE_CLIENT_SECRET")?,
            redirect_uri: env::var("GOOGLE_REDIRECT_URI").unwrap_or_else(|_| {
                "http://localhost:3000/api/auth/google/callback".to_string()
            }),
            scopes: DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct CalendarConfig {
    pub calendar_id: String,
    /// Pause between consecutive calendar API calls in a batch.
    pub pacing: Duration,
    pub slot_minutes: i64,
    pub day_start_hour: u32,
    pub day_end_hour: u32,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            calendar_id: "primary".to_string(),
            pacing: Duration::from_millis(500),
            slot_minutes: 30,
            day_start_hour: 9,
            day_end_hour: 17,
        }
    }
}

impl CalendarConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            calendar_id: env::var("GOOGLE_CALENDAR_ID").unwrap_or(defaults.calendar_id),
            pacing: Duration::from_millis(parse_or("CALENDAR_PACING_MS", 500u64)?),
            ..defaults
        })
    }
}

#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub api_key: String,
    pub engine_id: String,
}

impl SearchConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            api_key: required("GOOGLE_SEARCH_API_KEY")?,
            engine_id: required("GOOGLE_SEARCH_ENGINE_ID")?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct CampaignConfig {
    /// Pause between two sends of the workflow.
    pub send_delay: Duration,
    /// Upper bound on sends in one workflow run.
    pub max_per_run: usize,
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self {
            send_delay: Duration::from_millis(2000),
            max_per_run: 50,
        }
    }
}

impl CampaignConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            send_delay: Duration::from_millis(parse_or("CAMPAIGN_SEND_DELAY_MS", 2000u64)?),
            max_per_run: parse_or("CAMPAIGN_MAX_PER_RUN", 50usize)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct CronConfig {
    pub enabled: bool,
    pub schedule: String,
}

impl Default for CronConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            // sec min hour day-of-month month day-of-week: nightly at 02:00 UTC
            schedule: "0 0 2 * * *".to_string(),
        }
    }
}

impl CronConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            enabled: parse_or("CRON_ENABLED", true)?,
            schedule: env::var("CRON_SCHEDULE").unwrap_or(defaults.schedule),
        })
    }
}
