//! Mail Transport Adapter: one interface over Gmail, Mailjet and a simulated sender.
//!
//! No transport retries. A failed send comes back as a `SendResult` with
//! `success: false`; callers decide whether to stop.

pub mod gmail;
pub mod mailjet;
pub mod mock;

use std::sync::Arc;

use async_trait::async_trait;
use bizagent_core::models::email::{SendResult, SendingStats};
use eyre::Result;

use crate::config::{MailProvider, MailjetConfig, MockMailConfig, SenderConfig};
use crate::oauth::AccessTokenSource;

pub use gmail::GmailTransport;
pub use mailjet::MailjetTransport;
pub use mock::MockTransport;

#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Short provider name for logs and status payloads.
    fn name(&self) -> &'static str;

    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        html_content: &str,
        text_content: Option<&str>,
    ) -> SendResult;

    async fn test_connection(&self) -> bool;

    /// Counters for the last `window_days` days.
    async fn get_sending_stats(&self, window_days: u32) -> Result<SendingStats>;
}

/// Builds the transport selected by `provider`.
pub fn build_transport(
    provider: MailProvider,
    sender: Option<SenderConfig>,
    tokens: Option<Arc<dyn AccessTokenSource>>,
) -> Result<Arc<dyn MailTransport>> {
    let transport: Arc<dyn MailTransport> = match provider {
        MailProvider::Mock => Arc::new(MockTransport::new(MockMailConfig::from_env()?)),
        MailProvider::Mailjet => {
            let sender = sender.ok_or_else(|| eyre::eyre!("Mailjet requires FROM_EMAIL"))?;
            Arc::new(MailjetTransport::new(MailjetConfig::from_env()?, sender)?)
        }
        MailProvider::Gmail => {
            let sender = sender.ok_or_else(|| eyre::eyre!("Gmail requires FROM_EMAIL"))?;
            let tokens =
                tokens.ok_or_else(|| eyre::eyre!("Gmail requires Google OAuth credentials"))?;
            Arc::new(GmailTransport::new(sender, tokens)?)
        }
    };

    tracing::info!("Using {} mail transport", transport.name());
    Ok(transport)
}
