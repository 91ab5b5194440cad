use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::{
    Engine as _,
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
};
use bizagent_core::models::email::{SendResult, SendingStats};
use eyre::{eyre, Result, WrapErr};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::MailTransport;
use crate::config::SenderConfig;
use crate::oauth::AccessTokenSource;

const GMAIL_API: &str = "https://gmail.googleapis.com/gmail/v1/users/me";

#[derive(Debug, Deserialize)]
struct SendResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    result_size_estimate: u64,
}

/// Sends through the Gmail API as the OAuth-authorised account.
pub struct GmailTransport {
    client: Client,
    sender: SenderConfig,
    tokens: Arc<dyn AccessTokenSource>,
}

impl GmailTransport {
    pub fn new(sender: SenderConfig, tokens: Arc<dyn AccessTokenSource>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .wrap_err("Failed to build Gmail HTTP client")?;

        Ok(Self {
            client,
            sender,
            tokens,
        })
    }

    async fn try_send(
        &self,
        to: &str,
        subject: &str,
        html_content: &str,
        text_content: Option<&str>,
    ) -> Result<String> {
        let token = self.tokens.access_token().await?;
        let message = build_mime_message(&self.sender, to, subject, html_content, text_content)?;

        let response = self
            .client
            .post(format!("{}/messages/send", GMAIL_API))
            .bearer_auth(token)
            .json(&json!({ "raw": URL_SAFE_NO_PAD.encode(message.as_bytes()) }))
            .send()
            .await
            .wrap_err("Gmail send request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(eyre!(
                "Gmail API returned {}: {}",
                status,
                body
            ));
        }

        let body: SendResponse = response
            .json()
            .await
            .wrap_err("Invalid Gmail send response")?;
        Ok(body.id)
    }
}

#[async_trait]
impl MailTransport for GmailTransport {
    fn name(&self) -> &'static str {
        "gmail"
    }

    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        html_content: &str,
        text_content: Option<&str>,
    ) -> SendResult {
        match self.try_send(to, subject, html_content, text_content).await {
            Ok(id) => {
                info!("Gmail message {} sent to {}", id, to);
                SendResult::sent(id)
            }
            Err(e) => {
                error!("Gmail send to {} failed: {:#}", to, e);
                SendResult::failed(format!("{:#}", e))
            }
        }
    }

    async fn test_connection(&self) -> bool {
        let token = match self.tokens.access_token().await {
            Ok(token) => token,
            Err(e) => {
                warn!("Gmail connection test has no token: {:#}", e);
                return false;
            }
        };

        match self
            .client
            .get(format!("{}/profile", GMAIL_API))
            .bearer_auth(token)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                warn!("Gmail connection test failed: {}", e);
                false
            }
        }
    }

    /// Gmail exposes no engagement data; only `sent` is populated.
    async fn get_sending_stats(&self, window_days: u32) -> Result<SendingStats> {
        let token = self.tokens.access_token().await?;
        let query = format!("in:sent newer_than:{}d", window_days.max(1));

        let response = self
            .client
            .get(format!("{}/messages", GMAIL_API))
            .bearer_auth(token)
            .query(&[("q", query.as_str()), ("maxResults", "1")])
            .send()
            .await
            .wrap_err("Gmail list request failed")?;

        if !response.status().is_success() {
            return Err(eyre!("Gmail API returned {}", response.status()));
        }

        let body: ListResponse = response.json().await?;
        Ok(SendingStats {
            sent: body.result_size_estimate,
            ..Default::default()
        })
    }
}

/// Encodes a header value as RFC 2047 when it is not plain ASCII.
fn encode_header(value: &str) -> String {
    if value.is_ascii() {
        value.to_string()
    } else {
        format!("=?UTF-8?B?{}?=", STANDARD.encode(value.as_bytes()))
    }
}

fn single_line<'a>(name: &str, value: &'a str) -> Result<&'a str> {
    if value.contains(['\r', '\n']) {
        return Err(eyre!("{} header must not contain line breaks", name));
    }
    Ok(value)
}

/// Builds an RFC 2822 message; multipart/alternative when a text body is given.
///
/// Header values with line breaks are rejected.
pub fn build_mime_message(
    sender: &SenderConfig,
    to: &str,
    subject: &str,
    html_content: &str,
    text_content: Option<&str>,
) -> Result<String> {
    let to = single_line("To", to)?;
    let subject = single_line("Subject", subject)?;
    let from_name = single_line("From", &sender.from_name)?;

    let mut message = format!(
        "From: {} <{}>\r\nTo: {}\r\nSubject: {}\r\nMIME-Version: 1.0\r\n",
        encode_header(from_name),
        sender.from_email,
        to,
        encode_header(subject)
    );

    match text_content {
        Some(text) => {
            let boundary = format!("bizagent-{}", Uuid::new_v4().simple());
            message.push_str(&format!(
                "Content-Type: multipart/alternative; boundary=\"{b}\"\r\n\r\n\
                 --{b}\r\nContent-Type: text/plain; charset=\"UTF-8\"\r\n\r\n{text}\r\n\
                 --{b}\r\nContent-Type: text/html; charset=\"UTF-8\"\r\n\r\n{html}\r\n\
                 --{b}--\r\n",
                b = boundary,
                text = text,
                html = html_content
            ));
        }
        None => {
            message.push_str("Content-Type: text/html; charset=\"UTF-8\"\r\n\r\n");
            message.push_str(html_content);
            message.push_str("\r\n");
        }
    }

    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sender() -> SenderConfig {
        SenderConfig {
            from_email: "outreach@bizagent.dev".to_string(),
            from_name: "Biz Agent".to_string(),
        }
    }

    #[test]
    fn test_html_only_message() {
        let message = build_mime_message(&sender(), "ceo@acme.io", "Hello", "<p>Hi</p>", None).unwrap();

        assert!(message.starts_with("From: Biz Agent <outreach@bizagent.dev>\r\n"));
        assert!(message.contains("To: ceo@acme.io\r\n"));
        assert!(message.contains("Subject: Hello\r\n"));
        assert!(message.contains("Content-Type: text/html; charset=\"UTF-8\"\r\n\r\n<p>Hi</p>"));
        assert!(!message.contains("multipart"));
    }

    #[test]
    fn test_multipart_message_has_both_parts() {
        let message =
            build_mime_message(&sender(), "ceo@acme.io", "Hello", "<p>Hi</p>", Some("Hi"))
                .unwrap();

        assert!(message.contains("multipart/alternative"));
        assert!(message.contains("text/plain"));
        assert!(message.contains("<p>Hi</p>"));
        assert!(message.trim_end().ends_with("--"));
    }

    #[test]
    fn test_non_ascii_subject_is_encoded() {
        let message = build_mime_message(&sender(), "ceo@acme.io", "Grüße", "<p>Hi</p>", None).unwrap();

        assert!(message.contains("Subject: =?UTF-8?B?"));
        assert!(!message.contains("Grüße"));
    }

    #[test]
    fn test_line_breaks_in_headers_are_rejected() {
        let subject = "Hello Acme\r\nBcc: spy@evil.io";
        assert!(build_mime_message(&sender(), "ceo@acme.io", subject, "<p>Hi</p>", None).is_err());

        let to = "ceo@acme.io\nBcc: spy@evil.io";
        assert!(build_mime_message(&sender(), to, "Hello", "<p>Hi</p>", None).is_err());

        let mut sender = sender();
        sender.from_name = "Biz\rAgent".to_string();
        assert!(build_mime_message(&sender, "ceo@acme.io", "Hello", "<p>Hi</p>", None).is_err());
    }

    #[test]
    fn test_list_response_defaults_estimate() {
        let body: ListResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(body.result_size_estimate, 0);
    }
}
