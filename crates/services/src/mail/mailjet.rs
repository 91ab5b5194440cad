use std::time::Duration;

use async_trait::async_trait;
use bizagent_core::models::email::{SendResult, SendingStats};
use chrono::Utc;
use eyre::{eyre, Result, WrapErr};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info, warn};

use super::MailTransport;
use crate::config::{MailjetConfig, SenderConfig};

const MAILJET_API: &str = "https://api.mailjet.com";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SendResponse {
    messages: Vec<MessageResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct MessageResult {
    status: String,
    #[serde(default)]
    to: Vec<Recipient>,
    #[serde(default)]
    errors: Vec<MessageError>,
}

#[derive(Debug, Deserialize)]
struct Recipient {
    #[serde(rename = "MessageID")]
    message_id: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct MessageError {
    error_message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StatCountersResponse {
    #[serde(default)]
    data: Vec<StatCounter>,
}

/// One row of Mailjet's `statcounters` resource.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct StatCounter {
    pub message_sent_count: u64,
    pub message_delivered_count: u64,
    pub message_opened_count: u64,
    pub message_clicked_count: u64,
    pub message_hard_bounced_count: u64,
    pub message_soft_bounced_count: u64,
}

pub fn sum_stat_counters(counters: &[StatCounter]) -> SendingStats {
    counters.iter().fold(SendingStats::default(), |mut acc, c| {
        acc.sent += c.message_sent_count;
        acc.delivered += c.message_delivered_count;
        acc.opened += c.message_opened_count;
        acc.clicked += c.message_clicked_count;
        acc.bounced += c.message_hard_bounced_count + c.message_soft_bounced_count;
        acc
    })
}

pub struct MailjetTransport {
    client: Client,
    config: MailjetConfig,
    sender: SenderConfig,
}

impl MailjetTransport {
    pub fn new(config: MailjetConfig, sender: SenderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .wrap_err("Failed to build Mailjet HTTP client")?;

        Ok(Self {
            client,
            config,
            sender,
        })
    }

    fn payload(
        &self,
        to: &str,
        subject: &str,
        html_content: &str,
        text_content: Option<&str>,
    ) -> Value {
        let mut message = json!({
            "From": { "Email": self.sender.from_email, "Name": self.sender.from_name },
            "To": [{ "Email": to }],
            "Subject": subject,
            "HTMLPart": html_content,
        });
        if let Some(text) = text_content {
            message["TextPart"] = json!(text);
        }
        json!({ "Messages": [message] })
    }

    async fn try_send(
        &self,
        to: &str,
        subject: &str,
        html_content: &str,
        text_content: Option<&str>,
    ) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/v3.1/send", MAILJET_API))
            .basic_auth(&self.config.api_key, Some(&self.config.secret_key))
            .json(&self.payload(to, subject, html_content, text_content))
            .send()
            .await
            .wrap_err("Mailjet send request failed")?;

        let status = response.status();
        let body: SendResponse = response
            .json()
            .await
            .wrap_err_with(|| format!("Invalid Mailjet response ({})", status))?;

        parse_send_response(body)
    }
}

fn parse_send_response(body: SendResponse) -> Result<String> {
    let message = body
        .messages
        .into_iter()
        .next()
        .ok_or_else(|| eyre!("Mailjet returned no message result"))?;

    if message.status != "success" {
        let reason = message
            .errors
            .into_iter()
            .map(|e| e.error_message)
            .collect::<Vec<_>>()
            .join("; ");
        return Err(eyre!("Mailjet rejected message: {}", reason));
    }

    let id = message
        .to
        .into_iter()
        .next()
        .map(|r| match r.message_id {
            Value::String(s) => s,
            other => other.to_string(),
        })
        .ok_or_else(|| eyre!("Mailjet response has no message id"))?;
    Ok(id)
}

#[async_trait]
impl MailTransport for MailjetTransport {
    fn name(&self) -> &'static str {
        "mailjet"
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
                info!("Mailjet message {} sent to {}", id, to);
                SendResult::sent(id)
            }
            Err(e) => {
                error!("Mailjet send to {} failed: {:#}", to, e);
                SendResult::failed(format!("{:#}", e))
            }
        }
    }

    async fn test_connection(&self) -> bool {
        match self
            .client
            .get(format!("{}/v3/REST/user", MAILJET_API))
            .basic_auth(&self.config.api_key, Some(&self.config.secret_key))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                warn!("Mailjet connection test failed: {}", e);
                false
            }
        }
    }

    async fn get_sending_stats(&self, window_days: u32) -> Result<SendingStats> {
        let to_ts = Utc::now().timestamp();
        let from_ts = to_ts - i64::from(window_days.max(1)) * 86_400;

        let response = self
            .client
            .get(format!("{}/v3/REST/statcounters", MAILJET_API))
            .basic_auth(&self.config.api_key, Some(&self.config.secret_key))
            .query(&[
                ("CounterSource", "APIKey".to_string()),
                ("CounterTiming", "Message".to_string()),
                ("CounterResolution", "Day".to_string()),
                ("FromTS", from_ts.to_string()),
                ("ToTS", to_ts.to_string()),
            ])
            .send()
            .await
            .wrap_err("Mailjet statcounters request failed")?;

        if !response.status().is_success() {
            return Err(eyre!("Mailjet API returned {}", response.status()));
        }

        let body: StatCountersResponse = response.json().await?;
        Ok(sum_stat_counters(&body.data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn transport() -> MailjetTransport {
        MailjetTransport::new(
            MailjetConfig {
                api_key: "key".to_string(),
                secret_key: "secret".to_string(),
            },
            SenderConfig {
                from_email: "outreach@bizagent.dev".to_string(),
                from_name: "Biz Agent".to_string(),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_payload_shape() {
        let payload = transport().payload("ceo@acme.io", "Hello", "<p>Hi</p>", Some("Hi"));

        assert_eq!(payload["Messages"][0]["To"][0]["Email"], "ceo@acme.io");
        assert_eq!(payload["Messages"][0]["From"]["Name"], "Biz Agent");
        assert_eq!(payload["Messages"][0]["TextPart"], "Hi");
    }

    #[test]
    fn test_payload_without_text_part() {
        let payload = transport().payload("ceo@acme.io", "Hello", "<p>Hi</p>", None);
        assert!(payload["Messages"][0].get("TextPart").is_none());
    }

    #[test]
    fn test_parse_success_response() {
        let body: SendResponse = serde_json::from_value(json!({
            "Messages": [{
                "Status": "success",
                "To": [{ "Email": "ceo@acme.io", "MessageUUID": "abc", "MessageID": 288230376151711744u64 }]
            }]
        }))
        .unwrap();

        assert_eq!(parse_send_response(body).unwrap(), "288230376151711744");
    }

    #[test]
    fn test_parse_error_response() {
        let body: SendResponse = serde_json::from_value(json!({
            "Messages": [{
                "Status": "error",
                "Errors": [{ "ErrorMessage": "Invalid email" }]
            }]
        }))
        .unwrap();

        let err = parse_send_response(body).unwrap_err();
        assert!(err.to_string().contains("Invalid email"));
    }

    #[test]
    fn test_sum_stat_counters() {
        let counters = vec![
            StatCounter {
                message_sent_count: 10,
                message_delivered_count: 9,
                message_opened_count: 4,
                message_clicked_count: 1,
                message_hard_bounced_count: 1,
                message_soft_bounced_count: 0,
            },
            StatCounter {
                message_sent_count: 5,
                message_delivered_count: 4,
                message_soft_bounced_count: 1,
                ..Default::default()
            },
        ];

        assert_eq!(
            sum_stat_counters(&counters),
            SendingStats {
                sent: 15,
                delivered: 13,
                opened: 4,
                clicked: 1,
                bounced: 2,
            }
        );
    }
}
