use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bizagent_core::models::time_slot::CalendarEvent;
use chrono::{DateTime, NaiveDate, Utc};
use eyre::{eyre, Result, WrapErr};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::oauth::AccessTokenSource;

const CALENDAR_API: &str = "https://www.googleapis.com/calendar/v3";

/// The slice of Google Calendar the slot maintenance needs.
#[async_trait]
pub trait CalendarApi: Send + Sync {
    async fn list_events(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>>;

    /// Returns the id of the created event.
    async fn create_event(
        &self,
        summary: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<String>;

    async fn delete_event(&self, event_id: &str) -> Result<()>;
}

#[derive(Debug, Deserialize)]
struct EventList {
    #[serde(default)]
    items: Vec<EventItem>,
}

#[derive(Debug, Deserialize)]
struct EventItem {
    id: String,
    summary: Option<String>,
    start: Option<EventTime>,
    end: Option<EventTime>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventTime {
    date_time: Option<DateTime<Utc>>,
    date: Option<NaiveDate>,
}

impl EventTime {
    fn to_utc(&self) -> Option<DateTime<Utc>> {
        self.date_time.or_else(|| {
            self.date
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc())
        })
    }
}

impl From<EventItem> for CalendarEvent {
    fn from(item: EventItem) -> Self {
        CalendarEvent {
            start: item.start.as_ref().and_then(EventTime::to_utc),
            end: item.end.as_ref().and_then(EventTime::to_utc),
            id: item.id,
            summary: item.summary,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CreatedEvent {
    id: String,
}

pub struct GoogleCalendarClient {
    client: Client,
    calendar_id: String,
    tokens: Arc<dyn AccessTokenSource>,
}

impl GoogleCalendarClient {
    pub fn new(calendar_id: impl Into<String>, tokens: Arc<dyn AccessTokenSource>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(20))
            .build()
            .wrap_err("Failed to build Calendar HTTP client")?;

        Ok(Self {
            client,
            calendar_id: calendar_id.into(),
            tokens,
        })
    }

    fn events_url(&self) -> String {
        format!(
            "{}/calendars/{}/events",
            CALENDAR_API,
            urlencoding::encode(&self.calendar_id)
        )
    }
}

#[async_trait]
impl CalendarApi for GoogleCalendarClient {
    async fn list_events(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>> {
        let token = self.tokens.access_token().await?;
        let response = self
            .client
            .get(self.events_url())
            .bearer_auth(token)
            .query(&[
                ("timeMin", time_min.to_rfc3339()),
                ("timeMax", time_max.to_rfc3339()),
                ("singleEvents", "true".to_string()),
                ("orderBy", "startTime".to_string()),
                ("maxResults", "2500".to_string()),
            ])
            .send()
            .await
            .wrap_err("Calendar list request failed")?;

        if !response.status().is_success() {
            return Err(eyre!("Calendar API returned {}", response.status()));
        }

        let list: EventList = response.json().await.wrap_err("Invalid event list")?;
        Ok(list.items.into_iter().map(Into::into).collect())
    }

    async fn create_event(
        &self,
        summary: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<String> {
        let token = self.tokens.access_token().await?;
        let response = self
            .client
            .post(self.events_url())
            .bearer_auth(token)
            .json(&json!({
                "summary": summary,
                "start": { "dateTime": start.to_rfc3339(), "timeZone": "UTC" },
                "end": { "dateTime": end.to_rfc3339(), "timeZone": "UTC" },
                "transparency": "transparent",
            }))
            .send()
            .await
            .wrap_err("Calendar create request failed")?;

        if !response.status().is_success() {
            return Err(eyre!("Calendar API returned {}", response.status()));
        }

        let created: CreatedEvent = response.json().await?;
        debug!("Created calendar event {}", created.id);
        Ok(created.id)
    }

    async fn delete_event(&self, event_id: &str) -> Result<()> {
        let token = self.tokens.access_token().await?;
        let response = self
            .client
            .delete(format!("{}/{}", self.events_url(), urlencoding::encode(event_id)))
            .bearer_auth(token)
            .send()
            .await
            .wrap_err("Calendar delete request failed")?;

        match response.status() {
            status if status.is_success() => Ok(()),
            // Already removed on the calendar side.
            StatusCode::GONE => Ok(()),
            status => Err(eyre!("Calendar API returned {} for {}", status, event_id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_event_list_parsing() {
        let list: EventList = serde_json::from_value(json!({
            "items": [
                {
                    "id": "evt1",
                    "summary": "Available slot",
                    "start": { "dateTime": "2026-03-02T09:00:00Z" },
                    "end": { "dateTime": "2026-03-02T09:30:00Z" }
                },
                {
                    "id": "evt2",
                    "start": { "date": "2026-03-03" },
                    "end": { "date": "2026-03-04" }
                }
            ]
        }))
        .unwrap();

        let events: Vec<CalendarEvent> = list.items.into_iter().map(Into::into).collect();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].summary.as_deref(), Some("Available slot"));
        assert_eq!(
            events[0].start.unwrap().to_rfc3339(),
            "2026-03-02T09:00:00+00:00"
        );
        assert_eq!(events[1].summary, None);
        assert_eq!(
            events[1].start.unwrap().to_rfc3339(),
            "2026-03-03T00:00:00+00:00"
        );
    }

    #[test]
    fn test_empty_event_list() {
        let list: EventList = serde_json::from_str("{}").unwrap();
        assert!(list.items.is_empty());
    }
}
