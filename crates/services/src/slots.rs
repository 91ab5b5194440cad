//! Bookable time-slot maintenance, mirrored to the external calendar when
//! one is connected.

use std::sync::Arc;

use bizagent_core::{
    errors::{BizError, BizResult},
    models::time_slot::{
        CalendarEvent, CleanSlotsSummary, ClearSlotsSummary, CreateSlotsSummary, TimeSlot,
    },
};
use bizagent_db::{models::NewTimeSlot, store::TimeSlotRepository};
use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc, Weekday};
use tracing::{info, warn};

use crate::calendar::CalendarApi;
use crate::config::CalendarConfig;

const SLOT_SUMMARY: &str = "Available: intro call";

pub struct SlotService {
    repo: Arc<dyn TimeSlotRepository>,
    calendar: Option<Arc<dyn CalendarApi>>,
    config: CalendarConfig,
}

impl SlotService {
    pub fn new(
        repo: Arc<dyn TimeSlotRepository>,
        calendar: Option<Arc<dyn CalendarApi>>,
        config: CalendarConfig,
    ) -> Self {
        Self {
            repo,
            calendar,
            config,
        }
    }

    fn calendar(&self) -> BizResult<&Arc<dyn CalendarApi>> {
        self.calendar
            .as_ref()
            .ok_or_else(|| BizError::External("Google Calendar is not connected".to_string()))
    }

    async fn pace(&self, index: usize) {
        if index > 0 && !self.config.pacing.is_zero() {
            tokio::time::sleep(self.config.pacing).await;
        }
    }

    pub async fn list_slots(&self) -> BizResult<Vec<TimeSlot>> {
        let rows = self.repo.list_time_slots().await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Removes every slot row, deleting mirrored events one at a time first.
    pub async fn clear_all_slots(&self) -> BizResult<ClearSlotsSummary> {
        let mut summary = ClearSlotsSummary::default();
        let slots = self.repo.list_time_slots().await?;

        if let Some(calendar) = &self.calendar {
            let event_ids = slots.iter().filter_map(|s| s.calendar_event_id.as_deref());
            for (index, event_id) in event_ids.enumerate() {
                self.pace(index).await;
                match calendar.delete_event(event_id).await {
                    Ok(()) => summary.events_deleted += 1,
                    Err(e) => {
                        warn!("Failed to delete calendar event {}: {:#}", event_id, e);
                        summary.event_failures += 1;
                    }
                }
            }
        }

        summary.slots_deleted = self.repo.delete_all_time_slots().await?;
        info!(
            "Cleared {} slots ({} events deleted, {} failures)",
            summary.slots_deleted, summary.events_deleted, summary.event_failures
        );
        Ok(summary)
    }

    /// Creates `count` slots starting tomorrow.
    pub async fn create_slots(&self, count: usize) -> BizResult<CreateSlotsSummary> {
        let mut summary = CreateSlotsSummary::default();

        for (index, (start, end)) in generate_slots(Utc::now(), count, &self.config)
            .into_iter()
            .enumerate()
        {
            let mut calendar_event_id = None;
            if let Some(calendar) = &self.calendar {
                self.pace(index).await;
                match calendar.create_event(SLOT_SUMMARY, start, end).await {
                    Ok(id) => {
                        summary.events_created += 1;
                        calendar_event_id = Some(id);
                    }
                    Err(e) => {
                        warn!("Failed to create calendar event for {}: {:#}", start, e);
                        summary.event_failures += 1;
                    }
                }
            }

            self.repo
                .create_time_slot(&NewTimeSlot {
                    start_time: start,
                    end_time: end,
                    calendar_event_id,
                })
                .await?;
            summary.slots_created += 1;
        }

        info!(
            "Created {} slots ({} calendar events)",
            summary.slots_created, summary.events_created
        );
        Ok(summary)
    }

    /// Clear, then create. A failure after clearing leaves the slots cleared.
    pub async fn create_clean_slots(&self, count: usize) -> BizResult<CleanSlotsSummary> {
        let cleared = self.clear_all_slots().await?;
        let created = self.create_slots(count).await?;
        Ok(CleanSlotsSummary { cleared, created })
    }

    pub async fn get_events(&self, days: i64) -> BizResult<Vec<CalendarEvent>> {
        if !(1..=365).contains(&days) {
            return Err(BizError::Validation(format!(
                "days must be between 1 and 365, got {}",
                days
            )));
        }

        let now = Utc::now();
        self.calendar()?
            .list_events(now, now + Duration::days(days))
            .await
            .map_err(|e| BizError::External(format!("{:#}", e)))
    }

    pub async fn delete_event(&self, event_id: &str) -> BizResult<()> {
        if event_id.trim().is_empty() {
            return Err(BizError::Validation("eventId is required".to_string()));
        }

        self.calendar()?
            .delete_event(event_id)
            .await
            .map_err(|e| BizError::External(format!("{:#}", e)))
    }
}

/// Lays out `count` back-to-back weekday slots inside business hours,
/// beginning on the day after `now`.
pub fn generate_slots(
    now: DateTime<Utc>,
    count: usize,
    config: &CalendarConfig,
) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
    let length = Duration::minutes(config.slot_minutes.max(1));
    let (Some(open), Some(close)) = (
        NaiveTime::from_hms_opt(config.day_start_hour, 0, 0),
        NaiveTime::from_hms_opt(config.day_end_hour, 0, 0),
    ) else {
        return Vec::new();
    };

    let mut slots = Vec::with_capacity(count);
    if open + length > close {
        return slots;
    }

    let mut day = now.date_naive() + Duration::days(1);
    while slots.len() < count {
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            let mut start = day.and_time(open).and_utc();
            let day_close = day.and_time(close).and_utc();
            while slots.len() < count && start + length <= day_close {
                slots.push((start, start + length));
                start += length;
            }
        }
        day += Duration::days(1);
    }

    slots
}
