//! # Campaign Service
//!
//! Read access to campaigns and their recipients, aggregate statistics, and
//! the sending workflow that walks every ACTIVE campaign and emails the
//! recipients that have not been attempted yet.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use bizagent_core::{
    errors::{BizError, BizResult},
    models::campaign::{
        Campaign, CampaignDetail, CampaignRecipient, CampaignRunSummary, CampaignStats,
        CampaignStatus, DeliveryEvent, RunSummary,
    },
};
use bizagent_db::{
    models::{DbCampaignCompany, DbCompany, DbEmailTemplate},
    store::{CampaignRepository, CompanyRepository, TemplateRepository},
};
use regex::{Captures, Regex};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::CampaignConfig;
use crate::cron::CronJob;
use crate::mail::MailTransport;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").expect("Failed to compile placeholder regex")
});

/// Fills `{{company_name}}`, `{{contact_name}}`, `{{website}}` and
/// `{{industry}}`. Unknown or unset placeholders render empty.
pub fn render_template(template: &str, company: &DbCompany) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            let value = match &caps[1] {
                "company_name" => Some(company.name.as_str()),
                "contact_name" => company.contact_person.as_deref(),
                "website" => company.website.as_deref(),
                "industry" => company.industry.as_deref(),
                _ => None,
            };
            value.unwrap_or_default().to_string()
        })
        .into_owned()
}

fn ratio(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

/// Delivery is measured against sent mail, opens and clicks against delivered mail.
pub fn aggregate_stats(rows: &[DbCampaignCompany]) -> CampaignStats {
    let count = |pred: fn(&DbCampaignCompany) -> bool| rows.iter().filter(|r| pred(r)).count() as u64;

    let sent = count(|r| r.sent);
    let delivered = count(|r| r.delivered);
    let opened = count(|r| r.opened);
    let clicked = count(|r| r.clicked);

    CampaignStats {
        total_recipients: rows.len() as u64,
        sent,
        delivered,
        opened,
        clicked,
        bounced: count(|r| r.bounced),
        failed: count(|r| !r.sent && r.error.is_some()),
        delivery_rate: ratio(delivered, sent),
        open_rate: ratio(opened, delivered),
        click_rate: ratio(clicked, delivered),
    }
}

fn is_attempted(row: &DbCampaignCompany) -> bool {
    row.sent || row.error.is_some()
}

pub struct CampaignService {
    campaigns: Arc<dyn CampaignRepository>,
    companies: Arc<dyn CompanyRepository>,
    templates: Arc<dyn TemplateRepository>,
    transport: Arc<dyn MailTransport>,
    config: CampaignConfig,
    run_lock: Mutex<()>,
}

impl CampaignService {
    pub fn new(
        campaigns: Arc<dyn CampaignRepository>,
        companies: Arc<dyn CompanyRepository>,
        templates: Arc<dyn TemplateRepository>,
        transport: Arc<dyn MailTransport>,
        config: CampaignConfig,
    ) -> Self {
        Self {
            campaigns,
            companies,
            templates,
            transport,
            config,
            run_lock: Mutex::new(()),
        }
    }

    pub async fn get_campaigns(&self, status: Option<CampaignStatus>) -> BizResult<Vec<Campaign>> {
        let rows = self.campaigns.get_campaigns(status).await?;
        let campaigns = rows
            .into_iter()
            .map(Campaign::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(campaigns)
    }

    async fn find_campaign(&self, id: Uuid) -> BizResult<Campaign> {
        let row = self
            .campaigns
            .get_campaign_by_id(id)
            .await?
            .ok_or_else(|| BizError::NotFound(format!("Campaign {} not found", id)))?;
        Ok(Campaign::try_from(row)?)
    }

    pub async fn get_campaign_by_id(&self, id: Uuid) -> BizResult<CampaignDetail> {
        let campaign = self.find_campaign(id).await?;
        let template = self
            .templates
            .get_template_by_id(campaign.template_id)
            .await?
            .map(Into::into);

        let mut recipients = Vec::new();
        for row in self.campaigns.get_campaign_companies(id).await? {
            let Some(company) = self.companies.get_company_by_id(row.company_id).await? else {
                warn!("Recipient {} references missing company {}", row.id, row.company_id);
                continue;
            };
            recipients.push(CampaignRecipient {
                id: row.id,
                company: company.into(),
                sent: row.sent,
                sent_at: row.sent_at,
                message_id: row.message_id,
                error: row.error,
                delivered: row.delivered,
                opened: row.opened,
                clicked: row.clicked,
                bounced: row.bounced,
            });
        }

        Ok(CampaignDetail {
            campaign,
            template,
            recipients,
        })
    }

    pub async fn get_campaign_stats(&self, id: Uuid) -> BizResult<CampaignStats> {
        self.find_campaign(id).await?;
        let rows = self.campaigns.get_campaign_companies(id).await?;
        Ok(aggregate_stats(&rows))
    }

    /// Applies a provider delivery event. Returns false when no recipient
    /// carries `message_id`.
    pub async fn record_event(&self, message_id: &str, event: DeliveryEvent) -> BizResult<bool> {
        if message_id.trim().is_empty() {
            return Err(BizError::Validation("message id is required".to_string()));
        }

        let updated = self.campaigns.record_event(message_id, event).await?;
        if updated.is_none() {
            debug!("No recipient matches message {}", message_id);
        }
        Ok(updated.is_some())
    }

    /// One pass of the sending workflow over every ACTIVE campaign.
    ///
    /// Only one pass runs at a time; a second caller gets `Conflict`.
    pub async fn run_active_campaigns(&self) -> BizResult<RunSummary> {
        let Ok(_running) = self.run_lock.try_lock() else {
            return Err(BizError::Conflict(
                "A campaign run is already in progress".to_string(),
            ));
        };

        let mut summary = RunSummary::default();
        let mut budget = self.config.max_per_run;

        for campaign in self.get_campaigns(Some(CampaignStatus::Active)).await? {
            let template = self.templates.get_template_by_id(campaign.template_id).await?;
            let Some(template) = template else {
                warn!(
                    "Campaign {} skipped: template {} is missing",
                    campaign.id, campaign.template_id
                );
                continue;
            };

            let run = self
                .run_campaign(&campaign, &template, &mut budget, &mut summary.limit_reached)
                .await?;
            summary.total_sent += run.sent;
            summary.total_failed += run.failed;
            summary.campaigns.push(run);
        }

        info!(
            "Campaign run finished: {} sent, {} failed across {} campaigns",
            summary.total_sent,
            summary.total_failed,
            summary.campaigns.len()
        );
        Ok(summary)
    }

    /// Sends to the pending recipients of one campaign. `limit_reached` is
    /// set when a pending recipient was left for a later run.
    async fn run_campaign(
        &self,
        campaign: &Campaign,
        template: &DbEmailTemplate,
        budget: &mut usize,
        limit_reached: &mut bool,
    ) -> BizResult<CampaignRunSummary> {
        let mut run = CampaignRunSummary {
            campaign_id: campaign.id,
            attempted: 0,
            sent: 0,
            failed: 0,
            skipped: 0,
            completed: false,
        };

        let pending: Vec<_> = self
            .campaigns
            .get_campaign_companies(campaign.id)
            .await?
            .into_iter()
            .filter(|r| !is_attempted(r))
            .collect();

        for recipient in pending {
            if *budget == 0 {
                *limit_reached = true;
                break;
            }

            let company = self.companies.get_company_by_id(recipient.company_id).await?;
            let target = company.as_ref().and_then(|c| {
                c.email
                    .as_deref()
                    .filter(|e| !e.trim().is_empty())
                    .map(|email| (c, email))
            });
            let Some((company, email)) = target else {
                self.campaigns
                    .mark_failed(recipient.id, "Company has no email address")
                    .await?;
                run.skipped += 1;
                continue;
            };

            if run.attempted > 0 && !self.config.send_delay.is_zero() {
                tokio::time::sleep(self.config.send_delay).await;
            }

            let subject = render_template(&template.subject, company);
            let html = render_template(&template.html_content, company);
            let text = template
                .text_content
                .as_deref()
                .map(|t| render_template(t, company));

            let result = self
                .transport
                .send_email(email, &subject, &html, text.as_deref())
                .await;
            run.attempted += 1;
            *budget -= 1;

            if result.success {
                run.sent += 1;
                self.record_sent(recipient.id, result.message_id).await;
            } else {
                let error = result.error.unwrap_or_else(|| "Unknown send failure".to_string());
                warn!("Send to {} for campaign {} failed: {}", email, campaign.id, error);
                self.campaigns.mark_failed(recipient.id, &error).await?;
                run.failed += 1;
            }
        }

        let rows = self.campaigns.get_campaign_companies(campaign.id).await?;
        if !rows.is_empty() && rows.iter().all(is_attempted) {
            self.campaigns
                .update_campaign_status(campaign.id, CampaignStatus::Completed)
                .await?;
            run.completed = true;
            info!("Campaign {} completed", campaign.id);
        }

        Ok(run)
    }

    /// Stores the outcome of a delivered message. The mail is already out,
    /// so a storage failure must not end the run or leave the row pending.
    async fn record_sent(&self, recipient_id: Uuid, message_id: Option<String>) {
        let Err(e) = self
            .campaigns
            .mark_sent(recipient_id, message_id.clone())
            .await
        else {
            return;
        };

        error!("Failed to mark recipient {} as sent: {:#}", recipient_id, e);
        let note = format!(
            "Sent as {} but the send could not be recorded",
            message_id.as_deref().unwrap_or("unknown message")
        );
        if let Err(e) = self.campaigns.mark_failed(recipient_id, &note).await {
            error!("Recipient {} may be sent again: {:#}", recipient_id, e);
        }
    }
}

#[async_trait]
impl CronJob for CampaignService {
    fn name(&self) -> &'static str {
        "campaign-sender"
    }

    async fn run(&self) -> eyre::Result<()> {
        self.run_active_campaigns()
            .await
            .map(|_| ())
            .map_err(eyre::Report::new)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use bizagent_core::models::{
        campaign::NewCampaign, company::NewCompany, email::{SendResult, SendingStats},
        template::NewEmailTemplate,
    };
    use bizagent_db::mock::memory::MemoryStore;
    use bizagent_db::models::DbCampaign;
    use bizagent_db::mock::repositories::MockCampaignRepo;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    /// Records every message and fails for listed addresses.
    #[derive(Default)]
    struct RecordingTransport {
        sent: Mutex<Vec<(String, String, String)>>,
        reject: Vec<String>,
        delay: std::time::Duration,
    }

    #[async_trait]
    impl MailTransport for RecordingTransport {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn send_email(
            &self,
            to: &str,
            subject: &str,
            html_content: &str,
            _text_content: Option<&str>,
        ) -> SendResult {
            if self.reject.iter().any(|r| r == to) {
                return SendResult::failed("mailbox unavailable");
            }
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            let mut sent = self.sent.lock().unwrap();
            sent.push((to.to_string(), subject.to_string(), html_content.to_string()));
            SendResult::sent(format!("msg-{}", sent.len()))
        }

        async fn test_connection(&self) -> bool {
            true
        }

        async fn get_sending_stats(&self, _window_days: u32) -> eyre::Result<SendingStats> {
            Ok(SendingStats::default())
        }
    }

    fn company_row(name: &str, contact: Option<&str>) -> DbCompany {
        DbCompany {
            id: Uuid::new_v4(),
            name: name.to_string(),
            website: Some("https://acme.io".to_string()),
            email: Some("hello@acme.io".to_string()),
            phone: None,
            address: None,
            contact_person: contact.map(str::to_string),
            industry: None,
            size: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn recipient(sent: bool, delivered: bool, opened: bool, error: Option<&str>) -> DbCampaignCompany {
        DbCampaignCompany {
            id: Uuid::new_v4(),
            campaign_id: Uuid::nil(),
            company_id: Uuid::new_v4(),
            sent,
            sent_at: None,
            message_id: None,
            error: error.map(str::to_string),
            delivered,
            opened,
            clicked: false,
            bounced: false,
            created_at: Utc::now(),
        }
    }

    struct Fixture {
        store: Arc<MemoryStore>,
        campaign_id: Uuid,
    }

    async fn fixture(emails: &[Option<&str>]) -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let template = store
            .create_template(&NewEmailTemplate {
                name: "Intro".to_string(),
                category: "outreach".to_string(),
                subject: "Hello {{company_name}}".to_string(),
                html_content: "<p>Hi {{contact_name}}, we like {{website}}{{unknown}}</p>"
                    .to_string(),
                text_content: None,
            })
            .await
            .unwrap();
        let campaign = store
            .create_campaign(&NewCampaign {
                name: "Spring outreach".to_string(),
                description: None,
                template_id: template.id,
            })
            .await
            .unwrap();

        for (i, email) in emails.iter().enumerate() {
            let company = store
                .create_company(&NewCompany {
                    name: format!("Company {}", i),
                    website: Some(format!("https://c{}.io", i)),
                    email: email.map(str::to_string),
                    contact_person: Some("Jane".to_string()),
                    ..Default::default()
                })
                .await
                .unwrap();
            store.add_company(campaign.id, company.id).await.unwrap();
        }

        Fixture {
            store,
            campaign_id: campaign.id,
        }
    }

    fn service(store: &Arc<MemoryStore>, transport: Arc<dyn MailTransport>, max: usize) -> CampaignService {
        CampaignService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            transport,
            CampaignConfig {
                send_delay: std::time::Duration::ZERO,
                max_per_run: max,
            },
        )
    }

    #[test]
    fn test_render_template() {
        let company = company_row("Acme", Some("Jane Doe"));

        assert_eq!(
            render_template(
                "Hi {{ contact_name }} at {{company_name}} ({{industry}}){{nope}}",
                &company
            ),
            "Hi Jane Doe at Acme ()"
        );
    }

    #[test]
    fn test_aggregate_stats_counts_rows() {
        let rows = vec![
            recipient(true, true, true, None),
            recipient(true, true, false, None),
            recipient(true, false, false, None),
            recipient(false, false, false, Some("bounced")),
            recipient(false, false, false, None),
        ];

        let stats = aggregate_stats(&rows);

        assert_eq!(stats.total_recipients, rows.len() as u64);
        assert_eq!(stats.sent, 3);
        assert_eq!(stats.delivered, 2);
        assert_eq!(stats.opened, 1);
        assert_eq!(stats.failed, 1);
        assert!(stats.sent + stats.failed <= stats.total_recipients);
        assert!((stats.delivery_rate - 2.0 / 3.0).abs() < 1e-9);
        assert!((stats.open_rate - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_aggregate_stats_empty() {
        assert_eq!(aggregate_stats(&[]), CampaignStats::default());
    }

    #[tokio::test]
    async fn test_run_sends_to_active_campaigns_and_completes() {
        let f = fixture(&[Some("a@c0.io"), Some("b@c1.io"), None]).await;
        f.store
            .update_campaign_status(f.campaign_id, CampaignStatus::Active)
            .await
            .unwrap();
        let transport = Arc::new(RecordingTransport::default());
        let campaigns = service(&f.store, transport.clone(), 50);

        let summary = campaigns.run_active_campaigns().await.unwrap();

        assert_eq!(summary.total_sent, 2);
        assert_eq!(summary.campaigns[0].skipped, 1);
        assert!(summary.campaigns[0].completed);

        let sent = transport.sent.lock().unwrap().clone();
        assert_eq!(sent[0].1, "Hello Company 0");
        assert_eq!(sent[0].2, "<p>Hi Jane, we like https://c0.io</p>");

        let detail = campaigns.get_campaign_by_id(f.campaign_id).await.unwrap();
        assert_eq!(detail.campaign.status, CampaignStatus::Completed);
        assert_eq!(detail.recipients.len(), 3);

        let stats = campaigns.get_campaign_stats(f.campaign_id).await.unwrap();
        assert_eq!(stats.total_recipients, 3);
        assert_eq!(stats.sent, 2);
        assert_eq!(stats.failed, 1);
    }

    #[tokio::test]
    async fn test_run_respects_limit_and_ignores_drafts() {
        let f = fixture(&[Some("a@c0.io"), Some("b@c1.io"), Some("c@c2.io")]).await;
        let transport = Arc::new(RecordingTransport::default());
        let campaigns = service(&f.store, transport.clone(), 2);

        let summary = campaigns.run_active_campaigns().await.unwrap();
        assert!(summary.campaigns.is_empty());

        f.store
            .update_campaign_status(f.campaign_id, CampaignStatus::Active)
            .await
            .unwrap();
        let summary = campaigns.run_active_campaigns().await.unwrap();

        assert_eq!(summary.total_sent, 2);
        assert!(summary.limit_reached);
        assert!(!summary.campaigns[0].completed);

        let summary = campaigns.run_active_campaigns().await.unwrap();
        assert_eq!(summary.total_sent, 1);
        assert!(!summary.limit_reached);
        assert!(summary.campaigns[0].completed);
    }

    #[tokio::test]
    async fn test_budget_used_up_exactly_is_not_a_limit() {
        let f = fixture(&[Some("a@c0.io"), Some("b@c1.io")]).await;
        f.store
            .update_campaign_status(f.campaign_id, CampaignStatus::Active)
            .await
            .unwrap();
        let campaigns = service(&f.store, Arc::new(RecordingTransport::default()), 2);

        let summary = campaigns.run_active_campaigns().await.unwrap();

        assert_eq!(summary.total_sent, 2);
        assert!(!summary.limit_reached);
        assert!(summary.campaigns[0].completed);
    }

    #[tokio::test]
    async fn test_overlapping_runs_send_each_recipient_once() {
        let f = fixture(&[Some("a@c0.io"), Some("b@c1.io")]).await;
        f.store
            .update_campaign_status(f.campaign_id, CampaignStatus::Active)
            .await
            .unwrap();
        let transport = Arc::new(RecordingTransport {
            delay: std::time::Duration::from_millis(20),
            ..Default::default()
        });
        let campaigns = service(&f.store, transport.clone(), 50);

        let (first, second) = tokio::join!(
            campaigns.run_active_campaigns(),
            campaigns.run_active_campaigns()
        );

        let (finished, rejected) = if first.is_ok() { (first, second) } else { (second, first) };
        assert_eq!(finished.unwrap().total_sent, 2);
        assert!(matches!(rejected, Err(BizError::Conflict(_))));

        let recipients: Vec<String> = transport
            .sent
            .lock()
            .unwrap()
            .iter()
            .map(|(to, _, _)| to.clone())
            .collect();
        assert_eq!(recipients, vec!["a@c0.io", "b@c1.io"]);

        let summary = campaigns.run_active_campaigns().await.unwrap();
        assert_eq!(summary.total_sent, 0);
    }

    #[tokio::test]
    async fn test_unrecorded_send_does_not_abort_run() {
        let store = Arc::new(MemoryStore::new());
        let template = store
            .create_template(&NewEmailTemplate {
                name: "Intro".to_string(),
                category: "outreach".to_string(),
                subject: "Hello".to_string(),
                html_content: "<p>Hi</p>".to_string(),
                text_content: None,
            })
            .await
            .unwrap();

        let mut rows = Vec::new();
        for email in ["a@c0.io", "b@c1.io"] {
            let company = store
                .create_company(&NewCompany {
                    name: email.to_string(),
                    email: Some(email.to_string()),
                    ..Default::default()
                })
                .await
                .unwrap();
            rows.push(DbCampaignCompany {
                company_id: company.id,
                ..recipient(false, false, false, None)
            });
        }

        let campaign = DbCampaign {
            id: Uuid::new_v4(),
            name: "Spring outreach".to_string(),
            description: None,
            status: CampaignStatus::Active.to_string(),
            template_id: template.id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let mut repo = MockCampaignRepo::new();
        repo.expect_get_campaigns()
            .returning(move |_| Ok(vec![campaign.clone()]));
        repo.expect_get_campaign_companies()
            .returning(move |_| Ok(rows.clone()));
        repo.expect_mark_sent().times(2).returning(|id, message_id| {
            if message_id.as_deref() == Some("msg-1") {
                return Err(eyre::eyre!("connection reset"));
            }
            Ok(DbCampaignCompany {
                id,
                message_id,
                ..recipient(true, false, false, None)
            })
        });
        repo.expect_mark_failed().times(1).returning(|id, error| {
            assert!(error.contains("msg-1"));
            Ok(DbCampaignCompany {
                id,
                ..recipient(false, false, false, Some(error))
            })
        });

        let transport = Arc::new(RecordingTransport::default());
        let campaigns = CampaignService::new(
            Arc::new(repo),
            store.clone(),
            store,
            transport.clone(),
            CampaignConfig {
                send_delay: std::time::Duration::ZERO,
                max_per_run: 50,
            },
        );

        let summary = campaigns.run_active_campaigns().await.unwrap();

        assert_eq!(summary.total_sent, 2);
        assert_eq!(transport.sent.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_send_is_recorded() {
        let f = fixture(&[Some("a@c0.io"), Some("b@c1.io")]).await;
        f.store
            .update_campaign_status(f.campaign_id, CampaignStatus::Active)
            .await
            .unwrap();
        let transport = Arc::new(RecordingTransport {
            reject: vec!["b@c1.io".to_string()],
            ..Default::default()
        });
        let campaigns = service(&f.store, transport, 50);

        let summary = campaigns.run_active_campaigns().await.unwrap();
        assert_eq!(summary.total_sent, 1);
        assert_eq!(summary.total_failed, 1);

        let detail = campaigns.get_campaign_by_id(f.campaign_id).await.unwrap();
        let failed = detail.recipients.iter().find(|r| !r.sent).unwrap();
        assert_eq!(failed.error.as_deref(), Some("mailbox unavailable"));
    }

    #[rstest]
    #[case("open", DeliveryEvent::Opened)]
    #[case("bounce", DeliveryEvent::Bounced)]
    #[tokio::test]
    async fn test_record_event_updates_recipient(#[case] name: &str, #[case] event: DeliveryEvent) {
        let f = fixture(&[Some("a@c0.io")]).await;
        f.store
            .update_campaign_status(f.campaign_id, CampaignStatus::Active)
            .await
            .unwrap();
        let campaigns = service(&f.store, Arc::new(RecordingTransport::default()), 50);
        campaigns.run_active_campaigns().await.unwrap();

        assert_eq!(name.parse::<DeliveryEvent>().unwrap(), event);
        assert!(campaigns.record_event("msg-1", event).await.unwrap());
        assert!(!campaigns.record_event("msg-404", event).await.unwrap());

        let stats = campaigns.get_campaign_stats(f.campaign_id).await.unwrap();
        assert_eq!(stats.opened + stats.bounced, 1);
    }

    #[tokio::test]
    async fn test_cron_run_keeps_typed_error() {
        let mut repo = MockCampaignRepo::new();
        repo.expect_get_campaigns()
            .returning(|_| Err(eyre::eyre!("pool timed out")));
        let store = Arc::new(MemoryStore::new());
        let campaigns = CampaignService::new(
            Arc::new(repo),
            store.clone(),
            store,
            Arc::new(RecordingTransport::default()),
            CampaignConfig::default(),
        );

        let report = CronJob::run(&campaigns).await.unwrap_err();

        assert!(matches!(
            report.downcast_ref::<BizError>(),
            Some(BizError::Database(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_campaign_is_not_found() {
        let mut repo = MockCampaignRepo::new();
        repo.expect_get_campaign_by_id().returning(|_| Ok(None));
        let store = Arc::new(MemoryStore::new());

        let campaigns = CampaignService::new(
            Arc::new(repo),
            store.clone(),
            store,
            Arc::new(RecordingTransport::default()),
            CampaignConfig::default(),
        );

        assert!(matches!(
            campaigns.get_campaign_by_id(Uuid::new_v4()).await,
            Err(BizError::NotFound(_))
        ));
        assert!(matches!(
            campaigns.get_campaign_stats(Uuid::new_v4()).await,
            Err(BizError::NotFound(_))
        ));
    }
}
