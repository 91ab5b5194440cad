use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use bizagent_core::models::email::{SendResult, SendingStats};
use eyre::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;
use uuid::Uuid;

use super::MailTransport;
use crate::config::MockMailConfig;

/// Simulated transport: random latency and a configurable failure rate.
pub struct MockTransport {
    config: MockMailConfig,
    rng: Mutex<StdRng>,
    sent: AtomicU64,
    failed: AtomicU64,
}

impl MockTransport {
    pub fn new(config: MockMailConfig) -> Self {
        Self::from_rng(config, StdRng::from_entropy())
    }

    /// Deterministic outcomes for tests.
    pub fn with_seed(config: MockMailConfig, seed: u64) -> Self {
        Self::from_rng(config, StdRng::seed_from_u64(seed))
    }

    fn from_rng(config: MockMailConfig, rng: StdRng) -> Self {
        Self {
            config,
            rng: Mutex::new(rng),
            sent: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        }
    }

    /// Draws the latency and outcome for one send.
    fn roll(&self) -> (std::time::Duration, bool) {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let min = self.config.min_delay.as_millis() as u64;
        let max = self.config.max_delay.as_millis() as u64;
        let delay = if max > min { rng.gen_range(min..=max) } else { min };
        let fails = rng.gen_bool(self.config.failure_rate.clamp(0.0, 1.0));

        (std::time::Duration::from_millis(delay), fails)
    }

    pub fn sent_count(&self) -> u64 {
        self.sent.load(Ordering::Relaxed)
    }

    pub fn failed_count(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl MailTransport for MockTransport {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn send_email(
        &self,
        to: &str,
        _subject: &str,
        _html_content: &str,
        _text_content: Option<&str>,
    ) -> SendResult {
        let (delay, fails) = self.roll();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if fails {
            self.failed.fetch_add(1, Ordering::Relaxed);
            debug!("Mock send to {} failed", to);
            return SendResult::failed("Simulated delivery failure");
        }

        self.sent.fetch_add(1, Ordering::Relaxed);
        let id = format!("mock-{}", Uuid::new_v4());
        debug!("Mock send to {} succeeded as {}", to, id);
        SendResult::sent(id)
    }

    async fn test_connection(&self) -> bool {
        true
    }

    async fn get_sending_stats(&self, _window_days: u32) -> Result<SendingStats> {
        Ok(SendingStats {
            sent: self.sent_count(),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn instant(failure_rate: f64) -> MockMailConfig {
        MockMailConfig {
            min_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            failure_rate,
        }
    }

    #[tokio::test]
    async fn test_failure_rate_converges() {
        let transport = MockTransport::with_seed(instant(0.05), 42);

        for _ in 0..10_000 {
            transport.send_email("a@b.co", "s", "<p>h</p>", None).await;
        }

        let failed = transport.failed_count() as f64;
        let total = (transport.failed_count() + transport.sent_count()) as f64;
        let rate = failed / total;
        assert_eq!(total, 10_000.0);
        assert!((0.04..=0.06).contains(&rate), "failure rate {}", rate);
    }

    #[tokio::test]
    async fn test_success_has_mock_message_id() {
        let transport = MockTransport::with_seed(instant(0.0), 7);
        let result = transport.send_email("a@b.co", "s", "<p>h</p>", None).await;

        assert!(result.success);
        assert!(result.message_id.unwrap().starts_with("mock-"));
        assert_eq!(transport.get_sending_stats(30).await.unwrap().sent, 1);
    }

    #[tokio::test]
    async fn test_always_fails_at_full_rate() {
        let transport = MockTransport::with_seed(instant(1.0), 7);
        let result = transport.send_email("a@b.co", "s", "<p>h</p>", None).await;

        assert!(!result.success);
        assert!(result.error.is_some());
        assert!(transport.test_connection().await);
    }
}
