//! Cron Driver: fires a job on a cron schedule from a background task.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cron::Schedule;
use eyre::{eyre, Result};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Work triggered on every tick.
#[async_trait]
pub trait CronJob: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run(&self) -> Result<()>;
}

pub struct CronDriver {
    expression: String,
    schedule: Schedule,
    job: Arc<dyn CronJob>,
    task: Option<(JoinHandle<()>, watch::Sender<bool>)>,
}

impl CronDriver {
    /// `expression` uses the six-field form with seconds, e.g. `0 0 2 * * *`.
    pub fn new(expression: &str, job: Arc<dyn CronJob>) -> Result<Self> {
        let schedule = Schedule::from_str(expression)
            .map_err(|e| eyre!("Invalid cron expression '{}': {}", expression, e))?;

        Ok(Self {
            expression: expression.to_string(),
            schedule,
            job,
            task: None,
        })
    }

    pub fn next_run(&self) -> Option<DateTime<Utc>> {
        self.schedule.upcoming(Utc).next()
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    pub fn start(&mut self) {
        if self.task.is_some() {
            warn!("Cron driver for {} already running", self.job.name());
            return;
        }

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let schedule = self.schedule.clone();
        let job = self.job.clone();

        let handle = tokio::spawn(async move {
            loop {
                let Some(next) = schedule.upcoming(Utc).next() else {
                    warn!("Cron schedule for {} has no upcoming runs", job.name());
                    break;
                };
                let wait = (next - Utc::now()).to_std().unwrap_or_default();

                tokio::select! {
                    _ = tokio::time::sleep(wait) => {
                        info!("Running scheduled job {}", job.name());
                        if let Err(e) = job.run().await {
                            error!("Scheduled job {} failed: {:#}", job.name(), e);
                        }
                    }
                    _ = shutdown_rx.changed() => break,
                }
            }
        });

        info!(
            "Cron driver started for {} ({}), next run {:?}",
            self.job.name(),
            self.expression,
            self.next_run()
        );
        self.task = Some((handle, shutdown_tx));
    }

    pub async fn stop(&mut self) {
        let Some((handle, shutdown_tx)) = self.task.take() else {
            return;
        };

        let _ = shutdown_tx.send(true);
        if let Err(e) = handle.await {
            error!("Cron task ended abnormally: {}", e);
        }
        info!("Cron driver for {} stopped", self.job.name());
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    #[derive(Default)]
    struct CountingJob {
        runs: AtomicUsize,
    }

    #[async_trait]
    impl CronJob for CountingJob {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn run(&self) -> Result<()> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            Err(eyre!("job errors are logged, not fatal"))
        }
    }

    #[test]
    fn test_rejects_invalid_expression() {
        assert!(CronDriver::new("not a cron", Arc::new(CountingJob::default())).is_err());
    }

    #[test]
    fn test_next_run_is_nightly() {
        let driver = CronDriver::new("0 0 2 * * *", Arc::new(CountingJob::default())).unwrap();
        let next = driver.next_run().unwrap();

        assert!(next > Utc::now());
        assert_eq!(next.format("%H:%M:%S").to_string(), "02:00:00");
    }

    #[test_log::test(tokio::test)]
    async fn test_runs_every_second_until_stopped() {
        let job = Arc::new(CountingJob::default());
        let mut driver = CronDriver::new("* * * * * *", job.clone()).unwrap();

        driver.start();
        assert!(driver.is_running());
        tokio::time::sleep(Duration::from_millis(2500)).await;
        driver.stop().await;

        let runs = job.runs.load(Ordering::SeqCst);
        assert!(runs >= 1, "job ran {} times", runs);
        assert!(!driver.is_running());

        tokio::time::sleep(Duration::from_millis(1200)).await;
        assert_eq!(job.runs.load(Ordering::SeqCst), runs);
    }
}
