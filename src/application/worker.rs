//! Background refresh worker.
//!
//! Recomputes every eligible user's recommendations on a fixed interval and
//! purges long-inactive rows once a day. Runs independently of request
//! serving; a stop request takes effect between users, never mid-user.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tracing::info;

use crate::application::service::RecommendationService;
use crate::domain::error::DomainError;

const PURGE_EVERY: Duration = Duration::from_secs(24 * 60 * 60);
const INTER_USER_DELAY: Duration = Duration::from_secs(2);

pub struct RecommendationWorker {
    service: Arc<RecommendationService>,
    interval: Duration,
    retention_days: i64,
    stop: Arc<AtomicBool>,
    stop_notify: Notify,
}

impl RecommendationWorker {
    pub fn new(service: Arc<RecommendationService>, interval: Duration, retention_days: i64) -> Self {
        Self {
            service,
            interval,
            retention_days,
            stop: Arc::new(AtomicBool::new(false)),
            stop_notify: Notify::new(),
        }
    }

    /// Ask the worker to stop. An in-flight batch finishes its current user
    /// first; a sleeping worker wakes immediately. notify_one stores a
    /// permit, so a request landing before the loop reaches its wait still
    /// wakes it.
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
        self.stop_notify.notify_one();
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    /// Initial batch, then the periodic loop until a stop request arrives.
    pub async fn run(&self) -> Result<(), DomainError> {
        info!(
            interval_secs = self.interval.as_secs(),
            retention_days = self.retention_days,
            "recommendation worker started"
        );

        self.run_batch().await?;
        let mut last_purge = tokio::time::Instant::now();

        loop {
            if self.is_stopped() {
                break;
            }
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = self.stop_notify.notified() => break,
            }
            if self.is_stopped() {
                break;
            }

            self.run_batch().await?;

            if last_purge.elapsed() >= PURGE_EVERY {
                let purged = self.service.purge_inactive(self.retention_days)?;
                info!(purged, "purged long-inactive recommendations");
                last_purge = tokio::time::Instant::now();
            }
        }

        info!("recommendation worker stopped");
        Ok(())
    }

    /// One full-population recompute, off the async runtime.
    async fn run_batch(&self) -> Result<(), DomainError> {
        let service = self.service.clone();
        let stop = self.stop.clone();
        let outcome = tokio::task::spawn_blocking(move || {
            service.recompute_all_users(INTER_USER_DELAY, &stop)
        })
        .await
        .map_err(|e| DomainError::Database(format!("Batch task failed: {e}")))??;

        info!(
            eligible = outcome.eligible,
            succeeded = outcome.succeeded,
            failed = outcome.failed,
            interrupted = outcome.interrupted,
            "batch recompute finished"
        );
        Ok(())
    }
}
