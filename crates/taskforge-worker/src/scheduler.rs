//! Cron scheduling for the expiry sweeper.

use std::sync::Arc;
use std::time::Duration;

use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::info;

use taskforge_core::config::SweeperConfig;
use taskforge_core::error::AppError;
use taskforge_core::result::AppResult;

use crate::sweeper::ExpirySweeper;

/// Drives the expiry sweeper on a fixed interval.
pub struct SweepScheduler {
    /// The underlying job scheduler.
    scheduler: JobScheduler,
    /// The sweeper to run.
    sweeper: Arc<ExpirySweeper>,
    /// Minutes between runs.
    interval_minutes: u64,
    /// Whether sweeping is enabled at all.
    enabled: bool,
}

impl std::fmt::Debug for SweepScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SweepScheduler")
            .field("interval_minutes", &self.interval_minutes)
            .field("enabled", &self.enabled)
            .finish()
    }
}

impl SweepScheduler {
    /// Creates a new scheduler for the given sweeper.
    pub async fn new(sweeper: Arc<ExpirySweeper>, config: &SweeperConfig) -> AppResult<Self> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;

        Ok(Self {
            scheduler,
            sweeper,
            interval_minutes: config.interval_minutes.max(1),
            enabled: config.enabled,
        })
    }

    /// Registers the sweep job. A no-op when sweeping is disabled.
    pub async fn register(&self) -> AppResult<()> {
        if !self.enabled {
            info!("Expiry sweeper disabled by configuration");
            return Ok(());
        }

        let sweeper = Arc::clone(&self.sweeper);
        let interval = Duration::from_secs(self.interval_minutes * 60);

        let job = Job::new_repeated_async(interval, move |_uuid, _lock| {
            let sweeper = Arc::clone(&sweeper);
            Box::pin(async move {
                sweeper.run_sweep().await;
            })
        })
        .map_err(|e| AppError::internal(format!("Failed to create sweep schedule: {e}")))?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to add sweep schedule: {e}")))?;

        info!(
            interval_minutes = self.interval_minutes,
            "Registered: expiry_sweep"
        );
        Ok(())
    }

    /// Starts the scheduler.
    pub async fn start(&self) -> AppResult<()> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;

        info!("Sweep scheduler started");
        Ok(())
    }

    /// Shuts the scheduler down.
    pub async fn shutdown(&self) -> AppResult<()> {
        // JobScheduler handles are shared; shutting down a clone stops
        // the scheduler itself.
        let mut scheduler = self.scheduler.clone();
        scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shut down scheduler: {e}")))?;

        info!("Sweep scheduler shut down");
        Ok(())
    }
}
