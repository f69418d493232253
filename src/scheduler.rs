use std::sync::Arc;

use anyhow::Result;
use chrono::Datelike;
use tokio::sync::RwLock;
use tokio::time::{Duration, interval};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::config::SyncConfig;
use crate::services::SyncService;
use crate::state::SharedState;

/// Periodic reconciliation driver. A single writer: overlapping ticks are
/// tolerated only because every sync step is insert-if-absent on top of the
/// schema's uniqueness guards.
pub struct Scheduler {
    state: Arc<SharedState>,
    config: SyncConfig,
    running: Arc<RwLock<bool>>,
}

impl Scheduler {
    #[must_use]
    pub fn new(state: Arc<SharedState>, config: SyncConfig) -> Self {
        Self {
            state,
            config,
            running: Arc::new(RwLock::new(false)),
        }
    }

    pub async fn start(&self) -> Result<()> {
        if !self.config.enabled {
            info!("Sync scheduler is disabled in config");
            return Ok(());
        }

        *self.running.write().await = true;
        info!("Starting sync scheduler");

        if let Some(cron_expr) = &self.config.cron_expression {
            self.run_with_cron(cron_expr).await
        } else {
            self.run_with_interval().await
        }
    }

    async fn run_with_cron(&self, cron_expr: &str) -> Result<()> {
        let mut sched = JobScheduler::new().await?;

        let sync = Arc::clone(&self.state.sync);
        let running = Arc::clone(&self.running);
        let year = self.config.year;

        let job = Job::new_async(cron_expr, move |_uuid, _lock| {
            let sync = Arc::clone(&sync);
            let running = Arc::clone(&running);
            Box::pin(async move {
                if !*running.read().await {
                    return;
                }
                run_sync(&*sync, year).await;
            })
        })?;

        sched.add(job).await?;
        sched.start().await?;

        info!("Sync scheduler running with cron: {}", cron_expr);

        loop {
            if !*self.running.read().await {
                break;
            }
            tokio::time::sleep(Duration::from_secs(1)).await;
        }

        sched.shutdown().await?;
        Ok(())
    }

    async fn run_with_interval(&self) -> Result<()> {
        let interval_mins = self.config.interval_minutes;

        info!("Sync scheduler running every {} minutes", interval_mins);

        let mut tick = interval(Duration::from_secs(u64::from(interval_mins) * 60));

        loop {
            tick.tick().await;
            if !*self.running.read().await {
                break;
            }
            run_sync(&*self.state.sync, self.config.year).await;
        }

        Ok(())
    }

    pub async fn stop(&self) {
        info!("Stopping sync scheduler...");
        *self.running.write().await = false;
    }

    pub async fn is_running(&self) -> bool {
        *self.running.read().await
    }

    pub async fn run_once(&self) -> Result<()> {
        run_sync(&*self.state.sync, self.config.year).await;
        Ok(())
    }
}

/// The season to reconcile: configured year, or the current calendar year.
#[must_use]
pub fn target_year(configured: Option<i32>) -> i32 {
    configured.unwrap_or_else(|| chrono::Utc::now().year())
}

async fn run_sync(sync: &dyn SyncService, year: Option<i32>) {
    let year = target_year(year);
    let summary = sync.sync_year(year).await;

    if !summary.is_clean() {
        for err in &summary.errors {
            error!("Sync step failed: {}", err);
        }
    }
}
