use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use log::{info, warn};
use serde::Deserialize;
use tokio_cron_scheduler::{Job, JobScheduler};
use tokio_util::sync::CancellationToken;

use crate::config::CollectionSettings;
use crate::db::SnapshotStore;

use super::jobs::{self, update_price_data::PriceFeeds};

/// Configuration for cron job intervals
#[derive(Debug, Clone, Deserialize)]
pub struct CronSettings {
    /// Interval for appending price snapshots - default 5 minutes
    #[serde(default = "default_update_interval_secs")]
    pub update_interval_secs: u64,
}

fn default_update_interval_secs() -> u64 {
    300
}

impl Default for CronSettings {
    fn default() -> Self {
        Self {
            update_interval_secs: default_update_interval_secs(),
        }
    }
}

/// Cron scheduler that manages periodic background jobs.
pub struct CronScheduler {
    store: Arc<dyn SnapshotStore>,
    feeds: PriceFeeds,
    collections: Arc<Vec<CollectionSettings>>,
    settings: CronSettings,
}

impl CronScheduler {
    pub fn new(
        store: Arc<dyn SnapshotStore>,
        feeds: PriceFeeds,
        collections: Vec<CollectionSettings>,
        settings: CronSettings,
    ) -> Self {
        Self {
            store,
            feeds,
            collections: Arc::new(collections),
            settings,
        }
    }

    /// Starts the cron scheduler and runs until cancellation.
    pub async fn run(&self, cancellation_token: CancellationToken) -> Result<()> {
        let mut scheduler = JobScheduler::new().await?;

        self.register_update_price_data_job(&scheduler).await?;

        scheduler.start().await?;
        info!(
            "Cron scheduler started for {} collections",
            self.collections.len()
        );

        // Wait for cancellation
        cancellation_token.cancelled().await;
        info!("Cron scheduler shutting down...");

        scheduler.shutdown().await?;
        Ok(())
    }

    async fn register_update_price_data_job(&self, scheduler: &JobScheduler) -> Result<()> {
        let store = self.store.clone();
        let feeds = self.feeds.clone();
        let collections = self.collections.clone();
        let interval = self.settings.update_interval_secs;

        let job = Job::new_repeated_async(Duration::from_secs(interval), move |_uuid, _lock| {
            let store = store.clone();
            let feeds = feeds.clone();
            let collections = collections.clone();
            Box::pin(async move {
                let updated =
                    jobs::update_price_data::run_all(store.as_ref(), &feeds, &collections).await;
                if updated < collections.len() {
                    warn!(
                        "update_price_data updated {}/{} collections",
                        updated,
                        collections.len()
                    );
                }
            })
        })?;

        scheduler.add(job).await?;
        info!("Registered update_price_data job (every {}s)", interval);
        Ok(())
    }
}
