use std::sync::Arc;

use log::info;

use crate::config::Settings;

pub mod models;
pub mod postgres;
mod store;

pub use postgres::PostgresClient;
pub use store::SnapshotStore;

/// Database handle shared by the scheduler and the query layer.
///
/// PostgreSQL holds the append-only `price_history` snapshot table.
#[derive(Clone)]
pub struct Database {
    pub postgres: Arc<PostgresClient>,
}

impl Database {
    /// Connect and apply migrations.
    pub async fn new(settings: Arc<Settings>) -> anyhow::Result<Self> {
        let postgres = PostgresClient::new(settings.postgres.clone()).await?;

        // Run migrations
        postgres.migrate().await?;

        info!("Database ready");

        Ok(Self {
            postgres: Arc::new(postgres),
        })
    }

    /// Snapshot store view of the database.
    pub fn store(&self) -> Arc<dyn SnapshotStore> {
        self.postgres.clone()
    }
}
