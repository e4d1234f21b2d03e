use async_trait::async_trait;

use crate::db::models::{NewSnapshot, Snapshot};

/// Read/append access to collection snapshots.
///
/// Implemented by [`PostgresClient`](crate::db::PostgresClient). The aggregation engine
/// never sees this trait; the job and query layers fetch through it and hand plain
/// `Vec<Snapshot>`s to the engine.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Snapshots of a collection within an optional inclusive range, oldest first.
    async fn snapshots_in_range(
        &self,
        collection_address: &str,
        start_time: Option<i64>,
        end_time: Option<i64>,
    ) -> anyhow::Result<Vec<Snapshot>>;

    /// Snapshots of a collection with `timestamp >= since`, newest first.
    async fn snapshots_since(
        &self,
        collection_address: &str,
        since: i64,
    ) -> anyhow::Result<Vec<Snapshot>>;

    /// Most recent snapshot of a collection.
    async fn latest_snapshot(&self, collection_address: &str) -> anyhow::Result<Option<Snapshot>>;

    /// Append a snapshot.
    async fn insert_snapshot(&self, snapshot: &NewSnapshot) -> anyhow::Result<()>;
}
