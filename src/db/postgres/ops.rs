use async_trait::async_trait;
use log::error;
use tokio_postgres::Row;

use crate::db::models::{NewSnapshot, Snapshot};
use crate::db::postgres::PostgresClient;
use crate::db::SnapshotStore;

/// NUMERIC columns are cast to text so decimals survive untouched.
const SNAPSHOT_COLUMNS: &str = r#"
    collection_address,
    "timestamp",
    price_native::text AS price_native,
    price_usd::text AS price_usd,
    volume_native_token::text AS volume_native_token,
    volume_usd::text AS volume_usd,
    holders,
    listing_qty,
    total_volume_native_token::text AS total_volume_native_token,
    native_token
"#;

fn snapshot_from_row(row: &Row) -> Snapshot {
    Snapshot {
        collection_address: row.get("collection_address"),
        timestamp: row.get("timestamp"),
        price_native: row.get("price_native"),
        price_usd: row.get("price_usd"),
        volume_native: row.get("volume_native_token"),
        volume_usd: row.get("volume_usd"),
        holders: row.get("holders"),
        listing_qty: row.get("listing_qty"),
        total_volume_native: row.get("total_volume_native_token"),
        native_token: row.get("native_token"),
    }
}

#[async_trait]
impl SnapshotStore for PostgresClient {
    async fn snapshots_in_range(
        &self,
        collection_address: &str,
        start_time: Option<i64>,
        end_time: Option<i64>,
    ) -> anyhow::Result<Vec<Snapshot>> {
        let client = self.pool.get().await?;
        let query = format!(
            r#"
            SELECT {SNAPSHOT_COLUMNS}
            FROM price_history
            WHERE collection_address = $1
              AND ($2::bigint IS NULL OR "timestamp" >= $2)
              AND ($3::bigint IS NULL OR "timestamp" <= $3)
            ORDER BY "timestamp" ASC, id ASC
            "#
        );

        let rows = client
            .query(&query, &[&collection_address, &start_time, &end_time])
            .await?;

        Ok(rows.iter().map(snapshot_from_row).collect())
    }

    async fn snapshots_since(
        &self,
        collection_address: &str,
        since: i64,
    ) -> anyhow::Result<Vec<Snapshot>> {
        let client = self.pool.get().await?;
        let query = format!(
            r#"
            SELECT {SNAPSHOT_COLUMNS}
            FROM price_history
            WHERE collection_address = $1 AND "timestamp" >= $2
            ORDER BY "timestamp" DESC, id DESC
            "#
        );

        let rows = client.query(&query, &[&collection_address, &since]).await?;

        Ok(rows.iter().map(snapshot_from_row).collect())
    }

    async fn latest_snapshot(&self, collection_address: &str) -> anyhow::Result<Option<Snapshot>> {
        let client = self.pool.get().await?;
        let query = format!(
            r#"
            SELECT {SNAPSHOT_COLUMNS}
            FROM price_history
            WHERE collection_address = $1
            ORDER BY "timestamp" DESC, id DESC
            LIMIT 1
            "#
        );

        let row = client.query_opt(&query, &[&collection_address]).await?;

        Ok(row.as_ref().map(snapshot_from_row))
    }

    async fn insert_snapshot(&self, snapshot: &NewSnapshot) -> anyhow::Result<()> {
        let client = self.pool.get().await?;
        let query = r#"
            INSERT INTO price_history (
                collection_address, "timestamp",
                price_native, price_usd,
                volume_native_token, volume_usd,
                holders, listing_qty,
                total_volume_native_token, native_token
            ) VALUES (
                $1, $2,
                $3::text::numeric, $4::text::numeric,
                $5::text::numeric, $6::text::numeric,
                $7, $8,
                $9::text::numeric, $10
            )
        "#;

        client
            .execute(
                query,
                &[
                    &snapshot.collection_address,
                    &snapshot.timestamp,
                    &snapshot.price_native,
                    &snapshot.price_usd,
                    &snapshot.volume_native,
                    &snapshot.volume_usd,
                    &snapshot.holders,
                    &snapshot.listing_qty,
                    &snapshot.total_volume_native,
                    &snapshot.native_token,
                ],
            )
            .await
            .map_err(|e| {
                error!(
                    "Failed to insert snapshot for {} at {}: {:?}",
                    snapshot.collection_address, snapshot.timestamp, e
                );
                e
            })?;

        Ok(())
    }
}
