//! In-memory stand-ins for the database and upstream providers.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::config::CollectionSettings;
use crate::db::models::{NewSnapshot, Snapshot};
use crate::db::SnapshotStore;
use crate::providers::{
    CollectionStats, CollectionStatsProvider, ExchangeRateProvider, ProviderError,
};

pub(crate) fn collection(address: &str) -> CollectionSettings {
    CollectionSettings {
        address: address.to_string(),
        network_name: "Ethereum".to_string(),
        max_supply: 1_000.0,
        native_currency: Some("ETH".to_string()),
        indexing_start_time: 0,
    }
}

/// Pops one scripted result per call; the last one repeats forever.
struct Script<T> {
    results: Mutex<VecDeque<Result<T, &'static str>>>,
    calls: AtomicU32,
}

impl<T: Clone> Script<T> {
    fn new(results: Vec<Result<T, &'static str>>) -> Self {
        assert!(!results.is_empty(), "script needs at least one result");
        Self {
            results: Mutex::new(results.into()),
            calls: AtomicU32::new(0),
        }
    }

    fn next(&self) -> Result<T, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut results = self.results.lock().unwrap();
        let result = if results.len() > 1 {
            results.pop_front().unwrap()
        } else {
            results[0].clone()
        };
        result.map_err(|e| ProviderError::Response(e.to_string()))
    }
}

pub(crate) struct ScriptedRates {
    name: &'static str,
    script: Script<f64>,
}

impl ScriptedRates {
    pub(crate) fn new(name: &'static str, results: Vec<Result<f64, &'static str>>) -> Self {
        Self {
            name,
            script: Script::new(results),
        }
    }

    pub(crate) fn calls(&self) -> u32 {
        self.script.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExchangeRateProvider for ScriptedRates {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn native_usd_rate(&self, _network_name: &str) -> Result<f64, ProviderError> {
        self.script.next()
    }
}

pub(crate) struct ScriptedStats {
    script: Script<CollectionStats>,
}

impl ScriptedStats {
    pub(crate) fn new(results: Vec<Result<CollectionStats, &'static str>>) -> Self {
        Self {
            script: Script::new(results),
        }
    }
}

#[async_trait]
impl CollectionStatsProvider for ScriptedStats {
    async fn collection_stats(
        &self,
        _collection_address: &str,
    ) -> Result<CollectionStats, ProviderError> {
        self.script.next()
    }
}

/// Snapshot store backed by a vector, in insertion order.
#[derive(Default)]
pub(crate) struct MemoryStore {
    rows: Mutex<Vec<Snapshot>>,
    reads: AtomicU32,
}

impl MemoryStore {
    pub(crate) fn with_rows(rows: Vec<Snapshot>) -> Self {
        Self {
            rows: Mutex::new(rows),
            reads: AtomicU32::new(0),
        }
    }

    pub(crate) fn rows(&self) -> Vec<Snapshot> {
        self.rows.lock().unwrap().clone()
    }

    /// Number of read queries served so far.
    pub(crate) fn reads(&self) -> u32 {
        self.reads.load(Ordering::SeqCst)
    }

    fn matching(&self, collection_address: &str, keep: impl Fn(i64) -> bool) -> Vec<Snapshot> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.rows
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.collection_address == collection_address && keep(s.timestamp))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn snapshots_in_range(
        &self,
        collection_address: &str,
        start_time: Option<i64>,
        end_time: Option<i64>,
    ) -> anyhow::Result<Vec<Snapshot>> {
        let mut rows = self.matching(collection_address, |ts| {
            start_time.is_none_or(|start| ts >= start) && end_time.is_none_or(|end| ts <= end)
        });
        rows.sort_by_key(|s| s.timestamp);
        Ok(rows)
    }

    async fn snapshots_since(
        &self,
        collection_address: &str,
        since: i64,
    ) -> anyhow::Result<Vec<Snapshot>> {
        let mut rows = self.matching(collection_address, |ts| ts >= since);
        rows.reverse();
        rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(rows)
    }

    async fn latest_snapshot(&self, collection_address: &str) -> anyhow::Result<Option<Snapshot>> {
        let rows = self.matching(collection_address, |_| true);
        Ok(rows.into_iter().max_by_key(|s| s.timestamp))
    }

    async fn insert_snapshot(&self, snapshot: &NewSnapshot) -> anyhow::Result<()> {
        self.rows.lock().unwrap().push(snapshot.clone().into());
        Ok(())
    }
}
