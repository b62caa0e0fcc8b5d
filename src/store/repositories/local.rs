//! In-memory repository.
//!
//! Default backend for development and the test suite: all data lives in
//! maps behind a lock, seedable from tests, with a health toggle to
//! exercise the unreachable-store paths deterministically.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::api::{HistoryEntry, RegionSnapshot};
use crate::report::{self, BaseStationRecord, VisitRecord};
use crate::store::error::{StoreError, StoreResult};
use crate::store::repository::{HistoryRepository, SnapshotRepository};

/// In-memory repository with seed helpers for tests.
#[derive(Clone, Default)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

#[derive(Default)]
struct LocalData {
    snapshots: HashMap<String, RegionSnapshot>,
    history: HashMap<String, Vec<HistoryEntry>>,
    unhealthy: bool,
}

impl LocalRepository {
    /// Create a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a ready-made snapshot for a region.
    pub fn seed_snapshot(&self, snapshot: RegionSnapshot) {
        let mut data = self.data.write();
        data.snapshots
            .insert(snapshot.region_code.clone(), snapshot);
    }

    /// Build and store a snapshot from a named-record feed, the same path
    /// the live database variant took before the rows reach the report.
    pub fn seed_feed(
        &self,
        region_code: &str,
        stations: &[BaseStationRecord],
        visits: &[VisitRecord],
        now: DateTime<Utc>,
    ) -> RegionSnapshot {
        let snapshot = report::build_snapshot(region_code, stations, visits, now);
        self.seed_snapshot(snapshot.clone());
        snapshot
    }

    /// Append a history entry directly, bypassing the service layer.
    pub fn seed_history(&self, entry: HistoryEntry) {
        let mut data = self.data.write();
        data.history
            .entry(entry.region_code.clone())
            .or_default()
            .push(entry);
    }

    /// Toggle the simulated backend health.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().unhealthy = !healthy;
    }

    /// Drop all snapshots and history.
    pub fn clear(&self) {
        let mut data = self.data.write();
        data.snapshots.clear();
        data.history.clear();
    }

    /// Total number of history entries across all regions.
    pub fn history_len(&self, region_code: &str) -> usize {
        self.data
            .read()
            .history
            .get(region_code)
            .map(Vec::len)
            .unwrap_or(0)
    }

    fn ensure_healthy(&self) -> StoreResult<()> {
        if self.data.read().unhealthy {
            Err(StoreError::connection("local repository marked unhealthy"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SnapshotRepository for LocalRepository {
    async fn fetch_snapshot(&self, region_code: &str) -> StoreResult<Option<RegionSnapshot>> {
        self.ensure_healthy()?;
        Ok(self.data.read().snapshots.get(region_code).cloned())
    }

    async fn health_check(&self) -> StoreResult<bool> {
        Ok(!self.data.read().unhealthy)
    }

    fn backend_name(&self) -> &'static str {
        "local"
    }
}

#[async_trait]
impl HistoryRepository for LocalRepository {
    async fn append_entry(&self, entry: &HistoryEntry) -> StoreResult<()> {
        self.ensure_healthy()?;
        self.seed_history(entry.clone());
        Ok(())
    }

    async fn fetch_history(
        &self,
        region_code: &str,
        since: DateTime<Utc>,
        limit: usize,
    ) -> StoreResult<Vec<HistoryEntry>> {
        self.ensure_healthy()?;
        let data = self.data.read();
        let mut entries: Vec<HistoryEntry> = data
            .history
            .get(region_code)
            .map(|log| {
                log.iter()
                    .filter(|e| e.timestamp >= since)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        entries.truncate(limit);
        Ok(entries)
    }

    async fn latest_entry(&self, region_code: &str) -> StoreResult<Option<HistoryEntry>> {
        self.ensure_healthy()?;
        let data = self.data.read();
        Ok(data
            .history
            .get(region_code)
            .and_then(|log| log.iter().max_by_key(|e| e.timestamp))
            .cloned())
    }

    async fn nearest_entry(
        &self,
        region_code: &str,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<HistoryEntry>> {
        self.ensure_healthy()?;
        let data = self.data.read();
        Ok(data
            .history
            .get(region_code)
            .and_then(|log| {
                log.iter()
                    .min_by_key(|e| (e.timestamp - at).num_seconds().abs())
            })
            .cloned())
    }
}
