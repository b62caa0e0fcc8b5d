//! Repository traits for the availability stores.
//!
//! The service layer only ever sees these traits; which of memory, flat
//! files, SQLite or the remote file host actually answers is decided by the
//! factory at startup.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::error::StoreResult;
use crate::api::{HistoryEntry, RegionSnapshot};

/// Read access to current region snapshots.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    /// Fetch the current snapshot for a region.
    ///
    /// `Ok(None)` means the store is reachable but has no data for the
    /// region; callers fall back to mock data. Backend failures surface as
    /// errors so the service layer can tell "no data" from "store down".
    async fn fetch_snapshot(&self, region_code: &str) -> StoreResult<Option<RegionSnapshot>>;

    /// Check whether the backend is reachable.
    async fn health_check(&self) -> StoreResult<bool>;

    /// Short backend name for health and config-echo endpoints.
    fn backend_name(&self) -> &'static str;
}

/// Append-only per-region history log.
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Append one entry to a region's log.
    async fn append_entry(&self, entry: &HistoryEntry) -> StoreResult<()>;

    /// Entries with `timestamp >= since`, newest first, at most `limit`.
    async fn fetch_history(
        &self,
        region_code: &str,
        since: DateTime<Utc>,
        limit: usize,
    ) -> StoreResult<Vec<HistoryEntry>>;

    /// The most recent entry for a region, if any.
    async fn latest_entry(&self, region_code: &str) -> StoreResult<Option<HistoryEntry>>;

    /// The entry whose timestamp is closest to `at`, if any.
    async fn nearest_entry(
        &self,
        region_code: &str,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<HistoryEntry>>;

    /// Whether the region has any entries at all.
    async fn has_history(&self, region_code: &str) -> StoreResult<bool> {
        Ok(self.latest_entry(region_code).await?.is_some())
    }
}

/// Full repository: snapshots plus history.
#[async_trait]
pub trait FullRepository: SnapshotRepository + HistoryRepository {}

impl<T: SnapshotRepository + HistoryRepository> FullRepository for T {}
