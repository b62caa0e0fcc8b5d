//! Flat-file repository.
//!
//! Stores one JSON file per region under a data directory, in the layout
//! the collector publishes: `region_<CODE>.json` for the current snapshot,
//! `history_<CODE>.json` for the per-region log, and a combined
//! `cached_data.json` keyed by region code.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use super::encoding::{unwrap_history, RawHistoryEntry, RawSnapshot};
use crate::api::{HistoryEntry, RegionSnapshot};
use crate::store::error::{ErrorContext, StoreError, StoreResult};
use crate::store::repository::{HistoryRepository, SnapshotRepository};

/// Filesystem-backed repository rooted at a data directory.
pub struct FileRepository {
    dir: PathBuf,
}

impl FileRepository {
    /// Open (and create if needed) the data directory.
    pub fn new(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| {
            StoreError::internal_with_context(
                format!("Failed to create data dir: {}", e),
                ErrorContext::new("open_data_dir").with_details(dir.display().to_string()),
            )
        })?;
        Ok(Self { dir })
    }

    fn region_path(&self, code: &str) -> PathBuf {
        self.dir.join(format!("region_{code}.json"))
    }

    fn history_path(&self, code: &str) -> PathBuf {
        self.dir.join(format!("history_{code}.json"))
    }

    fn cached_path(&self) -> PathBuf {
        self.dir.join("cached_data.json")
    }

    async fn read_json(&self, path: &Path) -> StoreResult<Option<Value>> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes).map_err(|e| {
                StoreError::decode_with_context(
                    e.to_string(),
                    ErrorContext::new("read_json").with_details(path.display().to_string()),
                )
            })?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::from(e).with_operation("read_json")),
        }
    }

    async fn read_raw_history(&self, code: &str) -> StoreResult<Vec<RawHistoryEntry>> {
        if let Some(value) = self.read_json(&self.history_path(code)).await? {
            return Ok(unwrap_history(value));
        }
        // Fall back to the combined cache file
        if let Some(cached) = self.read_json(&self.cached_path()).await? {
            if let Some(history) = cached.get(code).and_then(|r| r.get("history")) {
                return Ok(unwrap_history(history.clone()));
            }
        }
        Ok(Vec::new())
    }

    async fn decoded_history(&self, code: &str) -> StoreResult<Vec<HistoryEntry>> {
        let raw = self.read_raw_history(code).await?;
        Ok(raw.into_iter().filter_map(|r| r.into_entry(code)).collect())
    }
}

#[async_trait]
impl SnapshotRepository for FileRepository {
    async fn fetch_snapshot(&self, region_code: &str) -> StoreResult<Option<RegionSnapshot>> {
        if let Some(value) = self.read_json(&self.region_path(region_code)).await? {
            let raw: RawSnapshot = serde_json::from_value(value)?;
            return Ok(Some(raw.into_snapshot(region_code)));
        }
        if let Some(cached) = self.read_json(&self.cached_path()).await? {
            if let Some(current) = cached.get(region_code).and_then(|r| r.get("current")) {
                let raw: RawSnapshot = serde_json::from_value(current.clone())?;
                return Ok(Some(raw.into_snapshot(region_code)));
            }
        }
        Ok(None)
    }

    async fn health_check(&self) -> StoreResult<bool> {
        Ok(tokio::fs::metadata(&self.dir)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false))
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}

#[async_trait]
impl HistoryRepository for FileRepository {
    async fn append_entry(&self, entry: &HistoryEntry) -> StoreResult<()> {
        let code = entry.region_code.clone();
        let mut raw = self.read_raw_history(&code).await?;
        raw.push(RawHistoryEntry::from(entry));

        let doc = serde_json::json!({
            "region_code": code,
            "count": raw.len(),
            "history": raw,
        });
        // Write-then-rename so a crashed write never truncates the log
        let path = self.history_path(&code);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(&doc)?)
            .await
            .map_err(|e| StoreError::from(e).with_operation("append_entry"))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| StoreError::from(e).with_operation("append_entry"))?;
        Ok(())
    }

    async fn fetch_history(
        &self,
        region_code: &str,
        since: DateTime<Utc>,
        limit: usize,
    ) -> StoreResult<Vec<HistoryEntry>> {
        let mut entries = self.decoded_history(region_code).await?;
        entries.retain(|e| e.timestamp >= since);
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        entries.truncate(limit);
        Ok(entries)
    }

    async fn latest_entry(&self, region_code: &str) -> StoreResult<Option<HistoryEntry>> {
        let entries = self.decoded_history(region_code).await?;
        Ok(entries.into_iter().max_by_key(|e| e.timestamp))
    }

    async fn nearest_entry(
        &self,
        region_code: &str,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<HistoryEntry>> {
        let entries = self.decoded_history(region_code).await?;
        Ok(entries
            .into_iter()
            .min_by_key(|e| (e.timestamp - at).num_seconds().abs()))
    }
}
