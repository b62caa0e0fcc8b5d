//! Read-only remote repository over raw GitHub content.
//!
//! The collector pushes `region_<CODE>.json`, `history_<CODE>.json` and a
//! combined `cached_data.json` to a plain repository; this backend reads
//! them over `raw.githubusercontent.com`. The combined file is cached for
//! the configured TTL so a region-list request does not hammer the host.
//!
//! There is no write path on this backend: history appends are accepted
//! and dropped with a warning so the service-layer debounce/refresh code
//! stays backend-agnostic.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::warn;
use reqwest::StatusCode;
use serde_json::Value;

use super::encoding::{unwrap_history, RawSnapshot};
use crate::api::{HistoryEntry, RegionSnapshot};
use crate::store::cache::TtlCache;
use crate::store::error::{ErrorContext, StoreError, StoreResult};
use crate::store::repository::{HistoryRepository, SnapshotRepository};

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
const COMBINED_CACHE_KEY: &str = "cached_data.json";

/// Remote raw-content repository with a TTL cache for the combined file.
pub struct GithubRepository {
    base_url: String,
    client: reqwest::Client,
    cache: TtlCache<String, Value>,
}

impl GithubRepository {
    /// Create a repository reading from `base_url` (trailing slash added if
    /// missing), caching the combined file for `cache_ttl`.
    pub fn new(base_url: impl Into<String>, cache_ttl: Duration) -> StoreResult<Self> {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| StoreError::configuration(format!("HTTP client build failed: {e}")))?;
        Ok(Self {
            base_url,
            client,
            cache: TtlCache::new(cache_ttl),
        })
    }

    /// Fetch one JSON file; `Ok(None)` for 404.
    async fn fetch_file(&self, filename: &str) -> StoreResult<Option<Value>> {
        let url = format!("{}{}", self.base_url, filename);
        let response = self.client.get(&url).send().await.map_err(|e| {
            StoreError::from(e).with_operation("fetch_file")
        })?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let value = response.json::<Value>().await.map_err(|e| {
                    StoreError::decode_with_context(
                        e.to_string(),
                        ErrorContext::new("fetch_file").with_details(filename.to_string()),
                    )
                })?;
                Ok(Some(value))
            }
            status => Err(StoreError::query_with_context(
                format!("Unexpected status {status}"),
                ErrorContext::new("fetch_file").with_details(url),
            )),
        }
    }

    /// The combined `cached_data.json`, served from cache within the TTL.
    async fn combined(&self) -> StoreResult<Option<Value>> {
        if let Some(cached) = self.cache.get(COMBINED_CACHE_KEY) {
            return Ok(Some(cached));
        }
        let fetched = self.fetch_file(COMBINED_CACHE_KEY).await?;
        if let Some(value) = &fetched {
            self.cache
                .insert(COMBINED_CACHE_KEY.to_string(), value.clone());
        }
        Ok(fetched)
    }

    async fn decoded_history(&self, code: &str) -> StoreResult<Vec<HistoryEntry>> {
        let raw = if let Some(value) = self.fetch_file(&format!("history_{code}.json")).await? {
            unwrap_history(value)
        } else if let Some(combined) = self.combined().await? {
            combined
                .get(code)
                .and_then(|r| r.get("history"))
                .map(|h| unwrap_history(h.clone()))
                .unwrap_or_default()
        } else {
            Vec::new()
        };
        Ok(raw.into_iter().filter_map(|r| r.into_entry(code)).collect())
    }
}

#[async_trait]
impl SnapshotRepository for GithubRepository {
    async fn fetch_snapshot(&self, region_code: &str) -> StoreResult<Option<RegionSnapshot>> {
        if let Some(value) = self.fetch_file(&format!("region_{region_code}.json")).await? {
            let raw: RawSnapshot = serde_json::from_value(value)?;
            return Ok(Some(raw.into_snapshot(region_code)));
        }
        if let Some(combined) = self.combined().await? {
            if let Some(current) = combined.get(region_code).and_then(|r| r.get("current")) {
                let raw: RawSnapshot = serde_json::from_value(current.clone())?;
                return Ok(Some(raw.into_snapshot(region_code)));
            }
        }
        Ok(None)
    }

    async fn health_check(&self) -> StoreResult<bool> {
        match self.fetch_file(COMBINED_CACHE_KEY).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_retryable() => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn backend_name(&self) -> &'static str {
        "github"
    }
}

#[async_trait]
impl HistoryRepository for GithubRepository {
    async fn append_entry(&self, entry: &HistoryEntry) -> StoreResult<()> {
        warn!(
            "github backend is read-only; dropping history entry for {}",
            entry.region_code
        );
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
