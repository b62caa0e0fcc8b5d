//! High-level availability service layer.
//!
//! Repository-agnostic operations that work with any [`FullRepository`]
//! implementation. Business rules that must hold regardless of the storage
//! backend live here: the mock fallback for missing or unreachable data,
//! the history write debounce and the forced-refresh bypass.

pub mod mock;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use log::{info, warn};

use crate::api::{HistoryEntry, Region, RegionSnapshot};
use crate::config::ServiceConfig;
use crate::regions;
use crate::store::{FullRepository, StoreResult};

/// Number of synthesized entries returned for a region with no log at all.
const MOCK_HISTORY_HOURS: usize = 24;

/// A snapshot produced by a forced refresh, with the persist timestamp.
#[derive(Debug, Clone)]
pub struct RefreshedSnapshot {
    pub snapshot: RegionSnapshot,
    pub refresh_timestamp: DateTime<Utc>,
}

/// Check if the configured repository backend is reachable.
pub async fn health_check<R: FullRepository + ?Sized>(repo: &R) -> StoreResult<bool> {
    repo.health_check().await
}

/// Current snapshot for a region, mock-backed so it never fails.
///
/// A store miss or a store error both fall back to synthesized data; the
/// caller distinguishes them through `is_mock` rather than status codes.
/// Real (non-mock) stats are appended to the region's history log unless
/// an entry younger than the configured debounce window already exists.
pub async fn current_snapshot<R: FullRepository + ?Sized>(
    repo: &R,
    config: &ServiceConfig,
    region_code: &str,
) -> RegionSnapshot {
    let now = Utc::now();
    let snapshot = fetch_or_mock(repo, region_code, now).await;
    if !snapshot.is_mock {
        record_history(repo, config, &snapshot, now, false).await;
    }
    snapshot
}

/// Forced re-fetch: same data path as [`current_snapshot`] but the stats
/// are always appended to the history log, bypassing the debounce.
pub async fn refresh_snapshot<R: FullRepository + ?Sized>(
    repo: &R,
    config: &ServiceConfig,
    region_code: &str,
) -> RefreshedSnapshot {
    let now = Utc::now();
    let snapshot = fetch_or_mock(repo, region_code, now).await;
    record_history(repo, config, &snapshot, now, true).await;
    info!("forced refresh for region {region_code}");
    RefreshedSnapshot {
        snapshot,
        refresh_timestamp: now,
    }
}

/// History entries for the last `hours` hours, newest first.
///
/// The result is capped at the configured limit. A region that has never
/// been recorded gets 24 synthesized hourly entries; a region with history
/// but nothing inside the window gets an empty list. Store errors degrade
/// to the synthesized fallback as well.
pub async fn region_history<R: FullRepository + ?Sized>(
    repo: &R,
    config: &ServiceConfig,
    region_code: &str,
    hours: u32,
) -> Vec<HistoryEntry> {
    let now = Utc::now();

    match repo.has_history(region_code).await {
        Ok(true) => {}
        Ok(false) => {
            info!("no history recorded for {region_code}, synthesizing");
            let count = MOCK_HISTORY_HOURS.min(config.history_limit);
            return mock::mock_history(region_code, count, now);
        }
        Err(e) => {
            warn!("history lookup for {region_code} failed, synthesizing: {e}");
            let count = MOCK_HISTORY_HOURS.min(config.history_limit);
            return mock::mock_history(region_code, count, now);
        }
    }

    // Very wide windows saturate to "everything" instead of overflowing
    let since = now
        .checked_sub_signed(ChronoDuration::hours(i64::from(hours)))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    match repo
        .fetch_history(region_code, since, config.history_limit)
        .await
    {
        Ok(entries) => entries,
        Err(e) => {
            warn!("history fetch for {region_code} failed: {e}");
            Vec::new()
        }
    }
}

/// The history entry closest in time to `at`, if the region has any.
pub async fn snapshot_at<R: FullRepository + ?Sized>(
    repo: &R,
    region_code: &str,
    at: DateTime<Utc>,
) -> StoreResult<Option<HistoryEntry>> {
    repo.nearest_entry(region_code, at).await
}

/// All known regions from the static table, with macro-region grouping.
pub fn list_regions() -> Vec<Region> {
    regions::all()
}

async fn fetch_or_mock<R: FullRepository + ?Sized>(
    repo: &R,
    region_code: &str,
    now: DateTime<Utc>,
) -> RegionSnapshot {
    match repo.fetch_snapshot(region_code).await {
        Ok(Some(snapshot)) => snapshot,
        Ok(None) => {
            info!("no stored snapshot for {region_code}, serving mock data");
            mock::mock_snapshot(region_code, now)
        }
        Err(e) => {
            warn!("snapshot fetch for {region_code} failed, serving mock data: {e}");
            mock::mock_snapshot(region_code, now)
        }
    }
}

/// Append the snapshot's stats to the history log.
///
/// Unless `force` is set, the write is skipped when the latest recorded
/// entry is younger than the debounce window. Failures are logged, never
/// surfaced: history is best-effort bookkeeping on the read path.
async fn record_history<R: FullRepository + ?Sized>(
    repo: &R,
    config: &ServiceConfig,
    snapshot: &RegionSnapshot,
    now: DateTime<Utc>,
    force: bool,
) {
    if !force {
        let debounce = ChronoDuration::from_std(config.history_debounce)
            .unwrap_or_else(|_| ChronoDuration::minutes(10));
        match repo.latest_entry(&snapshot.region_code).await {
            Ok(Some(latest)) if now.signed_duration_since(latest.timestamp) < debounce => {
                return;
            }
            Ok(_) => {}
            Err(e) => {
                warn!(
                    "latest-entry lookup for {} failed, recording anyway: {e}",
                    snapshot.region_code
                );
            }
        }
    }

    let entry = HistoryEntry::from_stats(&snapshot.region_code, &snapshot.stats, now);
    if let Err(e) = repo.append_entry(&entry).await {
        warn!("history append for {} failed: {e}", snapshot.region_code);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::RegionStats;
    use crate::store::LocalRepository;

    fn test_config() -> ServiceConfig {
        ServiceConfig::default()
    }

    fn seeded_repo(region: &str, total: u32, down: u32) -> LocalRepository {
        let repo = LocalRepository::new();
        let stats = RegionStats {
            total_bs: total,
            base_layer_count: down,
            power_problems: 1,
            non_priority_percentage: crate::report::non_priority_percentage(down, total),
        };
        repo.seed_snapshot(RegionSnapshot {
            region_code: region.to_string(),
            region_name: regions::display_name(region),
            base_layer: format!("{region} Базовый слой\nВсего BS: {total}\n"),
            non_priority: String::new(),
            stats,
            generated_at: Utc::now(),
            is_mock: false,
        });
        repo
    }

    #[tokio::test]
    async fn current_snapshot_serves_stored_data() {
        let repo = seeded_repo("KAZ", 100, 7);
        let snapshot = current_snapshot(&repo, &test_config(), "KAZ").await;
        assert!(!snapshot.is_mock);
        assert_eq!(snapshot.stats.total_bs, 100);
    }

    #[tokio::test]
    async fn current_snapshot_falls_back_to_mock() {
        let repo = LocalRepository::new();
        let snapshot = current_snapshot(&repo, &test_config(), "ZZZ").await;
        assert!(snapshot.is_mock);
        assert_eq!(snapshot.region_name, "Регион ZZZ");
    }

    #[tokio::test]
    async fn current_snapshot_respects_debounce() {
        let repo = seeded_repo("KAZ", 100, 7);
        current_snapshot(&repo, &test_config(), "KAZ").await;
        current_snapshot(&repo, &test_config(), "KAZ").await;
        assert_eq!(repo.history_len("KAZ"), 1);
    }

    #[tokio::test]
    async fn refresh_bypasses_debounce() {
        let repo = seeded_repo("KAZ", 100, 7);
        current_snapshot(&repo, &test_config(), "KAZ").await;
        refresh_snapshot(&repo, &test_config(), "KAZ").await;
        refresh_snapshot(&repo, &test_config(), "KAZ").await;
        assert_eq!(repo.history_len("KAZ"), 3);
    }

    #[tokio::test]
    async fn empty_log_synthesizes_full_day() {
        let repo = LocalRepository::new();
        let narrow = region_history(&repo, &test_config(), "BRT", 0).await;
        let wide = region_history(&repo, &test_config(), "BRT", 24).await;
        assert!(narrow.len() <= wide.len());
        assert!(wide.iter().all(|e| e.is_mock));
    }

    #[tokio::test]
    async fn huge_hours_window_saturates_instead_of_overflowing() {
        let repo = seeded_repo("KAZ", 100, 7);
        refresh_snapshot(&repo, &test_config(), "KAZ").await;
        let entries = region_history(&repo, &test_config(), "KAZ", u32::MAX).await;
        assert_eq!(entries.len(), 1);
        assert!(!entries[0].is_mock);
    }

    #[tokio::test]
    async fn windowed_history_never_grows_when_narrowed() {
        let repo = seeded_repo("KAZ", 100, 7);
        refresh_snapshot(&repo, &test_config(), "KAZ").await;
        let narrow = region_history(&repo, &test_config(), "KAZ", 0).await;
        let wide = region_history(&repo, &test_config(), "KAZ", 24).await;
        assert!(narrow.len() <= wide.len());
        assert_eq!(wide.len(), 1);
        assert!(!wide[0].is_mock);
    }
}
