//! Mock data generation.
//!
//! When no backing store has data for a region (or the store is down) the
//! service layer answers with plausible synthesized data instead of an
//! error. Everything produced here is marked `is_mock` so clients can tell
//! the difference.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use rand::Rng;

use crate::api::{HistoryEntry, RegionSnapshot};
use crate::regions;
use crate::report::{self, BaseStationRecord, VisitRecord};

/// Display name for a region, `Регион <CODE>` when the code is unknown.
pub fn mock_region_name(region_code: &str) -> String {
    match regions::lookup(region_code) {
        Some(region) => region.name,
        None => format!("Регион {region_code}"),
    }
}

/// Synthesize a current snapshot for a region.
///
/// Counts are randomized but plausible: 50-150 stations with a handful of
/// base-layer outages and a few open POWER alarms. The report texts are
/// produced by the regular report builder so they have the same shape as
/// real ones.
pub fn mock_snapshot(region_code: &str, now: DateTime<Utc>) -> RegionSnapshot {
    let mut rng = rand::rng();
    let total_bs: u32 = rng.random_range(50..=150);
    let down: u32 = rng.random_range(total_bs / 20..=total_bs / 8);
    let power: u32 = rng.random_range(0..=down.min(10));

    let mut stations = Vec::with_capacity(total_bs as usize);
    for i in 0..total_bs {
        let mut station = BaseStationRecord::healthy(format!("{region_code}-BS{:04}", i + 1));
        if i < down {
            station.base_layer_down = true;
            station.base_layer_tech = Some("LTE800".to_string());
            if i < power {
                station.power_ok = false;
                station.alarm = Some("POWER".to_string());
                station.alarm_since = Some(now.format("%d.%m.%Y %H:%M").to_string());
                station.priority = Some(if i % 2 == 0 { 10 } else { 9 });
            }
        }
        stations.push(station);
    }

    let visits: Vec<VisitRecord> = Vec::new();
    let mut snapshot = report::build_snapshot(region_code, &stations, &visits, now);
    snapshot.region_name = mock_region_name(region_code);
    snapshot.is_mock = true;
    snapshot
}

/// Synthesize `count` hourly history entries ending at `now`, newest first.
///
/// Used only when a region has no recorded history at all.
pub fn mock_history(region_code: &str, count: usize, now: DateTime<Utc>) -> Vec<HistoryEntry> {
    let mut rng = rand::rng();
    let total_bs: u32 = rng.random_range(50..=150);

    (0..count)
        .map(|i| {
            let timestamp = now - ChronoDuration::hours(i as i64);
            let base_layer_count = rng.random_range(total_bs / 20..=total_bs / 8);
            HistoryEntry {
                region_code: region_code.to_string(),
                base_layer_count,
                total_bs_count: total_bs,
                power_problems: rng.random_range(0..=base_layer_count.min(10)),
                non_priority_percentage: report::non_priority_percentage(
                    base_layer_count,
                    total_bs,
                ),
                timestamp,
                created_at: timestamp,
                is_mock: true,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_snapshot_is_marked_and_consistent() {
        let now = Utc::now();
        let snapshot = mock_snapshot("KAZ", now);
        assert!(snapshot.is_mock);
        assert_eq!(snapshot.region_code, "KAZ");
        assert!(snapshot.stats.total_bs >= 50 && snapshot.stats.total_bs <= 150);
        assert!(snapshot.stats.base_layer_count <= snapshot.stats.total_bs);
        assert!(snapshot.base_layer.contains("Всего BS:"));
    }

    #[test]
    fn unknown_region_gets_generic_name() {
        let snapshot = mock_snapshot("ZZZ", Utc::now());
        assert_eq!(snapshot.region_name, "Регион ZZZ");
        let known = mock_snapshot("KAZ", Utc::now());
        assert_ne!(known.region_name, "Регион KAZ");
    }

    #[test]
    fn mock_history_is_hourly_newest_first() {
        let now = Utc::now();
        let entries = mock_history("BRT", 24, now);
        assert_eq!(entries.len(), 24);
        assert_eq!(entries[0].timestamp, now);
        assert!(entries.windows(2).all(|w| w[0].timestamp > w[1].timestamp));
        assert!(entries.iter().all(|e| e.is_mock));
    }
}
