//! Lenient decoding of collector-published JSON.
//!
//! Snapshot and history files exist in several vintages: some carry a
//! `stats` object, some only the report texts; timestamps are either
//! RFC 3339 or the collector's naive local format. The file and GitHub
//! backends both read these shapes, so the tolerant raw types live here.

use chrono::{DateTime, NaiveDateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::{HistoryEntry, RegionSnapshot, RegionStats};
use crate::regions;
use crate::report;

/// Accept RFC 3339 or the collector's naive `%Y-%m-%d %H:%M:%S` format
/// (treated as UTC).
pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

/// History documents come either wrapped (`{"history": [...]}`) or as a
/// bare array, depending on the collector version.
pub(crate) fn unwrap_history(value: Value) -> Vec<RawHistoryEntry> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("history") {
            Some(Value::Array(items)) => items,
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };
    items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect()
}

/// Snapshot document as found on disk or on the remote host; every field
/// the older formats may omit is optional.
#[derive(Debug, Deserialize)]
pub(crate) struct RawSnapshot {
    #[serde(default)]
    region_name: Option<String>,
    #[serde(default)]
    base_layer: String,
    #[serde(default)]
    non_priority: String,
    #[serde(default)]
    stats: Option<RegionStats>,
    #[serde(default)]
    generated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    is_mock: bool,
}

impl RawSnapshot {
    /// Fill in the gaps: stats recovered from the report text when absent,
    /// display name from the static table, timestamp defaulting to now.
    pub(crate) fn into_snapshot(self, code: &str) -> RegionSnapshot {
        let stats = self
            .stats
            .unwrap_or_else(|| report::parse_stats(&self.base_layer));
        RegionSnapshot {
            region_code: code.to_string(),
            region_name: self
                .region_name
                .unwrap_or_else(|| regions::display_name(code)),
            base_layer: self.base_layer,
            non_priority: self.non_priority,
            stats,
            generated_at: self.generated_at.unwrap_or_else(Utc::now),
            is_mock: self.is_mock,
        }
    }
}

/// History entry as serialized by any collector version.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct RawHistoryEntry {
    #[serde(default)]
    region_code: Option<String>,
    #[serde(default)]
    base_layer_count: u32,
    #[serde(default)]
    total_bs_count: u32,
    #[serde(default)]
    power_problems: u32,
    #[serde(default)]
    non_priority_percentage: u32,
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
}

impl RawHistoryEntry {
    /// Decode into a domain entry; entries without a parseable timestamp
    /// are dropped (with a warning) rather than failing the whole read.
    pub(crate) fn into_entry(self, code: &str) -> Option<HistoryEntry> {
        let raw_ts = self.timestamp.as_deref()?;
        let Some(timestamp) = parse_timestamp(raw_ts) else {
            warn!("Skipping history entry with unparseable timestamp '{raw_ts}'");
            return None;
        };
        let created_at = self
            .created_at
            .as_deref()
            .and_then(parse_timestamp)
            .unwrap_or(timestamp);
        Some(HistoryEntry {
            region_code: self.region_code.unwrap_or_else(|| code.to_string()),
            base_layer_count: self.base_layer_count,
            total_bs_count: self.total_bs_count,
            power_problems: self.power_problems,
            non_priority_percentage: self.non_priority_percentage,
            timestamp,
            created_at,
            is_mock: false,
        })
    }
}

impl From<&HistoryEntry> for RawHistoryEntry {
    fn from(entry: &HistoryEntry) -> Self {
        Self {
            region_code: Some(entry.region_code.clone()),
            base_layer_count: entry.base_layer_count,
            total_bs_count: entry.total_bs_count,
            power_problems: entry.power_problems,
            non_priority_percentage: entry.non_priority_percentage,
            timestamp: Some(entry.timestamp.to_rfc3339()),
            created_at: Some(entry.created_at.to_rfc3339()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_parse_both_formats() {
        assert!(parse_timestamp("2026-08-30T10:00:00Z").is_some());
        assert!(parse_timestamp("2026-08-30 10:00:00").is_some());
        assert!(parse_timestamp("teatime").is_none());
    }

    #[test]
    fn legacy_snapshot_recovers_stats_from_text() {
        let raw: RawSnapshot = serde_json::from_value(serde_json::json!({
            "region_name": "Казань",
            "base_layer": "KAZ Базовый слой\n\nВсего BS: 100\nБазовый слой: 95/100\n",
            "non_priority": "",
        }))
        .unwrap();
        let snapshot = raw.into_snapshot("KAZ");
        assert_eq!(snapshot.stats.total_bs, 100);
        assert_eq!(snapshot.stats.base_layer_count, 95);
        assert_eq!(snapshot.region_name, "Казань");
    }

    #[test]
    fn history_unwraps_both_layouts() {
        let wrapped = serde_json::json!({"history": [{"timestamp": "2026-08-30 10:00:00"}]});
        let bare = serde_json::json!([{"timestamp": "2026-08-30 10:00:00"}]);
        assert_eq!(unwrap_history(wrapped).len(), 1);
        assert_eq!(unwrap_history(bare).len(), 1);
        assert!(unwrap_history(serde_json::json!("nope")).is_empty());
    }

    #[test]
    fn unparseable_timestamps_are_dropped() {
        let raw: RawHistoryEntry =
            serde_json::from_value(serde_json::json!({"timestamp": "когда-то"})).unwrap();
        assert!(raw.into_entry("KAZ").is_none());
    }

    #[test]
    fn history_round_trip_preserves_counters() {
        let entry = HistoryEntry {
            region_code: "KAZ".into(),
            base_layer_count: 95,
            total_bs_count: 100,
            power_problems: 2,
            non_priority_percentage: 5,
            timestamp: Utc::now(),
            created_at: Utc::now(),
            is_mock: false,
        };
        let raw = RawHistoryEntry::from(&entry);
        let back = raw.into_entry("KAZ").unwrap();
        assert_eq!(back.base_layer_count, 95);
        assert_eq!(back.total_bs_count, 100);
    }
}
