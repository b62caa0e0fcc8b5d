//! Core data types shared by the service, storage and HTTP layers.
//!
//! These are plain records: the availability feed has no relational
//! invariants to enforce, so the types stay close to the wire shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A reporting region: short code, display name and macro-region grouping.
///
/// Regions come from the static table in [`crate::regions`] and are never
/// mutated at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    /// Short code used as the primary key everywhere (e.g. `BRT`, `KAZ`)
    pub code: String,
    /// Human-readable display name
    pub name: String,
    /// Macro-region grouping label
    pub macro_region: String,
}

/// Aggregate availability counters for one region at one point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionStats {
    /// Total number of distinct base stations seen in the feed
    pub total_bs: u32,
    /// Base stations currently down on the base (priority) layer
    pub base_layer_count: u32,
    /// Base stations with an active POWER alarm
    pub power_problems: u32,
    /// Share of stations affected only on non-priority technologies
    pub non_priority_percentage: u32,
}

impl RegionStats {
    /// Percentage of the base layer relative to the station total,
    /// rounded to the nearest integer. Zero when no stations are known.
    pub fn base_layer_percentage(&self) -> u32 {
        if self.total_bs == 0 {
            return 0;
        }
        ((self.base_layer_count as f64 / self.total_bs as f64) * 100.0).round() as u32
    }
}

/// One fetched or generated availability report for a region.
///
/// Snapshots are ephemeral: they are produced by whichever backing store is
/// configured (or by the mock generator) and serialized straight out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionSnapshot {
    pub region_code: String,
    pub region_name: String,
    /// Free-text base-layer report
    pub base_layer: String,
    /// Free-text non-priority technology report
    pub non_priority: String,
    pub stats: RegionStats,
    /// When the snapshot was produced
    pub generated_at: DateTime<Utc>,
    /// True when the snapshot was synthesized because no store had data
    #[serde(default)]
    pub is_mock: bool,
}

/// A snapshot's stats pinned to a timestamp, appended to the per-region log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub region_code: String,
    pub base_layer_count: u32,
    pub total_bs_count: u32,
    pub power_problems: u32,
    pub non_priority_percentage: u32,
    /// When the underlying snapshot was taken
    pub timestamp: DateTime<Utc>,
    /// When the row was recorded
    pub created_at: DateTime<Utc>,
    /// True for synthesized entries returned when a region has no log yet
    #[serde(default)]
    pub is_mock: bool,
}

impl HistoryEntry {
    /// Build an entry from a snapshot's stats, stamped `now`.
    pub fn from_stats(region_code: &str, stats: &RegionStats, now: DateTime<Utc>) -> Self {
        Self {
            region_code: region_code.to_string(),
            base_layer_count: stats.base_layer_count,
            total_bs_count: stats.total_bs,
            power_problems: stats.power_problems,
            non_priority_percentage: stats.non_priority_percentage,
            timestamp: now,
            created_at: now,
            is_mock: false,
        }
    }

    /// Same rounding rule as [`RegionStats::base_layer_percentage`].
    pub fn base_layer_percentage(&self) -> u32 {
        if self.total_bs_count == 0 {
            return 0;
        }
        ((self.base_layer_count as f64 / self.total_bs_count as f64) * 100.0).round() as u32
    }

    /// The entry's stats as a [`RegionStats`] record.
    pub fn stats(&self) -> RegionStats {
        RegionStats {
            total_bs: self.total_bs_count,
            base_layer_count: self.base_layer_count,
            power_problems: self.power_problems,
            non_priority_percentage: self.non_priority_percentage,
        }
    }
}

/// Username/password pair submitted to the login endpoint.
///
/// There is no session or token issuance; every request re-authenticates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Result of a successful credential check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthOutcome {
    pub username: String,
    /// Name of the verifier that accepted the credentials
    /// (`admin`, `static`, `ldap-gateway`)
    pub verified_by: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_layer_percentage_rounds_to_nearest() {
        let stats = RegionStats {
            total_bs: 3,
            base_layer_count: 2,
            power_problems: 0,
            non_priority_percentage: 33,
        };
        // 2/3 = 66.67 -> 67, not the truncated 66
        assert_eq!(stats.base_layer_percentage(), 67);
    }

    #[test]
    fn base_layer_percentage_zero_total_is_zero() {
        let stats = RegionStats::default();
        assert_eq!(stats.base_layer_percentage(), 0);
    }

    #[test]
    fn history_entry_round_trips_stats() {
        let stats = RegionStats {
            total_bs: 120,
            base_layer_count: 110,
            power_problems: 4,
            non_priority_percentage: 8,
        };
        let now = Utc::now();
        let entry = HistoryEntry::from_stats("KAZ", &stats, now);
        assert_eq!(entry.stats(), stats);
        assert_eq!(entry.base_layer_percentage(), 92);
        assert!(!entry.is_mock);
    }
}
