//! Availability report building over named base-station records.
//!
//! The upstream feed used to be consumed as positional SQL tuples
//! (`row[3]`, `row[30]`, ...). That fragility stops at this boundary: the
//! data-access layer maps whatever it reads into [`BaseStationRecord`] and
//! everything below works with named fields.
//!
//! Report texts keep the exact human-readable shape the mobile client
//! already renders: a numbered base-layer outage list with power/visit/WO
//! lines, POWER totals, priority sections, and per-technology
//! "Недоступно ..." lists.

use std::collections::HashSet;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::api::{RegionSnapshot, RegionStats};
use crate::regions;

/// Regions where the LTE2300 band is not deployed; their reports skip the
/// LTE2300 section entirely.
pub const LTE2300_EXCLUDED: &[&str] = &[
    "ROS", "STV", "KRA", "VLG", "CNT", "NEA", "NWS", "SEA", "SWS",
];

/// One base station as seen in the availability feed, with every flag the
/// report cares about spelled out by name.
#[derive(Debug, Clone, Default)]
pub struct BaseStationRecord {
    pub hostname: String,
    /// Technology named in the base-layer outage, when the station is down
    /// on the priority layer
    pub base_layer_tech: Option<String>,
    /// Down-flag on the base (priority) layer
    pub base_layer_down: bool,
    pub power_ok: bool,
    pub visited: bool,
    /// Open work order identifier, if any
    pub work_order: Option<String>,
    /// Active alarm kind (`POWER` is the one the report counts)
    pub alarm: Option<String>,
    /// When the active alarm started, as reported by the feed
    pub alarm_since: Option<String>,
    /// Restoration priority from the alarm map (3, 9 or 10)
    pub priority: Option<u8>,
    // Per-technology availability; false = technology down on this station
    pub wcdma_ok: bool,
    pub lte800_ok: bool,
    pub lte1800_ok: bool,
    pub lte2100_ok: bool,
    pub lte2300_ok: bool,
    pub lte2600_ok: bool,
}

impl BaseStationRecord {
    /// A fully healthy station, useful as a baseline in tests and mocks.
    pub fn healthy(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            power_ok: true,
            visited: false,
            wcdma_ok: true,
            lte800_ok: true,
            lte1800_ok: true,
            lte2100_ok: true,
            lte2300_ok: true,
            lte2600_ok: true,
            ..Default::default()
        }
    }

    fn in_base_layer_report(&self) -> bool {
        self.base_layer_down || self.base_layer_tech.is_some()
    }

    fn has_power_problem(&self) -> bool {
        !self.power_ok && self.alarm.as_deref() == Some("POWER")
    }
}

/// An open site visit registration.
#[derive(Debug, Clone)]
pub struct VisitRecord {
    pub hostname: String,
    /// Visit kind; `f gen` (field generator) visits are counted separately
    pub visit_kind: Option<String>,
}

fn yes_no(v: bool) -> &'static str {
    if v {
        "Да"
    } else {
        "Нет"
    }
}

/// Deduplicate records by hostname keeping the first occurrence, matching
/// the feed's join behavior where one station shows up once per joined row.
fn dedup_stations(stations: &[BaseStationRecord]) -> Vec<&BaseStationRecord> {
    let mut seen = HashSet::new();
    stations
        .iter()
        .filter(|s| seen.insert(s.hostname.as_str()))
        .collect()
}

/// Build a complete snapshot (both report texts plus stats) for a region.
pub fn build_snapshot(
    region_code: &str,
    stations: &[BaseStationRecord],
    visits: &[VisitRecord],
    now: DateTime<Utc>,
) -> RegionSnapshot {
    let header_time = now.format("%d.%m.%Y %H:%M:");
    let unique = dedup_stations(stations);
    let total_bs = unique.len() as u32;

    // Base layer message
    let mut base_layer = format!("{region_code} Базовый слой {header_time}\n\n");
    let mut base_layer_count = 0u32;
    for station in &unique {
        if station.in_base_layer_report() {
            base_layer_count += 1;
            let tech = station.base_layer_tech.as_deref().unwrap_or("");
            base_layer.push_str(&format!("{base_layer_count}) {} {tech}\n", station.hostname));
            base_layer.push_str(&format!(
                "Power {}; Посещение {}; WO {}\n",
                yes_no(station.power_ok),
                yes_no(station.visited),
                if station.work_order.is_some() {
                    "Есть"
                } else {
                    "Нет"
                },
            ));
        }
    }

    let power_problems = unique.iter().filter(|s| s.has_power_problem()).count() as u32;

    base_layer.push_str(&format!(
        "\nВсего активных POWER на сети: {power_problems}\n"
    ));
    base_layer.push_str(&format!("Всего BS: {total_bs}\n"));
    base_layer.push_str(&format!("Базовый слой: {base_layer_count}/{total_bs}\n"));

    // Priority sections, highest first
    for prio in [10u8, 9, 3] {
        let mut header_written = false;
        for station in &unique {
            if station.priority == Some(prio) && station.alarm.as_deref() == Some("POWER") {
                if !header_written {
                    base_layer.push_str(&format!("\n{prio} приоритет:\n"));
                    header_written = true;
                }
                base_layer.push_str(&format!(
                    "- {}; wo {};Время {}\n",
                    station.hostname,
                    if station.work_order.is_some() {
                        "Есть"
                    } else {
                        "Нет"
                    },
                    station.alarm_since.as_deref().unwrap_or(""),
                ));
            }
        }
    }

    // Open visit registrations
    base_layer.push_str("\nОткрытые посещения:\n");
    let mut seen_visits = HashSet::new();
    let mut open_visits = 0u32;
    let mut gen_visits = 0u32;
    for visit in visits {
        if !seen_visits.insert(visit.hostname.as_str()) {
            continue;
        }
        if let Some(kind) = &visit.visit_kind {
            open_visits += 1;
            if kind == "f gen" {
                gen_visits += 1;
            }
        }
    }
    base_layer.push_str(&format!("Открыто всего посещений: {open_visits}\n"));
    base_layer.push_str(&format!("Открыто регистраций f gen: {gen_visits}\n"));

    // Non-priority technologies message
    let mut non_priority = format!("{region_code} Неприоритетные технологии {header_time}\n\n");
    let mut any_tech_down = false;

    let mut sections: Vec<(&str, fn(&BaseStationRecord) -> bool)> = vec![
        ("LTE1800", |s| !s.lte1800_ok),
        ("3G", |s| !s.wcdma_ok),
        ("LTE800", |s| !s.lte800_ok),
        ("LTE2600", |s| !s.lte2600_ok),
        ("LTE2100", |s| !s.lte2100_ok),
    ];
    if !LTE2300_EXCLUDED.contains(&region_code) {
        sections.push(("LTE2300", |s| !s.lte2300_ok));
    }

    for (tech, down) in &sections {
        let mut count = 0u32;
        for station in &unique {
            if down(station) {
                if count == 0 {
                    non_priority.push_str(&format!("Недоступно {tech}:\n"));
                }
                count += 1;
                non_priority.push_str(&format!("{count}) {}\n", station.hostname));
            }
        }
        if count > 0 {
            any_tech_down = true;
        }
    }
    if !any_tech_down {
        non_priority.push_str("✅ Все технологии доступны\n");
    }

    let stats = RegionStats {
        total_bs,
        base_layer_count,
        power_problems,
        non_priority_percentage: non_priority_percentage(base_layer_count, total_bs),
    };

    RegionSnapshot {
        region_code: region_code.to_string(),
        region_name: regions::display_name(region_code),
        base_layer,
        non_priority,
        stats,
        generated_at: now,
        is_mock: false,
    }
}

/// Legacy share formula carried over from the feed: `100 - trunc(x/y*100)`.
///
/// Stored snapshots are not validated, so an inverted ratio (count above
/// the total) must clamp to zero instead of underflowing.
pub fn non_priority_percentage(base_layer_count: u32, total_bs: u32) -> u32 {
    if total_bs == 0 {
        return 0;
    }
    let share = u64::from(base_layer_count) * 100 / u64::from(total_bs);
    100 - share.min(100) as u32
}

fn stats_regexes() -> &'static (Regex, Regex, Regex) {
    static RE: OnceLock<(Regex, Regex, Regex)> = OnceLock::new();
    RE.get_or_init(|| {
        (
            Regex::new(r"Всего BS:\s*(\d+)").expect("static regex"),
            Regex::new(r"Базовый слой:\s*(\d+)/(\d+)").expect("static regex"),
            Regex::new(r"Всего активных POWER на сети:\s*(\d+)").expect("static regex"),
        )
    })
}

/// Recover stats from a base-layer report text.
///
/// Older snapshot files carry only the report texts with no `stats` object;
/// this pulls the counters back out of the text the same way the mobile
/// client's backend used to.
pub fn parse_stats(base_layer_text: &str) -> RegionStats {
    let (re_total, re_base, re_power) = stats_regexes();

    let mut total_bs = re_total
        .captures(base_layer_text)
        .and_then(|c| c[1].parse().ok())
        .unwrap_or(0u32);

    let mut base_layer_count = 0u32;
    if let Some(c) = re_base.captures(base_layer_text) {
        base_layer_count = c[1].parse().unwrap_or(0);
        if total_bs == 0 {
            total_bs = c[2].parse().unwrap_or(0);
        }
    }

    let power_problems = re_power
        .captures(base_layer_text)
        .and_then(|c| c[1].parse().ok())
        .unwrap_or(0u32);

    RegionStats {
        total_bs,
        base_layer_count,
        power_problems,
        non_priority_percentage: non_priority_percentage(base_layer_count, total_bs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn down_station(host: &str, tech: &str) -> BaseStationRecord {
        BaseStationRecord {
            base_layer_tech: Some(tech.to_string()),
            base_layer_down: true,
            ..BaseStationRecord::healthy(host)
        }
    }

    #[test]
    fn snapshot_counts_unique_stations() {
        let mut stations = vec![
            down_station("BS001", "LTE800"),
            BaseStationRecord::healthy("BS002"),
            BaseStationRecord::healthy("BS003"),
        ];
        // Joined feeds repeat a hostname once per matched row
        stations.push(down_station("BS001", "LTE800"));

        let snap = build_snapshot("KAZ", &stations, &[], Utc::now());
        assert_eq!(snap.stats.total_bs, 3);
        assert_eq!(snap.stats.base_layer_count, 1);
        assert!(snap.base_layer.contains("Всего BS: 3"));
        assert!(snap.base_layer.contains("Базовый слой: 1/3"));
        assert!(!snap.is_mock);
    }

    #[test]
    fn power_problems_require_power_alarm() {
        let mut no_power = BaseStationRecord::healthy("BS010");
        no_power.power_ok = false;
        no_power.alarm = Some("POWER".to_string());

        let mut other_alarm = BaseStationRecord::healthy("BS011");
        other_alarm.power_ok = false;
        other_alarm.alarm = Some("TRANSPORT".to_string());

        let snap = build_snapshot("KAZ", &[no_power, other_alarm], &[], Utc::now());
        assert_eq!(snap.stats.power_problems, 1);
        assert!(snap
            .base_layer
            .contains("Всего активных POWER на сети: 1"));
    }

    #[test]
    fn priority_sections_appear_once() {
        let mut s1 = BaseStationRecord::healthy("BS020");
        s1.priority = Some(10);
        s1.alarm = Some("POWER".to_string());
        let mut s2 = BaseStationRecord::healthy("BS021");
        s2.priority = Some(10);
        s2.alarm = Some("POWER".to_string());

        let snap = build_snapshot("KAZ", &[s1, s2], &[], Utc::now());
        assert_eq!(snap.base_layer.matches("10 приоритет:").count(), 1);
        assert!(snap.base_layer.contains("- BS020;"));
        assert!(snap.base_layer.contains("- BS021;"));
    }

    #[test]
    fn lte2300_skipped_for_excluded_regions() {
        let mut station = BaseStationRecord::healthy("BS030");
        station.lte2300_ok = false;

        let moscow = build_snapshot("CNT", &[station.clone()], &[], Utc::now());
        assert!(!moscow.non_priority.contains("LTE2300"));

        let siberia = build_snapshot("NSK", &[station], &[], Utc::now());
        assert!(siberia.non_priority.contains("Недоступно LTE2300:"));
    }

    #[test]
    fn all_clear_marker_when_no_tech_down() {
        let snap = build_snapshot(
            "KAZ",
            &[BaseStationRecord::healthy("BS040")],
            &[],
            Utc::now(),
        );
        assert!(snap.non_priority.contains("Все технологии доступны"));
    }

    #[test]
    fn visit_counters() {
        let visits = vec![
            VisitRecord {
                hostname: "BS050".into(),
                visit_kind: Some("f gen".into()),
            },
            VisitRecord {
                hostname: "BS051".into(),
                visit_kind: Some("works".into()),
            },
            VisitRecord {
                hostname: "BS052".into(),
                visit_kind: None,
            },
            // duplicate registration rows for the same site collapse
            VisitRecord {
                hostname: "BS050".into(),
                visit_kind: Some("f gen".into()),
            },
        ];
        let snap = build_snapshot("KAZ", &[], &visits, Utc::now());
        assert!(snap.base_layer.contains("Открыто всего посещений: 2"));
        assert!(snap.base_layer.contains("Открыто регистраций f gen: 1"));
    }

    #[test]
    fn parse_stats_recovers_counters() {
        let text = "KAZ Базовый слой 01.01.2026 10:00:\n\n\
                    Всего активных POWER на сети: 4\n\
                    Всего BS: 120\n\
                    Базовый слой: 110/120\n";
        let stats = parse_stats(text);
        assert_eq!(stats.total_bs, 120);
        assert_eq!(stats.base_layer_count, 110);
        assert_eq!(stats.power_problems, 4);
        assert_eq!(stats.non_priority_percentage, 100 - 110 * 100 / 120);
    }

    #[test]
    fn parse_stats_inverted_ratio_clamps_to_zero() {
        // Legacy files are decoded without validation; a count above the
        // total must not underflow the share
        assert_eq!(non_priority_percentage(110, 100), 0);
        let stats = parse_stats("Всего BS: 100\nБазовый слой: 110/100\n");
        assert_eq!(stats.base_layer_count, 110);
        assert_eq!(stats.non_priority_percentage, 0);
    }

    #[test]
    fn parse_stats_total_falls_back_to_ratio_denominator() {
        let stats = parse_stats("Базовый слой: 95/100\n");
        assert_eq!(stats.total_bs, 100);
        assert_eq!(stats.base_layer_count, 95);
    }

    #[test]
    fn parse_stats_empty_text_is_zeroed() {
        let stats = parse_stats("нет данных");
        assert_eq!(stats, RegionStats::default());
    }
}
