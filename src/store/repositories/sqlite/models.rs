//! Row types for the SQLite history table.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use super::schema::region_history;
use crate::api::HistoryEntry;

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = region_history)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RegionHistoryRow {
    #[allow(dead_code)] // surrogate key, never read back
    pub id: i32,
    pub region_code: String,
    pub base_layer_count: i32,
    pub total_bs_count: i32,
    pub power_problems: i32,
    pub non_priority_percentage: i32,
    pub timestamp: NaiveDateTime,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = region_history)]
pub struct NewRegionHistoryRow {
    pub region_code: String,
    pub base_layer_count: i32,
    pub total_bs_count: i32,
    pub power_problems: i32,
    pub non_priority_percentage: i32,
    pub timestamp: NaiveDateTime,
    pub created_at: NaiveDateTime,
}

impl From<&HistoryEntry> for NewRegionHistoryRow {
    fn from(entry: &HistoryEntry) -> Self {
        Self {
            region_code: entry.region_code.clone(),
            base_layer_count: entry.base_layer_count as i32,
            total_bs_count: entry.total_bs_count as i32,
            power_problems: entry.power_problems as i32,
            non_priority_percentage: entry.non_priority_percentage as i32,
            timestamp: entry.timestamp.naive_utc(),
            created_at: entry.created_at.naive_utc(),
        }
    }
}

impl From<RegionHistoryRow> for HistoryEntry {
    fn from(row: RegionHistoryRow) -> Self {
        Self {
            region_code: row.region_code,
            base_layer_count: row.base_layer_count.max(0) as u32,
            total_bs_count: row.total_bs_count.max(0) as u32,
            power_problems: row.power_problems.max(0) as u32,
            non_priority_percentage: row.non_priority_percentage.max(0) as u32,
            timestamp: row.timestamp.and_utc(),
            created_at: row.created_at.and_utc(),
            is_mock: false,
        }
    }
}
