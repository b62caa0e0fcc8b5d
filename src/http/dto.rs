//! Request and response shapes for the REST API.
//!
//! Every success body carries `success: true`; failures go through
//! [`super::error::ApiError`] with `success: false` plus a stable code.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{HistoryEntry, Region, RegionSnapshot, RegionStats};

/// Stats block embedded in snapshot and history bodies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsDto {
    pub total_bs: u32,
    pub base_layer_count: u32,
    pub base_layer_percentage: u32,
    pub power_problems: u32,
    pub non_priority_percentage: u32,
}

impl From<&RegionStats> for StatsDto {
    fn from(stats: &RegionStats) -> Self {
        Self {
            total_bs: stats.total_bs,
            base_layer_count: stats.base_layer_count,
            base_layer_percentage: stats.base_layer_percentage(),
            power_problems: stats.power_problems,
            non_priority_percentage: stats.non_priority_percentage,
        }
    }
}

/// GET /api/region/{code} and POST /api/region/{code}/refresh body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotResponse {
    pub success: bool,
    pub region_code: String,
    pub region_name: String,
    pub base_layer: String,
    pub non_priority: String,
    pub stats: StatsDto,
    pub generated_at: DateTime<Utc>,
    pub is_mock: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forced_refresh: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_timestamp: Option<DateTime<Utc>>,
}

impl SnapshotResponse {
    pub fn from_snapshot(snapshot: RegionSnapshot) -> Self {
        Self {
            success: true,
            stats: StatsDto::from(&snapshot.stats),
            region_code: snapshot.region_code,
            region_name: snapshot.region_name,
            base_layer: snapshot.base_layer,
            non_priority: snapshot.non_priority,
            generated_at: snapshot.generated_at,
            is_mock: snapshot.is_mock,
            forced_refresh: None,
            refresh_timestamp: None,
        }
    }

    pub fn forced(snapshot: RegionSnapshot, refreshed_at: DateTime<Utc>) -> Self {
        let mut response = Self::from_snapshot(snapshot);
        response.forced_refresh = Some(true);
        response.refresh_timestamp = Some(refreshed_at);
        response
    }
}

/// One history row in API bodies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntryDto {
    pub timestamp: DateTime<Utc>,
    pub stats: StatsDto,
    pub is_mock: bool,
}

impl From<&HistoryEntry> for HistoryEntryDto {
    fn from(entry: &HistoryEntry) -> Self {
        Self {
            timestamp: entry.timestamp,
            stats: StatsDto::from(&entry.stats()),
            is_mock: entry.is_mock,
        }
    }
}

/// Query string for GET /api/region/{code}/history.
///
/// `hours` stays a string so a malformed value maps to the 400 envelope
/// instead of axum's bare rejection text.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub hours: Option<String>,
}

/// GET /api/region/{code}/history body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub success: bool,
    pub region_code: String,
    pub hours: u32,
    pub count: usize,
    pub history: Vec<HistoryEntryDto>,
}

/// GET /api/region/{code}/history/{timestamp} body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearestEntryResponse {
    pub success: bool,
    pub region_code: String,
    pub requested_at: DateTime<Utc>,
    pub entry: HistoryEntryDto,
}

/// GET /api/regions body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionListResponse {
    pub success: bool,
    pub count: usize,
    pub regions: Vec<Region>,
}

/// POST /api/auth/login success body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    pub username: String,
    pub verified_by: String,
}

/// GET /api/auth/health body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthHealthResponse {
    pub success: bool,
    pub verifiers: Vec<String>,
    /// `None` when no LDAP gateway is configured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_reachable: Option<bool>,
}

/// GET /api/test body: liveness plus a config echo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResponse {
    pub success: bool,
    pub status: String,
    pub version: String,
    pub backend: String,
    pub history_limit: usize,
    pub history_debounce_secs: u64,
}

/// GET /api/test-db body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreHealthResponse {
    pub success: bool,
    pub backend: String,
    pub connected: bool,
}

/// GET /api/health body: aggregate service health.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub success: bool,
    pub status: String,
    pub version: String,
    pub store: StoreHealthResponse,
    pub auth: AuthHealthResponse,
}
