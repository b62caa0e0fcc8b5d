//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! service layer for business logic.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, TimeZone, Utc};

use super::dto::{
    AuthHealthResponse, HealthResponse, HistoryEntryDto, HistoryQuery, HistoryResponse,
    LoginResponse, NearestEntryResponse, RegionListResponse, SnapshotResponse,
    StoreHealthResponse, TestResponse,
};
use super::error::AppError;
use super::state::AppState;
use crate::api::Credentials;
use crate::service;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

const DEFAULT_HISTORY_HOURS: u32 = 24;

/// Region codes are case-insensitive at the API boundary.
fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

// =============================================================================
// Liveness and store health
// =============================================================================

/// GET /api/test
///
/// Liveness probe with a version and config echo.
pub async fn test(State(state): State<AppState>) -> HandlerResult<TestResponse> {
    Ok(Json(TestResponse {
        success: true,
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend: state.repository.backend_name().to_string(),
        history_limit: state.config.history_limit,
        history_debounce_secs: state.config.history_debounce.as_secs(),
    }))
}

/// GET /api/test-db
///
/// Repository reachability check. A down store answers 200 with
/// `connected: false` rather than an error status.
pub async fn test_db(State(state): State<AppState>) -> HandlerResult<StoreHealthResponse> {
    let connected = service::health_check(state.repository.as_ref())
        .await
        .unwrap_or(false);
    Ok(Json(StoreHealthResponse {
        success: true,
        backend: state.repository.backend_name().to_string(),
        connected,
    }))
}

// =============================================================================
// Region snapshots
// =============================================================================

/// GET /api/region/{code}
///
/// Current snapshot for a region; unknown regions and store outages are
/// answered with mock data, never an error status.
pub async fn get_region(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> HandlerResult<SnapshotResponse> {
    let code = normalize_code(&code);
    let snapshot =
        service::current_snapshot(state.repository.as_ref(), &state.config, &code).await;
    Ok(Json(SnapshotResponse::from_snapshot(snapshot)))
}

/// POST /api/region/{code}/refresh
///
/// Forced re-fetch: always appends a history entry, bypassing the
/// write debounce.
pub async fn refresh_region(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> HandlerResult<SnapshotResponse> {
    let code = normalize_code(&code);
    let refreshed =
        service::refresh_snapshot(state.repository.as_ref(), &state.config, &code).await;
    Ok(Json(SnapshotResponse::forced(
        refreshed.snapshot,
        refreshed.refresh_timestamp,
    )))
}

// =============================================================================
// History
// =============================================================================

/// GET /api/region/{code}/history?hours=N
///
/// History window, newest first, capped at the configured limit.
/// Defaults to the last 24 hours.
pub async fn get_region_history(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> HandlerResult<HistoryResponse> {
    let code = normalize_code(&code);
    let hours = match query.hours.as_deref() {
        None | Some("") => DEFAULT_HISTORY_HOURS,
        Some(raw) => raw
            .parse::<u32>()
            .map_err(|_| AppError::BadRequest(format!("invalid hours value: {raw}")))?,
    };

    let entries = service::region_history(state.repository.as_ref(), &state.config, &code, hours)
        .await;
    let history: Vec<HistoryEntryDto> = entries.iter().map(HistoryEntryDto::from).collect();
    Ok(Json(HistoryResponse {
        success: true,
        region_code: code,
        hours,
        count: history.len(),
        history,
    }))
}

/// GET /api/region/{code}/history/{timestamp}
///
/// The recorded entry closest to a timestamp, which may be given as
/// RFC 3339 or as unix seconds.
pub async fn get_region_history_at(
    State(state): State<AppState>,
    Path((code, timestamp)): Path<(String, String)>,
) -> HandlerResult<NearestEntryResponse> {
    let code = normalize_code(&code);
    let at = parse_timestamp_param(&timestamp)
        .ok_or_else(|| AppError::BadRequest(format!("invalid timestamp: {timestamp}")))?;

    let entry = service::snapshot_at(state.repository.as_ref(), &code, at)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no history recorded for {code}")))?;

    Ok(Json(NearestEntryResponse {
        success: true,
        region_code: code,
        requested_at: at,
        entry: HistoryEntryDto::from(&entry),
    }))
}

fn parse_timestamp_param(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    let seconds: i64 = raw.parse().ok()?;
    Utc.timestamp_opt(seconds, 0).single()
}

// =============================================================================
// Regions
// =============================================================================

/// GET /api/regions
///
/// The static region table with macro-region grouping.
pub async fn list_regions() -> HandlerResult<RegionListResponse> {
    let regions = service::list_regions();
    Ok(Json(RegionListResponse {
        success: true,
        count: regions.len(),
        regions,
    }))
}

// =============================================================================
// Authentication
// =============================================================================

/// POST /api/auth/login
///
/// Run the credential chain. 401 on rejection; 503 only when no
/// verifier succeeded and the backend was unreachable.
pub async fn login(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> HandlerResult<LoginResponse> {
    let outcome = state.verifiers.verify(&credentials).await?;
    Ok(Json(LoginResponse {
        success: true,
        username: outcome.username,
        verified_by: outcome.verified_by,
    }))
}

/// GET /api/auth/health
///
/// Chain composition plus gateway reachability when one is configured.
pub async fn auth_health(State(state): State<AppState>) -> HandlerResult<AuthHealthResponse> {
    Ok(Json(auth_health_body(&state).await))
}

async fn auth_health_body(state: &AppState) -> AuthHealthResponse {
    AuthHealthResponse {
        success: true,
        verifiers: state
            .verifiers
            .verifier_names()
            .into_iter()
            .map(str::to_string)
            .collect(),
        gateway_reachable: state.verifiers.gateway_health().await,
    }
}

// =============================================================================
// Aggregate health
// =============================================================================

/// GET /api/health
///
/// Aggregate service, store and auth health in one body.
pub async fn health(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let connected = service::health_check(state.repository.as_ref())
        .await
        .unwrap_or(false);
    let store = StoreHealthResponse {
        success: true,
        backend: state.repository.backend_name().to_string(),
        connected,
    };
    let auth = auth_health_body(&state).await;

    let degraded = !connected || auth.gateway_reachable == Some(false);
    Ok(Json(HealthResponse {
        success: true,
        status: if degraded { "degraded" } else { "ok" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store,
        auth,
    }))
}
