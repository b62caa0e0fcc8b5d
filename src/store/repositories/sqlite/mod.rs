//! SQLite history cache backed by Diesel.
//!
//! Plays the same role the local `region_history.db` played next to the
//! live database: snapshots come from elsewhere (this backend answers
//! `None` and lets the service fall back), history is persisted here.

mod models;
mod schema;

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use log::info;
use tokio::task;

use models::{NewRegionHistoryRow, RegionHistoryRow};
use schema::region_history::dsl;

use crate::api::{HistoryEntry, RegionSnapshot};
use crate::store::error::{ErrorContext, StoreError, StoreResult};
use crate::store::repository::{HistoryRepository, SnapshotRepository};

const INIT_SQL: &str = "
CREATE TABLE IF NOT EXISTS region_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    region_code TEXT NOT NULL,
    base_layer_count INTEGER NOT NULL DEFAULT 0,
    total_bs_count INTEGER NOT NULL DEFAULT 0,
    power_problems INTEGER NOT NULL DEFAULT 0,
    non_priority_percentage INTEGER NOT NULL DEFAULT 0,
    timestamp DATETIME NOT NULL,
    created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
);
CREATE INDEX IF NOT EXISTS idx_region_code ON region_history(region_code);
CREATE INDEX IF NOT EXISTS idx_timestamp ON region_history(timestamp);
";

type SqlitePool = Pool<ConnectionManager<SqliteConnection>>;

/// Diesel/SQLite-backed history repository.
#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Open (creating if needed) the database at `path` and ensure the
    /// history table and indexes exist.
    pub fn new(path: &Path) -> StoreResult<Self> {
        let manager = ConnectionManager::<SqliteConnection>::new(path.display().to_string());
        let pool = Pool::builder()
            // SQLite serializes writers anyway; a small pool is plenty
            .max_size(4)
            .build(manager)
            .map_err(|e| {
                StoreError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("open_pool").with_details(path.display().to_string()),
                )
            })?;

        let mut conn = pool.get()?;
        conn.batch_execute(INIT_SQL)
            .map_err(|e| StoreError::from(e).with_operation("init_schema"))?;
        info!("SQLite history database ready at {}", path.display());

        Ok(Self { pool })
    }

    /// Run a blocking Diesel operation on the pool without stalling the
    /// async executor.
    async fn with_conn<T, F>(&self, f: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteConnection) -> StoreResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            f(&mut conn)
        })
        .await
        .map_err(|e| {
            StoreError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new("spawn_blocking"),
            )
        })?
    }
}

#[async_trait]
impl SnapshotRepository for SqliteRepository {
    async fn fetch_snapshot(&self, _region_code: &str) -> StoreResult<Option<RegionSnapshot>> {
        // Snapshots are not stored here; the service layer falls back.
        Ok(None)
    }

    async fn health_check(&self) -> StoreResult<bool> {
        self.with_conn(|conn| {
            diesel::sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(StoreError::from)
        })
        .await
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}

#[async_trait]
impl HistoryRepository for SqliteRepository {
    async fn append_entry(&self, entry: &HistoryEntry) -> StoreResult<()> {
        let row = NewRegionHistoryRow::from(entry);
        self.with_conn(move |conn| {
            diesel::insert_into(dsl::region_history)
                .values(&row)
                .execute(conn)
                .map_err(|e| StoreError::from(e).with_operation("append_entry"))?;
            Ok(())
        })
        .await
    }

    async fn fetch_history(
        &self,
        region_code: &str,
        since: DateTime<Utc>,
        limit: usize,
    ) -> StoreResult<Vec<HistoryEntry>> {
        let code = region_code.to_string();
        let since = since.naive_utc();
        self.with_conn(move |conn| {
            let rows: Vec<RegionHistoryRow> = dsl::region_history
                .filter(dsl::region_code.eq(&code))
                .filter(dsl::timestamp.ge(since))
                .order(dsl::timestamp.desc())
                .limit(limit as i64)
                .select(RegionHistoryRow::as_select())
                .load(conn)
                .map_err(|e| StoreError::from(e).with_operation("fetch_history"))?;
            Ok(rows.into_iter().map(HistoryEntry::from).collect())
        })
        .await
    }

    async fn latest_entry(&self, region_code: &str) -> StoreResult<Option<HistoryEntry>> {
        let code = region_code.to_string();
        self.with_conn(move |conn| {
            let row: Option<RegionHistoryRow> = dsl::region_history
                .filter(dsl::region_code.eq(&code))
                .order(dsl::timestamp.desc())
                .select(RegionHistoryRow::as_select())
                .first(conn)
                .optional()
                .map_err(|e| StoreError::from(e).with_operation("latest_entry"))?;
            Ok(row.map(HistoryEntry::from))
        })
        .await
    }

    async fn nearest_entry(
        &self,
        region_code: &str,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<HistoryEntry>> {
        let code = region_code.to_string();
        let at_naive = at.naive_utc();
        self.with_conn(move |conn| {
            // One candidate from each side of the requested instant
            let before: Option<RegionHistoryRow> = dsl::region_history
                .filter(dsl::region_code.eq(&code))
                .filter(dsl::timestamp.le(at_naive))
                .order(dsl::timestamp.desc())
                .select(RegionHistoryRow::as_select())
                .first(conn)
                .optional()
                .map_err(|e| StoreError::from(e).with_operation("nearest_entry"))?;
            let after: Option<RegionHistoryRow> = dsl::region_history
                .filter(dsl::region_code.eq(&code))
                .filter(dsl::timestamp.gt(at_naive))
                .order(dsl::timestamp.asc())
                .select(RegionHistoryRow::as_select())
                .first(conn)
                .optional()
                .map_err(|e| StoreError::from(e).with_operation("nearest_entry"))?;

            let nearest = [before, after]
                .into_iter()
                .flatten()
                .map(HistoryEntry::from)
                .min_by_key(|e| (e.timestamp - at).num_seconds().abs());
            Ok(nearest)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::RegionStats;
    use chrono::Duration;

    fn repo() -> (tempfile::TempDir, SqliteRepository) {
        let dir = tempfile::tempdir().unwrap();
        let repo = SqliteRepository::new(&dir.path().join("history.db")).unwrap();
        (dir, repo)
    }

    fn entry(code: &str, minutes_ago: i64) -> HistoryEntry {
        let ts = Utc::now() - Duration::minutes(minutes_ago);
        let stats = RegionStats {
            total_bs: 100,
            base_layer_count: 90,
            power_problems: 1,
            non_priority_percentage: 10,
        };
        HistoryEntry::from_stats(code, &stats, ts)
    }

    #[tokio::test]
    async fn append_and_fetch_round_trip() {
        let (_dir, repo) = repo();
        repo.append_entry(&entry("KAZ", 5)).await.unwrap();
        repo.append_entry(&entry("KAZ", 120)).await.unwrap();
        repo.append_entry(&entry("BRT", 5)).await.unwrap();

        let since = Utc::now() - Duration::hours(1);
        let entries = repo.fetch_history("KAZ", since, 100).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].region_code, "KAZ");
        assert_eq!(entries[0].total_bs_count, 100);
    }

    #[tokio::test]
    async fn latest_and_nearest() {
        let (_dir, repo) = repo();
        repo.append_entry(&entry("KAZ", 10)).await.unwrap();
        repo.append_entry(&entry("KAZ", 300)).await.unwrap();

        let latest = repo.latest_entry("KAZ").await.unwrap().unwrap();
        let age = (Utc::now() - latest.timestamp).num_minutes();
        assert!(age < 15, "latest entry is {age} minutes old");

        let at = Utc::now() - Duration::minutes(290);
        let nearest = repo.nearest_entry("KAZ", at).await.unwrap().unwrap();
        let delta = (nearest.timestamp - at).num_minutes().abs();
        assert!(delta <= 15);

        assert!(repo.nearest_entry("XXX", at).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn snapshot_fetch_is_always_empty() {
        let (_dir, repo) = repo();
        assert!(repo.fetch_snapshot("KAZ").await.unwrap().is_none());
        assert!(repo.health_check().await.unwrap());
    }
}
