//! FileRepository round trips over a temporary data directory.

use chrono::{Duration, Utc};
use serde_json::json;
use tempfile::tempdir;

use dostupnost_rust::api::{HistoryEntry, RegionStats};
use dostupnost_rust::store::{FileRepository, HistoryRepository, SnapshotRepository};

fn stats() -> RegionStats {
    RegionStats {
        total_bs: 120,
        base_layer_count: 6,
        power_problems: 2,
        non_priority_percentage: 95,
    }
}

#[tokio::test]
async fn appended_history_survives_a_reopen() {
    let dir = tempdir().unwrap();
    let now = Utc::now();
    {
        let repo = FileRepository::new(dir.path()).unwrap();
        for hours_ago in [0i64, 2, 50] {
            let ts = now - Duration::hours(hours_ago);
            let mut entry = HistoryEntry::from_stats("KAZ", &stats(), ts);
            entry.created_at = ts;
            repo.append_entry(&entry).await.unwrap();
        }
    }

    let repo = FileRepository::new(dir.path()).unwrap();
    let since = now - Duration::hours(24);
    let entries = repo.fetch_history("KAZ", since, 100).await.unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries[0].timestamp > entries[1].timestamp);

    let latest = repo.latest_entry("KAZ").await.unwrap().unwrap();
    assert_eq!(latest.timestamp.timestamp(), now.timestamp());
}

#[tokio::test]
async fn snapshot_is_read_from_region_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("region_UFA.json");
    tokio::fs::write(
        &path,
        json!({
            "region_name": "Уфа",
            "base_layer": "UFA Базовый слой\nВсего BS: 90\nБазовый слой: 3/90\n",
            "non_priority": "✅ Все технологии доступны\n",
            "stats": {
                "total_bs": 90,
                "base_layer_count": 3,
                "power_problems": 1,
                "non_priority_percentage": 97
            }
        })
        .to_string(),
    )
    .await
    .unwrap();

    let repo = FileRepository::new(dir.path()).unwrap();
    let snapshot = repo.fetch_snapshot("UFA").await.unwrap().unwrap();
    assert_eq!(snapshot.region_name, "Уфа");
    assert_eq!(snapshot.stats.total_bs, 90);
    assert!(!snapshot.is_mock);
}

#[tokio::test]
async fn snapshot_without_stats_block_recovers_them_from_text() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("region_KAZ.json");
    // Older collector output carries only the report texts
    tokio::fs::write(
        &path,
        json!({
            "base_layer": "KAZ Базовый слой\nВсего активных POWER на сети: 2\nВсего BS: 80\nБазовый слой: 4/80\n",
            "non_priority": ""
        })
        .to_string(),
    )
    .await
    .unwrap();

    let repo = FileRepository::new(dir.path()).unwrap();
    let snapshot = repo.fetch_snapshot("KAZ").await.unwrap().unwrap();
    assert_eq!(snapshot.stats.total_bs, 80);
    assert_eq!(snapshot.stats.base_layer_count, 4);
    assert_eq!(snapshot.stats.power_problems, 2);
}

#[tokio::test]
async fn combined_cache_file_answers_for_missing_region_files() {
    let dir = tempdir().unwrap();
    tokio::fs::write(
        dir.path().join("cached_data.json"),
        json!({
            "BRT": {
                "current": {
                    "base_layer": "BRT Базовый слой\nВсего BS: 40\nБазовый слой: 1/40\n",
                    "non_priority": ""
                },
                "history": [
                    {
                        "region_code": "BRT",
                        "base_layer_count": 1,
                        "total_bs_count": 40,
                        "power_problems": 0,
                        "non_priority_percentage": 98,
                        "timestamp": "2026-08-29 10:00:00",
                        "created_at": "2026-08-29 10:00:00"
                    }
                ]
            }
        })
        .to_string(),
    )
    .await
    .unwrap();

    let repo = FileRepository::new(dir.path()).unwrap();
    let snapshot = repo.fetch_snapshot("BRT").await.unwrap().unwrap();
    assert_eq!(snapshot.stats.total_bs, 40);

    let latest = repo.latest_entry("BRT").await.unwrap().unwrap();
    assert_eq!(latest.total_bs_count, 40);

    // a region absent from the combined file is a miss, not an error
    assert!(repo.fetch_snapshot("KAZ").await.unwrap().is_none());
    assert!(repo.latest_entry("KAZ").await.unwrap().is_none());
}

#[tokio::test]
async fn empty_directory_is_healthy_and_empty() {
    let dir = tempdir().unwrap();
    let repo = FileRepository::new(dir.path()).unwrap();
    assert!(repo.health_check().await.unwrap());
    assert!(repo.fetch_snapshot("KAZ").await.unwrap().is_none());
    assert!(repo
        .fetch_history("KAZ", Utc::now() - Duration::hours(24), 100)
        .await
        .unwrap()
        .is_empty());
}
