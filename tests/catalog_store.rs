//! Catalog store behaviour against a real file in a temp directory

use std::collections::HashSet;
use std::path::PathBuf;

use chrono::{Duration, TimeZone, Utc};
use snapcap::{CatalogStore, ScreenshotRecord, ScreenshotType, StoreError};
use tempfile::TempDir;

fn store() -> (TempDir, CatalogStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = CatalogStore::open(dir.path().join("catalog.json"));
    (dir, store)
}

fn record(minutes: i64) -> ScreenshotRecord {
    let base = Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap();
    let mut r = ScreenshotRecord::new(
        ScreenshotType::Regional,
        400,
        300,
        base + Duration::minutes(minutes),
    );
    r.file_path = Some(PathBuf::from(format!("/shots/{}.png", minutes)));
    r
}

#[tokio::test]
async fn test_missing_file_is_empty_catalog() {
    let (_dir, store) = store();
    assert!(store.list_all().await.unwrap().is_empty());
    assert!(store.get_by_id(1).await.unwrap().is_none());
}

#[tokio::test]
async fn test_list_all_newest_first() {
    let (_dir, store) = store();

    let older = store.add(record(0)).await.unwrap();
    let newest = store.add(record(20)).await.unwrap();
    let middle = store.add(record(10)).await.unwrap();

    let ids: Vec<u64> = store.list_all().await.unwrap().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![newest, middle, older]);
}

#[tokio::test]
async fn test_get_by_id_returns_stored_fields() {
    let (_dir, store) = store();
    let mut r = record(5);
    r.title = Some("Dashboard".to_string());
    r.thumbnail = Some(vec![1, 2, 3]);

    let id = store.add(r.clone()).await.unwrap();
    let fetched = store.get_by_id(id).await.unwrap().unwrap();

    assert_eq!(fetched.id, id);
    assert_eq!(fetched.title, r.title);
    assert_eq!(fetched.thumbnail, r.thumbnail);
    assert_eq!(fetched.file_path, r.file_path);
}

#[tokio::test]
async fn test_delete_reports_existence() {
    let (_dir, store) = store();
    let id = store.add(record(0)).await.unwrap();

    assert!(!store.delete(id + 100).await.unwrap());
    assert!(store.delete(id).await.unwrap());
    assert!(!store.delete(id).await.unwrap());
    assert!(store.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_search_matches_tags_title_and_text() {
    let (_dir, store) = store();

    let mut holiday = record(0);
    holiday.tags = Some("Vacation,trip".to_string());
    let holiday = store.add(holiday).await.unwrap();

    let mut report = record(1);
    report.tags = Some("work".to_string());
    report.ocr_text = Some("Quarterly numbers".to_string());
    let report = store.add(report).await.unwrap();

    let hits: Vec<u64> = store.search("vacation").await.unwrap().iter().map(|r| r.id).collect();
    assert_eq!(hits, vec![holiday]);

    let hits: Vec<u64> = store.search("QUARTERLY").await.unwrap().iter().map(|r| r.id).collect();
    assert_eq!(hits, vec![report]);

    assert!(store.search("nothing-like-this").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_clear_all_returns_snapshot() {
    let (_dir, store) = store();
    store.add(record(0)).await.unwrap();
    store.add(record(1)).await.unwrap();

    let removed = store.clear_all().await.unwrap();
    assert_eq!(removed.len(), 2);
    assert!(store.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_ids_not_reused_after_clear() {
    let (_dir, store) = store();
    let first = store.add(record(0)).await.unwrap();
    let second = store.add(record(1)).await.unwrap();
    store.delete(second).await.unwrap();
    store.clear_all().await.unwrap();

    let third = store.add(record(2)).await.unwrap();
    assert!(third > second && second > first);
}

#[tokio::test]
async fn test_reopened_store_sees_persisted_records() {
    let (dir, store) = store();
    let id = store.add(record(0)).await.unwrap();
    drop(store);

    let reopened = CatalogStore::open(dir.path().join("catalog.json"));
    assert!(reopened.get_by_id(id).await.unwrap().is_some());
    assert!(reopened.add(record(1)).await.unwrap() > id);
}

#[tokio::test]
async fn test_corrupt_catalog_is_reported() {
    let (dir, store) = store();
    std::fs::write(dir.path().join("catalog.json"), "{ not json").unwrap();

    let result = store.list_all().await;
    assert!(matches!(result, Err(StoreError::Corrupt { .. })));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_adds_get_unique_ids() {
    let (_dir, store) = store();

    let tasks: Vec<_> = (0..16)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move { store.add(record(i)).await.unwrap() })
        })
        .collect();

    let mut ids = HashSet::new();
    for task in tasks {
        assert!(ids.insert(task.await.unwrap()));
    }

    assert_eq!(store.list_all().await.unwrap().len(), 16);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_separately_opened_stores_share_file_lock() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.json");

    let tasks: Vec<_> = (0..32)
        .map(|i| {
            let path = path.clone();
            tokio::spawn(async move { CatalogStore::open(path).add(record(i)).await })
        })
        .collect();

    let mut ids = HashSet::new();
    for task in tasks {
        let id = task.await.unwrap().expect("add through a fresh handle");
        assert!(ids.insert(id));
    }

    let persisted = CatalogStore::open(&path).list_all().await.unwrap();
    assert_eq!(persisted.len(), 32);
    let persisted_ids: HashSet<u64> = persisted.iter().map(|r| r.id).collect();
    assert_eq!(persisted_ids, ids);

    // No temp files left behind
    let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(leftovers, 1);
}
