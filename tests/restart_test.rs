//! The window survives a restart through its backing file

use std::sync::Arc;
use tempfile::TempDir;

use windowcount::window::{MalformedLines, ServiceError, TimestampService, TimestampStore};

fn open_service(path: &std::path::Path, malformed: MalformedLines) -> TimestampService {
    let store = Arc::new(TimestampStore::open_file(path, malformed));
    TimestampService::new(store, 60)
}

#[tokio::test]
async fn test_window_survives_restart() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("timestamps.log");

    let first = open_service(&path, MalformedLines::Fail);
    first.initialize_at(1000).await.unwrap();
    for now in [1000, 1010, 1020] {
        first.record_timestamp_at(now).await.unwrap();
    }
    first.store().close().await.unwrap();
    drop(first);

    let second = open_service(&path, MalformedLines::Fail);
    second.initialize_at(1030).await.unwrap();
    assert_eq!(second.store().view().await, vec![1000, 1010, 1020]);

    // 1070 - 1010 == 60 evicts the second entry too
    let count = second.record_timestamp_at(1070).await.unwrap();
    assert_eq!(count, 2);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "1020\n1070\n");
}

#[tokio::test]
async fn test_restart_after_long_downtime_starts_empty() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("timestamps.log");
    std::fs::write(&path, "1000\n1001\n").unwrap();

    let service = open_service(&path, MalformedLines::Fail);
    service.initialize_at(5000).await.unwrap();

    assert_eq!(service.store().count().await, 0);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
}

#[tokio::test]
async fn test_corrupt_file_policies() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("timestamps.log");
    std::fs::write(&path, "990\n99O\n995\n").unwrap();

    let strict = open_service(&path, MalformedLines::Fail);
    let err = strict.initialize_at(1000).await.unwrap_err();
    assert!(matches!(err, ServiceError::Load(_)));
    // A failed load must not rewrite the file
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "990\n99O\n995\n");

    let lenient = open_service(&path, MalformedLines::Skip);
    lenient.initialize_at(1000).await.unwrap();
    assert_eq!(lenient.store().view().await, vec![990, 995]);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "990\n995\n");
}
