//! Integration tests for crash-safe file export.

use mixport_exports::{
    Error, EventQueue, EventRecord, ExportConfig, JsonlReader, event_queue, export_to_file,
};
use serde::{Serialize, Serializer};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

fn sample_event(id: usize) -> EventRecord {
    let mut event = EventRecord::with_event_id(id.to_string());
    event.insert("foo", "bar,baz");
    event
}

fn temp_path_for(path: &Path) -> PathBuf {
    path.with_extension("jsonl.tmp")
}

async fn closed_queue_with(records: Vec<EventRecord>) -> EventQueue {
    let (tx, queue) = event_queue(records.len().max(1));
    for record in records {
        tx.send(record).await.unwrap();
    }
    queue
}

async fn read_export(path: &Path) -> Vec<EventRecord> {
    let file = tokio::fs::File::open(path).await.unwrap();
    let mut reader = JsonlReader::new(file);
    let mut records = Vec::new();
    while let Some(record) = reader.read_line().await.unwrap() {
        records.push(record);
    }
    records
}

fn setup() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.jsonl");
    (dir, path)
}

#[tokio::test]
async fn export_writes_all_records() {
    let (_dir, path) = setup();
    let records: Vec<_> = (0..25).map(sample_event).collect();
    let queue = closed_queue_with(records.clone()).await;

    let summary = export_to_file(&path, queue, &ExportConfig::default(), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.records, 25);
    assert_eq!(read_export(&path).await, records);
    assert!(!temp_path_for(&path).exists());
}

#[tokio::test]
async fn export_of_empty_queue_creates_empty_file() {
    let (_dir, path) = setup();
    let queue = closed_queue_with(Vec::new()).await;

    export_to_file(&path, queue, &ExportConfig::default(), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(tokio::fs::metadata(&path).await.unwrap().len(), 0);
}

#[tokio::test]
async fn export_replaces_existing_file() {
    let (_dir, path) = setup();
    tokio::fs::write(&path, "old content\n").await.unwrap();
    let queue = closed_queue_with(vec![sample_event(42)]).await;

    export_to_file(&path, queue, &ExportConfig::default(), CancellationToken::new())
        .await
        .unwrap();

    let contents = tokio::fs::read_to_string(&path).await.unwrap();
    assert_eq!(contents, "{\"foo\":\"bar,baz\",\"id\":\"42\"}\n");
}

#[tokio::test]
async fn encode_failure_preserves_existing_file() {
    struct Failing;

    impl Serialize for Failing {
        fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("intentional encode failure"))
        }
    }

    let (_dir, path) = setup();
    tokio::fs::write(&path, "previous export\n").await.unwrap();

    let (tx, queue) = event_queue(1);
    tx.send(Failing).await.unwrap();
    tx.close();

    let err = export_to_file(&path, queue, &ExportConfig::default(), CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Encode { record: 0, .. }));
    assert_eq!(
        tokio::fs::read_to_string(&path).await.unwrap(),
        "previous export\n"
    );
    assert!(
        !temp_path_for(&path).exists(),
        "temp file should be cleaned up after encode failure"
    );
}

#[tokio::test]
async fn cancelled_export_is_discarded() {
    let (_dir, path) = setup();
    tokio::fs::write(&path, "previous export\n").await.unwrap();

    let (tx, queue) = event_queue(4);
    tx.send(sample_event(0)).await.unwrap();

    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let err = export_to_file(&path, queue, &ExportConfig::default(), token)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Cancelled { records: 1 }));
    assert_eq!(
        tokio::fs::read_to_string(&path).await.unwrap(),
        "previous export\n"
    );
    assert!(!temp_path_for(&path).exists());
    drop(tx);
}

#[tokio::test]
async fn invalid_config_is_rejected_before_creating_files() {
    let (dir, path) = setup();
    let queue = closed_queue_with(vec![sample_event(0)]).await;
    let config = ExportConfig {
        buffer_capacity: 0,
        ..ExportConfig::default()
    };

    let err = export_to_file(&path, queue, &config, CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Config(_)));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn missing_directory_is_io_error() {
    let (dir, _) = setup();
    let path = dir.path().join("missing").join("events.jsonl");
    let queue = closed_queue_with(vec![sample_event(0)]).await;

    let err = export_to_file(&path, queue, &ExportConfig::default(), CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Io(_)));
}

#[tokio::test]
async fn failed_commit_removes_temp_file() {
    let (_dir, path) = setup();
    // A non-empty directory at the target makes the final rename fail.
    tokio::fs::create_dir(&path).await.unwrap();
    tokio::fs::write(path.join("keep.txt"), "existing\n")
        .await
        .unwrap();
    let queue = closed_queue_with(vec![sample_event(0)]).await;

    let err = export_to_file(&path, queue, &ExportConfig::default(), CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Io(_)));
    assert!(
        !temp_path_for(&path).exists(),
        "temp file should be cleaned up after a failed rename"
    );
    assert!(path.join("keep.txt").exists());
}
