//! Offline queue and sync engine against a mock ingest endpoint

use std::time::Duration;

use assert_matches::assert_matches;
use openfield_collect::egui_app::local_db::LocalDatabase;
use openfield_collect::egui_app::offline::queue::INTERRUPTED_MESSAGE;
use openfield_collect::egui_app::offline::{
    EntryStatus, MemoryStorage, OfflineError, OfflineManager, OfflineQueue,
};
use openfield_collect::egui_app::sync::{Connectivity, HttpIngestClient, NetworkMonitor, SyncEngine};
use openfield_collect::shared::fields;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common::*;

#[tokio::test]
async fn test_acknowledged_entry_removed() {
    let server = ingest_server().await;
    answer_all(&server, ack_ok()).await;

    let queue = OfflineQueue::open(MemoryStorage::new(), "default").await;
    let entry = queue.enqueue(visit("A", "Clinic 1"), None).await;

    let report = SyncEngine::new(ingest_client(&server)).sync_all(&queue).await;
    assert_eq!(report.delivered, 1);
    assert!(queue.is_empty().await);

    let received = received_submissions(&server).await;
    assert_eq!(received.len(), 1);
    assert_eq!(received[0]["client_uuid"], json!(entry.id));
    assert_eq!(received[0]["enumerator_name"], json!("A"));
}

#[tokio::test]
async fn test_truthy_ack_with_loose_fields_removes_entry() {
    let bodies = [
        json!({ "ok": true, "submission_id": "abc" }),
        json!({ "ok": true, "duplicate": null }),
        json!({ "ok": true, "message": { "detail": "stored" } }),
        json!({ "ok": 1, "error": ["ignored"] }),
    ];

    for body in bodies {
        let server = ingest_server().await;
        answer_all(&server, ResponseTemplate::new(200).set_body_json(body.clone())).await;

        let queue = OfflineQueue::open(MemoryStorage::new(), "default").await;
        queue.enqueue(visit("A", "Clinic 1"), None).await;

        let report = SyncEngine::new(ingest_client(&server)).sync_all(&queue).await;
        assert_eq!(report.delivered, 1, "body {}", body);
        assert!(queue.is_empty().await, "body {}", body);
    }
}

#[tokio::test]
async fn test_server_error_keeps_entry() {
    let server = ingest_server().await;
    answer_all(&server, ResponseTemplate::new(500).set_body_string("boom")).await;

    let queue = OfflineQueue::open(MemoryStorage::new(), "default").await;
    let entry = queue.enqueue(visit("A", "Clinic 1"), None).await;

    let report = SyncEngine::new(ingest_client(&server)).sync_all(&queue).await;
    assert_eq!(report.failed, 1);

    let stored = queue.get(&entry.id).await.unwrap();
    assert_eq!(stored.status, EntryStatus::Error);
    assert_eq!(stored.attempts, 1);
    assert_eq!(stored.last_error, "HTTP 500");
}

#[tokio::test]
async fn test_negative_ack_reason_recorded() {
    let server = ingest_server().await;
    answer_all(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({ "ok": false, "error": "Unknown facility" })),
    )
    .await;

    let queue = OfflineQueue::open(MemoryStorage::new(), "default").await;
    let entry = queue.enqueue(visit("A", "Clinic 1"), None).await;
    SyncEngine::new(ingest_client(&server)).sync_all(&queue).await;

    let stored = queue.get(&entry.id).await.unwrap();
    assert_eq!(stored.status, EntryStatus::Error);
    assert_eq!(stored.last_error, "Unknown facility");
}

#[tokio::test]
async fn test_negative_ack_without_reason() {
    let server = ingest_server().await;
    answer_all(&server, ResponseTemplate::new(200).set_body_json(json!({ "ok": 0 }))).await;

    let queue = OfflineQueue::open(MemoryStorage::new(), "default").await;
    let entry = queue.enqueue(visit("A", "Clinic 1"), None).await;
    SyncEngine::new(ingest_client(&server)).sync_all(&queue).await;

    assert_eq!(queue.get(&entry.id).await.unwrap().last_error, "Sync failed");
}

#[tokio::test]
async fn test_unreachable_server_is_a_failed_attempt() {
    let url = "http://127.0.0.1:9/api/sync/submissions".parse().unwrap();
    let engine = SyncEngine::new(HttpIngestClient::new(url, Duration::from_secs(2)).unwrap());

    let queue = OfflineQueue::open(MemoryStorage::new(), "default").await;
    let entry = queue.enqueue(visit("A", "Clinic 1"), None).await;
    let report = engine.sync_all(&queue).await;
    assert_eq!(report.failed, 1);

    let stored = queue.get(&entry.id).await.unwrap();
    assert_eq!(stored.status, EntryStatus::Error);
    assert_eq!(stored.attempts, 1);
    assert!(!stored.last_error.is_empty());
}

#[tokio::test]
async fn test_drain_posts_newest_first() {
    let server = ingest_server().await;
    answer_all(&server, ack_ok()).await;

    let queue = OfflineQueue::open(MemoryStorage::new(), "default").await;
    for enumerator in ["first", "second", "third"] {
        queue.enqueue(visit(enumerator, "Clinic 1"), None).await;
    }

    SyncEngine::new(ingest_client(&server)).sync_all(&queue).await;

    let order: Vec<_> = received_submissions(&server)
        .await
        .into_iter()
        .map(|submission| submission["enumerator_name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(order, vec!["third", "second", "first"]);
}

#[tokio::test]
async fn test_one_failure_does_not_stop_the_drain() {
    let server = ingest_server().await;
    Mock::given(method("POST"))
        .and(path(INGEST_PATH))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    answer_all(&server, ack_ok()).await;

    let queue = OfflineQueue::open(MemoryStorage::new(), "default").await;
    let older = queue.enqueue(visit("older", "Clinic 1"), None).await;
    queue.enqueue(visit("newer", "Clinic 1"), None).await;

    let report = SyncEngine::new(ingest_client(&server)).sync_all(&queue).await;
    assert_eq!(report.attempted, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.delivered, 1);

    // The newest entry went first and hit the 503
    let remaining = queue.entries().await;
    assert_eq!(remaining.len(), 1);
    assert_ne!(remaining[0].id, older.id);
    assert_eq!(remaining[0].last_error, "HTTP 503");
}

#[tokio::test]
async fn test_failed_entry_retried_on_next_drain() {
    let server = ingest_server().await;
    Mock::given(method("POST"))
        .and(path(INGEST_PATH))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    answer_all(&server, ack_ok()).await;

    let queue = OfflineQueue::open(MemoryStorage::new(), "default").await;
    let entry = queue.enqueue(visit("A", "Clinic 1"), None).await;
    let engine = SyncEngine::new(ingest_client(&server));

    engine.sync_all(&queue).await;
    assert_eq!(queue.get(&entry.id).await.unwrap().status, EntryStatus::Error);

    let report = engine.sync_all(&queue).await;
    assert_eq!(report.delivered, 1);
    assert!(queue.is_empty().await);

    let received = received_submissions(&server).await;
    assert_eq!(received.len(), 2);
    assert_eq!(received[0]["client_uuid"], received[1]["client_uuid"]);
}

#[tokio::test]
async fn test_overlapping_drains_post_each_entry_once() {
    let server = ingest_server().await;
    answer_all(&server, ack_ok().set_delay(Duration::from_millis(150))).await;

    let queue = OfflineQueue::open(MemoryStorage::new(), "default").await;
    for enumerator in ["a", "b", "c"] {
        queue.enqueue(visit(enumerator, "Clinic 1"), None).await;
    }

    let engine = SyncEngine::new(ingest_client(&server));
    let (first, second) = tokio::join!(engine.sync_all(&queue), engine.sync_all(&queue));

    assert_eq!(first.delivered + second.delivered, 3);
    assert_eq!(first.failed + second.failed, 0);
    assert!(queue.is_empty().await);
    assert_eq!(received_submissions(&server).await.len(), 3);
}

#[tokio::test]
async fn test_reconnect_drains_automatically() {
    let server = ingest_server().await;
    answer_all(&server, ack_ok()).await;

    let queue = OfflineQueue::open(MemoryStorage::new(), "default").await;
    let manager = OfflineManager::new(
        queue,
        SyncEngine::new(ingest_client(&server)),
        NetworkMonitor::new(Connectivity::Offline),
    );
    manager.queue_submission(visit("A", "Clinic 1"), None).await;

    assert_matches!(manager.sync_now().await, Err(OfflineError::Offline));
    assert!(received_submissions(&server).await.is_empty());

    let report = manager.set_online(true).await.unwrap();
    assert_eq!(report.delivered, 1);
    assert!(manager.queue().is_empty().await);

    // Already online: no second drain
    assert!(manager.set_online(true).await.is_none());
    assert_eq!(received_submissions(&server).await.len(), 1);
}

#[tokio::test]
async fn test_going_offline_does_not_drain() {
    let server = ingest_server().await;
    answer_all(&server, ack_ok()).await;

    let queue = OfflineQueue::open(MemoryStorage::new(), "default").await;
    let manager = OfflineManager::new(
        queue,
        SyncEngine::new(ingest_client(&server)),
        NetworkMonitor::new(Connectivity::Online),
    );
    manager.queue_submission(visit("A", "Clinic 1"), None).await;

    assert!(manager.set_online(false).await.is_none());
    assert_eq!(manager.queue().len().await, 1);
    assert!(received_submissions(&server).await.is_empty());
}

#[tokio::test]
async fn test_queue_survives_reopen() {
    let (db, _dir, path) = temp_database().await;
    let queue = OfflineQueue::open(db, "household").await;
    let first = queue.enqueue(visit("A", "Clinic 1"), None).await;
    let second = queue.enqueue(visit("B", "Clinic 2"), Some("Clinic Two")).await;
    drop(queue);

    let reopened = OfflineQueue::open(LocalDatabase::open(&path).await.unwrap(), "household").await;
    let entries = reopened.entries().await;
    assert_eq!(entries, vec![first, second]);
    assert_eq!(entries[1].meta.facility, "Clinic Two");
}

#[tokio::test]
async fn test_queue_identities_are_isolated() {
    let (db, _dir, _path) = temp_database().await;
    let north = OfflineQueue::open(db.clone(), "north").await;
    let south = OfflineQueue::open(db, "south").await;

    north.enqueue(visit("A", "Clinic 1"), None).await;
    assert_eq!(north.len().await, 1);
    assert!(south.is_empty().await);
    assert!(south.load().await.is_empty());
}

#[tokio::test]
async fn test_interrupted_delivery_recovered_at_open() {
    let (db, _dir, path) = temp_database().await;
    let queue = OfflineQueue::open(db, "default").await;
    let entry = queue.enqueue(visit("A", "Clinic 1"), None).await;
    // Process ends while the request is in flight
    queue.begin_attempt(&entry.id).await.unwrap();
    drop(queue);

    let reopened = OfflineQueue::open(LocalDatabase::open(&path).await.unwrap(), "default").await;
    let recovered = reopened.get(&entry.id).await.unwrap();
    assert_eq!(recovered.status, EntryStatus::Error);
    assert_eq!(recovered.attempts, 1);
    assert_eq!(recovered.last_error, INTERRUPTED_MESSAGE);

    let server = ingest_server().await;
    answer_all(&server, ack_ok()).await;
    let report = SyncEngine::new(ingest_client(&server)).sync_all(&reopened).await;
    assert_eq!(report.delivered, 1);
    assert!(reopened.is_empty().await);
}

#[tokio::test]
async fn test_enqueue_is_idempotent_on_client_uuid() {
    let queue = OfflineQueue::open(MemoryStorage::new(), "default").await;
    let first = queue.enqueue(visit("A", "Clinic 1"), None).await;

    let mut again = visit("A", "Clinic 1");
    again.set(fields::CLIENT_UUID, first.id.clone());
    let second = queue.enqueue(again, None).await;

    assert_eq!(second, first);
    assert_eq!(queue.len().await, 1);
}

#[tokio::test]
async fn test_storage_failure_keeps_memory_queue() {
    let storage = MemoryStorage::new();
    storage.set_reject_writes(true);
    let queue = OfflineQueue::open(storage, "default").await;

    queue.enqueue(visit("A", "Clinic 1"), None).await;
    assert_eq!(queue.len().await, 1);
    assert!(queue.load().await.is_empty());
}
