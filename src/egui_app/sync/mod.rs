//! # Sync Engine
//!
//! Drains an [`OfflineQueue`] against the ingest endpoint, one entry at a time.
//!
//! ## Delivery rules
//!
//! - An entry is removed only after a positive acknowledgement
//! - A failed attempt leaves the entry in `error` with its reason recorded
//! - Entries already `syncing` are skipped, so overlapping drains never post
//!   the same entry twice
//! - Drains walk the queue newest first
//!
//! There is no retry timer. Drains run when connectivity returns or when the
//! user asks for one.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use openfield_collect::egui_app::offline::{MemoryStorage, OfflineQueue};
//! use openfield_collect::egui_app::sync::{HttpIngestClient, SyncEngine};
//! use std::time::Duration;
//!
//! # async fn example() {
//! let url = "http://127.0.0.1:3000/api/sync/submissions".parse().unwrap();
//! let engine = SyncEngine::new(HttpIngestClient::new(url, Duration::from_secs(30)).unwrap());
//! let queue = OfflineQueue::open(MemoryStorage::new(), "default").await;
//! let report = engine.sync_all(&queue).await;
//! println!("delivered {} of {}", report.delivered, report.attempted);
//! # }
//! ```

pub mod network_monitor;
pub mod transport;

pub use network_monitor::{probe, Connectivity, NetworkMonitor};
pub use transport::{DeliveryError, HttpIngestClient, IngestTransport};

use crate::egui_app::offline::queue::OfflineQueue;
use crate::egui_app::offline::storage::QueueStorage;

/// Result of one `sync_one` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Acknowledged by the server; the caller removes the entry
    Delivered,
    /// Attempt made and failed; the entry is in `error`
    Failed(String),
    /// No attempt made: the entry is gone or already in flight
    Skipped,
}

/// Summary of one drain
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Delivery attempts issued
    pub attempted: usize,
    pub delivered: usize,
    pub failed: usize,
    /// Entries left alone because another drain owned them
    pub skipped: usize,
}

impl DrainReport {
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// Delivers queued entries through an [`IngestTransport`]
#[derive(Debug, Clone)]
pub struct SyncEngine<T> {
    transport: T,
}

impl<T: IngestTransport> SyncEngine<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Attempt delivery of a single entry.
    ///
    /// Marks the entry `syncing` (one more attempt, error cleared) and persists
    /// that before posting. On failure the entry moves to `error`; it is never
    /// removed here.
    pub async fn sync_one<S: QueueStorage>(&self, queue: &OfflineQueue<S>, id: &str) -> SyncOutcome {
        let Some(entry) = queue.begin_attempt(id).await else {
            return SyncOutcome::Skipped;
        };

        match self.transport.post_submission(&entry.fields).await {
            Ok(ack) => {
                tracing::info!(
                    entry_id = %id,
                    attempts = entry.attempts,
                    duplicate = ack.duplicate,
                    "Submission delivered"
                );
                SyncOutcome::Delivered
            }
            Err(e) => {
                let message = e.to_string();
                tracing::warn!(entry_id = %id, attempts = entry.attempts, "Delivery failed: {}", message);
                queue.record_failure(id, &message).await;
                SyncOutcome::Failed(message)
            }
        }
    }

    /// Drain the queue once, newest entry first.
    ///
    /// The set of entries is fixed at drain start. Each is attempted at most
    /// once; one failure does not stop the pass.
    pub async fn sync_all<S: QueueStorage>(&self, queue: &OfflineQueue<S>) -> DrainReport {
        let ids: Vec<String> = queue.entries().await.into_iter().map(|e| e.id).collect();
        let mut report = DrainReport::default();

        tracing::debug!(queue_key = %queue.storage_key(), entries = ids.len(), "Drain started");

        for id in ids.iter().rev() {
            match self.sync_one(queue, id).await {
                SyncOutcome::Delivered => {
                    report.attempted += 1;
                    report.delivered += 1;
                    queue.remove(id).await;
                }
                SyncOutcome::Failed(_) => {
                    report.attempted += 1;
                    report.failed += 1;
                }
                SyncOutcome::Skipped => report.skipped += 1,
            }
        }

        tracing::info!(
            queue_key = %queue.storage_key(),
            attempted = report.attempted,
            delivered = report.delivered,
            failed = report.failed,
            skipped = report.skipped,
            "Drain finished"
        );
        report
    }
}
