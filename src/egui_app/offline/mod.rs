//! # Offline Submission System
//!
//! Keeps submissions on the device until the ingest endpoint acknowledges
//! them, and drains them when connectivity returns or the user asks.
//!
//! ## Architecture
//!
//! - **Queue**: durable ordered entries per queue identity (`queue.rs`)
//! - **Storage**: key/value persistence behind the queue (`storage.rs`)
//! - **Sync Engine**: delivery and acknowledgement handling (`sync` module)
//! - **Network Monitor**: connectivity flag and transition detection
//!
//! [`OfflineManager`] owns one of each and is constructed once per form
//! context.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use openfield_collect::egui_app::offline;
//! use openfield_collect::shared::{AppConfig, SubmissionFields};
//!
//! # async fn example() -> Result<(), offline::OfflineError> {
//! let config = AppConfig::builder()
//!     .sync_url("http://127.0.0.1:3000/api/sync/submissions")
//!     .build()
//!     .unwrap();
//!
//! if let Some(manager) = offline::open(&config).await? {
//!     manager.queue_submission(SubmissionFields::new(), None).await;
//!     // Connectivity regained: drains automatically
//!     let report = manager.set_online(true).await;
//!     # let _ = report;
//! }
//! # Ok(())
//! # }
//! ```

pub mod queue;
pub mod storage;

pub use queue::{EntryMeta, EntryStatus, OfflineQueue, QueueEntry, QueueSnapshot};
pub use storage::{MemoryStorage, QueueStorage, StorageError};

use thiserror::Error;
use tokio::sync::watch;

use crate::egui_app::bridge::ComposedSubmission;
use crate::egui_app::local_db::LocalDatabase;
use crate::egui_app::sync::{
    Connectivity, DeliveryError, DrainReport, HttpIngestClient, IngestTransport, NetworkMonitor,
    SyncEngine,
};
use crate::shared::{AppConfig, SubmissionFields};

/// Offline subsystem errors
#[derive(Debug, Error)]
pub enum OfflineError {
    /// A drain was requested while offline
    #[error("Cannot sync while offline")]
    Offline,
    #[error("Local database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Ingest client error: {0}")]
    Client(#[from] DeliveryError),
}

/// Offline manager backed by the local SQLite store and the HTTP client
pub type LocalOfflineManager = OfflineManager<LocalDatabase, HttpIngestClient>;

/// Main offline manager coordinating queue, sync engine and connectivity
#[derive(Debug)]
pub struct OfflineManager<S, T> {
    queue: OfflineQueue<S>,
    engine: SyncEngine<T>,
    monitor: NetworkMonitor,
}

impl<S: QueueStorage, T: IngestTransport> OfflineManager<S, T> {
    pub fn new(queue: OfflineQueue<S>, engine: SyncEngine<T>, monitor: NetworkMonitor) -> Self {
        Self {
            queue,
            engine,
            monitor,
        }
    }

    pub fn queue(&self) -> &OfflineQueue<S> {
        &self.queue
    }

    pub fn engine(&self) -> &SyncEngine<T> {
        &self.engine
    }

    /// Check if the system is currently online
    pub fn is_online(&self) -> bool {
        self.monitor.is_online()
    }

    /// Queue a submission without attempting delivery
    pub async fn queue_submission(
        &self,
        submission: SubmissionFields,
        facility_label: Option<&str>,
    ) -> QueueEntry {
        self.queue.enqueue(submission, facility_label).await
    }

    /// Post a composed submission directly when online; queue it when offline
    /// or when the direct post fails. Queued payloads carry the offline marker.
    pub async fn submit(&self, submission: ComposedSubmission) -> SubmitOutcome {
        if self.is_online() {
            match self.engine.transport().post_submission(&submission.fields).await {
                Ok(_) => {
                    tracing::info!(client_uuid = ?submission.client_uuid(), "Submission delivered directly");
                    return SubmitOutcome::Delivered;
                }
                Err(e) => {
                    tracing::warn!("Direct submission failed, queueing: {}", e);
                }
            }
        }

        let queued = submission.into_offline();
        let entry = self
            .queue
            .enqueue(queued.fields, queued.facility_label.as_deref())
            .await;
        SubmitOutcome::Queued(entry)
    }

    /// Update online status. Coming back online drains the queue.
    pub async fn set_online(&self, online: bool) -> Option<DrainReport> {
        if self.monitor.set_online(online) {
            Some(self.engine.sync_all(&self.queue).await)
        } else {
            None
        }
    }

    /// User-requested drain
    pub async fn sync_now(&self) -> Result<DrainReport, OfflineError> {
        if !self.is_online() {
            return Err(OfflineError::Offline);
        }
        Ok(self.engine.sync_all(&self.queue).await)
    }

    /// Empty the queue. Callers confirm with the user first.
    pub async fn clear_queue(&self) {
        self.queue.clear().await;
    }

    /// Get queue statistics
    pub async fn queue_stats(&self) -> QueueStats {
        let entries = self.queue.entries().await;
        let count = |status: EntryStatus| entries.iter().filter(|e| e.status == status).count();
        QueueStats {
            pending: count(EntryStatus::Pending),
            syncing: count(EntryStatus::Syncing),
            failed: count(EntryStatus::Error),
        }
    }

    pub fn subscribe_queue(&self) -> watch::Receiver<QueueSnapshot> {
        self.queue.subscribe()
    }

    pub fn subscribe_connectivity(&self) -> watch::Receiver<Connectivity> {
        self.monitor.subscribe()
    }
}

/// Where a submitted form ended up
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Acknowledged by the server
    Delivered,
    /// Waiting in the offline queue
    Queued(QueueEntry),
}

/// Queue statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    pub pending: usize,
    pub syncing: usize,
    pub failed: usize,
}

impl QueueStats {
    pub fn total(&self) -> usize {
        self.pending + self.syncing + self.failed
    }
}

/// Build the offline subsystem from configuration.
///
/// Returns `None` when no sync URL is configured; the subsystem is then
/// entirely disabled. Connectivity starts offline until the first probe.
pub async fn open(config: &AppConfig) -> Result<Option<LocalOfflineManager>, OfflineError> {
    let Some(sync_url) = config.sync_url.clone() else {
        tracing::info!("No sync URL configured, offline queue disabled");
        return Ok(None);
    };

    let db_path = config
        .local_db_path
        .clone()
        .unwrap_or_else(LocalDatabase::default_path);
    let db = LocalDatabase::open(&db_path).await?;

    let queue = OfflineQueue::open(db, &config.queue_key).await;
    let client = HttpIngestClient::new(sync_url, config.request_timeout)?;

    Ok(Some(OfflineManager::new(
        queue,
        SyncEngine::new(client),
        NetworkMonitor::new(Connectivity::Offline),
    )))
}
