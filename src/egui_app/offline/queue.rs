//! # Offline Submission Queue
//!
//! The durable, ordered queue of submissions waiting to reach the ingest
//! endpoint. The queue is the single source of truth for what still needs to
//! be delivered from this device.
//!
//! ## Features
//!
//! - **Persistent Queue**: entries survive restarts through a [`QueueStorage`]
//! - **Status Tracking**: `pending`, `syncing` and `error` per entry
//! - **Best-effort durability**: storage failures are logged, never raised
//! - **Snapshots**: every committed mutation is published on a watch channel
//!
//! Entries leave the queue only through [`OfflineQueue::remove`] (called after a
//! positive server acknowledgement) or [`OfflineQueue::clear`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use openfield_collect::egui_app::offline::{MemoryStorage, OfflineQueue};
//! use openfield_collect::shared::SubmissionFields;
//!
//! # async fn example() {
//! let queue = OfflineQueue::open(MemoryStorage::new(), "default").await;
//! let entry = queue.enqueue(SubmissionFields::new(), None).await;
//! assert_eq!(queue.len().await, 1);
//! # let _ = entry;
//! # }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, Mutex, RwLock};
use uuid::Uuid;

use crate::egui_app::offline::storage::{storage_key, QueueStorage, StorageError};
use crate::shared::{fields, SharedError, SubmissionFields};

/// Message recorded on entries whose delivery was cut short by a restart
pub const INTERRUPTED_MESSAGE: &str = "Interrupted before the server acknowledged the submission";

/// Delivery status of a queued entry. Success removes the entry instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Waiting for the next drain
    Pending,
    /// A delivery attempt is in flight
    Syncing,
    /// Last attempt failed, eligible for retry
    Error,
}

impl EntryStatus {
    /// Label shown in the status pill
    pub fn label(&self) -> &'static str {
        match self {
            EntryStatus::Pending => "pending",
            EntryStatus::Syncing => "syncing",
            EntryStatus::Error => "error",
        }
    }
}

/// Display fields derived once at queue time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryMeta {
    #[serde(default)]
    pub enumerator: String,
    #[serde(default)]
    pub facility: String,
    pub queued_at: DateTime<Utc>,
}

impl EntryMeta {
    /// Derive display fields. The selected facility option label wins over the
    /// free-text facility name; missing values stay empty.
    pub fn derive(
        submission: &SubmissionFields,
        facility_label: Option<&str>,
        queued_at: DateTime<Utc>,
    ) -> Self {
        let facility = facility_label
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .or_else(|| submission.text(fields::FACILITY_NAME))
            .unwrap_or_default()
            .to_string();

        Self {
            enumerator: submission
                .text(fields::ENUMERATOR_NAME)
                .unwrap_or_default()
                .to_string(),
            facility,
            queued_at,
        }
    }
}

/// One pending offline submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueEntry {
    /// Client identifier, also the server-side idempotency key
    pub id: String,
    pub queued_at: DateTime<Utc>,
    pub status: EntryStatus,
    #[serde(default)]
    pub attempts: u32,
    /// Empty when the last attempt did not fail
    #[serde(default)]
    pub last_error: String,
    pub meta: EntryMeta,
    pub fields: SubmissionFields,
}

/// Published after every committed mutation
#[derive(Debug, Clone, Default)]
pub struct QueueSnapshot {
    pub entries: Vec<QueueEntry>,
    /// Incremented on each publish
    pub revision: u64,
}

/// Durable offline queue for one queue identity
#[derive(Debug)]
pub struct OfflineQueue<S> {
    storage: S,
    key: String,
    entries: RwLock<Vec<QueueEntry>>,
    /// Serializes commits so storage and snapshots never regress
    commit_lock: Mutex<()>,
    snapshots: watch::Sender<QueueSnapshot>,
}

impl<S: QueueStorage> OfflineQueue<S> {
    /// Open the queue for `queue_key`, loading whatever was persisted.
    ///
    /// Entries left `syncing` by a previous process are moved to `error` so a
    /// later drain can pick them up again.
    pub async fn open(storage: S, queue_key: &str) -> Self {
        let key = storage_key(queue_key);
        let (snapshots, _) = watch::channel(QueueSnapshot::default());
        let queue = Self {
            storage,
            key,
            entries: RwLock::new(Vec::new()),
            commit_lock: Mutex::new(()),
            snapshots,
        };

        let mut loaded = queue.load().await;
        let mut recovered = 0usize;
        for entry in loaded.iter_mut().filter(|e| e.status == EntryStatus::Syncing) {
            entry.status = EntryStatus::Error;
            entry.last_error = INTERRUPTED_MESSAGE.to_string();
            recovered += 1;
        }

        tracing::info!(queue_key = %queue.key, entries = loaded.len(), recovered, "Offline queue opened");
        *queue.entries.write().await = loaded;
        if recovered > 0 {
            queue.commit().await;
        } else {
            queue.publish().await;
        }
        queue
    }

    /// Namespaced storage key of this queue
    pub fn storage_key(&self) -> &str {
        &self.key
    }

    /// Read the persisted queue. Missing or unreadable state yields an empty queue.
    pub async fn load(&self) -> Vec<QueueEntry> {
        let raw = match self.storage.read(&self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(queue_key = %self.key, "Failed to read offline queue: {}", e);
                return Vec::new();
            }
        };

        match decode_entries(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(queue_key = %self.key, "Discarding unreadable offline queue: {}", e);
                Vec::new()
            }
        }
    }

    /// Persist the full ordered sequence
    pub async fn save(&self, entries: &[QueueEntry]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(entries).map_err(SharedError::from)?;
        self.storage.write(&self.key, &raw).await
    }

    /// Append a new pending entry.
    ///
    /// A valid `client_uuid` in `fields` becomes the entry id; otherwise a new
    /// one is generated and written back into the fields, as is a missing
    /// `client_created_at`. If an entry with the same id is already queued it
    /// is returned unchanged.
    pub async fn enqueue(
        &self,
        mut submission: SubmissionFields,
        facility_label: Option<&str>,
    ) -> QueueEntry {
        let now = Utc::now();

        let id = match submission.text(fields::CLIENT_UUID).map(Uuid::parse_str) {
            Some(Ok(id)) => id.to_string(),
            _ => Uuid::new_v4().to_string(),
        };
        submission.set(fields::CLIENT_UUID, id.clone());
        if submission.text(fields::CLIENT_CREATED_AT).is_none() {
            submission.set(fields::CLIENT_CREATED_AT, now.to_rfc3339());
        }

        let entry = {
            let mut entries = self.entries.write().await;
            if let Some(existing) = entries.iter().find(|e| e.id == id) {
                tracing::info!(entry_id = %id, "Submission already queued, not adding it twice");
                return existing.clone();
            }

            let entry = QueueEntry {
                id: id.clone(),
                queued_at: now,
                status: EntryStatus::Pending,
                attempts: 0,
                last_error: String::new(),
                meta: EntryMeta::derive(&submission, facility_label, now),
                fields: submission,
            };
            entries.push(entry.clone());
            entry
        };

        tracing::info!(entry_id = %entry.id, queue_key = %self.key, "Submission queued");
        self.commit().await;
        entry
    }

    /// Remove every entry
    pub async fn clear(&self) {
        let removed = {
            let mut entries = self.entries.write().await;
            let removed = entries.len();
            entries.clear();
            removed
        };
        tracing::info!(queue_key = %self.key, removed, "Offline queue cleared");
        self.commit().await;
    }

    /// Current entries, in queue order
    pub async fn entries(&self) -> Vec<QueueEntry> {
        self.entries.read().await.clone()
    }

    pub async fn get(&self, id: &str) -> Option<QueueEntry> {
        self.entries.read().await.iter().find(|e| e.id == id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Mark an entry as in flight: `syncing`, one more attempt, error cleared.
    ///
    /// Returns `None` when the entry is gone or already syncing, in which case
    /// no delivery must be issued.
    pub async fn begin_attempt(&self, id: &str) -> Option<QueueEntry> {
        let entry = {
            let mut entries = self.entries.write().await;
            let entry = entries.iter_mut().find(|e| e.id == id)?;
            if entry.status == EntryStatus::Syncing {
                return None;
            }
            entry.status = EntryStatus::Syncing;
            entry.attempts += 1;
            entry.last_error.clear();
            entry.clone()
        };

        tracing::debug!(entry_id = %id, attempts = entry.attempts, "Delivery attempt started");
        self.commit().await;
        Some(entry)
    }

    /// Record a failed delivery; the entry stays queued
    pub async fn record_failure(&self, id: &str, message: &str) {
        let found = {
            let mut entries = self.entries.write().await;
            match entries.iter_mut().find(|e| e.id == id) {
                Some(entry) => {
                    entry.status = EntryStatus::Error;
                    entry.last_error = if message.trim().is_empty() {
                        "Sync failed".to_string()
                    } else {
                        message.to_string()
                    };
                    true
                }
                None => false,
            }
        };

        if found {
            self.commit().await;
        }
    }

    /// Remove an acknowledged entry
    pub async fn remove(&self, id: &str) -> bool {
        let removed = {
            let mut entries = self.entries.write().await;
            let before = entries.len();
            entries.retain(|e| e.id != id);
            entries.len() != before
        };

        if removed {
            tracing::debug!(entry_id = %id, "Acknowledged entry removed");
            self.commit().await;
        }
        removed
    }

    /// Watch committed queue states
    pub fn subscribe(&self) -> watch::Receiver<QueueSnapshot> {
        self.snapshots.subscribe()
    }

    /// Persist the current state, then publish it. Persistence failures are
    /// logged and the in-memory queue stays authoritative.
    ///
    /// The state is read under the commit lock, so a commit that finishes
    /// later always carries the later state.
    async fn commit(&self) {
        let _guard = self.commit_lock.lock().await;
        let entries = self.entries().await;
        if let Err(e) = self.save(&entries).await {
            tracing::warn!(queue_key = %self.key, "Offline queue not persisted: {}", e);
        }
        self.publish_entries(entries);
    }

    async fn publish(&self) {
        let _guard = self.commit_lock.lock().await;
        let entries = self.entries().await;
        self.publish_entries(entries);
    }

    fn publish_entries(&self, entries: Vec<QueueEntry>) {
        self.snapshots.send_modify(|snapshot| {
            snapshot.entries = entries;
            snapshot.revision += 1;
        });
    }
}

fn decode_entries(raw: &str) -> Result<Vec<QueueEntry>, SharedError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(raw)?)
}
