//! # Queue Storage
//!
//! Key/value persistence for offline queues. Each queue identity maps to one
//! namespaced key holding the whole serialized queue, the same shape a
//! browser's local storage would hold.
//!
//! Writes are best effort: callers log failures and keep working from memory.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::shared::SharedError;

/// Fixed prefix of every queue storage key
pub const QUEUE_KEY_PREFIX: &str = "openfield.offline_queue.";

/// Storage key for a queue identity
pub fn storage_key(queue_key: &str) -> String {
    format!("{}{}", QUEUE_KEY_PREFIX, queue_key)
}

/// Storage failures
#[derive(Debug, Error)]
pub enum StorageError {
    /// Backing store could not be reached or refused the write
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    /// Stored value could not be decoded
    #[error("corrupt queue state: {0}")]
    Corrupt(#[from] SharedError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistent key/value store backing an offline queue
pub trait QueueStorage: Send + Sync {
    /// Read the raw value stored under `key`
    fn read(&self, key: &str) -> impl Future<Output = Result<Option<String>, StorageError>> + Send;

    /// Replace the value stored under `key`
    fn write(&self, key: &str, value: &str) -> impl Future<Output = Result<(), StorageError>> + Send;
}

/// Process-local storage, lost on restart
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
    /// When set, every write fails (simulates a full quota)
    reject_writes: Mutex<bool>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw value, bypassing validation
    pub fn with_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        let storage = Self::default();
        if let Ok(mut values) = storage.values.lock() {
            values.insert(key.into(), value.into());
        }
        storage
    }

    /// Make subsequent writes fail or succeed
    pub fn set_reject_writes(&self, reject: bool) {
        if let Ok(mut flag) = self.reject_writes.lock() {
            *flag = reject;
        }
    }

    /// Raw stored value, for inspection
    pub fn raw(&self, key: &str) -> Option<String> {
        self.values.lock().ok()?.get(key).cloned()
    }
}

impl QueueStorage for MemoryStorage {
    async fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self
            .values
            .lock()
            .map_err(|_| StorageError::Unavailable("storage lock poisoned".to_string()))?;
        Ok(values.get(key).cloned())
    }

    async fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let rejecting = self.reject_writes.lock().map(|flag| *flag).unwrap_or(true);
        if rejecting {
            return Err(StorageError::Unavailable("quota exceeded".to_string()));
        }

        let mut values = self
            .values
            .lock()
            .map_err(|_| StorageError::Unavailable("storage lock poisoned".to_string()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

impl<T: QueueStorage> QueueStorage for Arc<T> {
    async fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).read(key).await
    }

    async fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).write(key, value).await
    }
}
