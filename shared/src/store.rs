//! Key-value store seam used by the balance ledger
//!
//! The ledger never reads-then-writes a balance: every mutation goes through
//! one of the atomic primitives below (`set`, `set_if_absent`, `incr_by`).

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// Backend unreachable (connection refused, pool exhausted, timeout).
    #[error("store unavailable: {message}")]
    Unavailable { message: String },

    #[error("store command failed: {message}")]
    Command { message: String },

    #[error("value at {key} is not an integer")]
    NotAnInteger { key: String },
}

impl StoreError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn command(message: impl Into<String>) -> Self {
        Self::Command {
            message: message.into(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Unavailable { .. })
    }
}

impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_io_error()
            || err.is_timeout()
            || err.is_connection_dropped()
            || err.is_connection_refusal()
        {
            StoreError::unavailable(err.to_string())
        } else {
            StoreError::command(err.to_string())
        }
    }
}

/// String key-value store with an atomic integer increment.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Sets `key` only when it does not exist yet. Returns whether it was written.
    async fn set_if_absent(&self, key: &str, value: &str) -> Result<bool, StoreError>;

    /// Atomically adds `delta` to the integer at `key` (missing keys count as 0)
    /// and returns the new value.
    async fn incr_by(&self, key: &str, delta: i64) -> Result<i64, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

/// In-process store backed by a `DashMap`. Each operation holds the shard
/// lock for its key, which makes `incr_by` and `set_if_absent` atomic.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<DashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn set_if_absent(&self, key: &str, value: &str) -> Result<bool, StoreError> {
        match self.entries.entry(key.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(_) => Ok(false),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(value.to_string());
                Ok(true)
            }
        }
    }

    async fn incr_by(&self, key: &str, delta: i64) -> Result<i64, StoreError> {
        let mut entry = self.entries.entry(key.to_string()).or_insert_with(|| "0".to_string());
        let current: i64 = entry.value().parse().map_err(|_| StoreError::NotAnInteger {
            key: key.to_string(),
        })?;
        let updated = current
            .checked_add(delta)
            .ok_or_else(|| StoreError::command(format!("increment on {} would overflow", key)))?;
        *entry.value_mut() = updated.to_string();
        debug!(key = %key, delta = delta, value = updated, "memory store increment");
        Ok(updated)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
