//! Key-value store abstraction for rate-limit records and usage logs.
//!
//! The rate limiter depends on `compare_and_set` rather than plain writes,
//! which lets the fixed-window counter stay atomic under concurrent
//! requests from the same user. `MemoryStore` is the in-process
//! implementation; a deployment backed by a persisted document store plugs
//! in behind the same traits.

use crate::models::{RateLimitRecord, UsageLogEntry};
use chrono::{DateTime, Utc};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

/// Errors surfaced by a store implementation
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Storage for per-user rate-limit counter records
pub trait RateLimitStore: Send + Sync {
    /// Read the record for `key`, if one exists
    fn get(&self, key: &str) -> Result<Option<RateLimitRecord>, StoreError>;

    /// Write `new` only if the stored record still equals `expected`
    ///
    /// `expected = None` means "only if no record exists yet". Returns
    /// whether the write landed; `false` signals a concurrent update and
    /// the caller should re-read and retry.
    fn compare_and_set(
        &self,
        key: &str,
        expected: Option<&RateLimitRecord>,
        new: RateLimitRecord,
    ) -> Result<bool, StoreError>;
}

/// Append-only storage for usage log entries
pub trait UsageStore: Send + Sync {
    fn append(&self, entry: UsageLogEntry) -> Result<(), StoreError>;

    /// Delete entries older than `cutoff`, at most `limit` of them,
    /// returning how many were removed
    fn delete_older_than(&self, cutoff: DateTime<Utc>, limit: usize) -> Result<usize, StoreError>;
}

/// In-process store backing both traits
#[derive(Default)]
pub struct MemoryStore {
    rate_limits: Mutex<HashMap<String, RateLimitRecord>>,
    usage_log: Mutex<Vec<UsageLogEntry>>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Number of usage log entries currently held
    pub fn usage_count(&self) -> usize {
        self.usage_log.lock().map(|log| log.len()).unwrap_or(0)
    }
}

fn poisoned() -> StoreError {
    StoreError::Unavailable("poisoned lock".to_string())
}

impl RateLimitStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<RateLimitRecord>, StoreError> {
        let records = self.rate_limits.lock().map_err(|_| poisoned())?;
        Ok(records.get(key).cloned())
    }

    fn compare_and_set(
        &self,
        key: &str,
        expected: Option<&RateLimitRecord>,
        new: RateLimitRecord,
    ) -> Result<bool, StoreError> {
        let mut records = self.rate_limits.lock().map_err(|_| poisoned())?;
        let matches = match (records.get(key), expected) {
            (None, None) => true,
            (Some(current), Some(expected)) => current == expected,
            _ => false,
        };
        if matches {
            records.insert(key.to_string(), new);
        }
        Ok(matches)
    }
}

impl UsageStore for MemoryStore {
    fn append(&self, entry: UsageLogEntry) -> Result<(), StoreError> {
        let mut log = self.usage_log.lock().map_err(|_| poisoned())?;
        log.push(entry);
        Ok(())
    }

    fn delete_older_than(&self, cutoff: DateTime<Utc>, limit: usize) -> Result<usize, StoreError> {
        let mut log = self.usage_log.lock().map_err(|_| poisoned())?;
        let mut deleted = 0;
        log.retain(|entry| {
            if deleted < limit && entry.timestamp < cutoff {
                deleted += 1;
                false
            } else {
                true
            }
        });
        Ok(deleted)
    }
}
