//! Usage logging and the scheduled retention sweep.

use crate::{
    config::RetentionConfig,
    models::UsageLogEntry,
    services::store::UsageStore,
};
use chrono::{DateTime, Duration, Utc};
use prometheus::Counter;
use std::sync::Arc;
use tracing::{info, warn};

/// Best-effort writer of usage log entries
///
/// A failed write never fails the request that produced it: the failure is
/// logged and counted, and the caller continues as if nothing happened.
#[derive(Clone)]
pub struct UsageLogger {
    store: Arc<dyn UsageStore>,
    failed_writes: Counter,
}

impl UsageLogger {
    pub fn new(store: Arc<dyn UsageStore>, failed_writes: Counter) -> Self {
        Self {
            store,
            failed_writes,
        }
    }

    /// Record one completed generation
    pub fn record(&self, entry: UsageLogEntry) {
        entry.log();
        if let Err(err) = self.store.append(entry) {
            self.failed_writes.inc();
            warn!(error = %err, "Failed to persist usage log entry");
        }
    }
}

/// Scheduled deleter of expired usage log entries
///
/// Deletes at most `sweep_batch_size` entries per invocation to bound a
/// single run's cost; rate-limit records are never touched.
pub struct RetentionSweeper {
    store: Arc<dyn UsageStore>,
    config: RetentionConfig,
    deleted_total: Counter,
}

impl RetentionSweeper {
    pub fn new(store: Arc<dyn UsageStore>, config: RetentionConfig, deleted_total: Counter) -> Self {
        Self {
            store,
            config,
            deleted_total,
        }
    }

    /// Run one sweep, returning how many entries were deleted
    pub fn run_once(&self, now: DateTime<Utc>) -> usize {
        let cutoff = now - Duration::days(self.config.retention_days);
        match self
            .store
            .delete_older_than(cutoff, self.config.sweep_batch_size)
        {
            Ok(deleted) => {
                self.deleted_total.inc_by(deleted as f64);
                if deleted > 0 {
                    info!(deleted, %cutoff, "Retention sweep removed expired usage entries");
                }
                deleted
            }
            Err(err) => {
                warn!(error = %err, "Retention sweep failed");
                0
            }
        }
    }

    /// Spawn the daily sweep loop on the runtime
    pub fn spawn(sweeper: Arc<Self>) {
        let interval = std::time::Duration::from_secs(sweeper.config.sweep_interval_seconds);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                sweeper.run_once(Utc::now());
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::store::{MemoryStore, StoreError};

    fn counter(name: &str) -> Counter {
        Counter::new(name.to_string(), "test counter".to_string()).unwrap()
    }

    /// Store whose writes always fail, for exercising the best-effort path
    struct FailingStore;

    impl UsageStore for FailingStore {
        fn append(&self, _entry: UsageLogEntry) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("write refused".to_string()))
        }

        fn delete_older_than(
            &self,
            _cutoff: DateTime<Utc>,
            _limit: usize,
        ) -> Result<usize, StoreError> {
            Err(StoreError::Unavailable("delete refused".to_string()))
        }
    }

    fn entry_aged(days: i64) -> UsageLogEntry {
        let mut entry = UsageLogEntry::new("u1".to_string(), 5, 20, "gemini-1.5-flash".to_string());
        entry.timestamp = Utc::now() - Duration::days(days);
        entry
    }

    #[test]
    fn test_record_appends() {
        let store = MemoryStore::new();
        let logger = UsageLogger::new(store.clone(), counter("usage_ok"));

        logger.record(entry_aged(0));
        assert_eq!(store.usage_count(), 1);
    }

    #[test]
    fn test_record_swallows_store_failure() {
        let failed = counter("usage_failed");
        let logger = UsageLogger::new(Arc::new(FailingStore), failed.clone());

        // Must not panic or propagate; only the counter moves.
        logger.record(entry_aged(0));
        assert_eq!(failed.get(), 1.0);
    }

    #[test]
    fn test_sweep_deletes_only_expired_entries() {
        let store = MemoryStore::new();
        store.append(entry_aged(40)).unwrap();
        store.append(entry_aged(31)).unwrap();
        store.append(entry_aged(29)).unwrap();
        store.append(entry_aged(1)).unwrap();

        let sweeper =
            RetentionSweeper::new(store.clone(), RetentionConfig::default(), counter("swept"));
        assert_eq!(sweeper.run_once(Utc::now()), 2);
        assert_eq!(store.usage_count(), 2);
    }

    #[test]
    fn test_sweep_is_idempotent_on_clean_store() {
        let store = MemoryStore::new();
        let sweeper =
            RetentionSweeper::new(store.clone(), RetentionConfig::default(), counter("swept2"));

        assert_eq!(sweeper.run_once(Utc::now()), 0);
        assert_eq!(sweeper.run_once(Utc::now()), 0);
    }

    #[test]
    fn test_sweep_respects_batch_cap() {
        let store = MemoryStore::new();
        for _ in 0..600 {
            store.append(entry_aged(45)).unwrap();
        }

        let sweeper =
            RetentionSweeper::new(store.clone(), RetentionConfig::default(), counter("swept3"));
        let now = Utc::now();

        assert_eq!(sweeper.run_once(now), 500);
        assert_eq!(store.usage_count(), 100);
        assert_eq!(sweeper.run_once(now), 100);
        assert_eq!(sweeper.run_once(now), 0);
    }

    #[test]
    fn test_sweep_failure_reports_zero() {
        let sweeper = RetentionSweeper::new(
            Arc::new(FailingStore),
            RetentionConfig::default(),
            counter("swept4"),
        );
        assert_eq!(sweeper.run_once(Utc::now()), 0);
    }
}
