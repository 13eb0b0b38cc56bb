//! Usage-log retention configuration.

use std::env;

/// Configuration for the scheduled usage-log retention sweep
///
/// The sweep only ever touches usage log entries; rate-limit records are
/// kept indefinitely.
#[derive(Debug, Clone)]
pub struct RetentionConfig {
    /// Entries older than this many days are eligible for deletion
    pub retention_days: i64,
    /// Upper bound on deletions per sweep invocation
    pub sweep_batch_size: usize,
    pub sweep_interval_seconds: u64,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            retention_days: 30,
            sweep_batch_size: 500,
            sweep_interval_seconds: 86400,
        }
    }
}

impl RetentionConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let retention_days = env::var("USAGE_RETENTION_DAYS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        let sweep_batch_size = env::var("RETENTION_SWEEP_BATCH")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(500);

        let sweep_interval_seconds = env::var("RETENTION_SWEEP_INTERVAL_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(86400);

        Self {
            retention_days,
            sweep_batch_size,
            sweep_interval_seconds,
        }
    }
}
