//! Persisted records: rate-limit counters and usage log entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-user fixed-window counter record
///
/// `count` is the number of accepted requests since `window_start`. A
/// record whose window has elapsed is reset to `count = 1` on the next
/// accepted request rather than incremented. Records are created lazily on
/// a user's first request and never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitRecord {
    pub count: u32,
    pub window_start: DateTime<Utc>,
}

impl RateLimitRecord {
    /// Fresh record opening a new window at `now`
    pub fn fresh(now: DateTime<Utc>) -> Self {
        Self {
            count: 1,
            window_start: now,
        }
    }
}

/// Immutable audit record of one completed generation
///
/// Written best-effort after a successful upstream call; bulk-deleted by
/// the retention sweep after the configured retention period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageLogEntry {
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
    pub prompt_length: usize,
    pub response_length: usize,
    pub model: String,
}

impl UsageLogEntry {
    /// Create an entry stamped with the current time
    pub fn new(user_id: String, prompt_length: usize, response_length: usize, model: String) -> Self {
        Self {
            user_id,
            timestamp: Utc::now(),
            prompt_length,
            response_length,
            model,
        }
    }

    /// Log the entry using structured logging
    pub fn log(&self) {
        tracing::info!(
            target: "usage",
            user_id = %self.user_id,
            timestamp = %self.timestamp,
            prompt_length = self.prompt_length,
            response_length = self.response_length,
            model = %self.model,
            "Generation completed"
        );
    }
}
