//! Rate limiting services.
//!
//! Two independent limiters guard the generation endpoints:
//! - `FixedWindowLimiter`: per-user counter persisted through the
//!   `RateLimitStore` abstraction, used by the authenticated entry point.
//! - `IpRateLimiter`: in-memory per-address limiter fronting the public
//!   endpoint.

use crate::{
    config::{IpRateLimitConfig, UserRateLimitConfig},
    error::ApiError,
    models::RateLimitRecord,
    services::store::{RateLimitStore, StoreError},
};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

/// Upper bound on compare-and-set retries under write contention
const MAX_CAS_ATTEMPTS: usize = 8;

/// Per-user fixed-window rate limiter
///
/// The read-check-write sequence is made atomic by routing the write
/// through `compare_and_set`: a concurrent update from another request
/// invalidates the expectation and the whole sequence is retried, so the
/// counter can never admit more than `max_per_window` requests per window.
#[derive(Clone)]
pub struct FixedWindowLimiter {
    store: Arc<dyn RateLimitStore>,
    config: UserRateLimitConfig,
}

impl FixedWindowLimiter {
    pub fn new(store: Arc<dyn RateLimitStore>, config: UserRateLimitConfig) -> Self {
        Self { store, config }
    }

    /// Check the caller's window and count this request against it
    ///
    /// Returns the accepted request's position in the window, or
    /// `ResourceExhausted` when the window is full.
    pub fn check_and_increment(&self, user_id: &str) -> Result<u32, ApiError> {
        self.check_and_increment_at(user_id, Utc::now())
    }

    /// Same as `check_and_increment` with an explicit clock, for tests
    pub fn check_and_increment_at(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<u32, ApiError> {
        let window = ChronoDuration::seconds(self.config.window_seconds as i64);

        for _ in 0..MAX_CAS_ATTEMPTS {
            let current = self.store.get(user_id).map_err(store_error)?;

            let next = match &current {
                Some(record) if now - record.window_start < window => {
                    if record.count >= self.config.max_per_window {
                        return Err(ApiError::ResourceExhausted(
                            "Rate limit exceeded. Please try again later.".to_string(),
                        ));
                    }
                    RateLimitRecord {
                        count: record.count + 1,
                        window_start: record.window_start,
                    }
                }
                // No record yet, or the window has elapsed: open a fresh one.
                _ => RateLimitRecord::fresh(now),
            };

            let count = next.count;
            if self
                .store
                .compare_and_set(user_id, current.as_ref(), next)
                .map_err(store_error)?
            {
                return Ok(count);
            }
        }

        tracing::error!(user_id = %user_id, "rate limit CAS retries exhausted");
        Err(ApiError::Internal("Rate limit check failed".to_string()))
    }
}

fn store_error(err: StoreError) -> ApiError {
    tracing::error!(error = %err, "rate limit store error");
    ApiError::Internal("Rate limit check failed".to_string())
}

/// Simple in-memory per-IP rate limiter
///
/// Fronts the public endpoint with a coarse global cap per client address,
/// independent of the per-user limiter.
#[derive(Clone)]
pub struct IpRateLimiter {
    config: IpRateLimitConfig,
    storage: Arc<Mutex<HashMap<String, (u32, Instant)>>>,
}

impl IpRateLimiter {
    pub fn new(config: IpRateLimitConfig) -> Self {
        Self {
            config,
            storage: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Check whether the given client address is within its limit
    ///
    /// Returns `true` if the request should be allowed.
    pub fn check(&self, key: &str) -> bool {
        let Ok(mut storage) = self.storage.lock() else {
            // A poisoned limiter should not take the endpoint down with it.
            return true;
        };
        let now = Instant::now();
        let window = Duration::from_secs(self.config.window_seconds);

        // Elapsed windows are evicted here, so any surviving entry is
        // current; a fresh window always starts through the `None` arm.
        storage.retain(|_, (_, started)| now.duration_since(*started) < window);

        match storage.get_mut(key) {
            Some((count, _)) => {
                if *count >= self.config.max_per_window {
                    false
                } else {
                    *count += 1;
                    true
                }
            }
            None => {
                storage.insert(key.to_string(), (1, now));
                true
            }
        }
    }
}
