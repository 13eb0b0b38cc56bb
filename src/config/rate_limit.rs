//! Rate limiting configuration.

use std::env;

/// Configuration for the per-user fixed-window limiter
///
/// Applied to the authenticated entry point, keyed by caller identity.
#[derive(Debug, Clone)]
pub struct UserRateLimitConfig {
    pub max_per_window: u32,
    pub window_seconds: u64,
}

impl Default for UserRateLimitConfig {
    fn default() -> Self {
        Self {
            max_per_window: 20,
            window_seconds: 3600,
        }
    }
}

impl UserRateLimitConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let max_per_window = env::var("USER_RATE_LIMIT_MAX")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(20);

        let window_seconds = env::var("USER_RATE_LIMIT_WINDOW_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3600);

        Self {
            max_per_window,
            window_seconds,
        }
    }
}

/// Configuration for the global per-IP limiter fronting the public endpoint
#[derive(Debug, Clone)]
pub struct IpRateLimitConfig {
    pub max_per_window: u32,
    pub window_seconds: u64,
}

impl Default for IpRateLimitConfig {
    fn default() -> Self {
        Self {
            max_per_window: 100,
            window_seconds: 900,
        }
    }
}

impl IpRateLimitConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let max_per_window = env::var("IP_RATE_LIMIT_MAX")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(100);

        let window_seconds = env::var("IP_RATE_LIMIT_WINDOW_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(900);

        Self {
            max_per_window,
            window_seconds,
        }
    }
}
