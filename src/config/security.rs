//! Security headers configuration.

use std::env;

/// Configuration for security headers middleware
#[derive(Debug, Clone)]
pub struct SecurityHeadersConfig {
    pub content_type_options: bool,
    pub frame_options: String,
    pub referrer_policy: String,
    pub hsts_enabled: bool,
    pub hsts_max_age: u32,
}

impl Default for SecurityHeadersConfig {
    fn default() -> Self {
        Self {
            content_type_options: true,
            frame_options: "DENY".to_string(),
            referrer_policy: "no-referrer".to_string(),
            hsts_enabled: true,
            hsts_max_age: 31536000, // 1 year
        }
    }
}

impl SecurityHeadersConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let content_type_options = env::var("X_CONTENT_TYPE_OPTIONS")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(true);

        let frame_options = env::var("X_FRAME_OPTIONS").unwrap_or_else(|_| "DENY".to_string());

        let referrer_policy =
            env::var("REFERRER_POLICY").unwrap_or_else(|_| "no-referrer".to_string());

        let hsts_enabled = env::var("HSTS_ENABLED")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(true);

        let hsts_max_age = env::var("HSTS_MAX_AGE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(31536000);

        Self {
            content_type_options,
            frame_options,
            referrer_policy,
            hsts_enabled,
            hsts_max_age,
        }
    }
}
