//! CORS configuration.

use std::env;

/// Configuration for cross-origin request handling
///
/// Allowed methods are restricted to POST; preflight requests are answered
/// by the CORS middleware with 204.
#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origin: String,
    pub allowed_methods: String,
    pub allowed_headers: String,
    pub max_age_seconds: u32,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origin: "*".to_string(),
            allowed_methods: "POST".to_string(),
            allowed_headers: "Content-Type, X-User-Id".to_string(),
            max_age_seconds: 3600,
        }
    }
}

impl CorsConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            allowed_origin: env::var("CORS_ALLOWED_ORIGIN").unwrap_or(defaults.allowed_origin),
            allowed_methods: env::var("CORS_ALLOWED_METHODS").unwrap_or(defaults.allowed_methods),
            allowed_headers: env::var("CORS_ALLOWED_HEADERS").unwrap_or(defaults.allowed_headers),
            max_age_seconds: env::var("CORS_MAX_AGE_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_age_seconds),
        }
    }
}
