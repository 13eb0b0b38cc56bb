//! Metrics exposition configuration.

use std::env;

/// Controls whether the Prometheus exposition endpoint is served
///
/// Collection itself is always on; disabling only turns the `/metrics`
/// route into a 503 for deployments that scrape through a sidecar or not
/// at all.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl MetricsConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let enabled = env::var("METRICS_EXPOSITION_ENABLED")
            .map(|v| v.to_lowercase() != "false")
            .unwrap_or(true);

        Self { enabled }
    }
}
