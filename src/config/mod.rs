//! Configuration structures and loading utilities.
//!
//! This module contains all configuration structures used by the application,
//! including environment variable loading and default values.

pub mod cors;
pub mod generation;
pub mod metrics;
pub mod rate_limit;
pub mod retention;
pub mod security;

pub use cors::*;
pub use generation::*;
pub use metrics::*;
pub use rate_limit::*;
pub use retention::*;
pub use security::*;

/// Bundle of every config section the application needs
///
/// `from_env` reads the whole environment once at startup; tests construct
/// a default bundle and override individual sections.
#[derive(Clone, Default)]
pub struct Settings {
    pub generation: GenerationConfig,
    pub user_rate_limit: UserRateLimitConfig,
    pub ip_rate_limit: IpRateLimitConfig,
    pub retention: RetentionConfig,
    pub cors: CorsConfig,
    pub security: SecurityHeadersConfig,
    pub metrics: MetricsConfig,
}

impl Settings {
    /// Load every section from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            generation: GenerationConfig::from_env(),
            user_rate_limit: UserRateLimitConfig::from_env(),
            ip_rate_limit: IpRateLimitConfig::from_env(),
            retention: RetentionConfig::from_env(),
            cors: CorsConfig::from_env(),
            security: SecurityHeadersConfig::from_env(),
            metrics: MetricsConfig::from_env(),
        }
    }
}
