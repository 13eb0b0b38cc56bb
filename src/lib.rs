//! Gemini Relay - an HTTP relay that routes text prompts to the Google
//! Gemini generation API.
//!
//! The service wraps a single upstream call with the operational pieces a
//! public prompt endpoint needs:
//! - Request validation (prompt presence, emptiness, maximum length)
//! - Per-user fixed-window rate limiting backed by a key-value store
//! - A global per-IP limiter in front of the public endpoint
//! - Typed translation of upstream failures into a stable error taxonomy
//! - Best-effort usage logging with a daily retention sweep
//! - Prometheus metrics and OpenAPI documentation
//!
//! ## Architecture
//!
//! The codebase is organized into focused modules:
//! - `models/` - Data structures and request/response models
//! - `handlers/` - HTTP request handlers for each endpoint
//! - `middleware/` - Custom middleware for cross-cutting concerns
//! - `services/` - Business logic: validation, rate limiting, the
//!   upstream client, usage logging, and the store abstraction
//! - `utils/` - Utility functions and helpers
//! - `config/` - Configuration structures and environment loading
//!
//! ## Quick Start
//!
//! ```no_run
//! use gemini_relay::{create_app, AppContext};
//!
//! #[actix_web::main]
//! async fn main() -> std::io::Result<()> {
//!     let ctx = AppContext::from_env().expect("context");
//!     let server_ctx = ctx.clone();
//!     actix_web::HttpServer::new(move || create_app(&server_ctx))
//!         .bind("127.0.0.1:8080")?
//!         .run()
//!         .await
//! }
//! ```

// Core modules
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

// Re-export commonly used types and functions for convenience
pub use config::{
    CorsConfig, GenerationConfig, IpRateLimitConfig, MetricsConfig, RetentionConfig,
    SecurityHeadersConfig, Settings, UserRateLimitConfig,
};
pub use error::ApiError;
pub use handlers::{
    create_app, create_openapi_spec, generate, get_metrics, health, rpc_generate, AppContext,
    StartupError,
};
pub use middleware::{Cors, MetricsMiddleware, RequestIdMiddleware, SecurityHeaders};
pub use models::{
    ErrorResponse, GenerateRequest, GenerateResponse, HealthResponse, RateLimitRecord,
    RpcGenerateRequest, UsageLogEntry,
};
pub use services::{
    validate_api_key, validate_prompt, AppMetrics, FixedWindowLimiter, GeminiClient, GeminiError,
    GenerationResult, IpRateLimiter, MemoryStore, RateLimitStore, RetentionSweeper, StoreError,
    UsageLogger, UsageStore,
};
pub use utils::{extract_client_ip, extract_user_agent};
