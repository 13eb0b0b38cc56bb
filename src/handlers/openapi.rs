//! OpenAPI specification generation and app factory.

use crate::{
    config::Settings,
    error::ApiError,
    handlers::{generate, get_metrics, health, rpc_generate},
    middleware::{Cors, MetricsMiddleware, RequestIdMiddleware, SecurityHeaders},
    services::{
        gemini::GeminiClient,
        metrics::AppMetrics,
        rate_limit::{FixedWindowLimiter, IpRateLimiter},
        store::MemoryStore,
        usage::{RetentionSweeper, UsageLogger},
    },
};
use actix_web::{App, body::MessageBody};
use paperclip::actix::{OpenApiExt, web};
use paperclip::v2::models::{DefaultApiRaw, Info};
use std::sync::Arc;

/// Errors that can occur while assembling the application context
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("failed to create metrics registry: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("failed to create HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Shared application context built once at startup
///
/// Every worker clones this, so the store, the limiters, and the metrics
/// registry are shared across all concurrent requests.
#[derive(Clone)]
pub struct AppContext {
    pub settings: Settings,
    pub store: Arc<MemoryStore>,
    pub gemini: GeminiClient,
    pub user_limiter: FixedWindowLimiter,
    pub ip_limiter: IpRateLimiter,
    pub usage_logger: UsageLogger,
    pub sweeper: Arc<RetentionSweeper>,
    pub metrics: AppMetrics,
}

impl AppContext {
    /// Assemble the context from a settings bundle
    pub fn new(settings: Settings) -> Result<Self, StartupError> {
        let metrics = AppMetrics::new()?;
        let store = MemoryStore::new();
        let gemini = GeminiClient::new(settings.generation.clone())?;
        let user_limiter =
            FixedWindowLimiter::new(store.clone(), settings.user_rate_limit.clone());
        let ip_limiter = IpRateLimiter::new(settings.ip_rate_limit.clone());
        let usage_logger =
            UsageLogger::new(store.clone(), metrics.usage_log_failures_total.clone());
        let sweeper = Arc::new(RetentionSweeper::new(
            store.clone(),
            settings.retention.clone(),
            metrics.retention_deleted_total.clone(),
        ));

        Ok(Self {
            settings,
            store,
            gemini,
            user_limiter,
            ip_limiter,
            usage_logger,
            sweeper,
            metrics,
        })
    }

    /// Assemble the context from environment variables
    pub fn from_env() -> Result<Self, StartupError> {
        Self::new(Settings::from_env())
    }
}

/// Creates the shared OpenAPI specification for the API
pub fn create_openapi_spec() -> DefaultApiRaw {
    DefaultApiRaw {
        info: Info {
            title: "Gemini Relay".into(),
            version: env!("CARGO_PKG_VERSION").into(),
            description: Some(
                "An HTTP relay that forwards text prompts to the Google Gemini generation API.\n\n\
                ## Entry points\n\
                - `POST /generate`: public endpoint; the caller supplies their own upstream API key \
                in the request body and is subject to a global per-IP rate limit.\n\
                - `POST /rpc/generate`: authenticated endpoint; caller identity arrives in the \
                `X-User-Id` header (installed by the fronting identity provider), the server-held \
                key is used, and each user is limited per fixed window.\n\n\
                ## Errors\n\
                Every failure carries a JSON body `{ \"error\": message, \"code\": kind }` where \
                kind is one of `invalid-argument`, `unauthenticated`, `resource-exhausted`, or \
                `internal`."
                    .into(),
            ),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Creates the application from a shared context
///
/// This factory function wires up all endpoints, middleware, and shared
/// services. It is used both by `main` (once per worker) and by the
/// integration tests.
pub fn create_app(
    ctx: &AppContext,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<impl MessageBody + use<>>,
        Error = actix_web::Error,
        InitError = (),
    > + use<>,
> {
    // Malformed bodies (including non-string prompts) get the service's
    // own error shape instead of the framework default.
    let json_config = actix_web::web::JsonConfig::default().error_handler(|err, _req| {
        tracing::debug!(error = %err, "Rejected malformed JSON body");
        ApiError::InvalidArgument("Invalid prompt".to_string()).into()
    });

    App::new()
        .wrap(SecurityHeaders::new(ctx.settings.security.clone()))
        .wrap(Cors::new(ctx.settings.cors.clone()))
        .wrap(RequestIdMiddleware)
        .wrap(MetricsMiddleware)
        .wrap_api_with_spec(create_openapi_spec())
        .app_data(json_config)
        .app_data(web::Data::new(ctx.gemini.clone()))
        .app_data(web::Data::new(ctx.user_limiter.clone()))
        .app_data(web::Data::new(ctx.ip_limiter.clone()))
        .app_data(web::Data::new(ctx.usage_logger.clone()))
        .app_data(web::Data::new(ctx.metrics.clone()))
        .app_data(web::Data::new(ctx.settings.metrics.clone()))
        .service(web::resource("/generate").route(web::post().to(generate)))
        .service(web::resource("/rpc/generate").route(web::post().to(rpc_generate)))
        .service(web::resource("/health").route(web::get().to(health)))
        .service(web::resource("/metrics").route(web::get().to(get_metrics)))
        .with_json_spec_at("/api/spec/v2")
        .build()
}
