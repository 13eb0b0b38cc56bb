//! Generation endpoint handlers.
//!
//! Both entry points run the same pipeline: validate, rate-limit, call the
//! upstream service, log usage, respond. They differ only in where the
//! upstream key and the caller identity come from.

use crate::{
    error::ApiError,
    models::{GenerateRequest, GenerateResponse, RpcGenerateRequest, UsageLogEntry},
    services::{
        gemini::GeminiClient,
        metrics::AppMetrics,
        rate_limit::{FixedWindowLimiter, IpRateLimiter},
        usage::UsageLogger,
        validation::{validate_api_key, validate_prompt},
    },
    utils::extract_client_ip,
};
use actix_web::{Error, HttpRequest, Result, web};
use paperclip::actix::api_v2_operation;

/// Public generation endpoint
///
/// The caller supplies their own upstream API key in the request body. A
/// coarse per-IP limiter guards this entry point; validation and
/// rate-limit denials return without contacting the upstream service.
#[api_v2_operation(
    summary = "Generate Text",
    description = "Forwards a prompt to the Gemini generation API using the caller-supplied API key and returns the generated text.",
    tags("Generation"),
    responses(
        (status = 200, description = "Successful response", body = GenerateResponse),
        (status = 400, description = "Bad Request - Invalid or missing prompt or key"),
        (status = 401, description = "Unauthorized - Upstream rejected the API key"),
        (status = 429, description = "Too Many Requests"),
        (status = 500, description = "Internal Server Error - Generation service unavailable")
    )
)]
pub async fn generate(
    req: HttpRequest,
    body: web::Json<GenerateRequest>,
) -> Result<web::Json<GenerateResponse>, Error> {
    let metrics = req.app_data::<web::Data<AppMetrics>>().cloned();
    let ip = extract_client_ip(&req);

    // Global per-IP limiter in front of everything else
    if let Some(limiter) = req.app_data::<web::Data<IpRateLimiter>>() {
        if !limiter.check(&ip) {
            if let Some(m) = &metrics {
                m.rate_limited_total.with_label_values(&["ip"]).inc();
            }
            return Err(ApiError::ResourceExhausted(
                "Rate limit exceeded. Please try again later.".to_string(),
            )
            .into());
        }
    }

    let gemini = required_service::<GeminiClient>(&req)?;
    let prompt = validate_prompt(body.prompt.as_deref(), gemini.config().max_prompt_chars)?;
    let api_key = validate_api_key(body.api_key.as_deref())?;

    let result = run_generation(&req, &gemini, &prompt, Some(&api_key), "http").await?;

    if let Some(logger) = req.app_data::<web::Data<UsageLogger>>() {
        logger.record(UsageLogEntry::new(
            format!("ip:{ip}"),
            prompt.chars().count(),
            result.response.chars().count(),
            gemini.config().model.clone(),
        ));
    }

    Ok(web::Json(result))
}

/// Authenticated generation endpoint
///
/// Caller identity arrives in the `X-User-Id` header installed by the
/// fronting identity provider; the server-held upstream key is used. Each
/// accepted request is counted against the caller's fixed window.
#[api_v2_operation(
    summary = "Generate Text (authenticated)",
    description = "Forwards a prompt to the Gemini generation API on behalf of an authenticated user, using the server-held API key and a per-user rate limit.",
    tags("Generation"),
    responses(
        (status = 200, description = "Successful response", body = GenerateResponse),
        (status = 400, description = "Bad Request - Invalid or missing prompt"),
        (status = 401, description = "Unauthorized - Missing caller identity"),
        (status = 429, description = "Too Many Requests - Per-user limit reached"),
        (status = 500, description = "Internal Server Error - Generation service unavailable")
    )
)]
pub async fn rpc_generate(
    req: HttpRequest,
    body: web::Json<RpcGenerateRequest>,
) -> Result<web::Json<GenerateResponse>, Error> {
    let metrics = req.app_data::<web::Data<AppMetrics>>().cloned();

    let user_id = req
        .headers()
        .get("X-User-Id")
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::Unauthenticated("Authentication required".to_string()))?;

    let gemini = required_service::<GeminiClient>(&req)?;
    let prompt = validate_prompt(body.prompt.as_deref(), gemini.config().max_prompt_chars)?;

    let limiter = required_service::<FixedWindowLimiter>(&req)?;
    if let Err(err) = limiter.check_and_increment(&user_id) {
        if matches!(err, ApiError::ResourceExhausted(_)) {
            if let Some(m) = &metrics {
                m.rate_limited_total.with_label_values(&["user"]).inc();
            }
            tracing::warn!(user_id = %user_id, "Per-user rate limit reached");
        }
        return Err(err.into());
    }

    let result = run_generation(&req, &gemini, &prompt, None, "rpc").await?;

    if let Some(logger) = req.app_data::<web::Data<UsageLogger>>() {
        logger.record(UsageLogEntry::new(
            user_id,
            prompt.chars().count(),
            result.response.chars().count(),
            gemini.config().model.clone(),
        ));
    }

    Ok(web::Json(result))
}

/// Shared upstream-call tail of both handlers
async fn run_generation(
    req: &HttpRequest,
    gemini: &GeminiClient,
    prompt: &str,
    api_key_override: Option<&str>,
    entry_point: &str,
) -> Result<GenerateResponse, Error> {
    let metrics = req.app_data::<web::Data<AppMetrics>>();

    match gemini.generate(prompt, api_key_override).await {
        Ok(result) => {
            if let Some(m) = metrics {
                m.generation_requests_total
                    .with_label_values(&[entry_point, "success"])
                    .inc();
            }
            Ok(GenerateResponse {
                response: result.text,
                timestamp: result.timestamp.to_rfc3339(),
            })
        }
        Err(err) => {
            // Full upstream detail stays server-side.
            tracing::error!(entry_point, error = %err, "Upstream generation failed");
            if let Some(m) = metrics {
                m.generation_requests_total
                    .with_label_values(&[entry_point, "error"])
                    .inc();
            }
            Err(ApiError::from(err).into())
        }
    }
}

/// Fetch a required service from app data
fn required_service<T: 'static>(req: &HttpRequest) -> Result<web::Data<T>, Error> {
    req.app_data::<web::Data<T>>().cloned().ok_or_else(|| {
        tracing::error!(
            service = std::any::type_name::<T>(),
            "Required service missing from app data"
        );
        ApiError::Internal("Service not configured".to_string()).into()
    })
}
