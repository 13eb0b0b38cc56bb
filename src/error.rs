//! Stable error taxonomy surfaced to API callers.
//!
//! Every failure in the service collapses into one of four kinds, each with
//! a fixed HTTP status and a machine-readable code. Upstream error detail is
//! logged server-side and never echoed into these messages.

use crate::models::ErrorResponse;
use actix_web::{http::StatusCode, HttpResponse, ResponseError};

/// API-level error returned to callers
///
/// Validation and rate-limit denials are produced locally; upstream
/// failures are classified by the Gemini client and converted into one of
/// these variants before they reach a handler boundary.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// Malformed, missing, or oversized input, or content blocked upstream
    #[error("{0}")]
    InvalidArgument(String),

    /// Missing caller identity or a rejected upstream API key
    #[error("{0}")]
    Unauthenticated(String),

    /// Per-user or global rate limit hit, or upstream quota exhaustion
    #[error("{0}")]
    ResourceExhausted(String),

    /// Anything unclassified, including upstream transport failures
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Stable machine-readable kind name for the error body
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::InvalidArgument(_) => "invalid-argument",
            ApiError::Unauthenticated(_) => "unauthenticated",
            ApiError::ResourceExhausted(_) => "resource-exhausted",
            ApiError::Internal(_) => "internal",
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::ResourceExhausted(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
            code: self.kind().to_string(),
        })
    }
}
