//! API request and response models for the HTTP endpoints.

use paperclip::actix::Apiv2Schema;
use serde::{Deserialize, Serialize};

/// Request body for the public generation endpoint
///
/// Both fields are optional at the serde level so that the validator can
/// report missing fields with the service's own error shape instead of a
/// deserialization failure.
#[derive(Clone, Debug, Serialize, Deserialize, Apiv2Schema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// Caller-supplied upstream API key
    #[serde(default)]
    pub api_key: Option<String>,
    /// Prompt to forward to the generation API
    #[serde(default)]
    pub prompt: Option<String>,
}

/// Request body for the authenticated generation endpoint
///
/// Caller identity arrives in the `X-User-Id` header; the upstream key is
/// the server-held credential.
#[derive(Clone, Debug, Serialize, Deserialize, Apiv2Schema)]
#[serde(rename_all = "camelCase")]
pub struct RpcGenerateRequest {
    #[serde(default)]
    pub prompt: Option<String>,
}

/// Successful generation response
#[derive(Clone, Debug, Serialize, Deserialize, Apiv2Schema)]
pub struct GenerateResponse {
    /// Generated text, always non-empty on success
    pub response: String,
    /// RFC 3339 timestamp of the generation
    pub timestamp: String,
}

/// Response model for the health check endpoint
#[derive(Clone, Serialize, Deserialize, Apiv2Schema)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub service: String,
}

/// Structured error body returned for every failure
#[derive(Clone, Debug, Serialize, Deserialize, Apiv2Schema)]
pub struct ErrorResponse {
    /// Short human-readable message
    pub error: String,
    /// Machine-readable kind: invalid-argument, unauthenticated,
    /// resource-exhausted, or internal
    pub code: String,
}
