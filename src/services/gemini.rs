//! Upstream client for the Gemini generation API.
//!
//! Wraps a single `generateContent` call with fixed sampling parameters and
//! a bounded timeout. Failures are classified into typed variants at this
//! boundary so the rest of the service never inspects upstream message
//! text. No retry is attempted; a single failure surfaces immediately.

use crate::{config::GenerationConfig, error::ApiError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Result of a successful generation
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// Typed upstream failure classification
#[derive(Debug, thiserror::Error)]
pub enum GeminiError {
    #[error("API key was rejected by the generation service")]
    InvalidKey,

    #[error("generation service quota exhausted")]
    QuotaExceeded,

    #[error("content blocked by safety filters: {0}")]
    SafetyBlocked(String),

    #[error("no content generated")]
    NoContent,

    #[error("generation request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("generation service error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("no server-side API key configured")]
    MissingKey,
}

impl From<GeminiError> for ApiError {
    fn from(err: GeminiError) -> Self {
        match err {
            GeminiError::InvalidKey => {
                ApiError::Unauthenticated("Invalid API key".to_string())
            }
            GeminiError::QuotaExceeded => ApiError::ResourceExhausted(
                "Generation quota exceeded. Please try again later.".to_string(),
            ),
            GeminiError::SafetyBlocked(_) => {
                ApiError::InvalidArgument("Content blocked by safety filters".to_string())
            }
            GeminiError::NoContent => ApiError::Internal("No content generated".to_string()),
            // Upstream detail stays in server-side logs only.
            GeminiError::Timeout
            | GeminiError::Network(_)
            | GeminiError::Api { .. }
            | GeminiError::MissingKey => {
                ApiError::Internal("Generation service unavailable".to_string())
            }
        }
    }
}

// Wire format for generateContent requests and responses.

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: SamplingParams,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SamplingParams {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpstreamErrorBody {
    error: Option<UpstreamErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct UpstreamErrorDetail {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

/// Client for the Gemini `generateContent` endpoint
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    config: GenerationConfig,
}

impl GeminiClient {
    /// Create a new client with bounded connect and request timeouts
    pub fn new(config: GenerationConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Generate text for a validated prompt
    ///
    /// `api_key_override` carries a caller-supplied key for the public
    /// endpoint; when absent the server-held key is used.
    pub async fn generate(
        &self,
        prompt: &str,
        api_key_override: Option<&str>,
    ) -> Result<GenerationResult, GeminiError> {
        if self.config.provider == "mock" {
            return Ok(GenerationResult {
                text: format!("Mock response for prompt of {} characters", prompt.chars().count()),
                timestamp: Utc::now(),
            });
        }

        let api_key = api_key_override
            .map(str::to_string)
            .or_else(|| self.config.api_key.clone())
            .ok_or(GeminiError::MissingKey)?;

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.config.base_url, self.config.model, api_key
        );

        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: SamplingParams {
                temperature: self.config.temperature,
                top_p: self.config.top_p,
                top_k: self.config.top_k,
                max_output_tokens: self.config.max_output_tokens,
            },
        };

        debug!(
            destination = %self.destination(),
            model = %self.config.model,
            prompt_length = prompt.chars().count(),
            "Calling generation API"
        );

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GeminiError::Timeout
                } else {
                    // The request URL carries the API key; it must not
                    // survive into error text that reaches the logs.
                    GeminiError::Network(e.without_url())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let err = classify_failure(status.as_u16(), &text);
            warn!(
                destination = %self.destination(),
                status = status.as_u16(),
                error = %err,
                "Generation API returned an error"
            );
            return Err(err);
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GeminiError::Network(e.without_url()))?;
        extract_text(parsed).map(|text| GenerationResult {
            text,
            timestamp: Utc::now(),
        })
    }

    /// Upstream host for log fields
    fn destination(&self) -> String {
        url::Url::parse(&self.config.base_url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// Classify a non-success upstream response by status code and body
fn classify_failure(status: u16, body: &str) -> GeminiError {
    let detail = serde_json::from_str::<UpstreamErrorBody>(body)
        .ok()
        .and_then(|b| b.error);
    let (message, rpc_status) = detail
        .map(|d| (d.message, d.status))
        .unwrap_or_default();
    let lowered = message.to_lowercase();

    if status == 401 || status == 403 || rpc_status == "PERMISSION_DENIED" {
        return GeminiError::InvalidKey;
    }
    if status == 400
        && (lowered.contains("api key")
            || (rpc_status == "INVALID_ARGUMENT" && lowered.contains("key")))
    {
        return GeminiError::InvalidKey;
    }
    if status == 429 || rpc_status == "RESOURCE_EXHAUSTED" || lowered.contains("quota") {
        return GeminiError::QuotaExceeded;
    }
    if lowered.contains("safety") {
        return GeminiError::SafetyBlocked(message);
    }

    GeminiError::Api { status, message }
}

/// Pull the generated text out of a successful response
///
/// Blocked prompts and empty candidates are failures: a success response
/// always carries non-empty text.
fn extract_text(response: GenerateContentResponse) -> Result<String, GeminiError> {
    if let Some(feedback) = &response.prompt_feedback {
        if let Some(reason) = &feedback.block_reason {
            return Err(GeminiError::SafetyBlocked(reason.clone()));
        }
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or(GeminiError::NoContent)?;

    if candidate.finish_reason.as_deref() == Some("SAFETY") {
        return Err(GeminiError::SafetyBlocked("SAFETY".to_string()));
    }

    let text = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(GeminiError::NoContent);
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response_from(json: &str) -> GenerateContentResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_classify_invalid_key() {
        let body = r#"{"error":{"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT"}}"#;
        assert!(matches!(classify_failure(400, body), GeminiError::InvalidKey));
        assert!(matches!(classify_failure(403, "{}"), GeminiError::InvalidKey));
    }

    #[test]
    fn test_classify_quota() {
        let body = r#"{"error":{"message":"Quota exceeded for requests","status":"RESOURCE_EXHAUSTED"}}"#;
        assert!(matches!(
            classify_failure(429, body),
            GeminiError::QuotaExceeded
        ));
        // Status code alone is enough.
        assert!(matches!(classify_failure(429, ""), GeminiError::QuotaExceeded));
    }

    #[test]
    fn test_classify_safety() {
        let body = r#"{"error":{"message":"Request blocked by safety settings","status":"INVALID_ARGUMENT"}}"#;
        assert!(matches!(
            classify_failure(400, body),
            GeminiError::SafetyBlocked(_)
        ));
    }

    #[test]
    fn test_classify_unknown_is_api_error() {
        let err = classify_failure(500, "upstream exploded");
        match err {
            GeminiError::Api { status, .. } => assert_eq!(status, 500),
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_extract_text_happy_path() {
        let resp = response_from(
            r#"{"candidates":[{"content":{"parts":[{"text":"Hello "},{"text":"there"}]},"finishReason":"STOP"}]}"#,
        );
        assert_eq!(extract_text(resp).unwrap(), "Hello there");
    }

    #[test]
    fn test_extract_text_empty_is_no_content() {
        let resp = response_from(r#"{"candidates":[{"content":{"parts":[{"text":"  "}]}}]}"#);
        assert!(matches!(extract_text(resp), Err(GeminiError::NoContent)));

        let resp = response_from(r#"{"candidates":[]}"#);
        assert!(matches!(extract_text(resp), Err(GeminiError::NoContent)));
    }

    #[test]
    fn test_extract_text_blocked_prompt() {
        let resp = response_from(r#"{"candidates":[],"promptFeedback":{"blockReason":"SAFETY"}}"#);
        assert!(matches!(
            extract_text(resp),
            Err(GeminiError::SafetyBlocked(_))
        ));
    }

    #[test]
    fn test_extract_text_safety_finish_reason() {
        let resp = response_from(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#);
        assert!(matches!(
            extract_text(resp),
            Err(GeminiError::SafetyBlocked(_))
        ));
    }

    #[test]
    fn test_error_taxonomy_mapping() {
        assert!(matches!(
            ApiError::from(GeminiError::InvalidKey),
            ApiError::Unauthenticated(_)
        ));
        assert!(matches!(
            ApiError::from(GeminiError::QuotaExceeded),
            ApiError::ResourceExhausted(_)
        ));
        assert!(matches!(
            ApiError::from(GeminiError::SafetyBlocked("x".into())),
            ApiError::InvalidArgument(_)
        ));
        assert!(matches!(
            ApiError::from(GeminiError::NoContent),
            ApiError::Internal(_)
        ));
        assert!(matches!(
            ApiError::from(GeminiError::Timeout),
            ApiError::Internal(_)
        ));
    }

    #[test]
    fn test_upstream_detail_not_leaked() {
        let err = ApiError::from(GeminiError::Api {
            status: 500,
            message: "secret internal detail".to_string(),
        });
        assert!(!err.to_string().contains("secret"));
    }

    #[tokio::test]
    async fn test_mock_provider_skips_network() {
        let config = GenerationConfig {
            provider: "mock".to_string(),
            ..GenerationConfig::default()
        };
        let client = GeminiClient::new(config).unwrap();

        let result = client.generate("Hello", None).await.unwrap();
        assert!(!result.text.is_empty());
    }

    #[tokio::test]
    async fn test_transport_error_omits_api_key() {
        // Nothing listens on the discard port, so the call fails in
        // transport with the key in the request URL.
        let config = GenerationConfig {
            api_key: Some("secret-key-123".to_string()),
            base_url: "http://127.0.0.1:9".to_string(),
            request_timeout_seconds: 2,
            connect_timeout_seconds: 1,
            ..GenerationConfig::default()
        };
        let client = GeminiClient::new(config).unwrap();

        let err = client.generate("Hello", None).await.unwrap_err();
        assert!(!err.to_string().contains("secret-key-123"));
    }

    #[tokio::test]
    async fn test_missing_server_key() {
        let config = GenerationConfig {
            api_key: None,
            ..GenerationConfig::default()
        };
        let client = GeminiClient::new(config).unwrap();

        let err = client.generate("Hello", None).await.unwrap_err();
        assert!(matches!(err, GeminiError::MissingKey));
    }
}
