//! Upstream generation API configuration.

use std::env;

/// Configuration for the upstream Gemini call
///
/// Sampling parameters are fixed deployment configuration, not tunable per
/// request. `api_key` is the server-held credential used by the
/// authenticated entry point; the public endpoint carries its own key in
/// the request body.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// "gemini" for the real API, "mock" for a canned local response
    pub provider: String,
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
    /// Maximum accepted prompt length in characters
    pub max_prompt_chars: usize,
    pub request_timeout_seconds: u64,
    pub connect_timeout_seconds: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-1.5-flash".to_string(),
            temperature: 0.7,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 2048,
            max_prompt_chars: 8000,
            request_timeout_seconds: 30,
            connect_timeout_seconds: 5,
        }
    }
}

impl GenerationConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            provider: env::var("GENERATION_PROVIDER").unwrap_or(defaults.provider),
            api_key: env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty()),
            base_url: env::var("GEMINI_BASE_URL").unwrap_or(defaults.base_url),
            model: env::var("GEMINI_MODEL").unwrap_or(defaults.model),
            temperature: env::var("GENERATION_TEMPERATURE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.temperature),
            top_p: env::var("GENERATION_TOP_P")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.top_p),
            top_k: env::var("GENERATION_TOP_K")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.top_k),
            max_output_tokens: env::var("GENERATION_MAX_OUTPUT_TOKENS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_output_tokens),
            max_prompt_chars: env::var("MAX_PROMPT_CHARS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_prompt_chars),
            request_timeout_seconds: env::var("UPSTREAM_TIMEOUT_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.request_timeout_seconds),
            connect_timeout_seconds: env::var("UPSTREAM_CONNECT_TIMEOUT_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.connect_timeout_seconds),
        }
    }
}
