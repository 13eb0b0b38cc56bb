//! Request validation for the generation endpoints.
//!
//! Validation happens before any store or upstream access; a rejected
//! request never reaches the rate limiter or the generation API.

use crate::error::ApiError;

/// Validate a prompt against presence, emptiness, and length rules
///
/// A prompt that is absent or empty after trimming is rejected; a prompt
/// longer than `max_chars` characters is rejected; exactly `max_chars` is
/// accepted. The original (untrimmed) prompt is returned on success.
pub fn validate_prompt(prompt: Option<&str>, max_chars: usize) -> Result<String, ApiError> {
    let prompt = prompt.unwrap_or_default();
    if prompt.trim().is_empty() {
        return Err(ApiError::InvalidArgument("Invalid prompt".to_string()));
    }
    if prompt.chars().count() > max_chars {
        return Err(ApiError::InvalidArgument("Prompt too long".to_string()));
    }
    Ok(prompt.to_string())
}

/// Validate a caller-supplied upstream API key
pub fn validate_api_key(api_key: Option<&str>) -> Result<String, ApiError> {
    match api_key {
        Some(key) if !key.trim().is_empty() => Ok(key.to_string()),
        _ => Err(ApiError::InvalidArgument("API key required".to_string())),
    }
}
