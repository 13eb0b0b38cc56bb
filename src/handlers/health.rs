//! Health check endpoint handler.

use crate::models::HealthResponse;
use actix_web::{Error, Result, web};
use chrono::Utc;
use paperclip::actix::api_v2_operation;

/// Health check endpoint
///
/// Returns the current health status of the API. This is a liveness probe,
/// not a dependency check: it answers 200 unconditionally and never
/// contacts the store or the upstream service.
#[api_v2_operation(
    summary = "Health Check Endpoint",
    description = "Returns the current health status of the API in JSON format.",
    tags("Health"),
    responses(
        (status = 200, description = "Successful response", body = HealthResponse)
    )
)]
pub async fn health() -> Result<web::Json<HealthResponse>, Error> {
    let response = HealthResponse {
        status: "OK".to_string(),
        timestamp: Utc::now().to_rfc3339(),
        service: env!("CARGO_PKG_NAME").to_string(),
    };

    Ok(web::Json(response))
}
