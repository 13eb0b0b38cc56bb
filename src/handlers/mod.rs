//! HTTP request handlers for API endpoints.
//!
//! This module contains all the HTTP request handlers that process
//! incoming requests and generate responses.

pub mod generate;
pub mod health;
pub mod metrics;
pub mod openapi;

pub use generate::*;
pub use health::*;
pub use metrics::*;
pub use openapi::*;
