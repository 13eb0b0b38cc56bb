//! Custom middleware for cross-cutting concerns.

pub mod cors;
pub mod metrics;
pub mod request_id;
pub mod security;

pub use cors::*;
pub use metrics::*;
pub use request_id::*;
pub use security::*;
