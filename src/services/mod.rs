//! Business logic and core services.

pub mod gemini;
pub mod metrics;
pub mod rate_limit;
pub mod store;
pub mod usage;
pub mod validation;

pub use gemini::*;
pub use metrics::*;
pub use rate_limit::*;
pub use store::*;
pub use usage::*;
pub use validation::*;
