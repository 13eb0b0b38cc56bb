//! Data structures and request/response models.

pub mod api;
pub mod usage;

pub use api::*;
pub use usage::*;
