//! Request middleware and extractors.

pub mod auth;
pub mod json;

pub use auth::{RequireAdmin, RequireUser};
pub use json::Json;
