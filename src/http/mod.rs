//! HTTP client module with response classification and credential handling.

mod client;
mod error;
mod secret;

pub use client::{HttpClient, build_http_client};
pub use error::{ApiError, classify_status};
pub use secret::Secret;
