//! Classification of failed HTTP responses.
//!
//! No class is retried: any failure surfaces to the caller, which aborts
//! the run. The classes only exist to turn status codes into actionable
//! messages.

use reqwest::StatusCode;

/// Errors produced by the registry and Packages API clients.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// HTTP 401
    #[error("Authentication failed for {0}. Check GITHUB_TOKEN and GITHUB_ACTOR.")]
    AuthenticationFailed(String),
    /// HTTP 403 without rate-limit text
    #[error("Access forbidden for {0}. The token needs read:packages and delete:packages.")]
    Forbidden(String),
    /// HTTP 429, or 403 mentioning the rate limit
    #[error("Rate limit exceeded for {0}. Try again later.")]
    RateLimitExceeded(String),
    /// HTTP 404
    #[error("Not found: {0}")]
    NotFound(String),
    /// Other 4xx
    #[error("Request error: HTTP {status} from {url}")]
    ClientError { status: u16, url: String },
    /// 5xx
    #[error("Server error: HTTP {status} from {url}")]
    ServerError { status: u16, url: String },
    /// A manifest HEAD response without a `Docker-Content-Digest` header.
    #[error("Response for {0} carries no Docker-Content-Digest header")]
    MissingDigest(String),
}

/// Maps a non-success status (and the response body, if any) to an [`ApiError`].
pub fn classify_status(status: StatusCode, body: &str, url: &str) -> ApiError {
    let url = url.to_string();
    match status {
        StatusCode::UNAUTHORIZED => ApiError::AuthenticationFailed(url),
        StatusCode::FORBIDDEN => {
            if body.to_lowercase().contains("rate limit") {
                ApiError::RateLimitExceeded(url)
            } else {
                ApiError::Forbidden(url)
            }
        }
        StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimitExceeded(url),
        StatusCode::NOT_FOUND => ApiError::NotFound(url),
        s if s.is_client_error() => ApiError::ClientError {
            status: s.as_u16(),
            url,
        },
        s => ApiError::ServerError {
            status: s.as_u16(),
            url,
        },
    }
}
