//! Error types for the Siftwire domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum. None of these cross a
//! tool boundary: tools render them into their result text.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider")]
    RateLimited,

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Empty response from provider")]
    EmptyResponse,
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),
}

/// Failure to retrieve a page. Timeouts, transport failures and
/// non-success statuses are all fetch failures.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout { url: String, timeout_secs: u64 },

    #[error("{status} for url: {url}")]
    Status { url: String, status: u16 },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("failed to read response body: {0}")]
    Body(String),

    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

#[derive(Debug, Clone, Error)]
pub enum DirectoryError {
    #[error("directory client not initialized")]
    NotConfigured,

    #[error("directory API returned {status_code}: {message}")]
    Api { status_code: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("malformed directory response: {0}")]
    Malformed(String),
}

/// Violations of the `|||` / ` | ` / `: ` string protocol.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("expected {expected} fields separated by '{delimiter}', got {actual}")]
    FieldCount {
        expected: usize,
        actual: usize,
        delimiter: &'static str,
    },

    #[error("missing '{0}' marker")]
    MissingMarker(&'static str),

    #[error("empty field: {0}")]
    EmptyField(&'static str),
}
