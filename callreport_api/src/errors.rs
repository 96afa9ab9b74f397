//! Error types for the call report client.

/// Errors that can occur when requesting call report data.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// An HTTP request failed (network error, timeout, or unreadable body).
    #[error("Request failed")]
    RequestFailed,
    /// The base URL and path did not form a valid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    /// The service rejected the credentials (HTTP 401/403).
    #[error("Unauthorized (HTTP {status}): check the API user and token")]
    Unauthorized { status: u16 },
    /// The API returned a non-success status with a body snippet.
    #[error("Request failed with status {status}")]
    HttpStatus { status: u16, body: String },
    /// The body was not a valid time series.
    #[error("Failed to parse response: {0}")]
    ParseFailed(String),
}
