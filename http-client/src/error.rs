//! Error types for the HTTP transport

use thiserror::Error;

/// Failures that happen before a device produced an HTTP status line.
///
/// HTTP error statuses are not errors at this layer; they come back as an
/// [`HttpResponse`](crate::HttpResponse) with the status set.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Could not resolve or connect to the device
    #[error("connection failed: {0}")]
    Connect(String),

    /// The device accepted the connection but did not answer in time
    #[error("timed out: {0}")]
    Timeout(String),

    /// I/O failure mid-request
    #[error("I/O error: {0}")]
    Io(String),

    /// The request URL could not be parsed
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Response body could not be read as UTF-8 text
    #[error("unreadable response body: {0}")]
    Body(String),
}
