//! Error types for the discovery system.

use thiserror::Error;

/// Error type for discovery operations.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Socket creation, multicast send or description fetch failed
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Malformed SSDP reply or device description
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Operation timed out")]
    Timeout,

    /// The responder is not a Sony device exposing the JSON-RPC API
    #[error("Invalid device: {0}")]
    InvalidDevice(String),
}

pub type Result<T> = std::result::Result<T, DiscoveryError>;
