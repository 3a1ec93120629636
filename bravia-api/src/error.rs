use bravia_http::TransportError;
use thiserror::Error;

use crate::auth::RegistrationError;
use crate::error_code::{DeviceError, DeviceErrorKind};

/// High-level API errors for Bravia operations
///
/// Transport problems, device-reported errors and unusable results are kept
/// apart so callers can branch on the variant instead of on message text.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The JSON-RPC request never produced a usable reply
    ///
    /// Connection refused, timeouts and bodies that are not a JSON-RPC
    /// envelope all land here.
    #[error("send failed: {0}")]
    Send(String),

    /// An IRCC (SOAP remote control) request failed
    #[error("IRCC request failed: {0}")]
    Ircc(String),

    /// The device answered with an `error` field
    #[error(transparent)]
    Device(#[from] DeviceError),

    /// The `result` array did not have the shape an operation expects
    #[error("unexpected result: {0}")]
    UnexpectedResult(String),

    /// A setting reported `isAvailable: false`
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// Request parameters could not be serialized
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error(transparent)]
    Registration(#[from] RegistrationError),
}

impl ApiError {
    /// Kind of a device-reported error, if that is what this is
    pub fn device_kind(&self) -> Option<DeviceErrorKind> {
        match self {
            ApiError::Device(error) => Some(error.kind),
            _ => None,
        }
    }

    /// Raw device error code, if that is what this is
    pub fn device_code(&self) -> Option<i64> {
        match self {
            ApiError::Device(error) => Some(error.code),
            _ => None,
        }
    }

    pub fn is_device(&self, kind: DeviceErrorKind) -> bool {
        self.device_kind() == Some(kind)
    }
}

/// Type alias for results that can return an ApiError
pub type Result<T> = std::result::Result<T, ApiError>;

impl From<TransportError> for ApiError {
    fn from(error: TransportError) -> Self {
        ApiError::Send(error.to_string())
    }
}
