use bravia_api::{ApiError, DeviceErrorKind, RegistrationError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SdkError {
    #[error("API error: {0}")]
    Api(ApiError),

    #[error("Device is not registered")]
    NotRegistered,

    /// The name is not in the device's remote-controller table
    #[error("Unknown remote command: {0}")]
    Command(String),

    #[error("No volume control point named {0:?}")]
    VolumeDevice(String),

    /// The device reports the setting as unavailable in its current mode
    #[error("Unsupported: {0}")]
    Unsupported(String),

    #[error("No input matches {0:?}")]
    SourceNotFound(String),

    #[error("No application matches {0:?}")]
    AppNotFound(String),

    #[error("No schedule with id {0:?}")]
    ScheduleNotFound(String),

    #[error("Wake-on-LAN failed: {0}")]
    WakeOnLan(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Event loop error: {0}")]
    EventLoop(String),
}

impl SdkError {
    /// Device error kind when the failure came from the device itself
    pub fn device_kind(&self) -> Option<DeviceErrorKind> {
        match self {
            SdkError::Api(error) => error.device_kind(),
            _ => None,
        }
    }

    pub fn device_code(&self) -> Option<i64> {
        match self {
            SdkError::Api(error) => error.device_code(),
            _ => None,
        }
    }
}

impl From<ApiError> for SdkError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::Unsupported(target) => SdkError::Unsupported(target),
            other => SdkError::Api(other),
        }
    }
}

impl From<RegistrationError> for SdkError {
    fn from(error: RegistrationError) -> Self {
        SdkError::Api(ApiError::Registration(error))
    }
}

pub type Result<T> = std::result::Result<T, SdkError>;
