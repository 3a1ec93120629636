//! Device-reported error codes
//!
//! Every failed JSON-RPC reply carries `"error": [code, message]`. The code
//! is looked up in a static table to produce a [`DeviceErrorKind`]; codes the
//! table does not know decode to [`DeviceErrorKind::Unknown`]. The raw code
//! and message always travel with the kind.

use serde_json::Value;
use thiserror::Error;

/// Typed classification of a device error code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceErrorKind {
    // Generic scalar web API codes
    Any,
    Timeout,
    IllegalArgument,
    IllegalDataFormat,
    IllegalRequest,
    IllegalResponse,
    IllegalState,
    IllegalType,
    IndexOutOfBounds,
    NoSuchElement,
    NoSuchField,
    NoSuchMethod,
    NullPointer,
    UnsupportedVersion,
    UnsupportedOperation,

    // HTTP-style codes
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    NotAcceptable,
    RequestEntityTooLarge,
    RequestUriTooLong,
    InternalServerError,
    NotImplemented,
    ServiceUnavailable,

    // Common device codes
    RequestRetry,
    ClientOverMaximum,
    EncryptionFailed,
    RequestDuplicated,
    MultipleSettingsFailed,
    DisplayIsOff,

    // avContent / recording
    ContentProtected,
    ContentDoesNotExist,
    StorageHasNoContent,
    SomeContentCouldNotBeDeleted,
    ChannelFixedByUsbRecording,
    ChannelFixedByScartRecording,
    ChapterDoesNotExist,
    ChannelCannotBeUniquelyDetermined,
    EmptyChannelList,
    StorageDoesNotExist,
    StorageIsFull,
    ContentAttributeSettingFailed,
    UnknownGroupId,
    ContentNotSupported,

    // appControl
    AnotherRequestInProgress,
    FailedToLaunch,
    RequestInProgress,
    FailedToTerminate,

    /// Code not present in the table
    Unknown,
}

static ERROR_TABLE: &[(i64, DeviceErrorKind, &str)] = &[
    (1, DeviceErrorKind::Any, "Any"),
    (2, DeviceErrorKind::Timeout, "Timeout"),
    (3, DeviceErrorKind::IllegalArgument, "Illegal Argument"),
    (4, DeviceErrorKind::IllegalDataFormat, "Illegal Data Format"),
    (5, DeviceErrorKind::IllegalRequest, "Illegal Request"),
    (6, DeviceErrorKind::IllegalResponse, "Illegal Response"),
    (7, DeviceErrorKind::IllegalState, "Illegal State"),
    (8, DeviceErrorKind::IllegalType, "Illegal Type"),
    (9, DeviceErrorKind::IndexOutOfBounds, "Index Out Of Bounds"),
    (10, DeviceErrorKind::NoSuchElement, "No Such Element"),
    (11, DeviceErrorKind::NoSuchField, "No Such Field"),
    (12, DeviceErrorKind::NoSuchMethod, "No Such Method"),
    (13, DeviceErrorKind::NullPointer, "Null Pointer"),
    (14, DeviceErrorKind::UnsupportedVersion, "Unsupported Version"),
    (15, DeviceErrorKind::UnsupportedOperation, "Unsupported Operation"),
    (400, DeviceErrorKind::BadRequest, "Bad Request"),
    (401, DeviceErrorKind::Unauthorized, "Unauthorized"),
    (403, DeviceErrorKind::Forbidden, "Forbidden"),
    (404, DeviceErrorKind::NotFound, "Not Found"),
    (406, DeviceErrorKind::NotAcceptable, "Not Acceptable"),
    (413, DeviceErrorKind::RequestEntityTooLarge, "Request Entity Too Large"),
    (414, DeviceErrorKind::RequestUriTooLong, "Request-URI Too Long"),
    (500, DeviceErrorKind::InternalServerError, "Internal Server Error"),
    (501, DeviceErrorKind::NotImplemented, "Not Implemented"),
    (503, DeviceErrorKind::ServiceUnavailable, "Service Unavailable"),
    (40000, DeviceErrorKind::RequestRetry, "Request Retry"),
    (40001, DeviceErrorKind::ClientOverMaximum, "Client Over Maximum"),
    (40002, DeviceErrorKind::EncryptionFailed, "Encryption Failed"),
    (40003, DeviceErrorKind::RequestDuplicated, "Request Duplicated"),
    (40004, DeviceErrorKind::MultipleSettingsFailed, "Multiple Settings Failed"),
    (40005, DeviceErrorKind::DisplayIsOff, "Display Is Off"),
    (41000, DeviceErrorKind::ContentProtected, "Content Is Protected"),
    (41001, DeviceErrorKind::ContentDoesNotExist, "Content Does Not Exist"),
    (41002, DeviceErrorKind::StorageHasNoContent, "Storage Has No Content"),
    (41003, DeviceErrorKind::SomeContentCouldNotBeDeleted, "Some Content Could Not Be Deleted"),
    (41011, DeviceErrorKind::ChannelFixedByUsbRecording, "Channel Fixed By USB Recording"),
    (41012, DeviceErrorKind::ChannelFixedByScartRecording, "Channel Fixed By SCART Recording"),
    (41013, DeviceErrorKind::ChapterDoesNotExist, "Chapter Does Not Exist"),
    (41014, DeviceErrorKind::ChannelCannotBeUniquelyDetermined, "Channel Cannot Be Uniquely Determined"),
    (41015, DeviceErrorKind::EmptyChannelList, "Empty Channel List"),
    (41020, DeviceErrorKind::StorageDoesNotExist, "Storage Does Not Exist"),
    (41022, DeviceErrorKind::StorageIsFull, "Storage Is Full"),
    (41023, DeviceErrorKind::ContentAttributeSettingFailed, "Content Attribute Setting Failed"),
    (41024, DeviceErrorKind::UnknownGroupId, "Unknown Group Id"),
    (41025, DeviceErrorKind::ContentNotSupported, "Content Is Not Supported"),
    (41400, DeviceErrorKind::AnotherRequestInProgress, "Another Request In Progress"),
    (41401, DeviceErrorKind::FailedToLaunch, "Failed To Launch"),
    (41402, DeviceErrorKind::RequestInProgress, "Request In Progress"),
    (41403, DeviceErrorKind::FailedToTerminate, "Failed To Terminate"),
];

impl DeviceErrorKind {
    /// Look up a code; unmapped codes yield `Unknown`
    pub fn from_code(code: i64) -> Self {
        ERROR_TABLE
            .iter()
            .find(|(c, _, _)| *c == code)
            .map(|(_, kind, _)| *kind)
            .unwrap_or(DeviceErrorKind::Unknown)
    }

    /// Canonical code for a mapped kind
    pub fn code(&self) -> Option<i64> {
        ERROR_TABLE
            .iter()
            .find(|(_, kind, _)| kind == self)
            .map(|(code, _, _)| *code)
    }

    pub fn description(&self) -> &'static str {
        ERROR_TABLE
            .iter()
            .find(|(_, kind, _)| kind == self)
            .map(|(_, _, text)| *text)
            .unwrap_or("Unknown")
    }
}

/// An error reported by the device in a JSON-RPC reply
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("device error {code} ({}): {message}", .kind.description())]
pub struct DeviceError {
    pub kind: DeviceErrorKind,
    pub code: i64,
    pub message: String,
}

impl DeviceError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            kind: DeviceErrorKind::from_code(code),
            code,
            message: message.into(),
        }
    }

    /// Decode the `[code, message]` pair of an `error` field.
    ///
    /// Returns `None` when the first element is not an integer.
    pub fn from_error_value(value: &Value) -> Option<Self> {
        let items = value.as_array()?;
        let code = items.first()?.as_i64()?;
        let message = items
            .get(1)
            .and_then(Value::as_str)
            .unwrap_or_default();
        Some(Self::new(code, message))
    }

    pub fn is(&self, kind: DeviceErrorKind) -> bool {
        self.kind == kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(7, DeviceErrorKind::IllegalState)]
    #[case(12, DeviceErrorKind::NoSuchMethod)]
    #[case(15, DeviceErrorKind::UnsupportedOperation)]
    #[case(401, DeviceErrorKind::Unauthorized)]
    #[case(403, DeviceErrorKind::Forbidden)]
    #[case(501, DeviceErrorKind::NotImplemented)]
    #[case(40005, DeviceErrorKind::DisplayIsOff)]
    #[case(41000, DeviceErrorKind::ContentProtected)]
    #[case(41015, DeviceErrorKind::EmptyChannelList)]
    #[case(41401, DeviceErrorKind::FailedToLaunch)]
    fn test_mapped_codes(#[case] code: i64, #[case] expected: DeviceErrorKind) {
        let error = DeviceError::new(code, "some message");
        assert_eq!(error.kind, expected);
        assert_eq!(error.code, code);
        assert_eq!(error.message, "some message");
        assert_eq!(expected.code(), Some(code));
    }

    #[rstest]
    #[case(0)]
    #[case(99)]
    #[case(40999)]
    #[case(-1)]
    fn test_unmapped_codes_keep_code_and_message(#[case] code: i64) {
        let error = DeviceError::new(code, "vendor specific");
        assert_eq!(error.kind, DeviceErrorKind::Unknown);
        assert_eq!(error.code, code);
        assert_eq!(error.message, "vendor specific");
    }

    #[test]
    fn test_table_has_unique_codes_and_kinds() {
        for (i, (code, kind, _)) in ERROR_TABLE.iter().enumerate() {
            for (other_code, other_kind, _) in &ERROR_TABLE[i + 1..] {
                assert_ne!(code, other_code);
                assert_ne!(kind, other_kind);
            }
        }
    }

    #[test]
    fn test_from_error_value() {
        let error = DeviceError::from_error_value(&json!([7, "Clock is not set"])).unwrap();
        assert!(error.is(DeviceErrorKind::IllegalState));
        assert_eq!(error.message, "Clock is not set");

        let bare = DeviceError::from_error_value(&json!([41000])).unwrap();
        assert_eq!(bare.kind, DeviceErrorKind::ContentProtected);
        assert_eq!(bare.message, "");

        assert!(DeviceError::from_error_value(&json!(["x", "y"])).is_none());
        assert!(DeviceError::from_error_value(&json!({"code": 7})).is_none());
    }

    #[test]
    fn test_display_includes_code_and_message() {
        let error = DeviceError::new(501, "Not Implemented");
        let text = error.to_string();
        assert!(text.contains("501"));
        assert!(text.contains("Not Implemented"));
    }
}
