use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::envelope::Params;
use crate::error::ApiError;
use crate::service::Service;

/// Base trait for all Bravia JSON-RPC operations
///
/// An operation names its service, method and API version, turns a typed
/// request into named parameters and decodes the `result` list into a typed
/// response.
pub trait Operation {
    /// The request type; serializes to a JSON object (or `()` for none)
    type Request: Serialize;

    type Response;

    const SERVICE: Service;

    const METHOD: &'static str;

    const VERSION: &'static str = "1.0";

    /// Named parameters for the request; an empty map means "no params"
    fn params(request: &Self::Request) -> Result<Params, ApiError> {
        match serde_json::to_value(request) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(Value::Null) => Ok(Params::new()),
            Ok(other) => Err(ApiError::InvalidParameter(format!(
                "{} parameters must be an object, got {}",
                Self::METHOD,
                other
            ))),
            Err(e) => Err(ApiError::InvalidParameter(e.to_string())),
        }
    }

    fn parse_response(result: Vec<Value>) -> Result<Self::Response, ApiError>;
}

/// Decode element `index` of a result list
pub fn decode_at<T: DeserializeOwned>(
    method: &str,
    result: &[Value],
    index: usize,
) -> Result<T, ApiError> {
    let value = result.get(index).ok_or_else(|| {
        ApiError::UnexpectedResult(format!(
            "{} returned {} result element(s), expected at least {}",
            method,
            result.len(),
            index + 1
        ))
    })?;
    serde_json::from_value(value.clone())
        .map_err(|e| ApiError::UnexpectedResult(format!("{}: {}", method, e)))
}

/// Decode the first element of a result list
pub fn decode_first<T: DeserializeOwned>(method: &str, result: &[Value]) -> Result<T, ApiError> {
    decode_at(method, result, 0)
}

/// Declare an operation whose response is the first result element
///
/// Generates the operation struct, its `Request` struct (camelCase on the
/// wire) and a snake_case convenience constructor for the request.
///
/// # Example
/// ```rust,ignore
/// define_operation! {
///     operation: SetAudioMute,
///     service: Audio,
///     method: "setAudioMute",
///     request: { status: bool },
///     response: (),
/// }
/// ```
#[macro_export]
macro_rules! define_operation {
    (
        operation: $op:ident,
        service: $service:ident,
        method: $method:literal,
        $(version: $version:literal,)?
        request: { $($field:ident: $ty:ty),* $(,)? },
        response: (),
    ) => {
        $crate::define_operation! {
            @emit $op, $service, $method, [$($version)?], { $($field: $ty),* },
            (),
            |_result| Ok(())
        }
    };
    (
        operation: $op:ident,
        service: $service:ident,
        method: $method:literal,
        $(version: $version:literal,)?
        request: { $($field:ident: $ty:ty),* $(,)? },
        response: $response:ty,
    ) => {
        $crate::define_operation! {
            @emit $op, $service, $method, [$($version)?], { $($field: $ty),* },
            $response,
            |result| $crate::operation::decode_first($method, &result)
        }
    };
    (
        @emit $op:ident, $service:ident, $method:literal, [$($version:literal)?],
        { $($field:ident: $ty:ty),* },
        $response:ty,
        |$result:ident| $parse:expr
    ) => {
        $crate::__private::paste::paste! {
            #[derive($crate::__private::serde::Serialize, Clone, Debug, PartialEq)]
            #[serde(crate = "bravia_api::__private::serde", rename_all = "camelCase")]
            pub struct [<$op Request>] {
                $(pub $field: $ty,)*
            }

            pub struct [<$op Operation>];

            impl $crate::operation::Operation for [<$op Operation>] {
                type Request = [<$op Request>];
                type Response = $response;

                const SERVICE: $crate::service::Service = $crate::service::Service::$service;
                const METHOD: &'static str = $method;
                $(const VERSION: &'static str = $version;)?

                fn parse_response(
                    $result: Vec<$crate::__private::serde_json::Value>,
                ) -> Result<Self::Response, $crate::error::ApiError> {
                    $parse
                }
            }

            pub fn [<$op:snake>]($($field: $ty),*) -> [<$op Request>] {
                [<$op Request>] { $($field,)* }
            }
        }
    };
}
