//! JSON-RPC request and reply envelopes

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{ApiError, Result};
use crate::error_code::DeviceError;

/// Named parameters of a single call
pub type Params = Map<String, Value>;

/// The request body posted to `/sony/<service>`
///
/// `params` is always a list: empty when the call has no parameters,
/// otherwise a single object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpcRequest {
    pub method: String,
    pub params: Vec<Value>,
    pub id: u64,
    pub version: String,
}

impl RpcRequest {
    pub fn new(method: impl Into<String>, params: Params) -> Self {
        let params = if params.is_empty() {
            Vec::new()
        } else {
            vec![Value::Object(params)]
        };
        Self::with_raw_params(method, params)
    }

    /// Build a request whose params list is used as-is
    pub fn with_raw_params(method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            method: method.into(),
            params,
            id: 1,
            version: "1.0".to_string(),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| ApiError::InvalidParameter(e.to_string()))
    }
}

/// A decoded reply: exactly one of result or error
#[derive(Debug, Clone, PartialEq)]
pub enum RpcReply {
    Result(Vec<Value>),
    Error(DeviceError),
}

impl RpcReply {
    /// Decode a reply body.
    ///
    /// `Err` carries a description of why the body is not a JSON-RPC reply.
    pub fn parse(body: &str) -> std::result::Result<Self, String> {
        let value: Value =
            serde_json::from_str(body).map_err(|e| format!("malformed reply body: {}", e))?;
        let object = value
            .as_object()
            .ok_or_else(|| "reply body is not a JSON object".to_string())?;

        if let Some(error) = object.get("error").filter(|e| !e.is_null()) {
            return DeviceError::from_error_value(error)
                .map(RpcReply::Error)
                .ok_or_else(|| format!("malformed error field: {}", error));
        }

        match object.get("result") {
            Some(Value::Array(items)) => Ok(RpcReply::Result(items.clone())),
            Some(Value::Null) | None => Err("reply has neither result nor error".to_string()),
            Some(other) => Ok(RpcReply::Result(vec![other.clone()])),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_code::DeviceErrorKind;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_empty_params_serialize_as_empty_list() {
        let request = RpcRequest::new("getPowerStatus", Params::new());
        let body: Value = serde_json::from_str(&request.to_json().unwrap()).unwrap();

        assert_eq!(
            body,
            json!({"method": "getPowerStatus", "params": [], "id": 1, "version": "1.0"})
        );
    }

    #[test]
    fn test_params_wrapped_in_single_element_list() {
        let mut params = Params::new();
        params.insert("status".to_string(), json!(true));
        let request = RpcRequest::new("setPowerStatus", params);
        let body: Value = serde_json::from_str(&request.to_json().unwrap()).unwrap();

        assert_eq!(body["params"], json!([{"status": true}]));
        assert_eq!(body["version"], "1.0");
    }

    #[test]
    fn test_parse_result() {
        let reply = RpcReply::parse(r#"{"result":[{"status":"active"}],"id":1}"#).unwrap();
        assert_eq!(reply, RpcReply::Result(vec![json!({"status": "active"})]));

        let empty = RpcReply::parse(r#"{"result":[],"id":1}"#).unwrap();
        assert_eq!(empty, RpcReply::Result(vec![]));
    }

    #[test]
    fn test_parse_error() {
        match RpcReply::parse(r#"{"error":[7,"Illegal State"],"id":1}"#).unwrap() {
            RpcReply::Error(error) => {
                assert_eq!(error.kind, DeviceErrorKind::IllegalState);
                assert_eq!(error.code, 7);
                assert_eq!(error.message, "Illegal State");
            }
            other => panic!("expected error reply, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_malformed() {
        assert!(RpcReply::parse("<html>").is_err());
        assert!(RpcReply::parse("[]").is_err());
        assert!(RpcReply::parse(r#"{"id":1}"#).is_err());
        assert!(RpcReply::parse(r#"{"error":"boom","id":1}"#).is_err());
    }

    proptest! {
        #[test]
        fn prop_params_shape(entries in proptest::collection::btree_map("[a-z]{1,8}", any::<i32>(), 0..6)) {
            let mut params = Params::new();
            for (key, value) in &entries {
                params.insert(key.clone(), json!(value));
            }

            let request = RpcRequest::new("anyMethod", params.clone());
            let body: Value = serde_json::from_str(&request.to_json().unwrap()).unwrap();
            let list = body["params"].as_array().unwrap();

            if entries.is_empty() {
                prop_assert!(list.is_empty());
            } else {
                prop_assert_eq!(list.len(), 1);
                prop_assert_eq!(&list[0], &Value::Object(params));
            }
        }
    }
}
