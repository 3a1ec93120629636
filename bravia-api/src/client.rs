use std::sync::Arc;

use bravia_http::{HttpClient, HttpRequest, HttpTransport};
use serde_json::Value;

use crate::envelope::{Params, RpcReply, RpcRequest};
use crate::error::{ApiError, Result};
use crate::error_code::DeviceError;
use crate::ircc::IrccSender;
use crate::operation::Operation;
use crate::service::Service;
use crate::session::Session;

/// A client for executing JSON-RPC calls against one registered device
///
/// The client pairs a [`Session`] with a transport. It never retries: a
/// failed call is reported exactly once and the caller decides what to do.
#[derive(Clone)]
pub struct BraviaClient {
    transport: Arc<dyn HttpTransport>,
    session: Arc<Session>,
}

impl BraviaClient {
    /// Create a client using a default [`HttpClient`]
    pub fn new(session: Session) -> Self {
        Self::with_transport(session, Arc::new(HttpClient::new()))
    }

    /// Create a client over a custom transport
    pub fn with_transport(session: Session, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            session: Arc::new(session),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn transport(&self) -> Arc<dyn HttpTransport> {
        Arc::clone(&self.transport)
    }

    /// Call `method` on `service` and return the `result` list
    ///
    /// The result is returned as the device sent it, possibly empty.
    pub fn call(&self, service: Service, method: &str, params: Params) -> Result<Vec<Value>> {
        self.call_versioned(service, method, "1.0", params)
    }

    pub fn call_versioned(
        &self,
        service: Service,
        method: &str,
        version: &str,
        params: Params,
    ) -> Result<Vec<Value>> {
        let envelope = RpcRequest::new(method, params).with_version(version);
        self.dispatch(service, &envelope)
    }

    /// Execute a typed operation
    ///
    /// # Example
    /// ```rust,no_run
    /// use bravia_api::{BraviaClient, Session};
    /// use bravia_api::operations::system::{get_power_status, GetPowerStatusOperation};
    ///
    /// let client = BraviaClient::new(Session::with_psk("192.168.1.20", "0000"));
    /// let status = client.execute::<GetPowerStatusOperation>(&get_power_status())?;
    /// println!("powered on: {}", status.is_active());
    /// # Ok::<(), bravia_api::ApiError>(())
    /// ```
    pub fn execute<Op: Operation>(&self, request: &Op::Request) -> Result<Op::Response> {
        let params = Op::params(request)?;
        let envelope = RpcRequest::new(Op::METHOD, params).with_version(Op::VERSION);
        let result = self.dispatch(Op::SERVICE, &envelope)?;
        Op::parse_response(result)
    }

    /// Sender for legacy IRCC remote-control codes on the same session
    pub fn ircc(&self) -> IrccSender {
        IrccSender::new(Arc::clone(&self.session), Arc::clone(&self.transport))
    }

    fn dispatch(&self, service: Service, envelope: &RpcRequest) -> Result<Vec<Value>> {
        let body = envelope.to_json()?;
        let request = self.session.authorize(
            HttpRequest::post(self.session.service_url(service))
                .header("Content-Type", "application/json")
                .body(body),
        );

        tracing::debug!(
            service = service.name(),
            method = %envelope.method,
            "json-rpc request"
        );

        let response = self.transport.post(&request)?;

        match RpcReply::parse(&response.body) {
            Ok(RpcReply::Result(result)) => Ok(result),
            Ok(RpcReply::Error(error)) => {
                tracing::debug!(
                    service = service.name(),
                    method = %envelope.method,
                    code = error.code,
                    message = %error.message,
                    "device returned error"
                );
                Err(ApiError::Device(error))
            }
            // Some firmwares answer auth failures with a bare status line.
            Err(_) if !response.is_success() => Err(ApiError::Device(DeviceError::new(
                i64::from(response.status),
                format!("HTTP {}", response.status),
            ))),
            Err(reason) => Err(ApiError::Send(reason)),
        }
    }
}

impl std::fmt::Debug for BraviaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BraviaClient")
            .field("address", &self.session.base_address())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_code::DeviceErrorKind;
    use bravia_http::mock::MockTransport;
    use bravia_http::{HttpResponse, TransportError};
    use serde_json::json;

    fn client_with(transport: MockTransport) -> (BraviaClient, Arc<MockTransport>) {
        let transport = Arc::new(transport);
        let client = BraviaClient::with_transport(
            Session::with_psk("10.0.0.5", "abc123"),
            transport.clone(),
        );
        (client, transport)
    }

    #[test]
    fn test_call_returns_result_list() {
        let mock = MockTransport::new();
        mock.enqueue(HttpResponse::new(200, r#"{"result":[{"status":"active"}],"id":1}"#));
        let (client, transport) = client_with(mock);

        let result = client.call(Service::System, "getPowerStatus", Params::new()).unwrap();
        assert_eq!(result, vec![json!({"status": "active"})]);

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "http://10.0.0.5/sony/system");
        assert_eq!(requests[0].header_value("X-Auth-PSK"), Some("abc123"));
        let body: Value = serde_json::from_str(&requests[0].body).unwrap();
        assert_eq!(body["params"], json!([]));
    }

    #[test]
    fn test_device_error_is_typed() {
        let mock = MockTransport::new();
        mock.enqueue(HttpResponse::new(200, r#"{"error":[15,"unsupported"],"id":1}"#));
        let (client, _) = client_with(mock);

        let err = client.call(Service::Audio, "getSoundSettings", Params::new()).unwrap_err();
        assert_eq!(err.device_kind(), Some(DeviceErrorKind::UnsupportedOperation));
        assert_eq!(err.device_code(), Some(15));
    }

    #[test]
    fn test_transport_failure_is_send_error() {
        let mock = MockTransport::new();
        mock.enqueue_error(TransportError::Connect("refused".to_string()));
        let (client, _) = client_with(mock);

        let err = client.call(Service::System, "getPowerStatus", Params::new()).unwrap_err();
        assert!(matches!(err, ApiError::Send(_)));
    }

    #[test]
    fn test_malformed_body_is_send_error() {
        let mock = MockTransport::new();
        mock.enqueue(HttpResponse::new(200, "<html>oops</html>"));
        let (client, _) = client_with(mock);

        let err = client.call(Service::System, "getPowerStatus", Params::new()).unwrap_err();
        assert!(matches!(err, ApiError::Send(_)));
        assert_eq!(err.device_kind(), None);
    }

    #[test]
    fn test_bare_status_maps_to_device_error() {
        let mock = MockTransport::new();
        mock.enqueue(HttpResponse::new(403, ""));
        let (client, _) = client_with(mock);

        let err = client.call(Service::System, "getPowerStatus", Params::new()).unwrap_err();
        assert_eq!(err.device_kind(), Some(DeviceErrorKind::Forbidden));
    }

    #[test]
    fn test_no_retry_on_failure() {
        let mock = MockTransport::new();
        mock.enqueue_error(TransportError::Io("timed out".to_string()));
        mock.enqueue(HttpResponse::new(200, r#"{"result":[],"id":1}"#));
        let (client, transport) = client_with(mock);

        assert!(client.call(Service::System, "getPowerStatus", Params::new()).is_err());
        assert_eq!(transport.request_count(), 1);
    }
}
