//! Client registration against `/sony/accessControl`
//!
//! A pre-shared key needs no handshake at all. Otherwise the client posts an
//! `actRegister` request; a device that has never seen this client answers
//! 401 and shows a four digit PIN on screen, which has to come back in a
//! second request as HTTP basic auth. The PIN is supplied through a
//! [`PinPrompt`] handle, typically from a UI thread, while [`Registrar::register`]
//! waits for it.

use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bravia_http::{HttpRequest, HttpResponse, HttpTransport};
use parking_lot::Mutex;
use serde_json::{json, Value};
use thiserror::Error;

use crate::envelope::{RpcReply, RpcRequest};
use crate::error_code::DeviceError;
use crate::service::Service;
use crate::session::{CookieJar, Session};

/// Fixed identifier appended to the client nickname
pub const CLIENT_GUID: &str = "24F26C67-5A50-4B08-8754-80EBAF880379";

/// Default window for entering the on-screen PIN
pub const DEFAULT_PIN_TIMEOUT: Duration = Duration::from_secs(60);

/// Why a registration attempt failed
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// The device rejected the PIN that was supplied
    #[error("the device rejected the PIN or this client is not registered")]
    Pin,

    /// No PIN arrived before the deadline
    #[error("no PIN supplied within {0:?}")]
    Timeout(Duration),

    #[error("registration failed: {0}")]
    Register(#[from] RegisterCause),
}

#[derive(Debug, Error)]
pub enum RegisterCause {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected HTTP status {0}")]
    Http(u16),

    #[error(transparent)]
    Device(DeviceError),

    #[error("malformed reply: {0}")]
    MalformedBody(String),

    #[error("PIN entry was cancelled")]
    Cancelled,
}

/// How this client introduces itself to the device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    nickname: String,
}

impl ClientIdentity {
    /// Dashes are not accepted in nicknames and are dropped
    pub fn new(nickname: &str) -> Self {
        Self {
            nickname: nickname.replace('-', ""),
        }
    }

    /// Identity derived from the local host name
    pub fn from_environment() -> Self {
        let name = std::env::var("HOSTNAME")
            .or_else(|_| std::env::var("COMPUTERNAME"))
            .ok()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| "bravia-sdk".to_string());
        Self::new(name.trim())
    }

    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    pub fn client_id(&self) -> String {
        format!("{}:{}", self.nickname, CLIENT_GUID)
    }

    /// The `actRegister` envelope sent for this identity
    pub fn register_request(&self) -> RpcRequest {
        RpcRequest::with_raw_params(
            "actRegister",
            vec![
                json!({
                    "clientid": self.client_id(),
                    "nickname": self.nickname,
                    "level": "private",
                }),
                json!([{"value": "yes", "function": "WOL"}]),
            ],
        )
    }
}

/// Progress of an interactive PIN exchange
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PinState {
    pub pending: bool,
    pub deadline: Option<Instant>,
    pub last_error: Option<String>,
}

enum PinReply {
    Pin(String),
    Cancel,
}

/// Handle used to answer a pending PIN request from another thread
#[derive(Clone)]
pub struct PinPrompt {
    sender: mpsc::Sender<PinReply>,
    state: Arc<Mutex<PinState>>,
}

impl PinPrompt {
    /// Hand the on-screen PIN to the waiting registration
    pub fn submit(&self, pin: impl Into<String>) {
        let _ = self.sender.send(PinReply::Pin(pin.into()));
    }

    pub fn cancel(&self) {
        let _ = self.sender.send(PinReply::Cancel);
    }

    pub fn is_pending(&self) -> bool {
        self.state.lock().pending
    }

    pub fn state(&self) -> PinState {
        self.state.lock().clone()
    }
}

enum Attempt {
    Registered(CookieJar),
    PinRequired,
}

/// Performs the registration handshake and produces [`Session`]s
pub struct Registrar {
    transport: Arc<dyn HttpTransport>,
    address: String,
    identity: ClientIdentity,
    pin_timeout: Duration,
    sender: mpsc::Sender<PinReply>,
    receiver: Mutex<mpsc::Receiver<PinReply>>,
    state: Arc<Mutex<PinState>>,
}

impl Registrar {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        address: impl Into<String>,
        identity: ClientIdentity,
    ) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            transport,
            address: address.into(),
            identity,
            pin_timeout: DEFAULT_PIN_TIMEOUT,
            sender,
            receiver: Mutex::new(receiver),
            state: Arc::new(Mutex::new(PinState::default())),
        }
    }

    pub fn with_pin_timeout(mut self, timeout: Duration) -> Self {
        self.pin_timeout = timeout;
        self
    }

    pub fn identity(&self) -> &ClientIdentity {
        &self.identity
    }

    pub fn pin_prompt(&self) -> PinPrompt {
        PinPrompt {
            sender: self.sender.clone(),
            state: Arc::clone(&self.state),
        }
    }

    /// Run the handshake.
    ///
    /// With a PSK this returns immediately without touching the network; the
    /// key is only checked by the first real call. Each invocation derives a
    /// fresh session.
    pub fn register(
        &self,
        pin: Option<&str>,
        psk: Option<&str>,
    ) -> Result<Session, RegistrationError> {
        if let Some(psk) = psk {
            tracing::debug!(address = %self.address, "using pre-shared key");
            return Ok(Session::with_psk(self.address.clone(), psk));
        }

        match self.attempt(pin)? {
            Attempt::Registered(cookies) => Ok(self.session(cookies)),
            Attempt::PinRequired if pin.is_some() => Err(RegistrationError::Pin),
            Attempt::PinRequired => {
                let pin = self.await_pin()?;
                match self.attempt(Some(&pin))? {
                    Attempt::Registered(cookies) => Ok(self.session(cookies)),
                    Attempt::PinRequired => {
                        self.state.lock().last_error = Some("PIN rejected".to_string());
                        Err(RegistrationError::Pin)
                    }
                }
            }
        }
    }

    fn session(&self, cookies: CookieJar) -> Session {
        tracing::info!(address = %self.address, "registered with device");
        Session::with_cookies(self.address.clone(), cookies)
    }

    fn attempt(&self, pin: Option<&str>) -> Result<Attempt, RegistrationError> {
        let body = self
            .identity
            .register_request()
            .to_json()
            .map_err(|e| RegisterCause::MalformedBody(e.to_string()))?;

        let mut request = HttpRequest::post(Service::AccessControl.url(&self.address))
            .header("Content-Type", "application/json")
            .body(body);
        if let Some(pin) = pin {
            request = request
                .header("Authorization", basic_auth(pin))
                .header("Connection", "keep-alive");
        }

        tracing::debug!(address = %self.address, with_pin = pin.is_some(), "actRegister");
        let response = self
            .transport
            .post(&request)
            .map_err(|e| RegisterCause::Transport(e.to_string()))?;

        classify(&response)
    }

    fn await_pin(&self) -> Result<String, RegistrationError> {
        let receiver = self.receiver.lock();
        // Answers to an earlier prompt must not satisfy this one.
        while receiver.try_recv().is_ok() {}

        let deadline = Instant::now() + self.pin_timeout;
        {
            let mut state = self.state.lock();
            state.pending = true;
            state.deadline = Some(deadline);
        }
        tracing::info!(
            address = %self.address,
            timeout = ?self.pin_timeout,
            "device is displaying a PIN, waiting for it to be submitted"
        );

        let remaining = deadline.saturating_duration_since(Instant::now());
        let reply = receiver.recv_timeout(remaining);

        let mut state = self.state.lock();
        state.pending = false;
        state.deadline = None;
        match reply {
            Ok(PinReply::Pin(pin)) => Ok(pin),
            Ok(PinReply::Cancel) => {
                state.last_error = Some("cancelled".to_string());
                Err(RegisterCause::Cancelled.into())
            }
            Err(_) => {
                state.last_error = Some("timed out".to_string());
                tracing::warn!(address = %self.address, "no PIN supplied before the deadline");
                Err(RegistrationError::Timeout(self.pin_timeout))
            }
        }
    }
}

fn classify(response: &HttpResponse) -> Result<Attempt, RegistrationError> {
    match response.status {
        200 => match RpcReply::parse(&response.body) {
            Ok(RpcReply::Result(_)) => Ok(Attempt::Registered(CookieJar::from_set_cookie(
                response.set_cookies(),
            ))),
            Ok(RpcReply::Error(error)) => Err(RegisterCause::Device(error).into()),
            Err(reason) => Err(RegisterCause::MalformedBody(reason).into()),
        },
        401 => Ok(Attempt::PinRequired),
        status => Err(RegisterCause::Http(status).into()),
    }
}

/// `Authorization` value for a PIN: basic auth with an empty user name
pub fn basic_auth(pin: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!(":{}", pin)))
}

/// Decode a registration request body, mostly useful to tests
pub fn parse_register_params(body: &str) -> Option<Vec<Value>> {
    serde_json::from_str::<Value>(body)
        .ok()?
        .get("params")?
        .as_array()
        .cloned()
}
