//! High-level Bravia API for device control
//!
//! This crate speaks the JSON-RPC dialect Sony Bravia TVs and AV receivers
//! expose under `http://<device>/sony/<service>`, plus the legacy IRCC
//! remote-control channel. It uses the private `bravia-http` crate for the
//! transport.
//!
//! # Registration and calls
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use bravia_api::{BraviaClient, ClientIdentity, Registrar};
//! use bravia_api::operations::system::{get_power_status, GetPowerStatusOperation};
//! use bravia_http::HttpClient;
//!
//! let transport = Arc::new(HttpClient::new());
//! let registrar = Registrar::new(transport.clone(), "192.168.1.20", ClientIdentity::from_environment());
//! let session = registrar.register(None, Some("0000"))?;
//!
//! let client = BraviaClient::with_transport(session, transport);
//! let power = client.execute::<GetPowerStatusOperation>(&get_power_status())?;
//! println!("active: {}", power.is_active());
//! # Ok::<(), bravia_api::ApiError>(())
//! ```

// Lets `define_operation!` name its serde paths the same way inside and
// outside this crate.
extern crate self as bravia_api;

pub mod auth;
pub mod client;
pub mod envelope;
pub mod error;
pub mod error_code;
pub mod ircc;
pub mod operation;
pub mod operations;
pub mod service;
pub mod session;

pub use auth::{ClientIdentity, PinPrompt, PinState, RegisterCause, Registrar, RegistrationError};
pub use client::BraviaClient;
pub use envelope::{Params, RpcReply, RpcRequest};
pub use error::{ApiError, Result};
pub use error_code::{DeviceError, DeviceErrorKind};
pub use ircc::IrccSender;
pub use operation::Operation;
pub use service::Service;
pub use session::{CookieJar, Credential, Session};

#[doc(hidden)]
pub mod __private {
    pub use paste;
    pub use serde;
    pub use serde_json;
}
