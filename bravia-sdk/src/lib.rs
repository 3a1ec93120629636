//! # Bravia SDK - sync control of Sony Bravia TVs and AV receivers
//!
//! ```rust,no_run
//! use bravia_sdk::{BraviaDevice, DeviceConfig, EventKind};
//!
//! fn main() -> Result<(), bravia_sdk::SdkError> {
//!     bravia_sdk::logging::init_logging_from_env().ok();
//!
//!     let device = BraviaDevice::connect(DeviceConfig::with_psk("192.168.1.20", "0000"))?;
//!     println!("powered on: {}", device.power()?);
//!
//!     let speaker = device.volume_control("speaker")?;
//!     speaker.set_volume(20)?;
//!
//!     let id = device.register_callback(|event: EventKind| println!("changed: {}", event))?;
//!     std::thread::sleep(std::time::Duration::from_secs(30));
//!     device.unregister_callback(id);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! bravia-sdk (BraviaDevice facade, event loop)
//!     ↓
//! bravia-api (registration, JSON-RPC operations, IRCC)
//!     ↓
//! bravia-http (blocking transport)
//! ```
//!
//! Devices on the local network can be found with [`discovery`].

// Main exports
pub use config::DeviceConfig;
pub use device::BraviaDevice;
pub use error::{Result, SdkError};
pub use events::{CallbackId, EventKind, LoopState};
pub use volume::VolumeControl;

// Re-export commonly used types from the lower layers
pub use bravia_api::{ApiError, DeviceErrorKind, PinPrompt, PinState};
pub use bravia_discovery as discovery;

pub mod catalog;
pub mod channel;
pub mod commands;
pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod power;
pub mod speaker;
pub mod volume;

mod device;
