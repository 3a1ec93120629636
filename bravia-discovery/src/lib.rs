//! Bravia device discovery
//!
//! Finds Sony TVs and receivers that expose the JSON-RPC control API by
//! sending an SSDP search and reading each responder's device description.
//!
//! # Quick Start
//!
//! ```no_run
//! use bravia_discovery::get;
//!
//! for device in get() {
//!     println!("Found {} at {}", device.name, device.ip_address);
//! }
//! ```

mod discovery;
mod error;
mod ssdp;

pub mod device;

use std::time::Duration;

pub use discovery::DiscoveryIterator;
pub use error::{DiscoveryError, Result};

/// Default time to wait for SSDP replies and description fetches
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// A discovered device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    /// Unique device identifier (UDN)
    pub id: String,
    pub name: String,
    pub model_name: String,
    pub ip_address: String,
    /// JSON-RPC base URL, e.g. `http://192.168.1.20/sony`
    pub base_url: String,
    /// Service names the device advertises (`system`, `avContent`...)
    pub services: Vec<String>,
}

impl Device {
    /// The `host[:port]` to hand to a session
    pub fn api_address(&self) -> String {
        self.base_url
            .split("//")
            .nth(1)
            .and_then(|rest| rest.split('/').next())
            .filter(|authority| !authority.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.ip_address.clone())
    }

    pub fn offers(&self, service: &str) -> bool {
        self.services.iter().any(|s| s == service)
    }
}

#[derive(Debug, Clone)]
pub enum DeviceEvent {
    Found(Device),
}

/// Discover devices with the default timeout
pub fn get() -> Vec<Device> {
    get_with_timeout(DEFAULT_TIMEOUT)
}

pub fn get_with_timeout(timeout: Duration) -> Vec<Device> {
    get_iter_with_timeout(timeout)
        .map(|event| match event {
            DeviceEvent::Found(device) => device,
        })
        .collect()
}

/// Stream devices as they are validated; stop iterating to end early
pub fn get_iter() -> DiscoveryIterator {
    get_iter_with_timeout(DEFAULT_TIMEOUT)
}

/// Like [`get_iter`] with a custom timeout
///
/// When the socket cannot be set up the iterator is empty and the failure
/// is logged.
pub fn get_iter_with_timeout(timeout: Duration) -> DiscoveryIterator {
    DiscoveryIterator::new(timeout).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "discovery unavailable");
        DiscoveryIterator::empty()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(base_url: &str) -> Device {
        Device {
            id: "uuid:1".to_string(),
            name: "BRAVIA".to_string(),
            model_name: "KD-55".to_string(),
            ip_address: "192.168.1.20".to_string(),
            base_url: base_url.to_string(),
            services: vec!["system".to_string(), "audio".to_string()],
        }
    }

    #[test]
    fn test_api_address() {
        assert_eq!(device("http://192.168.1.20/sony").api_address(), "192.168.1.20");
        assert_eq!(device("http://192.168.1.30:10000/sony").api_address(), "192.168.1.30:10000");
        assert_eq!(device("garbage").api_address(), "192.168.1.20");
    }

    #[test]
    fn test_offers() {
        let device = device("http://192.168.1.20/sony");
        assert!(device.offers("audio"));
        assert!(!device.offers("recording"));
    }
}
