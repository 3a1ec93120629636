//! Per-device configuration
//!
//! A [`DeviceConfig`] names the device, how to authenticate with it and the
//! timing of requests and of the polling loop.

use std::net::SocketAddr;
use std::time::Duration;

use bravia_http::HttpClientConfig;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SdkError};

/// Configuration for one [`BraviaDevice`](crate::BraviaDevice)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Host or `host:port` of the device
    pub address: String,

    /// PIN shown on screen during registration
    /// Default: none
    #[serde(default)]
    pub pin: Option<String>,

    /// Pre-shared key configured on the device
    /// Default: none
    #[serde(default)]
    pub psk: Option<String>,

    /// Name this client registers under
    /// Default: host name of this machine
    #[serde(default)]
    pub nickname: Option<String>,

    /// Period of the polling loop
    /// Default: 200 milliseconds
    #[serde(default = "defaults::poll_interval", rename = "poll_interval_ms", with = "millis")]
    pub poll_interval: Duration,

    /// Default: 5 seconds
    #[serde(default = "defaults::connect_timeout", rename = "connect_timeout_ms", with = "millis")]
    pub connect_timeout: Duration,

    /// Default: 10 seconds
    #[serde(default = "defaults::read_timeout", rename = "read_timeout_ms", with = "millis")]
    pub read_timeout: Duration,

    /// How long registration waits for a PIN to be submitted
    /// Default: 60 seconds
    #[serde(default = "defaults::pin_timeout", rename = "pin_timeout_ms", with = "millis")]
    pub pin_timeout: Duration,

    /// Upper bound on waiting for the polling worker to exit
    /// Default: 1 second
    #[serde(default = "defaults::stop_timeout", rename = "stop_timeout_ms", with = "millis")]
    pub stop_timeout: Duration,

    /// Where Wake-on-LAN packets are sent
    /// Default: "255.255.255.255:9"
    #[serde(default = "defaults::wol_broadcast")]
    pub wol_broadcast: String,
}

mod defaults {
    use std::time::Duration;

    pub fn poll_interval() -> Duration {
        Duration::from_millis(200)
    }

    pub fn connect_timeout() -> Duration {
        Duration::from_secs(5)
    }

    pub fn read_timeout() -> Duration {
        Duration::from_secs(10)
    }

    pub fn pin_timeout() -> Duration {
        bravia_api::auth::DEFAULT_PIN_TIMEOUT
    }

    pub fn stop_timeout() -> Duration {
        Duration::from_secs(1)
    }

    pub fn wol_broadcast() -> String {
        "255.255.255.255:9".to_string()
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

impl DeviceConfig {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            pin: None,
            psk: None,
            nickname: None,
            poll_interval: defaults::poll_interval(),
            connect_timeout: defaults::connect_timeout(),
            read_timeout: defaults::read_timeout(),
            pin_timeout: defaults::pin_timeout(),
            stop_timeout: defaults::stop_timeout(),
            wol_broadcast: defaults::wol_broadcast(),
        }
    }

    /// Configuration for a device with a pre-shared key set up
    pub fn with_psk(address: impl Into<String>, psk: impl Into<String>) -> Self {
        Self {
            psk: Some(psk.into()),
            ..Self::new(address)
        }
    }

    pub fn with_pin(mut self, pin: impl Into<String>) -> Self {
        self.pin = Some(pin.into());
        self
    }

    pub fn with_nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = Some(nickname.into());
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_request_timeouts(mut self, connect: Duration, read: Duration) -> Self {
        self.connect_timeout = connect;
        self.read_timeout = read;
        self
    }

    pub fn with_pin_timeout(mut self, timeout: Duration) -> Self {
        self.pin_timeout = timeout;
        self
    }

    pub fn with_stop_timeout(mut self, timeout: Duration) -> Self {
        self.stop_timeout = timeout;
        self
    }

    pub fn with_wol_broadcast(mut self, target: impl Into<String>) -> Self {
        self.wol_broadcast = target.into();
        self
    }

    pub fn http_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            connect_timeout: self.connect_timeout,
            read_timeout: self.read_timeout,
        }
    }

    pub(crate) fn wol_target(&self) -> Result<SocketAddr> {
        self.wol_broadcast.parse().map_err(|_| {
            SdkError::InvalidConfig(format!(
                "Wake-on-LAN target {:?} is not an ip:port pair",
                self.wol_broadcast
            ))
        })
    }

    /// Validate the configuration and return the first problem found
    pub fn validate(&self) -> Result<()> {
        if self.address.trim().is_empty() {
            return Err(SdkError::InvalidConfig("Device address must not be empty".to_string()));
        }

        if let Some(pin) = &self.pin {
            if pin.is_empty() || !pin.chars().all(|c| c.is_ascii_digit()) {
                return Err(SdkError::InvalidConfig("PIN must be numeric".to_string()));
            }
        }

        if self.psk.as_deref() == Some("") {
            return Err(SdkError::InvalidConfig("Pre-shared key must not be empty".to_string()));
        }

        let intervals = [
            ("Poll interval", self.poll_interval),
            ("Connect timeout", self.connect_timeout),
            ("Read timeout", self.read_timeout),
            ("PIN timeout", self.pin_timeout),
            ("Stop timeout", self.stop_timeout),
        ];
        for (name, value) in intervals {
            if value == Duration::ZERO {
                return Err(SdkError::InvalidConfig(format!("{} must be greater than 0", name)));
            }
        }

        self.wol_target().map(|_| ())
    }
}
