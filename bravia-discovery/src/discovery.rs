//! Discovery iterator.
//!
//! Sends one SSDP search for the Sony JSON-RPC service, then fetches and
//! validates each distinct description location before yielding it.

use std::collections::HashSet;
use std::time::Duration;

use crate::device::{extract_ip_from_url, fetch_description};
use crate::error::{DiscoveryError, Result};
use crate::ssdp::{SsdpClient, SsdpResponse, SCALAR_WEB_API_ST};
use crate::DeviceEvent;

/// Iterator that discovers Bravia devices on the local network.
///
/// # Examples
///
/// ```no_run
/// use bravia_discovery::{get_iter, DeviceEvent};
///
/// for event in get_iter() {
///     match event {
///         DeviceEvent::Found(device) => println!("Found: {}", device.name),
///     }
/// }
/// ```
pub struct DiscoveryIterator {
    ssdp_client: Option<SsdpClient>,
    ssdp_buffer: Vec<SsdpResponse>,
    buffer_index: usize,
    seen_locations: HashSet<String>,
    http_client: reqwest::blocking::Client,
}

impl DiscoveryIterator {
    pub fn new(timeout: Duration) -> Result<Self> {
        let ssdp_client = SsdpClient::new(timeout)?;
        let http_client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DiscoveryError::NetworkError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            ssdp_client: Some(ssdp_client),
            ssdp_buffer: Vec::new(),
            buffer_index: 0,
            seen_locations: HashSet::new(),
            http_client,
        })
    }

    /// An iterator that yields nothing
    pub(crate) fn empty() -> Self {
        Self {
            ssdp_client: None,
            ssdp_buffer: Vec::new(),
            buffer_index: 0,
            seen_locations: HashSet::new(),
            http_client: reqwest::blocking::Client::new(),
        }
    }

    /// Cheap pre-filter before the description is fetched
    fn is_likely_bravia(response: &SsdpResponse) -> bool {
        if response.urn.contains("ScalarWebAPI") {
            return true;
        }

        response
            .server
            .as_ref()
            .map(|server| server.to_lowercase().contains("sony"))
            .unwrap_or(false)
    }

    fn fill_buffer(&mut self) {
        let Some(client) = self.ssdp_client.take() else {
            return;
        };

        match client.search(SCALAR_WEB_API_ST) {
            Ok(replies) => {
                for reply in replies {
                    match reply {
                        Ok(response) => self.ssdp_buffer.push(response),
                        Err(e) => tracing::debug!(error = %e, "SSDP receive failed"),
                    }
                }
            }
            Err(e) => tracing::warn!(error = %e, "SSDP search failed"),
        }
    }
}

impl Iterator for DiscoveryIterator {
    type Item = DeviceEvent;

    fn next(&mut self) -> Option<Self::Item> {
        if self.ssdp_client.is_some() {
            self.fill_buffer();
        }

        while self.buffer_index < self.ssdp_buffer.len() {
            let response = &self.ssdp_buffer[self.buffer_index];
            self.buffer_index += 1;

            if !self.seen_locations.insert(response.location.clone()) {
                continue;
            }

            if !Self::is_likely_bravia(response) {
                continue;
            }

            let description = match fetch_description(&self.http_client, &response.location) {
                Ok(description) => description,
                Err(e) => {
                    tracing::debug!(location = %response.location, error = %e, "skipping device");
                    continue;
                }
            };

            if !description.is_bravia_device() {
                tracing::debug!(
                    location = %response.location,
                    manufacturer = %description.manufacturer,
                    "not a Bravia device"
                );
                continue;
            }

            let Some(ip_address) = extract_ip_from_url(&response.location) else {
                continue;
            };

            return Some(DeviceEvent::Found(description.to_device(ip_address)));
        }

        None
    }
}
