//! SSDP client used to locate devices exposing the Sony JSON-RPC API
//!
//! Internal to the crate; callers go through the discovery iterator.

use std::net::UdpSocket;
use std::time::Duration;

use crate::error::{DiscoveryError, Result};

pub(crate) const MULTICAST_ADDR: &str = "239.255.255.250:1900";

/// Search target advertised by Bravia TVs and Sony receivers
pub(crate) const SCALAR_WEB_API_ST: &str = "urn:schemas-sony-com:service:ScalarWebAPI:1";

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SsdpResponse {
    pub location: String,
    pub urn: String,
    pub usn: String,
    pub server: Option<String>,
}

pub(crate) struct SsdpClient {
    socket: UdpSocket,
}

impl SsdpClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0")
            .map_err(|e| DiscoveryError::NetworkError(format!("Failed to bind UDP socket: {}", e)))?;

        socket
            .set_read_timeout(Some(timeout))
            .map_err(|e| DiscoveryError::NetworkError(format!("Failed to set read timeout: {}", e)))?;

        socket
            .set_multicast_loop_v4(true)
            .map_err(|e| DiscoveryError::NetworkError(format!("Failed to set multicast loop: {}", e)))?;

        Ok(Self { socket })
    }

    /// Send one M-SEARCH and iterate over the replies until the read timeout
    pub fn search(&self, search_target: &str) -> Result<SsdpResponseIterator<'_>> {
        let request = search_request(search_target);

        self.socket
            .send_to(request.as_bytes(), MULTICAST_ADDR)
            .map_err(|e| DiscoveryError::NetworkError(format!("Failed to send M-SEARCH: {}", e)))?;
        tracing::debug!(st = search_target, "sent M-SEARCH");

        Ok(SsdpResponseIterator::new(&self.socket))
    }
}

fn search_request(search_target: &str) -> String {
    format!(
        "M-SEARCH * HTTP/1.1\r\n\
         HOST: {}\r\n\
         MAN: \"ssdp:discover\"\r\n\
         MX: 1\r\n\
         ST: {}\r\n\
         USER-AGENT: bravia-rs/0.3 UPnP/1.0\r\n\
         \r\n",
        MULTICAST_ADDR, search_target
    )
}

pub(crate) struct SsdpResponseIterator<'a> {
    socket: &'a UdpSocket,
    buffer: [u8; 2048],
    finished: bool,
}

impl<'a> SsdpResponseIterator<'a> {
    fn new(socket: &'a UdpSocket) -> Self {
        Self {
            socket,
            buffer: [0; 2048],
            finished: false,
        }
    }
}

impl<'a> Iterator for SsdpResponseIterator<'a> {
    type Item = Result<SsdpResponse>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            match self.socket.recv_from(&mut self.buffer) {
                Ok((size, from)) => {
                    // Non UTF-8 and unparsable datagrams are skipped.
                    let parsed = std::str::from_utf8(&self.buffer[..size])
                        .ok()
                        .and_then(parse_ssdp_response);
                    match parsed {
                        Some(response) => return Some(Ok(response)),
                        None => tracing::trace!(%from, "ignoring SSDP datagram"),
                    }
                }
                Err(e)
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut =>
                {
                    self.finished = true;
                }
                Err(e) => {
                    return Some(Err(DiscoveryError::NetworkError(format!("Socket error: {}", e))))
                }
            }
        }
        None
    }
}

/// Parse the headers of an SSDP search reply
pub(crate) fn parse_ssdp_response(response: &str) -> Option<SsdpResponse> {
    let mut location = None;
    let mut urn = None;
    let mut usn = None;
    let mut server = None;

    for line in response.lines() {
        let line = line.trim();

        if let Some(value) = extract_header_value(line, "LOCATION:") {
            location = Some(value);
        } else if let Some(value) = extract_header_value(line, "ST:") {
            urn = Some(value);
        } else if let Some(value) = extract_header_value(line, "USN:") {
            usn = Some(value);
        } else if let Some(value) = extract_header_value(line, "SERVER:") {
            server = Some(value);
        }
    }

    Some(SsdpResponse {
        location: location?,
        urn: urn?,
        usn: usn?,
        server,
    })
}

fn extract_header_value(line: &str, header: &str) -> Option<String> {
    let prefix = line.get(..header.len())?;
    if line.len() > header.len() && prefix.eq_ignore_ascii_case(header) {
        Some(line[header.len()..].trim().to_string())
    } else {
        None
    }
}
