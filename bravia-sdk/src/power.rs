//! Power state and Wake-on-LAN
//!
//! A device in network standby answers JSON-RPC and can be switched on with
//! `setPowerStatus` or the power button. A device that dropped off the
//! network only wakes from a magic packet sent to its MAC address.

use std::net::{SocketAddr, UdpSocket};

use bravia_api::operations::system::{
    get_network_settings, get_power_status, get_wol_mode, set_wol_mode, wol_mac,
    GetNetworkSettingsOperation, GetPowerStatusOperation, GetSystemSupportedFunctionOperation,
    GetWolModeOperation, SetWolModeOperation,
};
use bravia_api::BraviaClient;

use crate::error::{Result, SdkError};

const MAGIC_PACKET_LEN: usize = 6 + 16 * 6;

pub(crate) fn is_on(client: &BraviaClient) -> Result<bool> {
    Ok(client
        .execute::<GetPowerStatusOperation>(&get_power_status())?
        .is_active())
}

/// Find the MAC to wake the device with
///
/// Prefers the address advertised with the `WOL` function, then the first
/// network interface with a hardware address.
pub(crate) fn learn_mac(client: &BraviaClient) -> Result<Option<String>> {
    let functions = client.execute::<GetSystemSupportedFunctionOperation>(&())?;
    if let Some(mac) = wol_mac(&functions) {
        return Ok(Some(mac.to_string()));
    }

    let interfaces =
        client.execute::<GetNetworkSettingsOperation>(&get_network_settings(String::new()))?;
    Ok(interfaces
        .into_iter()
        .map(|interface| interface.hw_addr)
        .find(|mac| !mac.is_empty()))
}

/// Turn Wake-on-LAN on if the device has it switched off
pub(crate) fn ensure_wol_mode(client: &BraviaClient) -> Result<()> {
    let mode = client.execute::<GetWolModeOperation>(&get_wol_mode())?;
    if !mode.enabled {
        tracing::info!("enabling Wake-on-LAN on the device");
        client.execute::<SetWolModeOperation>(&set_wol_mode(true))?;
    }
    Ok(())
}

/// Parse `aa:bb:cc:dd:ee:ff`, `aa-bb-...` or twelve bare hex digits
pub fn parse_mac(mac: &str) -> Result<[u8; 6]> {
    let digits: String = mac
        .chars()
        .filter(|c| !matches!(c, ':' | '-' | '.'))
        .collect();

    if digits.len() != 12 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(SdkError::WakeOnLan(format!("{:?} is not a MAC address", mac)));
    }

    let mut bytes = [0u8; 6];
    for (i, byte) in bytes.iter_mut().enumerate() {
        *byte = u8::from_str_radix(&digits[i * 2..i * 2 + 2], 16)
            .map_err(|e| SdkError::WakeOnLan(e.to_string()))?;
    }
    Ok(bytes)
}

/// Six `0xFF` bytes followed by the MAC repeated sixteen times
pub fn magic_packet(mac: &str) -> Result<Vec<u8>> {
    let mac = parse_mac(mac)?;

    let mut packet = Vec::with_capacity(MAGIC_PACKET_LEN);
    packet.extend_from_slice(&[0xFF; 6]);
    for _ in 0..16 {
        packet.extend_from_slice(&mac);
    }
    Ok(packet)
}

/// Broadcast a magic packet for `mac` to `target`
pub fn send_magic_packet(mac: &str, target: SocketAddr) -> Result<()> {
    let packet = magic_packet(mac)?;

    let socket = UdpSocket::bind("0.0.0.0:0")
        .map_err(|e| SdkError::WakeOnLan(format!("Failed to bind UDP socket: {}", e)))?;
    socket
        .set_broadcast(true)
        .map_err(|e| SdkError::WakeOnLan(format!("Failed to enable broadcast: {}", e)))?;
    socket
        .send_to(&packet, target)
        .map_err(|e| SdkError::WakeOnLan(format!("Failed to send magic packet: {}", e)))?;

    tracing::info!(%mac, %target, "sent Wake-on-LAN packet");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_parse_mac_formats() {
        let expected = [0xfc, 0xf1, 0x52, 0x2a, 0x9b, 0x01];
        assert_eq!(parse_mac("FC:F1:52:2A:9B:01").unwrap(), expected);
        assert_eq!(parse_mac("fc-f1-52-2a-9b-01").unwrap(), expected);
        assert_eq!(parse_mac("fcf1522a9b01").unwrap(), expected);
    }

    #[test]
    fn test_parse_mac_rejects_garbage() {
        assert!(parse_mac("").is_err());
        assert!(parse_mac("fc:f1:52:2a:9b").is_err());
        assert!(parse_mac("zz:f1:52:2a:9b:01").is_err());
    }

    #[test]
    fn test_magic_packet_layout() {
        let packet = magic_packet("01:23:45:67:89:ab").unwrap();

        assert_eq!(packet.len(), 102);
        assert_eq!(&packet[..6], &[0xFF; 6]);
        for chunk in packet[6..].chunks(6) {
            assert_eq!(chunk, &[0x01, 0x23, 0x45, 0x67, 0x89, 0xab]);
        }
    }

    #[test]
    fn test_send_magic_packet_to_local_socket() {
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        receiver.set_read_timeout(Some(Duration::from_secs(2))).unwrap();
        let target = receiver.local_addr().unwrap();

        send_magic_packet("01:23:45:67:89:ab", target).unwrap();

        let mut buffer = [0u8; 256];
        let (size, _) = receiver.recv_from(&mut buffer).unwrap();
        assert_eq!(size, 102);
        assert_eq!(buffer[6], 0x01);
    }
}
