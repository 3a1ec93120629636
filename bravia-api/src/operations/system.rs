//! `system` service operations
//!
//! Power state, the remote-controller code table, device identity, network
//! settings and Wake-on-LAN configuration.

use serde::Deserialize;
use serde_json::Value;

use crate::define_operation;
use crate::error::ApiError;
use crate::operation::{decode_at, decode_first, Operation};
use crate::service::Service;

/// Reply of `getPowerStatus`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PowerStatus {
    pub status: String,
}

impl PowerStatus {
    /// `"active"` is the only powered-on state; `"standby"` is off
    pub fn is_active(&self) -> bool {
        self.status == "active"
    }
}

define_operation! {
    operation: GetPowerStatus,
    service: System,
    method: "getPowerStatus",
    request: {},
    response: PowerStatus,
}

define_operation! {
    operation: SetPowerStatus,
    service: System,
    method: "setPowerStatus",
    request: { status: bool },
    response: (),
}

/// One named remote button and its IRCC code
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteCommand {
    pub name: String,
    pub value: String,
}

/// `getRemoteControllerInfo`: element 0 describes the remote, element 1 is
/// the button table.
pub struct GetRemoteControllerInfoOperation;

impl Operation for GetRemoteControllerInfoOperation {
    type Request = ();
    type Response = Vec<RemoteCommand>;

    const SERVICE: Service = Service::System;
    const METHOD: &'static str = "getRemoteControllerInfo";

    fn parse_response(result: Vec<Value>) -> Result<Self::Response, ApiError> {
        decode_at(Self::METHOD, &result, 1)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SystemInformation {
    pub product: String,
    pub region: String,
    pub language: String,
    pub model: String,
    pub serial: String,
    pub mac_addr: String,
    pub name: String,
    pub generation: String,
    pub area: String,
    pub cid: String,
}

define_operation! {
    operation: GetSystemInformation,
    service: System,
    method: "getSystemInformation",
    request: {},
    response: SystemInformation,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InterfaceInformation {
    pub product_category: String,
    pub product_name: String,
    pub model_name: String,
    pub server_name: String,
    pub interface_version: String,
}

define_operation! {
    operation: GetInterfaceInformation,
    service: System,
    method: "getInterfaceInformation",
    request: {},
    response: InterfaceInformation,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NetworkInterface {
    pub netif: String,
    pub hw_addr: String,
    pub ip_addr_v4: String,
    pub ip_addr_v6: String,
    pub netmask: String,
    pub gateway: String,
    pub dns: Vec<String>,
}

define_operation! {
    operation: GetNetworkSettings,
    service: System,
    method: "getNetworkSettings",
    request: { netif: String },
    response: Vec<NetworkInterface>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct WolMode {
    pub enabled: bool,
}

define_operation! {
    operation: GetWolMode,
    service: System,
    method: "getWolMode",
    request: {},
    response: WolMode,
}

define_operation! {
    operation: SetWolMode,
    service: System,
    method: "setWolMode",
    request: { enabled: bool },
    response: (),
}

/// One `{option, value}` entry of `getSystemSupportedFunction`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SupportedFunction {
    pub option: String,
    pub value: String,
}

pub struct GetSystemSupportedFunctionOperation;

impl Operation for GetSystemSupportedFunctionOperation {
    type Request = ();
    type Response = Vec<SupportedFunction>;

    const SERVICE: Service = Service::System;
    const METHOD: &'static str = "getSystemSupportedFunction";

    fn parse_response(result: Vec<Value>) -> Result<Self::Response, ApiError> {
        decode_first(Self::METHOD, &result)
    }
}

/// MAC address the device advertises for Wake-on-LAN, if any
pub fn wol_mac(functions: &[SupportedFunction]) -> Option<&str> {
    functions
        .iter()
        .find(|f| f.option == "WOL")
        .map(|f| f.value.as_str())
        .filter(|mac| !mac.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_power_status() {
        let active = GetPowerStatusOperation::parse_response(vec![json!({"status": "active"})]).unwrap();
        assert!(active.is_active());

        let standby = GetPowerStatusOperation::parse_response(vec![json!({"status": "standby"})]).unwrap();
        assert!(!standby.is_active());
    }

    #[test]
    fn test_set_power_status_params() {
        let params = SetPowerStatusOperation::params(&set_power_status(true)).unwrap();
        assert_eq!(params.get("status"), Some(&json!(true)));
    }

    #[test]
    fn test_get_power_status_has_no_params() {
        assert!(GetPowerStatusOperation::params(&get_power_status()).unwrap().is_empty());
    }

    #[test]
    fn test_remote_controller_info_reads_second_element() {
        let result = vec![
            json!({"bundled": true, "type": "RM-J1100"}),
            json!([
                {"name": "PowerOff", "value": "AAAAAQAAAAEAAAAvAw=="},
                {"name": "Num1", "value": "AAAAAQAAAAEAAAAAAw=="}
            ]),
        ];
        let commands = GetRemoteControllerInfoOperation::parse_response(result).unwrap();
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0].name, "PowerOff");
        assert_eq!(commands[1].value, "AAAAAQAAAAEAAAAAAw==");
    }

    #[test]
    fn test_remote_controller_info_missing_table() {
        let result = vec![json!({"bundled": true})];
        assert!(matches!(
            GetRemoteControllerInfoOperation::parse_response(result),
            Err(ApiError::UnexpectedResult(_))
        ));
    }

    #[test]
    fn test_system_information_tolerates_missing_fields() {
        let info = GetSystemInformationOperation::parse_response(vec![json!({
            "product": "TV",
            "model": "KDL-50W800C",
            "macAddr": "ac:9b:0a:11:22:33"
        })])
        .unwrap();
        assert_eq!(info.model, "KDL-50W800C");
        assert_eq!(info.mac_addr, "ac:9b:0a:11:22:33");
        assert_eq!(info.serial, "");
    }

    #[test]
    fn test_network_settings() {
        let settings = GetNetworkSettingsOperation::parse_response(vec![json!([{
            "netif": "eth0",
            "hwAddr": "ac:9b:0a:11:22:33",
            "ipAddrV4": "10.0.0.5",
            "dns": ["10.0.0.1"]
        }])])
        .unwrap();
        assert_eq!(settings[0].hw_addr, "ac:9b:0a:11:22:33");
        assert_eq!(settings[0].dns, vec!["10.0.0.1".to_string()]);
    }

    #[test]
    fn test_wol_mac_lookup() {
        let functions = GetSystemSupportedFunctionOperation::parse_response(vec![json!([
            {"option": "WOL", "value": "ac:9b:0a:11:22:33"},
            {"option": "PIP", "value": "yes"}
        ])])
        .unwrap();
        assert_eq!(wol_mac(&functions), Some("ac:9b:0a:11:22:33"));
        assert_eq!(wol_mac(&functions[1..]), None);
    }
}
