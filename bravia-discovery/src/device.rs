//! Device description parsing and validation.
//!
//! Sony devices extend the UPnP description with an `X_ScalarWebAPI_DeviceInfo`
//! block naming the JSON-RPC base URL and the services it offers.

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;

use crate::error::{DiscoveryError, Result};
use crate::Device;

#[derive(Debug, Deserialize)]
pub struct Root {
    pub device: DeviceDescription,
}

/// The standard UPnP part of a device description
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDescription {
    pub device_type: String,
    pub friendly_name: String,
    pub manufacturer: String,
    pub model_name: String,
    pub model_number: Option<String>,
    #[serde(rename = "UDN")]
    pub udn: String,
    #[serde(skip)]
    pub api: ScalarWebApiInfo,
}

/// Contents of the vendor `X_ScalarWebAPI_DeviceInfo` block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScalarWebApiInfo {
    pub base_url: Option<String>,
    pub services: Vec<String>,
}

impl DeviceDescription {
    /// Parse a device description document.
    ///
    /// # Errors
    ///
    /// Returns `DiscoveryError::ParseError` if the XML is malformed or missing required fields.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let root: Root = quick_xml::de::from_str(xml)
            .map_err(|e| DiscoveryError::ParseError(format!("Failed to parse device XML: {}", e)))?;

        let mut description = root.device;
        description.api = scan_scalar_web_api(xml)?;
        Ok(description)
    }

    /// Whether this is a Sony device exposing the JSON-RPC API
    pub fn is_bravia_device(&self) -> bool {
        self.manufacturer.to_lowercase().contains("sony") && self.api.base_url.is_some()
    }

    pub fn to_device(&self, ip_address: String) -> Device {
        let base_url = self
            .api
            .base_url
            .clone()
            .unwrap_or_else(|| format!("http://{}/sony", ip_address));

        Device {
            id: self.udn.clone(),
            name: self.friendly_name.clone(),
            model_name: self.model_name.clone(),
            ip_address,
            base_url,
            services: self.api.services.clone(),
        }
    }
}

// The vendor elements are namespace-prefixed (`av:`), so they are matched on
// their local names with the pull reader instead of through serde.
fn scan_scalar_web_api(xml: &str) -> Result<ScalarWebApiInfo> {
    #[derive(PartialEq)]
    enum Field {
        None,
        BaseUrl,
        ServiceType,
    }

    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut info = ScalarWebApiInfo::default();
    let mut field = Field::None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(element)) => {
                field = match element.local_name().as_ref() {
                    b"X_ScalarWebAPI_BaseURL" => Field::BaseUrl,
                    b"X_ScalarWebAPI_ServiceType" => Field::ServiceType,
                    _ => Field::None,
                };
            }
            Ok(Event::Text(text)) if field != Field::None => {
                let value = text
                    .unescape()
                    .map_err(|e| DiscoveryError::ParseError(e.to_string()))?
                    .trim()
                    .to_string();
                match field {
                    Field::BaseUrl => info.base_url = Some(value),
                    Field::ServiceType => info.services.push(value),
                    Field::None => {}
                }
            }
            Ok(Event::End(_)) => field = Field::None,
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(DiscoveryError::ParseError(format!(
                    "Failed to scan device XML at {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
        }
    }

    Ok(info)
}

/// Fetch and parse the description document at `location`
pub fn fetch_description(
    client: &reqwest::blocking::Client,
    location: &str,
) -> Result<DeviceDescription> {
    let response = client
        .get(location)
        .send()
        .map_err(|e| DiscoveryError::NetworkError(format!("Failed to fetch device description: {}", e)))?;

    if !response.status().is_success() {
        return Err(DiscoveryError::NetworkError(format!(
            "Device description request returned {}",
            response.status()
        )));
    }

    let xml = response
        .text()
        .map_err(|e| DiscoveryError::NetworkError(format!("Failed to read response body: {}", e)))?;

    DeviceDescription::from_xml(&xml)
}

/// Host part of a URL such as `http://192.168.1.20:52323/dmr.xml`
pub fn extract_ip_from_url(url: &str) -> Option<String> {
    let authority = url.split("//").nth(1)?.split('/').next()?;
    let host = authority.split(':').next()?;
    if host.is_empty() {
        None
    } else {
        Some(host.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BRAVIA_XML: &str = r#"<?xml version="1.0"?>
<root xmlns="urn:schemas-upnp-org:device-1-0" xmlns:av="urn:schemas-sony-com:av">
  <specVersion><major>1</major><minor>0</minor></specVersion>
  <device>
    <deviceType>urn:schemas-upnp-org:device:MediaRenderer:1</deviceType>
    <friendlyName>BRAVIA KD-55XF9005</friendlyName>
    <manufacturer>Sony Corporation</manufacturer>
    <modelName>KD-55XF9005</modelName>
    <UDN>uuid:9f5a6d3c-0000-1000-8000-d8d43c4e2a1b</UDN>
    <av:X_ScalarWebAPI_DeviceInfo>
      <av:X_ScalarWebAPI_Version>1.0</av:X_ScalarWebAPI_Version>
      <av:X_ScalarWebAPI_BaseURL>http://192.168.1.20/sony</av:X_ScalarWebAPI_BaseURL>
      <av:X_ScalarWebAPI_ServiceList>
        <av:X_ScalarWebAPI_ServiceType>guide</av:X_ScalarWebAPI_ServiceType>
        <av:X_ScalarWebAPI_ServiceType>system</av:X_ScalarWebAPI_ServiceType>
        <av:X_ScalarWebAPI_ServiceType>avContent</av:X_ScalarWebAPI_ServiceType>
      </av:X_ScalarWebAPI_ServiceList>
    </av:X_ScalarWebAPI_DeviceInfo>
  </device>
</root>"#;

    #[test]
    fn test_bravia_description() {
        let description = DeviceDescription::from_xml(BRAVIA_XML).unwrap();

        assert_eq!(description.friendly_name, "BRAVIA KD-55XF9005");
        assert_eq!(description.manufacturer, "Sony Corporation");
        assert_eq!(description.model_number, None);
        assert_eq!(description.api.base_url.as_deref(), Some("http://192.168.1.20/sony"));
        assert_eq!(description.api.services, vec!["guide", "system", "avContent"]);
        assert!(description.is_bravia_device());
    }

    #[test]
    fn test_sony_without_scalar_api_is_rejected() {
        let xml = r#"<?xml version="1.0"?>
<root xmlns="urn:schemas-upnp-org:device-1-0">
  <device>
    <deviceType>urn:schemas-upnp-org:device:MediaRenderer:1</deviceType>
    <friendlyName>Old Player</friendlyName>
    <manufacturer>Sony Corporation</manufacturer>
    <modelName>BDP-S1</modelName>
    <UDN>uuid:old</UDN>
  </device>
</root>"#;

        let description = DeviceDescription::from_xml(xml).unwrap();
        assert_eq!(description.api, ScalarWebApiInfo::default());
        assert!(!description.is_bravia_device());
    }

    #[test]
    fn test_other_vendor_is_rejected() {
        let xml = BRAVIA_XML.replace("Sony Corporation", "Other Company");
        let description = DeviceDescription::from_xml(&xml).unwrap();
        assert!(!description.is_bravia_device());
    }

    #[test]
    fn test_malformed_xml() {
        assert!(matches!(
            DeviceDescription::from_xml("<root><device>"),
            Err(DiscoveryError::ParseError(_))
        ));
    }

    #[test]
    fn test_to_device() {
        let device = DeviceDescription::from_xml(BRAVIA_XML)
            .unwrap()
            .to_device("192.168.1.20".to_string());

        assert_eq!(device.id, "uuid:9f5a6d3c-0000-1000-8000-d8d43c4e2a1b");
        assert_eq!(device.name, "BRAVIA KD-55XF9005");
        assert_eq!(device.model_name, "KD-55XF9005");
        assert_eq!(device.base_url, "http://192.168.1.20/sony");
        assert_eq!(device.api_address(), "192.168.1.20");
    }

    #[test]
    fn test_extract_ip_from_url() {
        assert_eq!(
            extract_ip_from_url("http://192.168.1.20:52323/dmr.xml"),
            Some("192.168.1.20".to_string())
        );
        assert_eq!(
            extract_ip_from_url("http://10.0.0.5/sony"),
            Some("10.0.0.5".to_string())
        );
        assert_eq!(extract_ip_from_url("invalid-url"), None);
        assert_eq!(extract_ip_from_url("http:///dmr.xml"), None);
    }
}
