//! Description fetches against a local HTTP server

use bravia_discovery::device::{fetch_description, DeviceDescription};
use bravia_discovery::DiscoveryError;

const DESCRIPTION: &str = r#"<?xml version="1.0"?>
<root xmlns="urn:schemas-upnp-org:device-1-0" xmlns:av="urn:schemas-sony-com:av">
  <device>
    <deviceType>urn:schemas-upnp-org:device:MediaRenderer:1</deviceType>
    <friendlyName>STR-DN1080</friendlyName>
    <manufacturer>Sony Corporation</manufacturer>
    <modelName>STR-DN1080</modelName>
    <UDN>uuid:00000000-0000-1010-8000-fc0fe6aabbcc</UDN>
    <av:X_ScalarWebAPI_DeviceInfo>
      <av:X_ScalarWebAPI_BaseURL>http://192.168.1.40:10000/sony</av:X_ScalarWebAPI_BaseURL>
      <av:X_ScalarWebAPI_ServiceList>
        <av:X_ScalarWebAPI_ServiceType>audio</av:X_ScalarWebAPI_ServiceType>
        <av:X_ScalarWebAPI_ServiceType>avContent</av:X_ScalarWebAPI_ServiceType>
      </av:X_ScalarWebAPI_ServiceList>
    </av:X_ScalarWebAPI_DeviceInfo>
  </device>
</root>"#;

fn client() -> reqwest::blocking::Client {
    reqwest::blocking::Client::new()
}

#[test]
fn test_fetch_receiver_description() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/description.xml")
        .with_header("content-type", "text/xml")
        .with_body(DESCRIPTION)
        .create();

    let description =
        fetch_description(&client(), &format!("{}/description.xml", server.url())).unwrap();
    mock.assert();

    assert!(description.is_bravia_device());
    let device = description.to_device("192.168.1.40".to_string());
    assert_eq!(device.api_address(), "192.168.1.40:10000");
    assert!(device.offers("audio"));
    assert!(!device.offers("system"));
}

#[test]
fn test_fetch_error_status() {
    let mut server = mockito::Server::new();
    server.mock("GET", "/missing.xml").with_status(404).create();

    let result = fetch_description(&client(), &format!("{}/missing.xml", server.url()));
    assert!(matches!(result, Err(DiscoveryError::NetworkError(_))));
}

#[test]
fn test_fetch_non_xml_body() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/description.xml")
        .with_body("{\"not\": \"xml\"}")
        .create();

    let result = fetch_description(&client(), &format!("{}/description.xml", server.url()));
    assert!(matches!(result, Err(DiscoveryError::ParseError(_))));
}

#[test]
fn test_parse_is_independent_of_fetch() {
    let description = DeviceDescription::from_xml(DESCRIPTION).unwrap();
    assert_eq!(description.api.services, vec!["audio", "avContent"]);
}
