//! JSON-RPC calls against a local HTTP server

use std::sync::Arc;

use bravia_api::operations::audio::{set_audio_volume, SetAudioVolumeOperation};
use bravia_api::operations::system::{get_power_status, GetPowerStatusOperation};
use bravia_api::{ApiError, BraviaClient, DeviceErrorKind, Service, Session};
use bravia_http::HttpClient;
use mockito::Matcher;
use rstest::rstest;
use serde_json::json;

fn client(server: &mockito::Server) -> BraviaClient {
    BraviaClient::with_transport(
        Session::with_psk(server.host_with_port(), "abc123"),
        Arc::new(HttpClient::new()),
    )
}

#[test]
fn test_power_status_end_to_end() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/sony/system")
        .match_header("x-auth-psk", "abc123")
        .match_body(Matcher::PartialJson(json!({
            "method": "getPowerStatus",
            "params": [],
            "version": "1.0"
        })))
        .with_status(200)
        .with_body(r#"{"result":[{"status":"active"}],"id":1}"#)
        .create();

    let status = client(&server)
        .execute::<GetPowerStatusOperation>(&get_power_status())
        .unwrap();

    mock.assert();
    assert!(status.is_active());
}

#[test]
fn test_named_params_are_wrapped_in_a_list() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/sony/audio")
        .match_body(Matcher::PartialJson(json!({
            "method": "setAudioVolume",
            "params": [{"target": "speaker", "volume": "21"}]
        })))
        .with_body(r#"{"result":[0],"id":1}"#)
        .create();

    client(&server)
        .execute::<SetAudioVolumeOperation>(&set_audio_volume(
            "speaker".to_string(),
            "21".to_string(),
        ))
        .unwrap();
    mock.assert();
}

#[rstest]
#[case(r#"{"error":[3,"Illegal Argument"],"id":1}"#, 200, DeviceErrorKind::IllegalArgument)]
#[case(r#"{"error":[40005,"Display Is Turned off"],"id":1}"#, 200, DeviceErrorKind::DisplayIsOff)]
#[case(r#"{"error":[403,"Forbidden"],"id":1}"#, 200, DeviceErrorKind::Forbidden)]
#[case("", 401, DeviceErrorKind::Unauthorized)]
fn test_device_errors(#[case] body: &str, #[case] status: usize, #[case] expected: DeviceErrorKind) {
    let mut server = mockito::Server::new();
    server
        .mock("POST", "/sony/avContent")
        .with_status(status)
        .with_body(body)
        .create();

    let err = client(&server)
        .call(Service::AvContent, "getPlayingContentInfo", Default::default())
        .unwrap_err();
    assert_eq!(err.device_kind(), Some(expected));
}

#[test]
fn test_unknown_code_keeps_number() {
    let mut server = mockito::Server::new();
    server
        .mock("POST", "/sony/system")
        .with_body(r#"{"error":[65000,"mystery"],"id":1}"#)
        .create();

    let err = client(&server)
        .call(Service::System, "getPowerStatus", Default::default())
        .unwrap_err();
    match err {
        ApiError::Device(device) => {
            assert_eq!(device.kind, DeviceErrorKind::Unknown);
            assert_eq!(device.code, 65000);
            assert_eq!(device.message, "mystery");
        }
        other => panic!("expected a device error, got {:?}", other),
    }
}

#[test]
fn test_unreachable_device_is_send_error() {
    let client = BraviaClient::with_transport(
        Session::with_psk("127.0.0.1:1", "abc123"),
        Arc::new(HttpClient::new()),
    );
    let err = client
        .call(Service::System, "getPowerStatus", Default::default())
        .unwrap_err();
    assert!(matches!(err, ApiError::Send(_)));
}

mod custom {
    bravia_api::define_operation! {
        operation: GetSoundSettings,
        service: Audio,
        method: "getSoundSettings",
        request: { target: String },
        response: serde_json::Value,
    }
}

#[test]
fn test_operations_defined_outside_the_crate() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/sony/audio")
        .match_body(Matcher::PartialJson(json!({
            "method": "getSoundSettings",
            "params": [{"target": "outputTerminal"}]
        })))
        .with_body(r#"{"result":[[{"target":"outputTerminal","currentValue":"speaker"}]],"id":1}"#)
        .create();

    let settings = client(&server)
        .execute::<custom::GetSoundSettingsOperation>(&custom::get_sound_settings(
            "outputTerminal".to_string(),
        ))
        .unwrap();

    mock.assert();
    assert_eq!(settings[0]["currentValue"], "speaker");
}
