use bravia_http::{HttpClient, HttpRequest, HttpTransport, TransportError};

#[test]
fn test_post_returns_status_headers_and_body() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/sony/system")
        .match_header("x-auth-psk", "abc123")
        .match_body(r#"{"method":"getPowerStatus"}"#)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"result":[{"status":"active"}],"id":1}"#)
        .create();

    let client = HttpClient::new();
    let request = HttpRequest::post(format!("{}/sony/system", server.url()))
        .header("X-Auth-PSK", "abc123")
        .body(r#"{"method":"getPowerStatus"}"#);

    let response = client.post(&request).unwrap();

    mock.assert();
    assert_eq!(response.status, 200);
    assert_eq!(response.header("Content-Type"), Some("application/json"));
    assert!(response.body.contains("active"));
}

#[test]
fn test_error_status_is_a_response_not_an_error() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("POST", "/sony/accessControl")
        .with_status(401)
        .with_body("")
        .create();

    let client = HttpClient::new();
    let request = HttpRequest::post(format!("{}/sony/accessControl", server.url()));

    let response = client.post(&request).unwrap();
    assert_eq!(response.status, 401);
    assert!(!response.is_success());
}

#[test]
fn test_set_cookie_headers_are_all_kept() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("POST", "/sony/accessControl")
        .with_status(200)
        .with_header("set-cookie", "auth=abcdef; Path=/sony/; max-age=1209600")
        .with_header("set-cookie", "lang=en")
        .with_body(r#"{"result":[],"id":1}"#)
        .create();

    let client = HttpClient::new();
    let request = HttpRequest::post(format!("{}/sony/accessControl", server.url()));
    let response = client.post(&request).unwrap();

    let cookies = response.set_cookies();
    assert_eq!(cookies.len(), 2);
    assert!(cookies.iter().any(|c| c.starts_with("auth=abcdef")));
    assert!(cookies.iter().any(|c| c.starts_with("lang=en")));
}

#[test]
fn test_connection_refused_is_transport_error() {
    let client = HttpClient::new();
    let request = HttpRequest::post("http://127.0.0.1:1/sony/system");

    let err = client.post(&request).unwrap_err();
    assert!(matches!(err, TransportError::Connect(_) | TransportError::Io(_)));
}

#[test]
fn test_invalid_url_is_reported() {
    let client = HttpClient::new();
    let request = HttpRequest::post("not a url");

    assert!(matches!(
        client.post(&request),
        Err(TransportError::InvalidUrl(_))
    ));
}
