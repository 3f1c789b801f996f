//! Dispatcher integration tests against mock backends.

use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use stackwatch::client::{Dispatcher, RequestOptions};
use stackwatch::error::{ClientError, RouteError};
use stackwatch::routing::{HostContext, RoutingConfig};

/// Dispatcher whose routing table points at the two mock servers.
fn dispatcher_for(auth: &MockServer, items: &MockServer) -> Dispatcher {
    let table = RoutingConfig {
        auth_port: auth.address().port(),
        item_port: items.address().port(),
        ..RoutingConfig::default()
    };

    Dispatcher::with_parts(
        reqwest::Client::new(),
        table,
        HostContext::Advertised("127.0.0.1".to_string()),
    )
}

/// A loopback port with nothing listening on it.
fn dead_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    port
}

#[tokio::test]
async fn auth_prefixes_reach_the_auth_backend() {
    let auth = MockServer::start().await;
    let items = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "UP", "service": "auth-service", "timestamp": 0
        })))
        .expect(1)
        .mount(&auth)
        .await;

    let dispatcher = dispatcher_for(&auth, &items);
    let response = dispatcher.get("/api/auth/health").await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn item_prefixes_reach_the_item_backend() {
    let auth = MockServer::start().await;
    let items = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "healthy", "service": "item-service", "timestamp": 0.0
        })))
        .expect(1)
        .mount(&items)
        .await;

    let dispatcher = dispatcher_for(&auth, &items);
    let response = dispatcher.get("/health").await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn default_json_content_type_travels_with_caller_headers() {
    let auth = MockServer::start().await;
    let items = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/user"))
        .and(header("content-type", "application/json"))
        .and(header("authorization", "Bearer token-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true
        })))
        .expect(1)
        .mount(&auth)
        .await;

    let dispatcher = dispatcher_for(&auth, &items);
    let options = RequestOptions::new().header(
        reqwest::header::AUTHORIZATION,
        reqwest::header::HeaderValue::from_static("Bearer token-123"),
    );

    let response = dispatcher.request("/api/auth/user", options).await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn post_body_is_forwarded_verbatim() {
    let auth = MockServer::start().await;
    let items = MockServer::start().await;

    let payload = serde_json::json!({"username": "admin", "password": "password"});

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(&payload))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true, "token": "demo-jwt-token-1234567890"
        })))
        .expect(1)
        .mount(&auth)
        .await;

    let dispatcher = dispatcher_for(&auth, &items);
    let options = RequestOptions::post().json(&payload).unwrap();

    let response = dispatcher.request("/api/auth/login", options).await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn error_statuses_are_returned_not_raised() {
    let auth = MockServer::start().await;
    let items = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&items)
        .await;

    let dispatcher = dispatcher_for(&auth, &items);
    let response = dispatcher.get("/health").await.unwrap();
    assert_eq!(response.status().as_u16(), 503);
}

#[tokio::test]
async fn transport_failure_is_propagated() {
    let table = RoutingConfig {
        auth_port: dead_port(),
        item_port: dead_port(),
        ..RoutingConfig::default()
    };
    let dispatcher = Dispatcher::with_parts(
        reqwest::Client::new(),
        table,
        HostContext::Advertised("127.0.0.1".to_string()),
    );

    let result = dispatcher.get("/health").await;
    assert!(matches!(result, Err(ClientError::Http(_))));
}

#[tokio::test]
async fn unrouted_endpoint_never_touches_the_network() {
    let auth = MockServer::start().await;
    let items = MockServer::start().await;

    // No mocks mounted; routing fails before any request is built.
    let dispatcher = dispatcher_for(&auth, &items);
    let result = dispatcher.get("/api/orders").await;

    assert!(matches!(
        result,
        Err(ClientError::Route(RouteError::UnroutedEndpoint { .. }))
    ));
}
