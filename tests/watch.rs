//! Health watcher integration tests.

use std::time::Duration;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use stackwatch::client::Dispatcher;
use stackwatch::routing::{HostContext, RoutingConfig, ServiceKind};
use stackwatch::watch::{check_all, HealthWatcher, ServiceState};

fn dead_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    port
}

fn dispatcher(auth_port: u16, item_port: u16) -> Dispatcher {
    let table = RoutingConfig {
        auth_port,
        item_port,
        ..RoutingConfig::default()
    };

    Dispatcher::with_parts(
        reqwest::Client::new(),
        table,
        HostContext::Advertised("127.0.0.1".to_string()),
    )
}

async fn healthy_auth_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "UP", "service": "auth-service", "timestamp": 0
        })))
        .mount(&server)
        .await;
    server
}

async fn healthy_item_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "healthy", "service": "item-service", "timestamp": 0.0
        })))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn one_failing_service_does_not_affect_its_sibling() {
    let auth = healthy_auth_server().await;
    let d = dispatcher(auth.address().port(), dead_port());

    let snapshot = check_all(&d).await;
    assert!(snapshot.is_populated());
    assert!(!snapshot.all_healthy());

    let auth_report = snapshot
        .services
        .iter()
        .find(|r| r.service == ServiceKind::Auth)
        .unwrap();
    assert!(matches!(
        auth_report.state,
        ServiceState::Healthy { http_status: 200 }
    ));

    let item_report = snapshot
        .services
        .iter()
        .find(|r| r.service == ServiceKind::Items)
        .unwrap();
    assert!(matches!(item_report.state, ServiceState::Unreachable { .. }));
}

#[tokio::test]
async fn fully_healthy_stack_reports_healthy() {
    let auth = healthy_auth_server().await;
    let items = healthy_item_server().await;
    let d = dispatcher(auth.address().port(), items.address().port());

    let snapshot = check_all(&d).await;
    assert!(snapshot.all_healthy());
    assert_eq!(snapshot.services.len(), 2);
}

#[tokio::test]
async fn watcher_publishes_a_batch_immediately_and_stops_cleanly() {
    let auth = healthy_auth_server().await;
    let items = healthy_item_server().await;
    let d = dispatcher(auth.address().port(), items.address().port());

    let watcher = HealthWatcher::spawn(d, Duration::from_secs(60));
    let mut rx = watcher.subscribe();

    // First batch fires on spawn, long before the 60s interval elapses.
    tokio::time::timeout(Duration::from_secs(5), rx.changed())
        .await
        .expect("first batch within timeout")
        .expect("watcher still running");

    let snapshot = rx.borrow().clone();
    assert!(snapshot.is_populated());
    assert!(snapshot.all_healthy());

    // Teardown must stop the repeating trigger promptly.
    tokio::time::timeout(Duration::from_secs(5), watcher.stop())
        .await
        .expect("watcher stops within timeout");
}

#[tokio::test]
async fn consecutive_failures_accumulate_per_service() {
    let auth = healthy_auth_server().await;
    let d = dispatcher(auth.address().port(), dead_port());

    let watcher = HealthWatcher::spawn(d, Duration::from_millis(50));
    let mut rx = watcher.subscribe();

    // Wait for at least two batches.
    for _ in 0..2 {
        tokio::time::timeout(Duration::from_secs(5), rx.changed())
            .await
            .expect("batch within timeout")
            .expect("watcher still running");
    }

    let snapshot = rx.borrow().clone();
    let item_report = snapshot
        .services
        .iter()
        .find(|r| r.service == ServiceKind::Items)
        .unwrap();
    assert!(item_report.consecutive_failures >= 2);

    let auth_report = snapshot
        .services
        .iter()
        .find(|r| r.service == ServiceKind::Auth)
        .unwrap();
    assert_eq!(auth_report.consecutive_failures, 0);

    watcher.stop().await;
}
