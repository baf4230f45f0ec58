//! End-to-end balancing and failover against real TCP backends.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use axum::http::StatusCode;

mod common;

async fn get_body(client: &reqwest::Client, addr: std::net::SocketAddr) -> (StatusCode, String) {
    let res = client
        .get(format!("http://{}/", addr))
        .send()
        .await
        .expect("Proxy unreachable");
    let status = StatusCode::from_u16(res.status().as_u16()).unwrap();
    (status, res.text().await.unwrap())
}

#[tokio::test]
async fn test_round_robin_order() {
    let a = common::start_mock_backend("a").await;
    let b = common::start_mock_backend("b").await;
    let c = common::start_mock_backend("c").await;
    let proxy = common::start_proxy(common::config_for(&[a, b, c])).await;

    let client = common::client();
    let mut bodies = Vec::new();
    for _ in 0..6 {
        let (status, body) = get_body(&client, proxy.addr).await;
        assert_eq!(status, StatusCode::OK);
        bodies.push(body);
    }

    assert_eq!(bodies, vec!["a", "b", "c", "a", "b", "c"]);
    proxy.shutdown.trigger();
}

#[tokio::test]
async fn test_failover_to_live_backend() {
    let dead = common::dead_addr().await;
    let live = common::start_mock_backend("live").await;
    let proxy = common::start_proxy(common::config_for(&[dead, live])).await;

    let client = common::client();
    for _ in 0..5 {
        let (status, body) = get_body(&client, proxy.addr).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "live");
    }

    assert!(!proxy.registry.backends()[0].is_alive(), "refused backend should be marked dead");
    assert!(proxy.registry.backends()[1].is_alive());
    proxy.shutdown.trigger();
}

#[tokio::test]
async fn test_all_dead_returns_503() {
    let backends = [
        common::dead_addr().await,
        common::dead_addr().await,
        common::dead_addr().await,
    ];
    let proxy = common::start_proxy(common::config_for(&backends)).await;

    let client = common::client();
    let (status, body) = tokio::time::timeout(Duration::from_secs(10), get_body(&client, proxy.addr))
        .await
        .expect("request did not terminate");

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, "No healthy backends");
    assert_eq!(proxy.registry.alive_count(), 0);

    // Once everything is dead, later requests fail without touching the network.
    let (status, _) = get_body(&client, proxy.addr).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    proxy.shutdown.trigger();
}

#[tokio::test]
async fn test_error_status_passed_through() {
    let hits = Arc::new(AtomicUsize::new(0));
    let h = hits.clone();
    let backend = common::start_programmable_backend(move |_| {
        let h = h.clone();
        async move {
            h.fetch_add(1, Ordering::SeqCst);
            (500, "boom".to_string())
        }
    })
    .await;
    let proxy = common::start_proxy(common::config_for(&[backend])).await;

    let (status, body) = get_body(&common::client(), proxy.addr).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "boom");
    assert_eq!(hits.load(Ordering::SeqCst), 1, "5xx must not trigger failover");
    assert!(proxy.registry.backends()[0].is_alive());
    proxy.shutdown.trigger();
}

#[tokio::test]
async fn test_forwarding_headers() {
    let backend = common::start_programmable_backend(|head| async move { (200, head) }).await;
    let proxy = common::start_proxy(common::config_for(&[backend])).await;

    let res = common::client()
        .get(format!("http://{}/search?q=rust", proxy.addr))
        .header("x-custom", "kept")
        .send()
        .await
        .unwrap();

    assert!(res.headers().contains_key("x-request-id"));
    let head = res.text().await.unwrap().to_lowercase();
    assert!(head.starts_with("get /search?q=rust http/1.1"), "{}", head);
    assert!(head.contains("x-custom: kept"), "{}", head);
    assert!(head.contains("x-forwarded-for: 127.0.0.1"), "{}", head);
    assert!(head.contains("x-request-id: "), "{}", head);
    proxy.shutdown.trigger();
}

#[tokio::test]
async fn test_health_monitor_restores_backend() {
    let live = common::start_mock_backend("live").await;
    let revived_addr = common::dead_addr().await;

    let mut config = common::config_for(&[live, revived_addr]);
    config.health_check.enabled = true;
    config.health_check.interval_secs = 1;
    config.health_check.timeout_secs = 1;
    let proxy = common::start_proxy(config).await;

    // First probe cycle runs immediately.
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(!proxy.registry.backends()[1].is_alive());

    common::start_programmable_backend_at(revived_addr, |_| async { (200, "revived".to_string()) }).await;

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !proxy.registry.backends()[1].is_alive() {
        assert!(tokio::time::Instant::now() < deadline, "backend was not restored by the monitor");
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    let client = common::client();
    let mut bodies = Vec::new();
    for _ in 0..4 {
        bodies.push(get_body(&client, proxy.addr).await.1);
    }
    assert!(bodies.iter().any(|b| b == "revived"), "{:?}", bodies);
    proxy.shutdown.trigger();
}

#[tokio::test]
async fn test_graceful_shutdown() {
    let backend = common::start_mock_backend("ok").await;
    let mut config = common::config_for(&[backend]);
    config.health_check.enabled = true;
    config.health_check.interval_secs = 60;
    let proxy = common::start_proxy(config).await;

    let (status, _) = get_body(&common::client(), proxy.addr).await;
    assert_eq!(status, StatusCode::OK);

    proxy.shutdown.trigger();
    let result = tokio::time::timeout(Duration::from_secs(5), proxy.handle)
        .await
        .expect("server did not stop")
        .unwrap();
    assert!(result.is_ok());
}
