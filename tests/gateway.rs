//! Full-stack gateway contract tests: envelopes, admission, CORS headers.

use std::net::SocketAddr;

use axum::http::StatusCode;
use cors_gateway::{GatewayConfig, HttpServer, Shutdown};

/// Bind the gateway on an ephemeral port and serve it in the background.
async fn start_gateway(mut config: GatewayConfig) -> (SocketAddr, Shutdown) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    config.listener.bind_address = addr.to_string();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config).expect("gateway init");
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    (addr, shutdown)
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_missing_url_parameter_returns_400() {
    let (addr, shutdown) = start_gateway(GatewayConfig::default()).await;
    let client = client();

    for uri in [format!("http://{addr}/url"), format!("http://{addr}/url?url=")] {
        let res = client.get(&uri).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            res.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );
        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!(body["error"], "Missing \"url\" parameter");
    }

    shutdown.trigger();
}

#[tokio::test]
async fn test_invalid_target_returns_400() {
    let (addr, shutdown) = start_gateway(GatewayConfig::default()).await;
    let client = client();

    for raw in ["notaurl", "ftp://example.com", "http://intranet"] {
        let res = client
            .get(format!("http://{addr}/url?url={raw}"))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{raw}");
        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!(
            body["error"],
            "Invalid URL. Must include valid http/https protocol and host."
        );
    }

    shutdown.trigger();
}

#[tokio::test]
async fn test_blocked_hosts_surface_as_invalid_url() {
    let (addr, shutdown) = start_gateway(GatewayConfig::default()).await;
    let client = client();

    // The SSRF denial is deliberately indistinguishable from a malformed URL.
    for raw in [
        "http://localhost/admin",
        "http://127.0.0.1:8080/secrets",
        "http://192.168.1.1/router",
        "http://0.0.0.0/",
    ] {
        let res = client
            .get(format!("http://{addr}/url?url={raw}"))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{raw}");
        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!(
            body["error"],
            "Invalid URL. Must include valid http/https protocol and host."
        );
    }

    shutdown.trigger();
}

#[tokio::test]
async fn test_rate_limit_returns_429_with_envelope() {
    let mut config = GatewayConfig::default();
    config.rate_limit.max_requests = 2;
    let (addr, shutdown) = start_gateway(config).await;
    let client = client();

    let uri = format!("http://{addr}/url");
    for _ in 0..2 {
        let res = client.get(&uri).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    for _ in 0..2 {
        let res = client.get(&uri).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            res.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );
        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!(
            body["error"],
            "Too many requests from this IP, please try again later."
        );
    }

    shutdown.trigger();
}

#[tokio::test]
async fn test_rate_limiting_can_be_disabled() {
    let mut config = GatewayConfig::default();
    config.rate_limit.enabled = false;
    config.rate_limit.max_requests = 1;
    let (addr, shutdown) = start_gateway(config).await;
    let client = client();

    for _ in 0..5 {
        let res = client.get(format!("http://{addr}/url")).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    shutdown.trigger();
}

#[tokio::test]
async fn test_unresolvable_target_returns_500_envelope() {
    let (addr, shutdown) = start_gateway(GatewayConfig::default()).await;
    let client = client();

    // Passes validation (dotted host, http scheme) but can never resolve:
    // .invalid is reserved.
    let res = client
        .get(format!("http://{addr}/url?url=http://nonexistent-host.invalid/"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Proxy error occurred");
    let details = body["details"].as_str().unwrap();
    assert!(!details.is_empty());

    shutdown.trigger();
}

#[tokio::test]
async fn test_configured_origin_used_in_responses() {
    let mut config = GatewayConfig::default();
    config.cors.allowed_origins = vec![
        "https://app.example.com".to_string(),
        "https://second.example.com".to_string(),
    ];
    let (addr, shutdown) = start_gateway(config).await;
    let client = client();

    let res = client.get(format!("http://{addr}/url")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        res.headers().get("access-control-allow-origin").unwrap(),
        "https://app.example.com"
    );

    shutdown.trigger();
}

#[tokio::test]
async fn test_preflight_handled_by_cors_layer() {
    let (addr, shutdown) = start_gateway(GatewayConfig::default()).await;
    let client = client();

    let res = client
        .request(reqwest::Method::OPTIONS, format!("http://{addr}/url"))
        .header("Origin", "https://somewhere.example.com")
        .header("Access-Control-Request-Method", "GET")
        .send()
        .await
        .unwrap();

    assert!(res.status().is_success());
    assert_eq!(
        res.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );

    shutdown.trigger();
}
