use httpmock::prelude::*;
use mg_dashboard::adapters::gateway::{GatewayEvent, GatewayResponse};
use mg_dashboard::{EdgeProxy, ProxyConfig, ProxyRequest};
use serde_json::json;

fn request_with_headers(method: &str, path: &str, headers: &[(&str, &str)]) -> ProxyRequest {
    let mut request = ProxyRequest::new(method, path);
    request.headers = headers
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    request
}

#[tokio::test]
async fn test_forwards_headers_query_and_client_ip() {
    let server = MockServer::start();
    let backend = server.mock(|when, then| {
        when.method(GET)
            .path("/api/v1/analytics/top-products")
            .query_param("limit", "10")
            .header("authorization", "Bearer abc")
            .header("x-forwarded-for", "203.0.113.9")
            .header("x-forwarded-proto", "https")
            .body("");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!([{"product_name": "Rice"}]));
    });

    let proxy = EdgeProxy::new(ProxyConfig::new(server.base_url()));
    let mut request = request_with_headers(
        "GET",
        "/api/v1/analytics/top-products",
        &[
            ("Authorization", "Bearer abc"),
            ("Host", "dashboard.example.com"),
            ("Content-Length", "7"),
        ],
    );
    request.query = Some("limit=10".to_string());
    request.client_ip = Some("203.0.113.9".to_string());
    request.body = Some("ignored".to_string());

    let response = proxy.forward(request).await;

    backend.assert();
    assert_eq!(response.status, 200);
    assert_eq!(response.header("content-type"), Some("application/json"));
    assert_eq!(response.header("content-length"), None);
    assert_eq!(response.header("access-control-allow-origin"), Some("*"));
}

#[tokio::test]
async fn test_post_body_and_incoming_proto_are_kept() {
    let server = MockServer::start();
    let backend = server.mock(|when, then| {
        when.method(POST)
            .path("/api/v1/ml/train")
            .header("x-forwarded-for", "unknown")
            .header("x-forwarded-proto", "http")
            .body(r#"{"force":true}"#);
        then.status(202).body(r#"{"status":"training"}"#);
    });

    let proxy = EdgeProxy::new(ProxyConfig::new(server.base_url()));
    let mut request = request_with_headers("POST", "/api/v1/ml/train", &[("X-Forwarded-Proto", "http")]);
    request.body = Some(r#"{"force":true}"#.to_string());

    let response = proxy.forward(request).await;

    backend.assert();
    assert_eq!(response.status, 202);
    assert_eq!(response.body, r#"{"status":"training"}"#);
}

#[tokio::test]
async fn test_backend_errors_are_relayed_not_rewritten() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/health");
        then.status(503).body("maintenance");
    });

    let proxy = EdgeProxy::new(ProxyConfig::new(server.base_url()));
    let response = proxy.forward(ProxyRequest::new("GET", "/health")).await;

    assert_eq!(response.status, 503);
    assert_eq!(response.body, "maintenance");
}

#[tokio::test]
async fn test_gateway_event_round_trip() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path("/api/v1/cities")
            .query_param("start_date", "2024-01-01");
        then.status(200).json_body(json!([]));
    });

    let event: GatewayEvent = serde_json::from_value(json!({
        "httpMethod": "GET",
        "path": "/api/v1/cities",
        "queryStringParameters": {"start_date": "2024-01-01"},
        "headers": {"Accept": "application/json"},
        "requestContext": {"identity": {"sourceIp": "198.51.100.4"}}
    }))
    .unwrap();

    let proxy = EdgeProxy::new(ProxyConfig::new(server.base_url()));
    let response = GatewayResponse::from(proxy.forward(event.into_proxy_request().unwrap()).await);

    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(value["statusCode"], 200);
    assert_eq!(value["body"], "[]");
}

#[tokio::test]
async fn test_unknown_path_and_unreachable_backend() {
    let proxy = EdgeProxy::new(ProxyConfig::new("http://127.0.0.1:1"));

    let not_found = proxy.forward(ProxyRequest::new("GET", "/")).await;
    assert_eq!(not_found.status, 404);
    let body: serde_json::Value = serde_json::from_str(&not_found.body).unwrap();
    assert_eq!(body, json!({"error": "Not found", "path": "/"}));

    let unreachable = proxy.forward(ProxyRequest::new("GET", "/api/v1/users")).await;
    assert_eq!(unreachable.status, 502);
    let body: serde_json::Value = serde_json::from_str(&unreachable.body).unwrap();
    assert_eq!(body["error"], "Backend unreachable");
    assert!(body["message"].as_str().is_some());
}
