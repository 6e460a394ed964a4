//! 無狀態的 API 轉發：`/api/*` 與 `/health` 原樣送到固定的後端 origin
//!
//! 不重試、不設逾時（沿用 reqwest 預設）、不做斷路。後端連不上時回 502 與
//! 一段 JSON 診斷訊息。

use crate::config::proxy::ProxyConfig;
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::{Client, Method};
use serde_json::json;

/// 轉發前移除的請求標頭
const STRIPPED_REQUEST_HEADERS: [&str; 2] = ["host", "content-length"];

/// 回傳時不轉送的 hop-by-hop 標頭
const STRIPPED_RESPONSE_HEADERS: [&str; 3] = ["transfer-encoding", "connection", "content-length"];

pub const CORS_HEADERS: [(&str, &str); 3] = [
    ("access-control-allow-origin", "*"),
    (
        "access-control-allow-methods",
        "GET, POST, PUT, PATCH, DELETE, OPTIONS",
    ),
    (
        "access-control-allow-headers",
        "Content-Type, Authorization, X-Requested-With",
    ),
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyRequest {
    pub method: String,
    pub path: String,
    /// 原始 query string，不含 `?`
    pub query: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub client_ip: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl ProxyRequest {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

impl ProxyResponse {
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        let mut response = Self {
            status,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: body.to_string(),
        };
        response.apply_cors();
        response
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// 覆蓋後端自己給的 CORS 標頭
    fn apply_cors(&mut self) {
        self.headers
            .retain(|(name, _)| !CORS_HEADERS.iter().any(|(cors, _)| name.eq_ignore_ascii_case(cors)));
        for (name, value) in CORS_HEADERS {
            self.headers.push((name.to_string(), value.to_string()));
        }
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

pub fn is_proxied_path(path: &str) -> bool {
    path == "/health" || path.starts_with("/api/")
}

pub struct EdgeProxy {
    client: Client,
    config: ProxyConfig,
}

impl EdgeProxy {
    pub fn new(config: ProxyConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// 轉發單一請求；任何失敗都轉成 HTTP 回應，不會回傳錯誤
    pub async fn forward(&self, request: ProxyRequest) -> ProxyResponse {
        if !is_proxied_path(&request.path) {
            tracing::debug!("Rejecting non-API path {}", request.path);
            return ProxyResponse::json(404, json!({ "error": "Not found", "path": request.path }));
        }

        let method = match Method::from_bytes(request.method.to_ascii_uppercase().as_bytes()) {
            Ok(method) => method,
            Err(_) => {
                return ProxyResponse::json(
                    405,
                    json!({ "error": "Unsupported method", "method": request.method }),
                )
            }
        };

        let target = self
            .config
            .target_url(&request.path, request.query.as_deref());
        tracing::info!("➡️ {} {}", method, target);

        let mut builder = self.client.request(method.clone(), &target);
        let mut forwarded_for = None;

        for (name, value) in &request.headers {
            let lower = name.to_ascii_lowercase();
            if STRIPPED_REQUEST_HEADERS.contains(&lower.as_str()) {
                continue;
            }
            if lower == "x-forwarded-for" {
                forwarded_for = Some(value.clone());
                continue;
            }
            // 由下方統一設定，避免重複
            if lower == "x-forwarded-proto" {
                continue;
            }
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => builder = builder.header(name, value),
                _ => tracing::debug!("Dropping invalid header {}", name),
            }
        }

        let client_ip = request.client_ip.as_deref().unwrap_or("unknown");
        let forwarded_for = match forwarded_for {
            Some(chain) => format!("{}, {}", chain, client_ip),
            None => client_ip.to_string(),
        };
        let forwarded_proto = request
            .header("x-forwarded-proto")
            .unwrap_or(&self.config.forwarded_proto)
            .to_string();

        builder = builder
            .header("x-forwarded-for", forwarded_for)
            .header("x-forwarded-proto", forwarded_proto);

        if method != Method::GET && method != Method::HEAD {
            if let Some(body) = request.body {
                builder = builder.body(body);
            }
        }

        match builder.send().await {
            Ok(response) => self.relay(response, &target).await,
            Err(e) => self.backend_unreachable(&target, &e),
        }
    }

    async fn relay(&self, response: reqwest::Response, target: &str) -> ProxyResponse {
        let status = response.status().as_u16();
        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .filter(|(name, _)| !STRIPPED_RESPONSE_HEADERS.contains(&name.as_str()))
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        match response.text().await {
            Ok(body) => {
                tracing::info!("⬅️ {} from {}", status, target);
                let mut relayed = ProxyResponse {
                    status,
                    headers,
                    body,
                };
                relayed.apply_cors();
                relayed
            }
            Err(e) => self.backend_unreachable(target, &e),
        }
    }

    fn backend_unreachable(&self, target: &str, error: &reqwest::Error) -> ProxyResponse {
        tracing::error!("❌ Backend request to {} failed: {}", target, error);
        ProxyResponse::json(
            502,
            json!({
                "error": "Backend unreachable",
                "message": error.to_string(),
                "backend_url": target,
            }),
        )
    }
}
