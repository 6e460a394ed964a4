//! API Gateway（REST, payload v1）事件與 [`ProxyRequest`]/[`ProxyResponse`] 之間的轉換

use crate::core::proxy::{ProxyRequest, ProxyResponse};
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::collections::HashMap;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayEvent {
    #[serde(default)]
    pub http_method: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub query_string_parameters: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub is_base64_encoded: bool,
    #[serde(default)]
    pub request_context: Option<RequestContext>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestContext {
    #[serde(default)]
    pub identity: Option<Identity>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    #[serde(default)]
    pub source_ip: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    /// 重複出現的標頭（例如 `set-cookie`）
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub multi_value_headers: HashMap<String, Vec<String>>,
    pub body: String,
    pub is_base64_encoded: bool,
}

impl GatewayEvent {
    /// Gateway 已把 query string 拆成 map，這裡重新編碼回去
    pub fn query_string(&self) -> Option<String> {
        let params = self.query_string_parameters.as_ref()?;
        if params.is_empty() {
            return None;
        }
        let encoded = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params.iter())
            .finish();
        Some(encoded)
    }

    /// 轉成 [`ProxyRequest`]；body 無法解碼時直接回 400
    pub fn into_proxy_request(self) -> Result<ProxyRequest, ProxyResponse> {
        let query = self.query_string();
        let client_ip = self
            .request_context
            .and_then(|ctx| ctx.identity)
            .and_then(|identity| identity.source_ip);

        let body = match self.body {
            Some(encoded) if self.is_base64_encoded => Some(decode_body(&encoded)?),
            body => body,
        };

        Ok(ProxyRequest {
            method: if self.http_method.is_empty() {
                "GET".to_string()
            } else {
                self.http_method
            },
            path: self.path,
            query,
            headers: self.headers.unwrap_or_default().into_iter().collect(),
            body,
            client_ip,
        })
    }
}

fn decode_body(encoded: &str) -> Result<String, ProxyResponse> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| {
            tracing::warn!("⚠️ Rejecting request with invalid base64 body: {}", e);
            ProxyResponse::json(400, json!({ "error": "Invalid base64 body" }))
        })?;
    String::from_utf8(bytes).map_err(|_| {
        tracing::warn!("⚠️ Rejecting request with binary body");
        ProxyResponse::json(400, json!({ "error": "Binary request bodies are not supported" }))
    })
}

impl From<ProxyResponse> for GatewayResponse {
    fn from(response: ProxyResponse) -> Self {
        let mut grouped: Vec<(String, Vec<String>)> = Vec::new();
        for (name, value) in response.headers {
            match grouped.iter_mut().find(|(key, _)| key.eq_ignore_ascii_case(&name)) {
                Some((_, values)) => values.push(value),
                None => grouped.push((name, vec![value])),
            }
        }

        let mut headers = HashMap::new();
        let mut multi_value_headers = HashMap::new();
        for (name, mut values) in grouped {
            if values.len() == 1 {
                headers.insert(name, values.remove(0));
            } else {
                multi_value_headers.insert(name, values);
            }
        }

        Self {
            status_code: response.status,
            headers,
            multi_value_headers,
            body: response.body,
            is_base64_encoded: false,
        }
    }
}
