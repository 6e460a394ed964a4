use crate::utils::error::{DashboardError, Result};
use crate::utils::validation::Validate;
use std::env;

/// 未設定 `BACKEND_ORIGIN` 時使用的後端
pub const DEFAULT_BACKEND_ORIGIN: &str = "http://localhost:8001";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    pub backend_origin: String,
    /// 來源請求沒帶 `X-Forwarded-Proto` 時補上的值
    pub forwarded_proto: String,
}

impl ProxyConfig {
    pub fn new(backend_origin: impl Into<String>) -> Self {
        Self {
            backend_origin: backend_origin.into().trim_end_matches('/').to_string(),
            forwarded_proto: "https".to_string(),
        }
    }

    pub fn from_env() -> Result<Self> {
        let origin = env::var("BACKEND_ORIGIN")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BACKEND_ORIGIN.to_string());

        let mut config = Self::new(origin);
        if let Ok(proto) = env::var("FORWARDED_PROTO") {
            if !matches!(proto.as_str(), "http" | "https") {
                return Err(DashboardError::InvalidConfigValueError {
                    field: "FORWARDED_PROTO".to_string(),
                    value: proto,
                    reason: "Must be http or https".to_string(),
                });
            }
            config.forwarded_proto = proto;
        }
        Ok(config)
    }

    /// 後端 origin + 原始路徑 + 原樣的 query string
    pub fn target_url(&self, path: &str, query: Option<&str>) -> String {
        match query.filter(|q| !q.is_empty()) {
            Some(query) => format!("{}{}?{}", self.backend_origin, path, query),
            None => format!("{}{}", self.backend_origin, path),
        }
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BACKEND_ORIGIN)
    }
}

impl Validate for ProxyConfig {
    fn validate(&self) -> Result<()> {
        use crate::utils::validation::*;

        validate_origin("backend_origin", &self.backend_origin)?;

        tracing::info!("✅ Proxy configuration validation passed");
        Ok(())
    }
}
