use crate::domain::model::ExportOptions;
use crate::utils::error::{DashboardError, Result};
use crate::utils::validation::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var regex"));

/// `--config` 指到的 TOML 檔；命令列參數優先於檔案
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub export: ExportSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiSection {
    pub base_url: Option<String>,
    pub auth_token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportSection {
    pub output_path: Option<String>,
    pub include_timestamp: Option<bool>,
    pub currency: Option<String>,
    pub delimiter: Option<String>,
}

impl DashboardConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        tracing::debug!("Loaded config file {}", path.as_ref().display());
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置，先替換 `${VAR}`
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content);
        Ok(toml::from_str(&processed)?)
    }

    /// 沒設定的環境變數保持原樣，交給驗證報錯
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    fn delimiter(&self) -> Result<Option<u8>> {
        let Some(raw) = self.export.delimiter.as_deref() else {
            return Ok(None);
        };
        let delimiter = match raw {
            "\\t" | "tab" => b'\t',
            s if s.len() == 1 => s.as_bytes()[0],
            other => {
                return Err(DashboardError::InvalidConfigValueError {
                    field: "export.delimiter".to_string(),
                    value: other.to_string(),
                    reason: "Delimiter must be a single ASCII character".to_string(),
                })
            }
        };
        Ok(Some(delimiter))
    }

    /// 套用 `[export]` 的設定到預設匯出選項
    pub fn export_options(&self) -> Result<ExportOptions> {
        let mut options = ExportOptions::default();
        if let Some(include) = self.export.include_timestamp {
            options = options.with_timestamp(include);
        }
        if let Some(currency) = &self.export.currency {
            options = options.with_currency(currency.clone());
        }
        if let Some(delimiter) = self.delimiter()? {
            options = options.with_delimiter(delimiter);
        }
        Ok(options)
    }
}

impl Validate for DashboardConfig {
    fn validate(&self) -> Result<()> {
        use crate::utils::validation::*;

        if let Some(base_url) = &self.api.base_url {
            validate_url("api.base_url", base_url)?;
        }
        if let Some(path) = &self.export.output_path {
            validate_path("export.output_path", path)?;
        }
        if let Some(currency) = &self.export.currency {
            validate_non_empty_string("export.currency", currency)?;
        }
        if let Some(delimiter) = self.delimiter()? {
            validate_delimiter("export.delimiter", delimiter)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let config = DashboardConfig::from_toml_str(
            r#"
[api]
base_url = "https://analytics.example.com/api/v1"
auth_token = "abc"

[export]
output_path = "./reports"
include_timestamp = false
currency = "USD"
delimiter = ";"
"#,
        )
        .unwrap();

        assert_eq!(config.api.auth_token.as_deref(), Some("abc"));
        assert!(config.validate().is_ok());

        let options = config.export_options().unwrap();
        assert!(!options.include_timestamp);
        assert_eq!(options.currency, "USD");
        assert_eq!(options.delimiter, b';');
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = DashboardConfig::from_toml_str("").unwrap();
        assert!(config.api.base_url.is_none());
        let options = config.export_options().unwrap();
        assert!(options.include_timestamp);
        assert_eq!(options.currency, "PKR");
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("MG_DASHBOARD_TEST_TOKEN", "from-env");
        let config = DashboardConfig::from_toml_str(
            r#"
[api]
auth_token = "${MG_DASHBOARD_TEST_TOKEN}"
base_url = "${MG_DASHBOARD_TEST_UNSET_URL}"
"#,
        )
        .unwrap();

        assert_eq!(config.api.auth_token.as_deref(), Some("from-env"));
        assert_eq!(
            config.api.base_url.as_deref(),
            Some("${MG_DASHBOARD_TEST_UNSET_URL}")
        );
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_delimiter() {
        let config = DashboardConfig::from_toml_str("[export]\ndelimiter = \"||\"\n").unwrap();
        assert!(config.export_options().is_err());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[export]\noutput_path = \"./out\"\n")
            .unwrap();

        let config = DashboardConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.export.output_path.as_deref(), Some("./out"));
    }

    #[test]
    fn test_proxy_table_is_not_read() {
        // 代理只看環境變數，檔案裡的 [proxy] 不影響驗證
        let config = DashboardConfig::from_toml_str(
            "[proxy]\nbackend_origin = \"not a url\"\n[export]\ncurrency = \"USD\"\n",
        )
        .unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.export_options().unwrap().currency, "USD");
    }

    #[test]
    fn test_malformed_toml_is_reported() {
        let err = DashboardConfig::from_toml_str("[api\nbase_url = 1").unwrap_err();
        assert!(matches!(err, DashboardError::TomlError(_)));
    }
}
