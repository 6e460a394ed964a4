use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("API returned status {status} for {url}")]
    ApiStatus { status: u16, url: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Config file parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("No {section} data to export")]
    NoData { section: String },

    #[error("Operation cancelled")]
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Export,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl DashboardError {
    pub fn no_data(section: impl Into<String>) -> Self {
        Self::NoData {
            section: section.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ApiError(_) | Self::ApiStatus { .. } => ErrorCategory::Network,
            Self::CsvError(_) | Self::NoData { .. } | Self::SerializationError(_) => {
                ErrorCategory::Export
            }
            Self::TomlError(_)
            | Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            Self::IoError(_) | Self::Cancelled => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Cancelled => ErrorSeverity::Low,
            // 空資料只是沒東西可匯出
            Self::NoData { .. } => ErrorSeverity::Low,
            Self::ApiError(_) | Self::ApiStatus { .. } => ErrorSeverity::Medium,
            Self::CsvError(_)
            | Self::SerializationError(_)
            | Self::TomlError(_)
            | Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorSeverity::High,
            Self::IoError(_) => ErrorSeverity::Critical,
        }
    }

    /// CLI 退出碼；明確要求的匯出沒寫出檔案也算失敗
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Cancelled => 130,
            Self::NoData { .. } => 4,
            _ => match self.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            },
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ApiError(_) | Self::ApiStatus { .. } => {
                "無法連線到分析後端服務".to_string()
            }
            Self::NoData { section } => format!("沒有可匯出的 {} 資料", section),
            Self::Cancelled => "操作已取消".to_string(),
            Self::IoError(e) => format!("檔案寫入失敗: {}", e),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check --api-base-url and that the backend is reachable",
            ErrorCategory::Export => "Pick a wider time filter or another section",
            ErrorCategory::Configuration => "Review the CLI flags and the TOML config file",
            ErrorCategory::System => "Check the output directory permissions and free space",
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
