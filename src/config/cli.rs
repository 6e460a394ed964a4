use crate::app::client::DEFAULT_API_BASE_URL;
use crate::app::dashboard::{DashboardSection, ExportRequest};
use crate::config::dashboard_config::DashboardConfig;
use crate::domain::model::{ExportOptions, TimeFilter};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub const DEFAULT_OUTPUT_PATH: &str = "./exports";

#[derive(Debug, Clone, Parser)]
#[command(name = "mg-dashboard")]
#[command(about = "Headless analytics dashboard: fetch sections and export them to CSV")]
pub struct CliConfig {
    /// 分析後端 API 位址（含 /api/v1）
    #[arg(long, env = "MG_API_BASE_URL", global = true)]
    pub api_base_url: Option<String>,

    #[arg(long, env = "MG_API_TOKEN", global = true, hide_env_values = true)]
    pub auth_token: Option<String>,

    #[arg(long, global = true)]
    pub output_path: Option<String>,

    /// TOML 設定檔
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,

    #[arg(skip)]
    pub file: DashboardConfig,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Export one dashboard section to CSV
    Export(ExportArgs),
    /// List the exportable sections
    Sections,
    /// Load the overview page and print a summary
    Overview {
        #[arg(long, default_value = "7days")]
        filter: String,
    },
    /// Recommendation model operations
    Ml {
        #[arg(value_enum)]
        action: MlAction,
    },
    /// Show the A/B test variant assigned to a user
    Variant { user_id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MlAction {
    Status,
    Train,
    Precompute,
}

#[derive(Debug, Clone, Args)]
pub struct ExportArgs {
    /// Section name, see `sections`
    pub section: String,

    /// today, 7days, 30days, mtd, 90days, 6months, 1year, all or YYYY-MM-DD:YYYY-MM-DD
    #[arg(long, default_value = "7days")]
    pub filter: String,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long)]
    pub segment: Option<String>,

    #[arg(long)]
    pub product_id: Option<String>,

    #[arg(long)]
    pub user_id: Option<String>,

    #[arg(long)]
    pub city: Option<String>,
}

impl ExportArgs {
    pub fn to_request(&self) -> Result<ExportRequest> {
        let section: DashboardSection = self.section.parse()?;
        let mut request = ExportRequest::new(section, TimeFilter::parse(&self.filter));
        request.category = self.category.clone();
        request.segment = self.segment.clone();
        request.product_id = self.product_id.clone();
        request.user_id = self.user_id.clone();
        request.city = self.city.clone();
        Ok(request)
    }
}

impl CliConfig {
    /// 讀取 `--config` 指定的檔案；沒指定時不做事
    pub fn load_file(&mut self) -> Result<()> {
        if let Some(path) = &self.config {
            self.file = DashboardConfig::from_file(path)?;
            tracing::info!("📄 Using config file {}", path.display());
        }
        Ok(())
    }

    pub fn export_options(&self) -> Result<ExportOptions> {
        self.file.export_options()
    }
}

impl ConfigProvider for CliConfig {
    fn api_base_url(&self) -> &str {
        self.api_base_url
            .as_deref()
            .or(self.file.api.base_url.as_deref())
            .unwrap_or(DEFAULT_API_BASE_URL)
    }

    fn auth_token(&self) -> Option<&str> {
        self.auth_token
            .as_deref()
            .or(self.file.api.auth_token.as_deref())
    }

    fn output_path(&self) -> &str {
        self.output_path
            .as_deref()
            .or(self.file.export.output_path.as_deref())
            .unwrap_or(DEFAULT_OUTPUT_PATH)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        use crate::utils::validation::*;

        // 驗證API位址
        validate_url("api_base_url", self.api_base_url())?;

        // 驗證輸出路徑
        validate_path("output_path", self.output_path())?;

        self.file.validate()?;

        if let Command::Export(args) = &self.command {
            args.to_request()?;
        }

        tracing::info!("✅ CLI configuration validation passed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliConfig {
        CliConfig::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_export_command() {
        let config = parse(&[
            "mg-dashboard",
            "export",
            "top-products",
            "--filter",
            "30days",
            "--category",
            "Beverages",
            "--api-base-url",
            "https://analytics.example.com/api/v1",
        ]);

        assert_eq!(config.api_base_url(), "https://analytics.example.com/api/v1");
        let Command::Export(args) = &config.command else {
            panic!("expected export command");
        };
        let request = args.to_request().unwrap();
        assert_eq!(request.section, DashboardSection::TopProducts);
        assert_eq!(request.filter, TimeFilter::Last30Days);
        assert_eq!(request.category.as_deref(), Some("Beverages"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_flags_override_file() {
        let mut config = parse(&["mg-dashboard", "--output-path", "./cli-out", "sections"]);
        config.file = DashboardConfig::from_toml_str(
            "[api]\nbase_url = \"https://file.example.com/api/v1\"\n[export]\noutput_path = \"./file-out\"\n",
        )
        .unwrap();

        assert_eq!(config.output_path(), "./cli-out");
        assert_eq!(config.api_base_url(), "https://file.example.com/api/v1");
    }

    #[test]
    fn test_unknown_section_fails_validation() {
        let config = parse(&[
            "mg-dashboard",
            "export",
            "weather",
            "--api-base-url",
            "http://localhost:8001/api/v1",
        ]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_ml_action() {
        let config = parse(&["mg-dashboard", "ml", "train"]);
        assert!(matches!(
            config.command,
            Command::Ml {
                action: MlAction::Train
            }
        ));
    }
}
