#[cfg(feature = "cli")]
pub mod cli;
pub mod dashboard_config;
pub mod proxy;

#[cfg(feature = "cli")]
pub use cli::{CliConfig, Command, ExportArgs, MlAction};
pub use dashboard_config::DashboardConfig;
pub use proxy::{ProxyConfig, DEFAULT_BACKEND_ORIGIN};
