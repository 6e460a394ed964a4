pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::storage::{LocalFileSaver, MemoryFileSaver};
pub use app::{BackendClient, DashboardSection, DashboardView, ExportRequest};
pub use config::ProxyConfig;
pub use core::csv_export::CsvExporter;
pub use core::exports::DashboardExporter;
pub use core::proxy::{EdgeProxy, ProxyRequest, ProxyResponse};
pub use utils::error::{DashboardError, Result};
