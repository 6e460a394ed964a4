pub mod client;
pub mod dashboard;

pub use client::{BackendClient, DEFAULT_API_BASE_URL};
pub use dashboard::{DashboardSection, DashboardSnapshot, DashboardView, ExportRequest};
