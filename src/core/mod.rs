pub mod csv_export;
pub mod date_range;
pub mod exports;
pub mod format;
pub mod proxy;

pub use crate::domain::model::{DateRange, ExportOptions, ExportRow, TimeFilter};
pub use crate::domain::ports::{AnalyticsApi, ConfigProvider, FileSaver};
pub use crate::utils::error::Result;
