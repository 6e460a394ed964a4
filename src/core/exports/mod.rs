//! 各儀表板區塊的匯出轉接
//!
//! 每個匯出函式先驗證輸入（`None` 或空集合直接回傳 [`DashboardError::NoData`]），
//! 再把領域資料轉成人看得懂的欄位名稱，最後交給 [`CsvExporter`]。
//! 引擎本身遇到空輸入只是略過，這裡刻意比較嚴格，讓呼叫端能提示使用者。

mod collaborative;
mod customers;
mod geography;
mod products;
mod table;
mod trends;

pub use collaborative::CollaborativeExportSet;

use crate::core::csv_export::CsvExporter;
use crate::domain::model::{ExportOptions, ExportRow};
use crate::domain::ports::FileSaver;
use crate::utils::error::{DashboardError, Result};
use serde_json::Value;
use std::time::Duration;

/// 連續下載之間的間隔，避免瀏覽器擋掉多檔下載
pub const BATCH_EXPORT_DELAY: Duration = Duration::from_millis(500);

pub struct DashboardExporter<S: FileSaver> {
    engine: CsvExporter<S>,
    defaults: ExportOptions,
    batch_delay: Duration,
}

impl<S: FileSaver> DashboardExporter<S> {
    pub fn new(engine: CsvExporter<S>) -> Self {
        Self {
            engine,
            defaults: ExportOptions::default(),
            batch_delay: BATCH_EXPORT_DELAY,
        }
    }

    /// 共用設定（幣別、時間戳記、分隔符號），檔名由各匯出函式決定
    pub fn with_defaults(mut self, defaults: ExportOptions) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_batch_delay(mut self, delay: Duration) -> Self {
        self.batch_delay = delay;
        self
    }

    fn options(&self, filename: String) -> ExportOptions {
        let mut options = self.defaults.clone();
        options.filename = filename;
        options
    }

    async fn save(&self, section: &str, rows: Vec<ExportRow>, options: ExportOptions) -> Result<String> {
        self.engine
            .download(&rows, &options)
            .await?
            .ok_or_else(|| DashboardError::no_data(section))
    }
}

/// `None` 與空集合都視為沒有資料
pub(crate) fn require_records<'a, T>(records: Option<&'a [T]>, section: &str) -> Result<&'a [T]> {
    match records {
        Some(items) if !items.is_empty() => Ok(items),
        _ => {
            tracing::warn!("⚠️ Export of {} requested without data", section);
            Err(DashboardError::no_data(section))
        }
    }
}

pub(crate) fn into_row(value: Value) -> ExportRow {
    match value {
        Value::Object(map) => map,
        other => {
            let mut row = ExportRow::new();
            row.insert("Value".to_string(), other);
            row
        }
    }
}

/// 組出 `{base}[_context...]`，context 轉成小寫底線格式
pub(crate) fn export_name(base: &str, context: &[Option<&str>]) -> String {
    let mut name = base.to_string();
    for part in context.iter().flatten() {
        let slug = slugify(part);
        if !slug.is_empty() {
            name.push('_');
            name.push_str(&slug);
        }
    }
    name
}

fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for ch in text.trim().chars() {
        if ch.is_alphanumeric() || ch == '-' {
            slug.extend(ch.to_lowercase());
        } else if !slug.ends_with('_') {
            slug.push('_');
        }
    }
    slug.trim_matches('_').to_string()
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::adapters::storage::MemoryFileSaver;
    use chrono::NaiveDate;

    pub fn fixed_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 8).unwrap()
    }

    pub fn memory_exporter() -> (DashboardExporter<MemoryFileSaver>, MemoryFileSaver) {
        let saver = MemoryFileSaver::new();
        let exporter = DashboardExporter::new(CsvExporter::with_clock(saver.clone(), fixed_day))
            .with_batch_delay(Duration::from_millis(1));
        (exporter, saver)
    }

    pub fn parse_csv(text: &str) -> (Vec<String>, Vec<Vec<String>>) {
        let mut reader = csv::Reader::from_reader(text.as_bytes());
        let headers = reader
            .headers()
            .unwrap()
            .iter()
            .map(str::to_string)
            .collect();
        let rows = reader
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect();
        (headers, rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_name_slugifies_context() {
        assert_eq!(export_name("top_products", &[None, Some("30days")]), "top_products_30days");
        assert_eq!(
            export_name("top_products", &[Some("Home & Kitchen"), Some("7days")]),
            "top_products_home_kitchen_7days"
        );
        assert_eq!(export_name("rfm_segments", &[Some("  ")]), "rfm_segments");
    }

    #[test]
    fn test_require_records() {
        let items = vec![1, 2];
        assert!(require_records(Some(items.as_slice()), "numbers").is_ok());
        assert!(require_records::<i32>(Some(&[][..]), "numbers").is_err());
        assert!(matches!(
            require_records::<i32>(None, "numbers"),
            Err(DashboardError::NoData { .. })
        ));
    }
}
