use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// 一列匯出資料：欄位名稱 → 值，保留插入順序
pub type ExportRow = serde_json::Map<String, serde_json::Value>;

/// 欄位自訂格式化函式
pub type CellFormatter = Arc<dyn Fn(&serde_json::Value) -> String + Send + Sync>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeFilter {
    Today,
    #[default]
    Last7Days,
    Last30Days,
    MonthToDate,
    Last90Days,
    Last6Months,
    LastYear,
    AllTime,
    Custom { start: NaiveDate, end: NaiveDate },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub label: String,
}

/// 明確的欄位型別標記，優先於欄位名稱推測
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Currency,
    Number,
    Date,
    Text,
}

#[derive(Clone)]
pub struct ExportOptions {
    pub filename: String,
    pub headers: Option<Vec<String>>,
    pub delimiter: u8,
    pub include_timestamp: bool,
    pub format_currency: bool,
    pub format_numbers: bool,
    pub currency: String,
    pub custom_formatters: HashMap<String, CellFormatter>,
    pub column_kinds: HashMap<String, ColumnKind>,
}

impl ExportOptions {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            ..Self::default()
        }
    }

    pub fn with_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.headers = Some(headers.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_timestamp(mut self, include_timestamp: bool) -> Self {
        self.include_timestamp = include_timestamp;
        self
    }

    pub fn with_currency_formatting(mut self, enabled: bool) -> Self {
        self.format_currency = enabled;
        self
    }

    pub fn with_number_formatting(mut self, enabled: bool) -> Self {
        self.format_numbers = enabled;
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn with_formatter<F>(mut self, column: impl Into<String>, formatter: F) -> Self
    where
        F: Fn(&serde_json::Value) -> String + Send + Sync + 'static,
    {
        self.custom_formatters
            .insert(column.into(), Arc::new(formatter));
        self
    }

    pub fn with_column_kind(mut self, column: impl Into<String>, kind: ColumnKind) -> Self {
        self.column_kinds.insert(column.into(), kind);
        self
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            filename: "export".to_string(),
            headers: None,
            delimiter: b',',
            include_timestamp: true,
            format_currency: true,
            format_numbers: true,
            currency: "PKR".to_string(),
            custom_formatters: HashMap::new(),
            column_kinds: HashMap::new(),
        }
    }
}

impl fmt::Debug for ExportOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut formatter_columns: Vec<&String> = self.custom_formatters.keys().collect();
        formatter_columns.sort();

        f.debug_struct("ExportOptions")
            .field("filename", &self.filename)
            .field("headers", &self.headers)
            .field("delimiter", &(self.delimiter as char))
            .field("include_timestamp", &self.include_timestamp)
            .field("format_currency", &self.format_currency)
            .field("format_numbers", &self.format_numbers)
            .field("currency", &self.currency)
            .field("custom_formatters", &formatter_columns)
            .field("column_kinds", &self.column_kinds)
            .finish()
    }
}
