use crate::core::format::{format_display_date, format_with_separators, leading_iso_date};
use crate::domain::model::{ColumnKind, ExportOptions, ExportRow};
use crate::domain::ports::FileSaver;
use crate::utils::error::{DashboardError, Result};
use chrono::NaiveDate;
use serde_json::Value;

pub const CSV_CONTENT_TYPE: &str = "text/csv;charset=utf-8";

const CURRENCY_HINTS: [&str; 4] = ["revenue", "price", "value", "amount"];
const PLAIN_NUMBER_HINTS: [&str; 2] = ["id", "score"];

/// 明確 headers 優先，否則依列的順序收集第一次出現的欄位
pub fn resolve_columns(rows: &[ExportRow], options: &ExportOptions) -> Vec<String> {
    if let Some(headers) = &options.headers {
        return headers.clone();
    }

    let mut columns: Vec<String> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.clone());
            }
        }
    }
    columns
}

/// 把列轉成 CSV 文字，空輸入回傳空字串
pub fn to_csv(rows: &[ExportRow], options: &ExportOptions) -> Result<String> {
    if rows.is_empty() {
        return Ok(String::new());
    }

    let columns = resolve_columns(rows, options);

    let mut writer = csv::WriterBuilder::new()
        .delimiter(options.delimiter)
        .quote_style(csv::QuoteStyle::Necessary)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(&columns)?;
    // csv 會把單一空欄位寫成 `""`，記下位置之後改回空字串
    let mut lone_empty_fields = Vec::new();
    for row in rows {
        let record: Vec<String> = columns
            .iter()
            .map(|column| format_cell(column, row.get(column), options))
            .collect();
        if record.len() == 1 && record[0].is_empty() {
            writer.flush()?;
            lone_empty_fields.push(writer.get_ref().len());
        }
        writer.write_record(&record)?;
    }

    let mut bytes = writer
        .into_inner()
        .map_err(|e| DashboardError::IoError(e.into_error()))?;
    for start in lone_empty_fields.into_iter().rev() {
        if bytes.get(start..start + 2) == Some(b"\"\"".as_slice()) {
            bytes.drain(start..start + 2);
        }
    }
    let mut text = String::from_utf8(bytes).map_err(|e| {
        DashboardError::IoError(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    })?;

    // 列之間用 \n 分隔，最後一列不帶換行
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}

/// 單一欄位的格式化，依優先順序套用
pub fn format_cell(column: &str, value: Option<&Value>, options: &ExportOptions) -> String {
    let value = value.unwrap_or(&Value::Null);

    if let Some(formatter) = options.custom_formatters.get(column) {
        return formatter(value);
    }

    if value.is_null() {
        return String::new();
    }

    if let Some(kind) = options.column_kinds.get(column) {
        return format_by_kind(*kind, value, options);
    }

    if let Some(number) = value.as_f64() {
        let name = column.to_lowercase();
        if options.format_currency && CURRENCY_HINTS.iter().any(|hint| name.contains(hint)) {
            return currency_cell(number, &options.currency);
        }
        if options.format_numbers && !PLAIN_NUMBER_HINTS.iter().any(|hint| name.contains(hint)) {
            return format_with_separators(number);
        }
    }

    match value {
        Value::String(s) => match leading_iso_date(s) {
            Some(date) => format_display_date(date),
            None => s.clone(),
        },
        Value::Object(_) | Value::Array(_) => value.to_string(),
        other => plain_text(other),
    }
}

fn format_by_kind(kind: ColumnKind, value: &Value, options: &ExportOptions) -> String {
    match (kind, value.as_f64()) {
        (ColumnKind::Currency, Some(number)) => currency_cell(number, &options.currency),
        (ColumnKind::Number, Some(number)) => format_with_separators(number),
        (ColumnKind::Date, _) => value
            .as_str()
            .and_then(leading_iso_date)
            .map(format_display_date)
            .unwrap_or_else(|| plain_text(value)),
        _ => plain_text(value),
    }
}

fn currency_cell(amount: f64, currency: &str) -> String {
    if amount < 0.0 {
        format!("-{} {}", currency, format_with_separators(amount.abs()))
    } else {
        format!("{} {}", currency, format_with_separators(amount))
    }
}

fn plain_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        // 整數值的 f64 不帶 `.0`
        Value::Number(n) if n.is_f64() => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// CSV 匯出引擎：格式化後透過 [`FileSaver`] 落地
pub struct CsvExporter<S: FileSaver> {
    saver: S,
    today: fn() -> NaiveDate,
}

impl<S: FileSaver> CsvExporter<S> {
    pub fn new(saver: S) -> Self {
        Self {
            saver,
            today: local_today,
        }
    }

    pub fn with_clock(saver: S, today: fn() -> NaiveDate) -> Self {
        Self { saver, today }
    }

    pub fn today(&self) -> NaiveDate {
        (self.today)()
    }

    /// `{filename}[_{YYYY-MM-DD}].csv`
    pub fn filename_for(&self, options: &ExportOptions) -> String {
        if options.include_timestamp {
            format!(
                "{}_{}.csv",
                options.filename,
                self.today().format("%Y-%m-%d")
            )
        } else {
            format!("{}.csv", options.filename)
        }
    }

    /// 空輸入不存檔，回傳 `Ok(None)`
    pub async fn download(
        &self,
        rows: &[ExportRow],
        options: &ExportOptions,
    ) -> Result<Option<String>> {
        if rows.is_empty() {
            tracing::debug!("Skipping export of '{}': no rows", options.filename);
            return Ok(None);
        }

        let content = to_csv(rows, options)?;
        let filename = self.filename_for(options);

        tracing::debug!(
            "Saving {} rows ({} bytes) as {}",
            rows.len(),
            content.len(),
            filename
        );
        let location = self
            .saver
            .save_file(&filename, CSV_CONTENT_TYPE, content.as_bytes())
            .await?;

        tracing::info!("📁 Exported {} rows to {}", rows.len(), location);
        Ok(Some(location))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    fn row(value: Value) -> ExportRow {
        match value {
            Value::Object(map) => map,
            _ => panic!("test rows must be objects"),
        }
    }

    #[derive(Clone, Default)]
    struct MockSaver {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl FileSaver for MockSaver {
        async fn save_file(&self, filename: &str, _content_type: &str, data: &[u8]) -> Result<String> {
            let mut files = self.files.lock().await;
            files.insert(filename.to_string(), data.to_vec());
            Ok(format!("memory://{}", filename))
        }
    }

    fn fixed_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 8).unwrap()
    }

    #[test]
    fn test_empty_rows_produce_empty_string() {
        let csv = to_csv(&[], &ExportOptions::default()).unwrap();
        assert_eq!(csv, "");
    }

    #[test]
    fn test_quotes_fields_with_delimiter() {
        let rows = vec![row(json!({"a": 1, "b": "x,y"}))];
        let csv = to_csv(&rows, &ExportOptions::default()).unwrap();
        assert_eq!(csv, "a,b\n1,\"x,y\"");
    }

    #[test]
    fn test_quotes_and_newlines_are_escaped() {
        let rows = vec![row(json!({"note": "say \"hi\"", "memo": "line1\nline2"}))];
        let csv = to_csv(&rows, &ExportOptions::default()).unwrap();
        assert_eq!(csv, "note,memo\n\"say \"\"hi\"\"\",\"line1\nline2\"");
    }

    #[test]
    fn test_single_null_column_is_empty_field() {
        let rows = vec![
            row(json!({"a": null})),
            row(json!({"a": "x"})),
            row(json!({"a": ""})),
        ];
        let csv = to_csv(&rows, &ExportOptions::default()).unwrap();
        assert_eq!(csv, "a\n\nx\n");
    }

    #[test]
    fn test_integral_floats_print_without_fraction() {
        let rows = vec![row(json!({"Score": 1.0, "Revenue": 5.0, "Product ID": 42.0, "Ratio": 0.5}))];
        let options = ExportOptions::default()
            .with_currency_formatting(false)
            .with_number_formatting(false);
        assert_eq!(
            to_csv(&rows, &options).unwrap(),
            "Score,Revenue,Product ID,Ratio\n1,5,42,0.5"
        );
    }

    #[test]
    fn test_column_union_in_first_seen_order() {
        let rows = vec![
            row(json!({"name": "A", "city": "Lahore"})),
            row(json!({"name": "B", "orders": 3, "city": "Karachi"})),
        ];
        let options = ExportOptions::default();
        assert_eq!(resolve_columns(&rows, &options), vec!["name", "city", "orders"]);

        let csv = to_csv(&rows, &options).unwrap();
        assert_eq!(csv, "name,city,orders\nA,Lahore,\nB,Karachi,3");
        assert_eq!(csv, to_csv(&rows, &options).unwrap());
    }

    #[test]
    fn test_explicit_headers_control_order() {
        let rows = vec![row(json!({"a": "1", "b": "2", "c": "3"}))];
        let options = ExportOptions::default().with_headers(["c", "a"]);
        assert_eq!(to_csv(&rows, &options).unwrap(), "c,a\n3,1");
    }

    #[test]
    fn test_currency_and_number_heuristics() {
        let rows = vec![row(json!({
            "Product ID": 12345,
            "Total Revenue": 1234567.5,
            "Avg Order Value": -250,
            "Orders": 4321,
            "Similarity Score": 0.8765,
        }))];
        let csv = to_csv(&rows, &ExportOptions::default()).unwrap();
        let data_line = csv.lines().nth(1).unwrap();
        assert_eq!(
            data_line,
            "12345,\"PKR 1,234,567.5\",-PKR 250,\"4,321\",0.8765"
        );
    }

    #[test]
    fn test_heuristics_can_be_disabled() {
        let rows = vec![row(json!({"Revenue": 1500, "Orders": 1200}))];
        let options = ExportOptions::default()
            .with_currency_formatting(false)
            .with_number_formatting(false);
        assert_eq!(to_csv(&rows, &options).unwrap(), "Revenue,Orders\n1500,1200");
    }

    #[test]
    fn test_custom_formatter_wins() {
        let rows = vec![row(json!({"Revenue": 1500}))];
        let options = ExportOptions::default()
            .with_formatter("Revenue", |v| format!("~{}", v.as_f64().unwrap_or(0.0)));
        assert_eq!(to_csv(&rows, &options).unwrap(), "Revenue\n~1500");
    }

    #[test]
    fn test_column_kind_overrides_name_heuristic() {
        let rows = vec![row(json!({"Current Value": 2500, "Product ID": 1000}))];
        let options = ExportOptions::default()
            .with_column_kind("Current Value", ColumnKind::Number)
            .with_column_kind("Product ID", ColumnKind::Text);
        assert_eq!(
            to_csv(&rows, &options).unwrap(),
            "Current Value,Product ID\n\"2,500\",1000"
        );
    }

    #[test]
    fn test_dates_objects_and_nulls() {
        let rows = vec![row(json!({
            "Last Order": "2024-03-05T10:00:00Z",
            "Tags": {"vip": true},
            "Missing": null,
            "Active": true,
        }))];
        let options = ExportOptions::default().with_delimiter(b';');
        let csv = to_csv(&rows, &options).unwrap();
        assert_eq!(
            csv,
            "Last Order;Tags;Missing;Active\n3/5/2024;\"{\"\"vip\"\":true}\";;true"
        );
    }

    #[test]
    fn test_round_trip_through_csv_reader() {
        let rows = vec![row(json!({"a": 1, "b": "x,y"}))];
        let csv = to_csv(&rows, &ExportOptions::default()).unwrap();
        assert!(csv.contains("\"x,y\""));

        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), vec!["a", "b"]);
        let record = reader.records().next().unwrap().unwrap();
        assert_eq!(record.iter().collect::<Vec<_>>(), vec!["1", "x,y"]);
    }

    #[tokio::test]
    async fn test_download_names_file_with_date() {
        let saver = MockSaver::default();
        let exporter = CsvExporter::with_clock(saver.clone(), fixed_day);

        let rows = vec![row(json!({"city": "Lahore"}))];
        let location = exporter
            .download(&rows, &ExportOptions::new("geographic_30days"))
            .await
            .unwrap();

        assert_eq!(
            location.as_deref(),
            Some("memory://geographic_30days_2024-01-08.csv")
        );
        let files = saver.files.lock().await;
        assert_eq!(
            files.get("geographic_30days_2024-01-08.csv").unwrap(),
            b"city\nLahore"
        );
    }

    #[tokio::test]
    async fn test_download_without_timestamp_and_empty_rows() {
        let saver = MockSaver::default();
        let exporter = CsvExporter::with_clock(saver.clone(), fixed_day);

        let options = ExportOptions::new("report").with_timestamp(false);
        assert_eq!(exporter.filename_for(&options), "report.csv");

        let nothing = exporter.download(&[], &options).await.unwrap();
        assert!(nothing.is_none());
        assert!(saver.files.lock().await.is_empty());
    }
}
