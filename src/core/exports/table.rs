use super::{export_name, require_records, DashboardExporter};
use crate::domain::model::ExportRow;
use crate::domain::ports::FileSaver;
use crate::utils::error::{DashboardError, Result};
use serde::Serialize;
use serde_json::Value;

/// 依 `(來源欄位, 顯示名稱)` 重新命名並排序欄位
///
/// `columns` 為空時保留原始欄位。
pub fn rename_columns(record: &Value, columns: &[(&str, &str)]) -> ExportRow {
    let Value::Object(source) = record else {
        let mut row = ExportRow::new();
        row.insert("Value".to_string(), record.clone());
        return row;
    };

    if columns.is_empty() {
        return source.clone();
    }

    columns
        .iter()
        .map(|(key, label)| {
            let value = source.get(*key).cloned().unwrap_or(Value::Null);
            (label.to_string(), value)
        })
        .collect()
}

impl<S: FileSaver> DashboardExporter<S> {
    /// 任何可序列化的表格資料，欄位以 `columns` 指定的順序與名稱輸出
    pub async fn export_table<T: Serialize>(
        &self,
        records: Option<&[T]>,
        columns: &[(&str, &str)],
        filename: &str,
    ) -> Result<String> {
        let records = require_records(records, filename)?;

        let rows = records
            .iter()
            .map(|record| serde_json::to_value(record).map(|v| rename_columns(&v, columns)))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(DashboardError::SerializationError)?;

        let mut options = self.options(export_name(filename, &[]));
        if !columns.is_empty() {
            options.headers = Some(columns.iter().map(|(_, label)| label.to_string()).collect());
        }
        self.save(filename, rows, options).await
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{memory_exporter, parse_csv};
    use super::*;
    use crate::domain::records::OrderStatusBreakdown;
    use serde_json::json;

    #[test]
    fn test_rename_columns_orders_by_mapping() {
        let record = json!({"status": "delivered", "order_count": 10, "revenue": 5.0});
        let row = rename_columns(&record, &[("revenue", "Revenue"), ("status", "Status"), ("missing", "Missing")]);

        let keys: Vec<&String> = row.keys().collect();
        assert_eq!(keys, vec!["Revenue", "Status", "Missing"]);
        assert_eq!(row["Missing"], Value::Null);
    }

    #[tokio::test]
    async fn test_export_table_with_column_map() {
        let (exporter, saver) = memory_exporter();
        let statuses = vec![
            OrderStatusBreakdown {
                status: "Delivered".to_string(),
                order_count: 5120,
                revenue: 20_480_000.0,
                percentage: 81.3,
            },
            OrderStatusBreakdown {
                status: "Returned, Refunded".to_string(),
                order_count: 210,
                revenue: 840_000.0,
                percentage: 3.3,
            },
        ];

        let location = exporter
            .export_table(
                Some(statuses.as_slice()),
                &[
                    ("status", "Order Status"),
                    ("order_count", "Orders"),
                    ("revenue", "Revenue"),
                ],
                "order_status",
            )
            .await
            .unwrap();
        assert_eq!(location, "memory://order_status_2024-01-08.csv");

        let text = saver.get_text("order_status_2024-01-08.csv").await.unwrap();
        let (headers, rows) = parse_csv(&text);
        assert_eq!(headers, vec!["Order Status", "Orders", "Revenue"]);
        assert_eq!(rows[1], vec!["Returned, Refunded", "210", "PKR 840,000"]);
    }

    #[tokio::test]
    async fn test_export_table_without_map_keeps_fields() {
        let (exporter, saver) = memory_exporter();
        let records = vec![json!({"city": "Multan", "orders": 12})];

        exporter
            .export_table(Some(records.as_slice()), &[], "cities")
            .await
            .unwrap();

        let text = saver.get_text("cities_2024-01-08.csv").await.unwrap();
        assert_eq!(text, "city,orders\nMultan,12");
    }

    #[tokio::test]
    async fn test_export_table_requires_rows() {
        let (exporter, _saver) = memory_exporter();
        let result = exporter
            .export_table::<Value>(None, &[("a", "A")], "anything")
            .await;
        assert!(matches!(result, Err(DashboardError::NoData { .. })));
    }
}
