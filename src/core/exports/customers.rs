use super::{export_name, into_row, require_records, DashboardExporter};
use crate::domain::model::{ColumnKind, TimeFilter};
use crate::domain::ports::FileSaver;
use crate::domain::records::{CustomerMetrics, CustomerProfile, RfmSegment};
use crate::utils::error::{DashboardError, Result};
use serde_json::json;

impl<S: FileSaver> DashboardExporter<S> {
    pub async fn export_customer_profiling(
        &self,
        customers: Option<&[CustomerProfile]>,
        filter: TimeFilter,
    ) -> Result<String> {
        let customers = require_records(customers, "customer profiling")?;

        let rows = customers
            .iter()
            .map(|c| {
                into_row(json!({
                    "Customer ID": c.customer_id,
                    "Customer Name": c.customer_name.as_deref().unwrap_or("Unknown"),
                    "City": c.city.as_deref().unwrap_or(""),
                    "Province": c.province.as_deref().unwrap_or(""),
                    "Total Orders": c.total_orders,
                    "Total Spent (Revenue)": c.total_spent,
                    "Avg Order Value": c.avg_order_value,
                    "Last Order Date": c.last_order_date,
                    "Segment": c.segment.as_deref().unwrap_or("Unclassified"),
                }))
            })
            .collect();

        let context = filter.filename_context();
        let options = self.options(export_name("customer_profiling", &[Some(&context)]));
        self.save("customer profiling", rows, options).await
    }

    /// 單列摘要，含平均終身價值與每位客戶訂單數
    pub async fn export_customer_metrics_summary(
        &self,
        metrics: Option<&CustomerMetrics>,
        filter: TimeFilter,
    ) -> Result<String> {
        let metrics = match metrics {
            Some(m) if m.total_customers > 0 || m.total_orders > 0 => m,
            _ => return Err(DashboardError::no_data("customer metrics")),
        };

        let rows = vec![into_row(json!({
            "Time Period": filter.token(),
            "Total Orders": metrics.total_orders,
            "Total Customers": metrics.total_customers,
            "Total Revenue": metrics.total_revenue,
            "Avg Order Value": metrics.avg_order_value,
            "Avg Lifetime Value": metrics.avg_lifetime_value(),
            "Orders per Customer": (metrics.orders_per_customer() * 10.0).round() / 10.0,
        }))];

        let context = filter.filename_context();
        let options = self
            .options(export_name("customer_metrics", &[Some(&context)]))
            .with_column_kind("Time Period", ColumnKind::Text);
        self.save("customer metrics", rows, options).await
    }

    pub async fn export_rfm_segments(&self, segments: Option<&[RfmSegment]>) -> Result<String> {
        let segments = require_records(segments, "RFM segmentation")?;

        let rows = segments
            .iter()
            .map(|s| {
                into_row(json!({
                    "Segment": s.segment,
                    "Description": s.description.as_deref().unwrap_or(""),
                    "Customers": s.customer_count,
                    "Share (%)": s.percentage,
                    "Avg Recency (days)": s.avg_recency_days,
                    "Avg Frequency": s.avg_frequency,
                    "Avg Monetary Value": s.avg_monetary,
                    "Total Revenue": s.total_revenue,
                }))
            })
            .collect();

        let options = self.options(export_name("rfm_segments", &[]));
        self.save("RFM segmentation", rows, options).await
    }
}
