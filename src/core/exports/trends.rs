use super::{export_name, into_row, require_records, DashboardExporter};
use crate::core::format::{calculate_growth, format_growth_with_color, GrowthTone};
use crate::domain::model::{ColumnKind, TimeFilter};
use crate::domain::ports::FileSaver;
use crate::domain::records::{PerformanceMetric, RevenuePoint};
use crate::utils::error::Result;
use serde_json::json;

impl<S: FileSaver> DashboardExporter<S> {
    /// 每一期附上相對前一期的營收成長
    pub async fn export_revenue_trend(
        &self,
        points: Option<&[RevenuePoint]>,
        filter: TimeFilter,
    ) -> Result<String> {
        let points = require_records(points, "revenue trend")?;

        let rows = points
            .iter()
            .enumerate()
            .map(|(i, point)| {
                let growth = match i {
                    0 => String::new(),
                    _ => {
                        format_growth_with_color(calculate_growth(point.revenue, points[i - 1].revenue))
                            .text
                    }
                };
                into_row(json!({
                    "Period": point.period,
                    "Revenue": point.revenue,
                    "Orders": point.orders,
                    "Customers": point.customers,
                    "Avg Order Value": point.avg_order_value,
                    "Revenue Growth": growth,
                }))
            })
            .collect();

        let context = filter.filename_context();
        let options = self.options(export_name("revenue_trend", &[Some(&context)]));
        self.save("revenue trend", rows, options).await
    }

    pub async fn export_performance_metrics(
        &self,
        metrics: Option<&[PerformanceMetric]>,
        filter: TimeFilter,
    ) -> Result<String> {
        let metrics = require_records(metrics, "performance metrics")?;

        let rows = metrics
            .iter()
            .map(|m| {
                let growth = format_growth_with_color(calculate_growth(m.current_value, m.previous_value));
                let trend = match growth.tone {
                    GrowthTone::Positive => "Up",
                    GrowthTone::Negative => "Down",
                };
                into_row(json!({
                    "Metric": m.metric,
                    "Current Value": m.current_value,
                    "Previous Value": m.previous_value,
                    "Unit": m.unit.as_deref().unwrap_or(""),
                    "Change": growth.text,
                    "Trend": trend,
                }))
            })
            .collect();

        // 指標單位不一定是金額，不能靠欄位名稱裡的 "value" 判斷
        let context = filter.filename_context();
        let options = self
            .options(export_name("performance_metrics", &[Some(&context)]))
            .with_column_kind("Current Value", ColumnKind::Number)
            .with_column_kind("Previous Value", ColumnKind::Number);
        self.save("performance metrics", rows, options).await
    }
}
