use super::{export_name, into_row, require_records, DashboardExporter};
use crate::core::format::format_percentage;
use crate::domain::model::{ExportRow, TimeFilter};
use crate::domain::ports::FileSaver;
use crate::domain::records::{
    CollaborativeMetrics, CollaborativeProduct, CustomerSimilarity, ProductPair,
};
use crate::utils::error::{DashboardError, Result};
use serde_json::json;

/// 協同過濾頁面一次匯出的全部資料
#[derive(Debug, Clone, Default)]
pub struct CollaborativeExportSet {
    pub metrics: Option<CollaborativeMetrics>,
    pub products: Option<Vec<CollaborativeProduct>>,
    pub customer_similarity: Option<Vec<CustomerSimilarity>>,
    pub product_pairs: Option<Vec<ProductPair>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CfSection {
    Metrics,
    Products,
    CustomerSimilarity,
    ProductPairs,
}

fn has_rows<T>(records: &Option<Vec<T>>) -> bool {
    records.as_ref().is_some_and(|v| !v.is_empty())
}

impl CollaborativeExportSet {
    pub fn is_empty(&self) -> bool {
        self.present_sections().is_empty()
    }

    fn present_sections(&self) -> Vec<CfSection> {
        let candidates = [
            (CfSection::Metrics, self.metrics.is_some()),
            (CfSection::Products, has_rows(&self.products)),
            (CfSection::CustomerSimilarity, has_rows(&self.customer_similarity)),
            (CfSection::ProductPairs, has_rows(&self.product_pairs)),
        ];

        candidates
            .into_iter()
            .filter_map(|(section, present)| {
                if !present {
                    tracing::info!("⏭️ Skipping {:?} in batch export: no data", section);
                }
                present.then_some(section)
            })
            .collect()
    }
}

fn metric_rows(metrics: &CollaborativeMetrics) -> Vec<ExportRow> {
    let entries = [
        ("Total Users", json!(metrics.total_users)),
        ("Total Products", json!(metrics.total_products)),
        ("Total Purchases", json!(metrics.total_purchases)),
        ("Total Recommendations", json!(metrics.total_recommendations)),
        ("Active Customer Pairs", json!(metrics.active_customer_pairs)),
        (
            "Avg Similarity Score",
            json!((metrics.avg_similarity_score * 1000.0).round() / 1000.0),
        ),
        (
            "Algorithm Accuracy",
            json!(format_percentage(metrics.algorithm_accuracy * 100.0, 1)),
        ),
        ("Coverage", json!(format_percentage(metrics.coverage * 100.0, 1))),
        ("High-Value Pairs (AOV > PKR 5,000)", json!(metrics.high_value_pairs)),
        ("Cross-Region Opportunities", json!(metrics.cross_region_opportunities)),
    ];

    entries
        .into_iter()
        .map(|(metric, result)| into_row(json!({ "Metric": metric, "Result": result })))
        .collect()
}

impl<S: FileSaver> DashboardExporter<S> {
    pub async fn export_cf_metrics(
        &self,
        metrics: Option<&CollaborativeMetrics>,
        filter: TimeFilter,
    ) -> Result<String> {
        let metrics = metrics.ok_or_else(|| DashboardError::no_data("collaborative filtering metrics"))?;

        let context = filter.filename_context();
        let options = self.options(export_name("cf_metrics", &[Some(&context)]));
        self.save("collaborative filtering metrics", metric_rows(metrics), options)
            .await
    }

    pub async fn export_cf_products(
        &self,
        products: Option<&[CollaborativeProduct]>,
        filter: TimeFilter,
    ) -> Result<String> {
        let products = require_records(products, "collaborative filtering products")?;

        let rows = products
            .iter()
            .map(|p| {
                into_row(json!({
                    "Product ID": p.product_id,
                    "Product Name": p.product_name,
                    "Category": p.category.as_deref().unwrap_or(""),
                    "Times Recommended": p.recommendation_count,
                    "Avg Score": p.avg_score,
                    "Total Purchases": p.total_purchases,
                    "Revenue": p.revenue,
                }))
            })
            .collect();

        let context = filter.filename_context();
        let options = self.options(export_name("cf_top_products", &[Some(&context)]));
        self.save("collaborative filtering products", rows, options)
            .await
    }

    pub async fn export_customer_similarity(
        &self,
        similarities: Option<&[CustomerSimilarity]>,
        filter: TimeFilter,
    ) -> Result<String> {
        let similarities = require_records(similarities, "customer similarity")?;

        let rows = similarities
            .iter()
            .map(|s| {
                into_row(json!({
                    "Customer ID": s.customer_id,
                    "Similar Customer ID": s.similar_customer_id,
                    "Similarity Score": s.similarity_score,
                    "Shared Products": s.shared_products,
                    "Recommended Products": s.recommended_products.join("; "),
                }))
            })
            .collect();

        let context = filter.filename_context();
        let options = self.options(export_name("cf_customer_similarity", &[Some(&context)]));
        self.save("customer similarity", rows, options).await
    }

    pub async fn export_cf_product_pairs(
        &self,
        pairs: Option<&[ProductPair]>,
        filter: TimeFilter,
    ) -> Result<String> {
        let pairs = require_records(pairs, "collaborative filtering product pairs")?;

        let rows = pairs
            .iter()
            .map(|pair| {
                into_row(json!({
                    "Product A": pair.product_a_name,
                    "Product B": pair.product_b_name,
                    "Co-Purchases": pair.co_purchase_count,
                    "Lift": pair.lift,
                    "Avg Pair Value": pair.avg_order_value,
                }))
            })
            .collect();

        let context = filter.filename_context();
        let options = self.options(export_name("cf_product_pairs", &[Some(&context)]));
        self.save("collaborative filtering product pairs", rows, options)
            .await
    }

    /// 依序匯出有資料的區塊，每次下載之間等待 `batch_delay`
    ///
    /// 全部都沒資料時回傳錯誤。
    pub async fn export_collaborative_filtering_all(
        &self,
        data: &CollaborativeExportSet,
        filter: TimeFilter,
    ) -> Result<Vec<String>> {
        let sections = data.present_sections();
        if sections.is_empty() {
            return Err(DashboardError::no_data("collaborative filtering"));
        }

        let mut saved = Vec::with_capacity(sections.len());
        for (i, section) in sections.into_iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.batch_delay).await;
            }

            let location = match section {
                CfSection::Metrics => self.export_cf_metrics(data.metrics.as_ref(), filter).await?,
                CfSection::Products => {
                    self.export_cf_products(data.products.as_deref(), filter)
                        .await?
                }
                CfSection::CustomerSimilarity => {
                    self.export_customer_similarity(data.customer_similarity.as_deref(), filter)
                        .await?
                }
                CfSection::ProductPairs => {
                    self.export_cf_product_pairs(data.product_pairs.as_deref(), filter)
                        .await?
                }
            };
            saved.push(location);
        }

        tracing::info!("✅ Batch export finished: {} files", saved.len());
        Ok(saved)
    }
}
