use super::{export_name, into_row, require_records, DashboardExporter};
use crate::domain::model::{ColumnKind, TimeFilter};
use crate::domain::ports::FileSaver;
use crate::domain::records::{ProductPair, SimilarItem, TopProduct};
use crate::utils::error::Result;
use serde_json::json;

impl<S: FileSaver> DashboardExporter<S> {
    pub async fn export_top_products(
        &self,
        products: Option<&[TopProduct]>,
        category: Option<&str>,
        filter: TimeFilter,
    ) -> Result<String> {
        let products = require_records(products, "top products")?;

        let rows = products
            .iter()
            .enumerate()
            .map(|(i, p)| {
                into_row(json!({
                    "Rank": i + 1,
                    "Product ID": p.product_id,
                    "Product Name": p.product_name,
                    "Category": p.category.as_deref().unwrap_or("Uncategorized"),
                    "Units Sold": p.total_quantity,
                    "Revenue": p.total_revenue,
                    "Orders": p.order_count,
                    "Unique Customers": p.unique_customers,
                    "Avg Price": p.avg_price,
                }))
            })
            .collect();

        let context = filter.filename_context();
        let category = category.filter(|c| !c.eq_ignore_ascii_case("all"));
        let options = self.options(export_name("top_products", &[category, Some(&context)]));
        self.save("top products", rows, options).await
    }

    pub async fn export_cross_selling_pairs(
        &self,
        pairs: Option<&[ProductPair]>,
        filter: TimeFilter,
    ) -> Result<String> {
        let pairs = require_records(pairs, "cross-selling pairs")?;

        let rows = pairs
            .iter()
            .map(|pair| {
                into_row(json!({
                    "Product A ID": pair.product_a_id,
                    "Product A": pair.product_a_name,
                    "Product B ID": pair.product_b_id,
                    "Product B": pair.product_b_name,
                    "Times Bought Together": pair.co_purchase_count,
                    "Support": pair.support,
                    "Confidence (%)": pair.confidence * 100.0,
                    "Lift": pair.lift,
                    "Avg Order Value": pair.avg_order_value,
                }))
            })
            .collect();

        let context = filter.filename_context();
        // "confidence" 內含 "id"，名稱推測會把它當成識別碼
        let options = self
            .options(export_name("cross_selling_pairs", &[Some(&context)]))
            .with_column_kind("Confidence (%)", ColumnKind::Number);
        self.save("cross-selling pairs", rows, options).await
    }

    pub async fn export_similar_items(
        &self,
        items: Option<&[SimilarItem]>,
        source_product: &str,
    ) -> Result<String> {
        let items = require_records(items, "similar items")?;

        let rows = items
            .iter()
            .map(|item| {
                into_row(json!({
                    "Source Product": source_product,
                    "Product ID": item.product_id,
                    "Product Name": item.product_name,
                    "Category": item.category.as_deref().unwrap_or(""),
                    "Similarity Score": item.similarity_score,
                    "Times Bought Together": item.co_purchase_count,
                    "Price": item.price,
                }))
            })
            .collect();

        let options = self.options(export_name("similar_items", &[Some(source_product)]));
        self.save("similar items", rows, options).await
    }
}
