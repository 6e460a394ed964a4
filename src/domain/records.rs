//! 後端分析 API 回傳的資料形狀
//!
//! 數值欄位一律 `#[serde(default)]`，後端漏欄位時顯示 0 而不是整頁失敗。

use serde::{Deserialize, Deserializer, Serialize};

/// 後端的 id 有時是數字有時是字串
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopProduct {
    #[serde(deserialize_with = "string_or_number")]
    pub product_id: String,
    pub product_name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub total_quantity: f64,
    #[serde(default)]
    pub total_revenue: f64,
    #[serde(default)]
    pub order_count: u64,
    #[serde(default)]
    pub unique_customers: u64,
    #[serde(default)]
    pub avg_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerProfile {
    #[serde(deserialize_with = "string_or_number")]
    pub customer_id: String,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub province: Option<String>,
    #[serde(default)]
    pub total_orders: u64,
    #[serde(default)]
    pub total_spent: f64,
    #[serde(default)]
    pub avg_order_value: f64,
    #[serde(default)]
    pub last_order_date: Option<String>,
    #[serde(default)]
    pub segment: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerMetrics {
    #[serde(default)]
    pub total_orders: u64,
    #[serde(default)]
    pub total_customers: u64,
    #[serde(default)]
    pub total_revenue: f64,
    #[serde(default)]
    pub avg_order_value: f64,
}

impl CustomerMetrics {
    pub fn avg_lifetime_value(&self) -> f64 {
        if self.total_customers == 0 {
            0.0
        } else {
            self.total_revenue / self.total_customers as f64
        }
    }

    pub fn orders_per_customer(&self) -> f64 {
        if self.total_customers == 0 {
            0.0
        } else {
            self.total_orders as f64 / self.total_customers as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RfmSegment {
    pub segment: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub customer_count: u64,
    #[serde(default)]
    pub percentage: f64,
    #[serde(default)]
    pub avg_recency_days: f64,
    #[serde(default)]
    pub avg_frequency: f64,
    #[serde(default)]
    pub avg_monetary: f64,
    #[serde(default)]
    pub total_revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPair {
    #[serde(deserialize_with = "string_or_number")]
    pub product_a_id: String,
    pub product_a_name: String,
    #[serde(deserialize_with = "string_or_number")]
    pub product_b_id: String,
    pub product_b_name: String,
    #[serde(default)]
    pub co_purchase_count: u64,
    #[serde(default)]
    pub support: f64,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub lift: f64,
    #[serde(default)]
    pub avg_order_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityBreakdown {
    pub city: String,
    #[serde(default)]
    pub province: Option<String>,
    #[serde(default)]
    pub customer_count: u64,
    #[serde(default, alias = "orders")]
    pub order_count: u64,
    #[serde(default)]
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvinceBreakdown {
    pub province: String,
    #[serde(default)]
    pub city_count: u64,
    #[serde(default)]
    pub customer_count: u64,
    #[serde(default, alias = "orders")]
    pub order_count: u64,
    #[serde(default)]
    pub revenue: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollaborativeMetrics {
    #[serde(default)]
    pub total_users: u64,
    #[serde(default)]
    pub total_products: u64,
    #[serde(default)]
    pub total_purchases: u64,
    #[serde(default)]
    pub total_recommendations: u64,
    #[serde(default)]
    pub active_customer_pairs: u64,
    #[serde(default)]
    pub avg_similarity_score: f64,
    #[serde(default)]
    pub algorithm_accuracy: f64,
    #[serde(default)]
    pub coverage: f64,
    /// 平均訂單金額超過 PKR 5,000 的商品組合數
    #[serde(default)]
    pub high_value_pairs: u64,
    /// 在三個以上城市都有穩定買氣的商品數
    #[serde(default)]
    pub cross_region_opportunities: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollaborativeProduct {
    #[serde(deserialize_with = "string_or_number")]
    pub product_id: String,
    pub product_name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub recommendation_count: u64,
    #[serde(default)]
    pub avg_score: f64,
    #[serde(default)]
    pub total_purchases: u64,
    #[serde(default)]
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerSimilarity {
    #[serde(deserialize_with = "string_or_number")]
    pub customer_id: String,
    #[serde(deserialize_with = "string_or_number")]
    pub similar_customer_id: String,
    #[serde(default)]
    pub similarity_score: f64,
    #[serde(default)]
    pub shared_products: u64,
    #[serde(default)]
    pub recommended_products: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenuePoint {
    pub period: String,
    #[serde(default)]
    pub revenue: f64,
    #[serde(default)]
    pub orders: u64,
    #[serde(default)]
    pub customers: u64,
    #[serde(default)]
    pub avg_order_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetric {
    pub metric: String,
    #[serde(default)]
    pub current_value: f64,
    #[serde(default)]
    pub previous_value: f64,
    #[serde(default)]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarItem {
    #[serde(deserialize_with = "string_or_number")]
    pub product_id: String,
    pub product_name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub similarity_score: f64,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub co_purchase_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderStatusBreakdown {
    pub status: String,
    #[serde(default)]
    pub order_count: u64,
    #[serde(default)]
    pub revenue: f64,
    #[serde(default)]
    pub percentage: f64,
}

/// POS（門市）與 OE（線上）通路對比
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelBreakdown {
    pub channel: String,
    #[serde(default)]
    pub order_count: u64,
    #[serde(default)]
    pub revenue: f64,
    #[serde(default)]
    pub avg_order_value: f64,
    #[serde(default)]
    pub unique_customers: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    #[serde(deserialize_with = "string_or_number")]
    pub user_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub segment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(deserialize_with = "string_or_number")]
    pub product_id: String,
    pub product_name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub model_version: Option<String>,
    #[serde(default)]
    pub last_trained_at: Option<String>,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbVariant {
    #[serde(deserialize_with = "string_or_number")]
    pub user_id: String,
    pub variant: String,
    #[serde(default)]
    pub experiment: Option<String>,
}
