use crate::domain::model::DateRange;
use crate::domain::ports::{AnalyticsApi, ConfigProvider};
use crate::domain::records::*;
use crate::utils::error::{DashboardError, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

/// 未設定 `MG_API_BASE_URL` 時使用的後端 API
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8001/api/v1";

/// 分析後端的 `/api/v1` 客戶端
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    base_url: Url,
    auth_token: Option<String>,
}

impl BackendClient {
    pub fn new(base_url: &str, auth_token: Option<String>) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| DashboardError::InvalidConfigValueError {
            field: "api_base_url".to_string(),
            value: base_url.to_string(),
            reason: format!("Invalid URL format: {}", e),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(DashboardError::InvalidConfigValueError {
                field: "api_base_url".to_string(),
                value: base_url.to_string(),
                reason: "URL cannot be used as a base".to_string(),
            });
        }

        Ok(Self {
            client: Client::new(),
            base_url,
            auth_token: auth_token.filter(|t| !t.is_empty()),
        })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::new(config.api_base_url(), config.auth_token().map(str::to_string))
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// 每一段都會做 percent-encoding，城市名稱可以含空白
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.auth_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Value> {
        let response = builder.send().await?;
        let status = response.status();
        let url = response.url().to_string();
        tracing::debug!("API response status: {} ({})", status, url);

        if !status.is_success() {
            return Err(DashboardError::ApiStatus {
                status: status.as_u16(),
                url,
            });
        }
        Ok(response.json::<Value>().await?)
    }

    async fn get_value(&self, segments: &[&str], query: &[(&str, String)]) -> Result<Value> {
        let url = self.endpoint(segments);
        tracing::debug!("Making API request to: {}", url);
        self.send(self.request(Method::GET, url).query(query)).await
    }

    async fn get_object<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<T> {
        let value = self.get_value(segments, query).await?;
        Ok(serde_json::from_value(unwrap_object(value))?)
    }

    async fn get_list<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let value = self.get_value(segments, query).await?;
        Ok(serde_json::from_value(unwrap_list(value))?)
    }

    async fn post_object<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let url = self.endpoint(segments);
        tracing::debug!("Posting to: {}", url);
        let value = self.send(self.request(Method::POST, url)).await?;
        Ok(serde_json::from_value(unwrap_object(value))?)
    }
}

/// 後端列表有時直接回陣列，有時包在 `{"data": [...]}` 或其他欄位裡
fn unwrap_list(value: Value) -> Value {
    match value {
        Value::Object(mut obj) => {
            if let Some(data @ Value::Array(_)) = obj.remove("data") {
                return data;
            }
            match obj.into_iter().find(|(_, v)| v.is_array()) {
                Some((_, items)) => items,
                None => Value::Array(vec![]),
            }
        }
        other => other,
    }
}

fn unwrap_object(value: Value) -> Value {
    match value {
        Value::Object(mut obj) if matches!(obj.get("data"), Some(Value::Object(_))) => {
            obj.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

#[async_trait]
impl AnalyticsApi for BackendClient {
    async fn provinces(&self, range: &DateRange) -> Result<Vec<ProvinceBreakdown>> {
        self.get_list(&["provinces"], &range.to_query()).await
    }

    async fn cities(&self, range: &DateRange) -> Result<Vec<CityBreakdown>> {
        self.get_list(&["cities"], &range.to_query()).await
    }

    async fn users(&self) -> Result<Vec<UserSummary>> {
        self.get_list(&["users"], &[]).await
    }

    async fn user_recommendations(&self, user_id: &str) -> Result<Vec<Recommendation>> {
        self.get_list(&["recommendations", "user", user_id], &[]).await
    }

    async fn location_recommendations(&self, city: &str) -> Result<Vec<Recommendation>> {
        self.get_list(&["recommendations", "location", city], &[])
            .await
    }

    async fn segment_recommendations(&self, segment: &str) -> Result<Vec<Recommendation>> {
        self.get_list(&["recommendations", "segment", segment], &[])
            .await
    }

    async fn rfm_segments(&self) -> Result<Vec<RfmSegment>> {
        self.get_list(&["analytics", "rfm-segments"], &[]).await
    }

    async fn order_status(&self, range: &DateRange) -> Result<Vec<OrderStatusBreakdown>> {
        self.get_list(&["analytics", "order-status"], &range.to_query())
            .await
    }

    async fn pos_vs_oe(&self, range: &DateRange) -> Result<Vec<ChannelBreakdown>> {
        self.get_list(&["analytics", "pos-vs-oe"], &range.to_query())
            .await
    }

    async fn top_products(
        &self,
        range: &DateRange,
        category: Option<&str>,
    ) -> Result<Vec<TopProduct>> {
        let mut query = range.to_query().to_vec();
        if let Some(category) = category.filter(|c| !c.is_empty() && *c != "all") {
            query.push(("category", category.to_string()));
        }
        self.get_list(&["analytics", "top-products"], &query).await
    }

    async fn customer_profiling(&self, range: &DateRange) -> Result<Vec<CustomerProfile>> {
        self.get_list(&["analytics", "customer-profiling"], &range.to_query())
            .await
    }

    async fn customer_metrics(&self, range: &DateRange) -> Result<CustomerMetrics> {
        self.get_object(&["analytics", "customer-metrics"], &range.to_query())
            .await
    }

    async fn revenue_trend(&self, range: &DateRange) -> Result<Vec<RevenuePoint>> {
        self.get_list(&["analytics", "revenue-trend"], &range.to_query())
            .await
    }

    async fn geographic(&self, range: &DateRange) -> Result<Vec<CityBreakdown>> {
        self.get_list(&["analytics", "geographic"], &range.to_query())
            .await
    }

    async fn cross_selling(&self, range: &DateRange) -> Result<Vec<ProductPair>> {
        self.get_list(&["analytics", "cross-selling"], &range.to_query())
            .await
    }

    async fn performance(&self, range: &DateRange) -> Result<Vec<PerformanceMetric>> {
        self.get_list(&["analytics", "performance"], &range.to_query())
            .await
    }

    async fn training_status(&self) -> Result<TrainingStatus> {
        self.get_object(&["ml", "status"], &[]).await
    }

    async fn train_model(&self) -> Result<TrainingStatus> {
        tracing::info!("🚀 Triggering model training");
        self.post_object(&["ml", "train"]).await
    }

    async fn precompute_recommendations(&self) -> Result<TrainingStatus> {
        tracing::info!("🚀 Triggering recommendation precompute");
        self.post_object(&["ml", "precompute"]).await
    }

    async fn ml_metrics(&self, range: &DateRange) -> Result<CollaborativeMetrics> {
        self.get_object(&["ml", "metrics"], &range.to_query()).await
    }

    async fn ml_top_products(&self, range: &DateRange) -> Result<Vec<CollaborativeProduct>> {
        self.get_list(&["ml", "top-products"], &range.to_query())
            .await
    }

    async fn ml_product_pairs(&self, range: &DateRange) -> Result<Vec<ProductPair>> {
        self.get_list(&["ml", "product-pairs"], &range.to_query())
            .await
    }

    async fn ml_customer_similarity(
        &self,
        range: &DateRange,
    ) -> Result<Vec<CustomerSimilarity>> {
        self.get_list(&["ml", "customer-similarity"], &range.to_query())
            .await
    }

    async fn similar_items(&self, product_id: &str) -> Result<Vec<SimilarItem>> {
        self.get_list(&["ml", "similar-items", product_id], &[])
            .await
    }

    async fn ab_variant(&self, user_id: &str) -> Result<AbVariant> {
        self.get_object(&["ab-test", "variant", user_id], &[]).await
    }
}
