use crate::domain::model::DateRange;
use crate::domain::records::*;
use crate::utils::error::Result;
use async_trait::async_trait;

/// 匯出檔案的落地方式（瀏覽器下載、本機檔案、測試記憶體）
pub trait FileSaver: Send + Sync {
    fn save_file(
        &self,
        filename: &str,
        content_type: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_base_url(&self) -> &str;
    fn auth_token(&self) -> Option<&str>;
    fn output_path(&self) -> &str;
}

#[async_trait]
pub trait AnalyticsApi: Send + Sync {
    async fn provinces(&self, range: &DateRange) -> Result<Vec<ProvinceBreakdown>>;
    async fn cities(&self, range: &DateRange) -> Result<Vec<CityBreakdown>>;
    async fn users(&self) -> Result<Vec<UserSummary>>;

    async fn user_recommendations(&self, user_id: &str) -> Result<Vec<Recommendation>>;
    async fn location_recommendations(&self, city: &str) -> Result<Vec<Recommendation>>;
    async fn segment_recommendations(&self, segment: &str) -> Result<Vec<Recommendation>>;

    async fn rfm_segments(&self) -> Result<Vec<RfmSegment>>;
    async fn order_status(&self, range: &DateRange) -> Result<Vec<OrderStatusBreakdown>>;
    async fn pos_vs_oe(&self, range: &DateRange) -> Result<Vec<ChannelBreakdown>>;

    async fn top_products(
        &self,
        range: &DateRange,
        category: Option<&str>,
    ) -> Result<Vec<TopProduct>>;
    async fn customer_profiling(&self, range: &DateRange) -> Result<Vec<CustomerProfile>>;
    async fn customer_metrics(&self, range: &DateRange) -> Result<CustomerMetrics>;
    async fn revenue_trend(&self, range: &DateRange) -> Result<Vec<RevenuePoint>>;
    async fn geographic(&self, range: &DateRange) -> Result<Vec<CityBreakdown>>;
    async fn cross_selling(&self, range: &DateRange) -> Result<Vec<ProductPair>>;
    async fn performance(&self, range: &DateRange) -> Result<Vec<PerformanceMetric>>;

    async fn training_status(&self) -> Result<TrainingStatus>;
    async fn train_model(&self) -> Result<TrainingStatus>;
    async fn precompute_recommendations(&self) -> Result<TrainingStatus>;
    async fn ml_metrics(&self, range: &DateRange) -> Result<CollaborativeMetrics>;
    async fn ml_top_products(&self, range: &DateRange) -> Result<Vec<CollaborativeProduct>>;
    async fn ml_product_pairs(&self, range: &DateRange) -> Result<Vec<ProductPair>>;
    async fn ml_customer_similarity(&self, range: &DateRange)
        -> Result<Vec<CustomerSimilarity>>;
    async fn similar_items(&self, product_id: &str) -> Result<Vec<SimilarItem>>;

    async fn ab_variant(&self, user_id: &str) -> Result<AbVariant>;
}
