//! 無畫面的儀表板視圖：抓資料、失敗時降級成空狀態、把時間篩選接到匯出
//!
//! 每個 fetch 都跟視圖的 [`CancellationToken`] 競速，關閉視圖就放棄還在路上的請求。

use crate::core::date_range::resolve;
use crate::core::exports::{export_name, CollaborativeExportSet, DashboardExporter};
use crate::domain::model::{DateRange, TimeFilter};
use crate::domain::ports::{AnalyticsApi, FileSaver};
use crate::domain::records::*;
use crate::utils::cancellation::CancellationToken;
use crate::utils::error::{DashboardError, Result};
use crate::utils::validation::validate_required_field;
use chrono::NaiveDate;
use std::fmt;
use std::future::Future;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DashboardSection {
    TopProducts,
    CustomerProfiling,
    CustomerMetrics,
    RfmSegments,
    CrossSelling,
    Geographic,
    Provinces,
    RevenueTrend,
    Performance,
    OrderStatus,
    PosVsOe,
    CfMetrics,
    CfProducts,
    CfCustomerSimilarity,
    CfProductPairs,
    CollaborativeFiltering,
    SimilarItems,
    UserRecommendations,
    LocationRecommendations,
    SegmentRecommendations,
    Users,
}

impl DashboardSection {
    pub const ALL: [DashboardSection; 21] = [
        Self::TopProducts,
        Self::CustomerProfiling,
        Self::CustomerMetrics,
        Self::RfmSegments,
        Self::CrossSelling,
        Self::Geographic,
        Self::Provinces,
        Self::RevenueTrend,
        Self::Performance,
        Self::OrderStatus,
        Self::PosVsOe,
        Self::CfMetrics,
        Self::CfProducts,
        Self::CfCustomerSimilarity,
        Self::CfProductPairs,
        Self::CollaborativeFiltering,
        Self::SimilarItems,
        Self::UserRecommendations,
        Self::LocationRecommendations,
        Self::SegmentRecommendations,
        Self::Users,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::TopProducts => "top-products",
            Self::CustomerProfiling => "customer-profiling",
            Self::CustomerMetrics => "customer-metrics",
            Self::RfmSegments => "rfm-segments",
            Self::CrossSelling => "cross-selling",
            Self::Geographic => "geographic",
            Self::Provinces => "provinces",
            Self::RevenueTrend => "revenue-trend",
            Self::Performance => "performance",
            Self::OrderStatus => "order-status",
            Self::PosVsOe => "pos-vs-oe",
            Self::CfMetrics => "cf-metrics",
            Self::CfProducts => "cf-products",
            Self::CfCustomerSimilarity => "cf-customer-similarity",
            Self::CfProductPairs => "cf-product-pairs",
            Self::CollaborativeFiltering => "collaborative-filtering",
            Self::SimilarItems => "similar-items",
            Self::UserRecommendations => "user-recommendations",
            Self::LocationRecommendations => "location-recommendations",
            Self::SegmentRecommendations => "segment-recommendations",
            Self::Users => "users",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::TopProducts => "Best selling products (--category)",
            Self::CustomerProfiling => "Per-customer order and spend profile",
            Self::CustomerMetrics => "Customer summary with lifetime value",
            Self::RfmSegments => "RFM segmentation",
            Self::CrossSelling => "Products frequently bought together",
            Self::Geographic => "Cities with customer share",
            Self::Provinces => "Province breakdown",
            Self::RevenueTrend => "Revenue per period with growth",
            Self::Performance => "KPI comparison with previous period",
            Self::OrderStatus => "Orders by status",
            Self::PosVsOe => "Store (POS) versus online (OE) orders",
            Self::CfMetrics => "Collaborative filtering model metrics",
            Self::CfProducts => "Most recommended products",
            Self::CfCustomerSimilarity => "Similar customer pairs",
            Self::CfProductPairs => "Model product pairs",
            Self::CollaborativeFiltering => "All collaborative filtering sections",
            Self::SimilarItems => "Items similar to a product (--product-id)",
            Self::UserRecommendations => "Recommendations for a user (--user-id)",
            Self::LocationRecommendations => "Recommendations for a city (--city)",
            Self::SegmentRecommendations => "Recommendations for a segment (--segment)",
            Self::Users => "Customer directory",
        }
    }
}

impl fmt::Display for DashboardSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DashboardSection {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|section| section.name() == wanted)
            .ok_or_else(|| DashboardError::InvalidConfigValueError {
                field: "section".to_string(),
                value: s.to_string(),
                reason: "Unknown dashboard section, run `sections` for the list".to_string(),
            })
    }
}

/// 一次匯出需要的參數
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub section: DashboardSection,
    pub filter: TimeFilter,
    pub category: Option<String>,
    pub segment: Option<String>,
    pub product_id: Option<String>,
    pub user_id: Option<String>,
    pub city: Option<String>,
}

impl ExportRequest {
    pub fn new(section: DashboardSection, filter: TimeFilter) -> Self {
        Self {
            section,
            filter,
            category: None,
            segment: None,
            product_id: None,
            user_id: None,
            city: None,
        }
    }
}

/// 總覽頁的資料；抓取失敗的區塊是空集合或 `None`
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    pub range: DateRange,
    pub customer_metrics: Option<CustomerMetrics>,
    pub top_products: Vec<TopProduct>,
    pub revenue_trend: Vec<RevenuePoint>,
    pub order_status: Vec<OrderStatusBreakdown>,
    pub pos_vs_oe: Vec<ChannelBreakdown>,
    pub geographic: Vec<CityBreakdown>,
    pub provinces: Vec<ProvinceBreakdown>,
    pub rfm_segments: Vec<RfmSegment>,
    pub performance: Vec<PerformanceMetric>,
}

const RECOMMENDATION_COLUMNS: [(&str, &str); 5] = [
    ("product_id", "Product ID"),
    ("product_name", "Product Name"),
    ("category", "Category"),
    ("score", "Score"),
    ("reason", "Reason"),
];

pub struct DashboardView<A: AnalyticsApi, S: FileSaver> {
    api: A,
    exporter: DashboardExporter<S>,
    token: CancellationToken,
    today: fn() -> NaiveDate,
}

impl<A: AnalyticsApi, S: FileSaver> DashboardView<A, S> {
    pub fn new(api: A, exporter: DashboardExporter<S>) -> Self {
        Self {
            api,
            exporter,
            token: CancellationToken::new(),
            today: || chrono::Local::now().date_naive(),
        }
    }

    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn with_token(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// 關閉視圖，還沒回來的請求一律放棄
    pub fn close(&self) {
        tracing::debug!("Closing dashboard view");
        self.token.cancel();
    }

    pub fn range(&self, filter: TimeFilter) -> DateRange {
        resolve(filter, (self.today)())
    }

    /// 抓取失敗只記錄警告，畫面改顯示空狀態
    async fn fetch<T, F>(&self, what: &str, fut: F) -> Option<T>
    where
        F: Future<Output = Result<T>>,
    {
        match self.token.run(fut).await {
            Ok(value) => Some(value),
            Err(DashboardError::Cancelled) => {
                tracing::debug!("Fetch of {} cancelled", what);
                None
            }
            Err(e) => {
                tracing::warn!("⚠️ Failed to load {}: {}", what, e);
                None
            }
        }
    }

    async fn fetch_list<T, F>(&self, what: &str, fut: F) -> Vec<T>
    where
        F: Future<Output = Result<Vec<T>>>,
    {
        self.fetch(what, fut).await.unwrap_or_default()
    }

    /// 匯出時抓取失敗直接回報，不降級成空資料
    async fn fetch_fresh<T, F>(&self, fut: F) -> Result<Option<T>>
    where
        F: Future<Output = Result<T>>,
    {
        self.token.run(fut).await.map(Some)
    }

    pub async fn load_overview(&self, filter: TimeFilter) -> DashboardSnapshot {
        let range = self.range(filter);
        tracing::info!("📊 Loading dashboard for {}", range.label);

        let (
            customer_metrics,
            top_products,
            revenue_trend,
            order_status,
            pos_vs_oe,
            geographic,
            provinces,
            rfm_segments,
            performance,
        ) = tokio::join!(
            self.fetch("customer metrics", self.api.customer_metrics(&range)),
            self.fetch_list("top products", self.api.top_products(&range, None)),
            self.fetch_list("revenue trend", self.api.revenue_trend(&range)),
            self.fetch_list("order status", self.api.order_status(&range)),
            self.fetch_list("POS vs OE", self.api.pos_vs_oe(&range)),
            self.fetch_list("geographic distribution", self.api.geographic(&range)),
            self.fetch_list("provinces", self.api.provinces(&range)),
            self.fetch_list("RFM segments", self.api.rfm_segments()),
            self.fetch_list("performance metrics", self.api.performance(&range)),
        );

        DashboardSnapshot {
            range,
            customer_metrics,
            top_products,
            revenue_trend,
            order_status,
            pos_vs_oe,
            geographic,
            provinces,
            rfm_segments,
            performance,
        }
    }

    pub async fn load_collaborative(&self, filter: TimeFilter) -> CollaborativeExportSet {
        let range = self.range(filter);
        let (metrics, products, customer_similarity, product_pairs) = tokio::join!(
            self.fetch("collaborative filtering metrics", self.api.ml_metrics(&range)),
            self.fetch("collaborative filtering products", self.api.ml_top_products(&range)),
            self.fetch("customer similarity", self.api.ml_customer_similarity(&range)),
            self.fetch("collaborative filtering product pairs", self.api.ml_product_pairs(&range)),
        );

        CollaborativeExportSet {
            metrics,
            products,
            customer_similarity,
            product_pairs,
        }
    }

    /// 抓一次最新資料再匯出，回傳寫出的檔案位置
    pub async fn export_section(&self, request: &ExportRequest) -> Result<Vec<String>> {
        let filter = request.filter;
        let range = self.range(filter);
        let exporter = &self.exporter;
        tracing::info!("📤 Exporting {} ({})", request.section, range.label);

        let location = match request.section {
            DashboardSection::TopProducts => {
                let category = request.category.as_deref();
                let data = self.fetch_fresh(self.api.top_products(&range, category)).await?;
                exporter
                    .export_top_products(data.as_deref(), category, filter)
                    .await?
            }
            DashboardSection::CustomerProfiling => {
                let data = self.fetch_fresh(self.api.customer_profiling(&range)).await?;
                exporter
                    .export_customer_profiling(data.as_deref(), filter)
                    .await?
            }
            DashboardSection::CustomerMetrics => {
                let data = self.fetch_fresh(self.api.customer_metrics(&range)).await?;
                exporter
                    .export_customer_metrics_summary(data.as_ref(), filter)
                    .await?
            }
            DashboardSection::RfmSegments => {
                let data = self.fetch_fresh(self.api.rfm_segments()).await?;
                exporter.export_rfm_segments(data.as_deref()).await?
            }
            DashboardSection::CrossSelling => {
                let data = self.fetch_fresh(self.api.cross_selling(&range)).await?;
                exporter
                    .export_cross_selling_pairs(data.as_deref(), filter)
                    .await?
            }
            DashboardSection::Geographic => {
                let data = self.fetch_fresh(self.api.geographic(&range)).await?;
                exporter.export_geographic(data.as_deref(), filter).await?
            }
            DashboardSection::Provinces => {
                let data = self.fetch_fresh(self.api.provinces(&range)).await?;
                exporter
                    .export_province_breakdown(data.as_deref(), filter)
                    .await?
            }
            DashboardSection::RevenueTrend => {
                let data = self.fetch_fresh(self.api.revenue_trend(&range)).await?;
                exporter.export_revenue_trend(data.as_deref(), filter).await?
            }
            DashboardSection::Performance => {
                let data = self.fetch_fresh(self.api.performance(&range)).await?;
                exporter
                    .export_performance_metrics(data.as_deref(), filter)
                    .await?
            }
            DashboardSection::OrderStatus => {
                let data = self.fetch_fresh(self.api.order_status(&range)).await?;
                exporter
                    .export_table(
                        data.as_deref(),
                        &[
                            ("status", "Order Status"),
                            ("order_count", "Orders"),
                            ("revenue", "Revenue"),
                            ("percentage", "Share (%)"),
                        ],
                        &export_name("order_status", &[Some(&filter.filename_context())]),
                    )
                    .await?
            }
            DashboardSection::PosVsOe => {
                let data = self.fetch_fresh(self.api.pos_vs_oe(&range)).await?;
                exporter
                    .export_table(
                        data.as_deref(),
                        &[
                            ("channel", "Channel"),
                            ("order_count", "Orders"),
                            ("revenue", "Revenue"),
                            ("avg_order_value", "Avg Order Value"),
                            ("unique_customers", "Unique Customers"),
                        ],
                        &export_name("pos_vs_oe", &[Some(&filter.filename_context())]),
                    )
                    .await?
            }
            DashboardSection::CfMetrics => {
                let data = self.fetch_fresh(self.api.ml_metrics(&range)).await?;
                exporter.export_cf_metrics(data.as_ref(), filter).await?
            }
            DashboardSection::CfProducts => {
                let data = self.fetch_fresh(self.api.ml_top_products(&range)).await?;
                exporter.export_cf_products(data.as_deref(), filter).await?
            }
            DashboardSection::CfCustomerSimilarity => {
                let data = self.fetch_fresh(self.api.ml_customer_similarity(&range)).await?;
                exporter
                    .export_customer_similarity(data.as_deref(), filter)
                    .await?
            }
            DashboardSection::CfProductPairs => {
                let data = self.fetch_fresh(self.api.ml_product_pairs(&range)).await?;
                exporter
                    .export_cf_product_pairs(data.as_deref(), filter)
                    .await?
            }
            DashboardSection::CollaborativeFiltering => {
                let data = self.load_collaborative(filter).await;
                return exporter
                    .export_collaborative_filtering_all(&data, filter)
                    .await;
            }
            DashboardSection::SimilarItems => {
                let product_id = validate_required_field("product_id", &request.product_id)?.as_str();
                let data = self.fetch_fresh(self.api.similar_items(product_id)).await?;
                exporter
                    .export_similar_items(data.as_deref(), product_id)
                    .await?
            }
            DashboardSection::UserRecommendations => {
                let user_id = validate_required_field("user_id", &request.user_id)?.as_str();
                let data = self.fetch_fresh(self.api.user_recommendations(user_id)).await?;
                exporter
                    .export_table(
                        data.as_deref(),
                        &RECOMMENDATION_COLUMNS,
                        &export_name("user_recommendations", &[Some(user_id)]),
                    )
                    .await?
            }
            DashboardSection::LocationRecommendations => {
                let city = validate_required_field("city", &request.city)?.as_str();
                let data = self.fetch_fresh(self.api.location_recommendations(city)).await?;
                exporter
                    .export_table(
                        data.as_deref(),
                        &RECOMMENDATION_COLUMNS,
                        &export_name("location_recommendations", &[Some(city)]),
                    )
                    .await?
            }
            DashboardSection::SegmentRecommendations => {
                let segment = validate_required_field("segment", &request.segment)?.as_str();
                let data = self.fetch_fresh(self.api.segment_recommendations(segment)).await?;
                exporter
                    .export_table(
                        data.as_deref(),
                        &RECOMMENDATION_COLUMNS,
                        &export_name("segment_recommendations", &[Some(segment)]),
                    )
                    .await?
            }
            DashboardSection::Users => {
                let data = self.fetch_fresh(self.api.users()).await?;
                exporter
                    .export_table(
                        data.as_deref(),
                        &[
                            ("user_id", "User ID"),
                            ("name", "Name"),
                            ("city", "City"),
                            ("segment", "Segment"),
                        ],
                        "users",
                    )
                    .await?
            }
        };

        Ok(vec![location])
    }
}
