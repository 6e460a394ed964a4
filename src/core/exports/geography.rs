use super::{export_name, into_row, require_records, DashboardExporter};
use crate::domain::model::TimeFilter;
use crate::domain::ports::FileSaver;
use crate::domain::records::{CityBreakdown, ProvinceBreakdown};
use crate::utils::error::Result;
use serde_json::json;

/// 客戶數佔比（%），四捨五入到一位小數
pub fn customer_shares(cities: &[CityBreakdown]) -> Vec<f64> {
    let total: u64 = cities.iter().map(|c| c.customer_count).sum();
    cities
        .iter()
        .map(|c| {
            if total == 0 {
                0.0
            } else {
                (c.customer_count as f64 / total as f64 * 1000.0).round() / 10.0
            }
        })
        .collect()
}

impl<S: FileSaver> DashboardExporter<S> {
    pub async fn export_geographic(
        &self,
        cities: Option<&[CityBreakdown]>,
        filter: TimeFilter,
    ) -> Result<String> {
        let cities = require_records(cities, "geographic distribution")?;
        let shares = customer_shares(cities);

        let rows = cities
            .iter()
            .zip(shares)
            .enumerate()
            .map(|(i, (city, share))| {
                into_row(json!({
                    "Rank": i + 1,
                    "City": city.city,
                    "Province": city.province.as_deref().unwrap_or(""),
                    "Customers": city.customer_count,
                    "Customer Share (%)": share,
                    "Orders": city.order_count,
                    "Revenue": city.revenue,
                }))
            })
            .collect();

        let context = filter.filename_context();
        let options = self.options(export_name("geographic_distribution", &[Some(&context)]));
        self.save("geographic distribution", rows, options).await
    }

    pub async fn export_province_breakdown(
        &self,
        provinces: Option<&[ProvinceBreakdown]>,
        filter: TimeFilter,
    ) -> Result<String> {
        let provinces = require_records(provinces, "province breakdown")?;

        let rows = provinces
            .iter()
            .map(|p| {
                into_row(json!({
                    "Province": p.province,
                    "Cities": p.city_count,
                    "Customers": p.customer_count,
                    "Orders": p.order_count,
                    "Revenue": p.revenue,
                }))
            })
            .collect();

        let context = filter.filename_context();
        let options = self.options(export_name("province_breakdown", &[Some(&context)]));
        self.save("province breakdown", rows, options).await
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{memory_exporter, parse_csv};
    use super::*;

    fn city(name: &str, customers: u64, revenue: f64) -> CityBreakdown {
        CityBreakdown {
            city: name.to_string(),
            province: Some("Punjab".to_string()),
            customer_count: customers,
            order_count: customers * 2,
            revenue,
        }
    }

    #[test]
    fn test_customer_shares() {
        let cities = vec![city("Lahore", 500, 0.0), city("Faisalabad", 300, 0.0), city("Sialkot", 200, 0.0)];
        assert_eq!(customer_shares(&cities), vec![50.0, 30.0, 20.0]);

        let uneven = vec![city("A", 1, 0.0), city("B", 2, 0.0)];
        let shares = customer_shares(&uneven);
        assert_eq!(shares, vec![33.3, 66.7]);
        assert!((shares.iter().sum::<f64>() - 100.0).abs() < 0.2);

        assert_eq!(customer_shares(&[city("Empty", 0, 0.0)]), vec![0.0]);
    }

    #[tokio::test]
    async fn test_export_geographic() {
        let (exporter, saver) = memory_exporter();
        let cities = vec![city("Lahore", 420, 1_830_000.0), city("Rawalpindi", 180, 640_000.0)];

        exporter
            .export_geographic(Some(cities.as_slice()), TimeFilter::Last30Days)
            .await
            .unwrap();

        let text = saver
            .get_text("geographic_distribution_30days_2024-01-08.csv")
            .await
            .unwrap();
        let (headers, rows) = parse_csv(&text);
        assert_eq!(
            headers,
            vec!["Rank", "City", "Province", "Customers", "Customer Share (%)", "Orders", "Revenue"]
        );
        assert_eq!(rows[0][4], "70");
        assert_eq!(rows[1][4], "30");
        assert_eq!(rows[0][6], "PKR 1,830,000");
    }

    #[tokio::test]
    async fn test_export_province_breakdown_requires_data() {
        let (exporter, _saver) = memory_exporter();
        assert!(exporter
            .export_province_breakdown(None, TimeFilter::AllTime)
            .await
            .is_err());
    }
}
