//! One full dashboard rerun: filter, then every report.

use crate::dataset::Dataset;
use crate::filter::{filter_by_date, DateRange, FilterParams};
use crate::geo::{CityCustomers, GeoJoiner};
use crate::histogram::PriceHistogram;
use crate::reports::{
    CategoryMetric, MonthlyRevenuePoint, PaymentMethodCount, ReportAggregator, ReportSet,
    SeasonalPoint,
};
use ecomdash_config::ReportConfig;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, instrument};

/// The three scalar panels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadlineMetrics {
    pub order_count: u64,
    pub total_revenue: f64,
    /// `None` when the range holds no payment values
    pub average_order_value: Option<f64>,
}

/// Every date-dependent panel for one filter selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardReport {
    pub range: DateRange,
    /// Line items inside the range
    pub row_count: usize,
    pub metrics: HeadlineMetrics,
    pub price_distribution: PriceHistogram,
    pub top_price_categories: Vec<CategoryMetric>,
    pub top_sales_categories: Vec<CategoryMetric>,
    pub monthly_revenue: Vec<MonthlyRevenuePoint>,
    pub seasonal_orders: Vec<SeasonalPoint>,
    pub payment_methods: Vec<PaymentMethodCount>,
}

/// Runs the reports configured by a [`ReportConfig`].
#[derive(Debug)]
pub struct DashboardPipeline {
    reports: ReportSet,
    joiner: GeoJoiner,
}

impl DashboardPipeline {
    pub fn new(config: &ReportConfig) -> Self {
        Self {
            reports: ReportSet::from_config(config),
            joiner: GeoJoiner::new(config.coordinate_strategy),
        }
    }

    /// Filter the orders and compute every report from the filtered rows.
    #[instrument(skip(self, dataset), fields(range = %params.range))]
    pub fn run(&self, dataset: &Dataset, params: &FilterParams) -> DashboardReport {
        let started = Instant::now();
        let all = dataset.frame();
        let orders = filter_by_date(&all, &params.range);
        let reports = &self.reports;

        let report = DashboardReport {
            range: params.range,
            row_count: orders.len(),
            metrics: HeadlineMetrics {
                order_count: reports.order_count.aggregate(&orders),
                total_revenue: reports.total_revenue.aggregate(&orders),
                average_order_value: reports.average_order_value.aggregate(&orders),
            },
            price_distribution: reports.price_distribution.aggregate(&orders),
            top_price_categories: reports.top_price_categories.aggregate(&orders),
            top_sales_categories: reports.top_sales_categories.aggregate(&orders),
            monthly_revenue: reports.monthly_revenue.aggregate(&orders),
            seasonal_orders: reports.seasonal_orders.aggregate(&orders),
            payment_methods: reports.payment_methods.aggregate(&orders),
        };

        debug!(
            rows = report.row_count,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Dashboard report computed"
        );
        report
    }

    /// Per-city customer counts; independent of the date filter.
    pub fn customer_distribution(&self, dataset: &Dataset) -> Option<Vec<CityCustomers>> {
        dataset
            .geography()
            .map(|geo| self.joiner.distribution(&geo.customers, &geo.geolocations))
    }
}

/// Compute the dashboard for `params`; a pure function of its inputs.
pub fn build_report(dataset: &Dataset, params: &FilterParams, config: &ReportConfig) -> DashboardReport {
    DashboardPipeline::new(config).run(dataset, params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecomdash_common::test_utils::{mock_date, order_fixtures::sample_orders};

    #[test]
    fn test_build_report_for_range() {
        let dataset = Dataset::from_orders(sample_orders());
        let params = FilterParams::new(mock_date(2018, 1, 1), mock_date(2018, 1, 31));

        let report = build_report(&dataset, &params, &ReportConfig::default());
        assert_eq!(report.row_count, 3);
        assert_eq!(report.metrics.order_count, 2);
        assert_eq!(report.metrics.total_revenue, 835.0);
        assert_eq!(report.monthly_revenue.len(), 1);
        assert_eq!(report.seasonal_orders[0].orders, 3);
        assert_eq!(report.price_distribution.sample_size, 3);
    }

    #[test]
    fn test_build_report_is_deterministic() {
        let dataset = Dataset::from_orders(sample_orders());
        let params = FilterParams::new(mock_date(2017, 1, 1), mock_date(2018, 12, 31));
        let mut config = ReportConfig::default();
        config.sampling.fraction = Some(0.5);

        let first = build_report(&dataset, &params, &config);
        let second = build_report(&dataset, &params, &config);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_range_report() {
        let dataset = Dataset::from_orders(sample_orders());
        let params = FilterParams::new(mock_date(2018, 3, 1), mock_date(2017, 3, 1));

        let report = build_report(&dataset, &params, &ReportConfig::default());
        assert_eq!(report.row_count, 0);
        assert_eq!(report.metrics.total_revenue, 0.0);
        assert_eq!(report.metrics.average_order_value, None);
        assert!(report.top_price_categories.is_empty());
        assert_eq!(report.seasonal_orders.len(), 12);
    }

    #[test]
    fn test_no_geography_means_no_distribution() {
        let dataset = Dataset::from_orders(sample_orders());
        let pipeline = DashboardPipeline::new(&ReportConfig::default());
        assert!(pipeline.customer_distribution(&dataset).is_none());
    }
}
