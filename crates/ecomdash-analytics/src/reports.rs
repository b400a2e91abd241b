//! Dashboard report aggregators over the date-filtered orders.
//!
//! Every aggregator is a pure function of the frame it receives; none of
//! them filters by date or keeps state between calls.

use crate::frame::{Frame, GroupRow, Grouped, Reducer, Value};
use crate::histogram::PriceHistogram;
use crate::time::{month_of, YearMonth};
use ecomdash_common::{OrderRecord, MONTH_ABBREVIATIONS};
use ecomdash_config::{ReportConfig, SamplingConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Label used when a category or payment type is missing.
pub const MISSING_LABEL: &str = "(none)";

/// A single dashboard panel computed from filtered orders.
pub trait ReportAggregator {
    type Output;

    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    fn aggregate(&self, orders: &Frame<'_, OrderRecord>) -> Self::Output;
}

fn category_key<'a>(order: &'a OrderRecord) -> Option<&'a str> {
    order.product_category.as_deref()
}

fn payment_value<'a>(order: &'a OrderRecord) -> Value<'a> {
    order.payment_value.into()
}

fn order_id<'a>(order: &'a OrderRecord) -> Value<'a> {
    Value::Text(&order.order_id)
}

/// Metric of one product category; a `None` category is its own group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryMetric {
    pub category: Option<String>,
    pub value: f64,
}

impl CategoryMetric {
    pub fn label(&self) -> &str {
        self.category.as_deref().unwrap_or(MISSING_LABEL)
    }
}

fn category_metrics(grouped: Grouped<Option<&str>>) -> Vec<CategoryMetric> {
    grouped
        .into_rows()
        .into_iter()
        .map(|GroupRow { key, value }| CategoryMetric {
            category: key.map(str::to_string),
            value,
        })
        .collect()
}

/// Revenue per product category, descending.
pub fn revenue_by_category(orders: &Frame<'_, OrderRecord>) -> Vec<CategoryMetric> {
    category_metrics(
        orders
            .group_by_aggregate(category_key, payment_value, Reducer::Sum)
            .sort_desc(),
    )
}

/// Distinct order ids.
#[derive(Debug, Default)]
pub struct OrderCountReport;

impl ReportAggregator for OrderCountReport {
    type Output = u64;

    fn name(&self) -> &'static str {
        "order_count"
    }

    fn aggregate(&self, orders: &Frame<'_, OrderRecord>) -> u64 {
        orders
            .aggregate(order_id, Reducer::CountDistinct)
            .unwrap_or_default() as u64
    }
}

/// Sum of payment values; 0 over no rows.
#[derive(Debug, Default)]
pub struct TotalRevenueReport;

impl ReportAggregator for TotalRevenueReport {
    type Output = f64;

    fn name(&self) -> &'static str {
        "total_revenue"
    }

    fn aggregate(&self, orders: &Frame<'_, OrderRecord>) -> f64 {
        orders
            .aggregate(payment_value, Reducer::Sum)
            .unwrap_or_default()
    }
}

/// Mean payment value per line item; `None` when no payment value exists.
#[derive(Debug, Default)]
pub struct AverageOrderValueReport;

impl ReportAggregator for AverageOrderValueReport {
    type Output = Option<f64>;

    fn name(&self) -> &'static str {
        "average_order_value"
    }

    fn aggregate(&self, orders: &Frame<'_, OrderRecord>) -> Option<f64> {
        orders.aggregate(payment_value, Reducer::Mean)
    }
}

/// Unit price histogram, optionally over a seeded Bernoulli sample.
#[derive(Debug)]
pub struct PriceDistributionReport {
    pub bins: usize,
    pub sampling: SamplingConfig,
}

impl PriceDistributionReport {
    pub fn new(bins: usize) -> Self {
        Self {
            bins,
            sampling: SamplingConfig::default(),
        }
    }

    pub fn with_sampling(mut self, fraction: Option<f64>, seed: u64) -> Self {
        self.sampling = SamplingConfig { fraction, seed };
        self
    }
}

impl ReportAggregator for PriceDistributionReport {
    type Output = PriceHistogram;

    fn name(&self) -> &'static str {
        "price_distribution"
    }

    #[instrument(skip(self, orders), fields(rows = orders.len()))]
    fn aggregate(&self, orders: &Frame<'_, OrderRecord>) -> PriceHistogram {
        let sampled = match self.sampling.fraction {
            Some(fraction) => orders.sample(fraction, self.sampling.seed),
            None => orders.clone(),
        };
        let prices: Vec<f64> = sampled.iter().filter_map(|order| order.price).collect();

        debug!("Bucketed {} prices into {} bins", prices.len(), self.bins);
        PriceHistogram::from_values(&prices, self.bins)
    }
}

/// Categories with the highest mean unit price.
#[derive(Debug)]
pub struct TopPriceCategoriesReport {
    pub limit: usize,
}

impl TopPriceCategoriesReport {
    pub fn new() -> Self {
        Self { limit: 10 }
    }

    pub fn with_limit(limit: usize) -> Self {
        Self { limit }
    }

    /// Every category, descending, without the limit.
    pub fn grouped(&self, orders: &Frame<'_, OrderRecord>) -> Vec<CategoryMetric> {
        category_metrics(
            orders
                .group_by_aggregate(category_key, |o| o.price.into(), Reducer::Mean)
                .sort_desc(),
        )
    }
}

impl Default for TopPriceCategoriesReport {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportAggregator for TopPriceCategoriesReport {
    type Output = Vec<CategoryMetric>;

    fn name(&self) -> &'static str {
        "top_price_categories"
    }

    fn aggregate(&self, orders: &Frame<'_, OrderRecord>) -> Vec<CategoryMetric> {
        let mut result = self.grouped(orders);
        result.truncate(self.limit);
        debug!("Aggregated {} top price categories", result.len());
        result
    }
}

/// Categories with the largest summed order-item sequence numbers.
#[derive(Debug)]
pub struct TopSalesCategoriesReport {
    pub limit: usize,
}

impl TopSalesCategoriesReport {
    pub fn new() -> Self {
        Self { limit: 10 }
    }

    pub fn with_limit(limit: usize) -> Self {
        Self { limit }
    }

    /// Every category, descending, without the limit.
    pub fn grouped(&self, orders: &Frame<'_, OrderRecord>) -> Vec<CategoryMetric> {
        category_metrics(
            orders
                .group_by_aggregate(
                    category_key,
                    |o| o.order_item_id.map(f64::from).into(),
                    Reducer::Sum,
                )
                .sort_desc(),
        )
    }
}

impl Default for TopSalesCategoriesReport {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportAggregator for TopSalesCategoriesReport {
    type Output = Vec<CategoryMetric>;

    fn name(&self) -> &'static str {
        "top_sales_categories"
    }

    fn aggregate(&self, orders: &Frame<'_, OrderRecord>) -> Vec<CategoryMetric> {
        let mut result = self.grouped(orders);
        result.truncate(self.limit);
        debug!("Aggregated {} top sales categories", result.len());
        result
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRevenuePoint {
    pub year: i32,
    pub month: u32,
    /// `YYYY-MM`
    pub label: String,
    pub revenue: f64,
}

/// Revenue per (year, month) in chronological order; only months with rows.
#[derive(Debug, Default)]
pub struct MonthlyRevenueReport;

impl ReportAggregator for MonthlyRevenueReport {
    type Output = Vec<MonthlyRevenuePoint>;

    fn name(&self) -> &'static str {
        "monthly_revenue"
    }

    fn aggregate(&self, orders: &Frame<'_, OrderRecord>) -> Vec<MonthlyRevenuePoint> {
        let result: Vec<MonthlyRevenuePoint> = orders
            .group_by_aggregate(|o| YearMonth::of(&o.purchased_at), payment_value, Reducer::Sum)
            .into_rows()
            .into_iter()
            .map(|GroupRow { key, value }| MonthlyRevenuePoint {
                year: key.year,
                month: key.month,
                label: key.label(),
                revenue: value,
            })
            .collect();

        debug!("Aggregated {} monthly revenue data points", result.len());
        result
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalPoint {
    /// 1-12
    pub month: u32,
    /// `Jan`..`Dec`
    pub label: String,
    pub orders: u64,
}

/// Line items per calendar month, always all twelve months.
#[derive(Debug, Default)]
pub struct SeasonalOrdersReport;

impl ReportAggregator for SeasonalOrdersReport {
    type Output = Vec<SeasonalPoint>;

    fn name(&self) -> &'static str {
        "seasonal_orders"
    }

    fn aggregate(&self, orders: &Frame<'_, OrderRecord>) -> Vec<SeasonalPoint> {
        let mut counts = [0u64; 12];
        for row in orders
            .group_by_aggregate(|o| month_of(&o.purchased_at), order_id, Reducer::Count)
            .rows()
        {
            if let Some(slot) = counts.get_mut((row.key as usize).wrapping_sub(1)) {
                *slot = row.value as u64;
            }
        }

        MONTH_ABBREVIATIONS
            .iter()
            .zip(counts)
            .zip(1u32..)
            .map(|((label, orders), month)| SeasonalPoint {
                month,
                label: label.to_string(),
                orders,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentMethodCount {
    pub payment_type: Option<String>,
    pub count: u64,
}

impl PaymentMethodCount {
    pub fn label(&self) -> &str {
        self.payment_type.as_deref().unwrap_or(MISSING_LABEL)
    }
}

/// Line items per payment type, most used first, ties by name.
#[derive(Debug, Default)]
pub struct PaymentMethodsReport;

impl ReportAggregator for PaymentMethodsReport {
    type Output = Vec<PaymentMethodCount>;

    fn name(&self) -> &'static str {
        "payment_methods"
    }

    fn aggregate(&self, orders: &Frame<'_, OrderRecord>) -> Vec<PaymentMethodCount> {
        orders
            .group_by_aggregate(|o| o.payment_type.as_deref(), order_id, Reducer::Count)
            .sort_desc()
            .into_rows()
            .into_iter()
            .map(|GroupRow { key, value }| PaymentMethodCount {
                payment_type: key.map(str::to_string),
                count: value as u64,
            })
            .collect()
    }
}

/// All panel aggregators configured from one [`ReportConfig`].
#[derive(Debug)]
pub struct ReportSet {
    pub order_count: OrderCountReport,
    pub total_revenue: TotalRevenueReport,
    pub average_order_value: AverageOrderValueReport,
    pub price_distribution: PriceDistributionReport,
    pub top_price_categories: TopPriceCategoriesReport,
    pub top_sales_categories: TopSalesCategoriesReport,
    pub monthly_revenue: MonthlyRevenueReport,
    pub seasonal_orders: SeasonalOrdersReport,
    pub payment_methods: PaymentMethodsReport,
}

impl ReportSet {
    pub fn from_config(config: &ReportConfig) -> Self {
        Self {
            order_count: OrderCountReport,
            total_revenue: TotalRevenueReport,
            average_order_value: AverageOrderValueReport,
            price_distribution: PriceDistributionReport::new(config.histogram_bins)
                .with_sampling(config.sampling.fraction, config.sampling.seed),
            top_price_categories: TopPriceCategoriesReport::with_limit(config.top_n),
            top_sales_categories: TopSalesCategoriesReport::with_limit(config.top_n),
            monthly_revenue: MonthlyRevenueReport,
            seasonal_orders: SeasonalOrdersReport,
            payment_methods: PaymentMethodsReport,
        }
    }
}

impl Default for ReportSet {
    fn default() -> Self {
        Self::from_config(&ReportConfig::default())
    }
}
