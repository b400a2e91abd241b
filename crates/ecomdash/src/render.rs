//! Dashboard output: JSON for machines, a plain text summary for people.

use crate::app::DashboardView;
use crate::error::AppResult;
use ecomdash_analytics::CategoryMetric;
use ecomdash_common::{format_currency_brl, truncate_string};
use std::fmt::Write;

const LABEL_WIDTH: usize = 32;

/// Pretty-printed JSON of the whole view.
pub fn render_json(view: &DashboardView) -> AppResult<String> {
    Ok(serde_json::to_string_pretty(view)?)
}

fn optional_currency(amount: Option<f64>) -> String {
    amount.map_or_else(|| "no data".to_string(), format_currency_brl)
}

fn write_categories(out: &mut String, title: &str, metrics: &[CategoryMetric], currency: bool) -> std::fmt::Result {
    writeln!(out, "\n{title}")?;
    if metrics.is_empty() {
        writeln!(out, "  no data")?;
    }
    for (rank, metric) in metrics.iter().enumerate() {
        let value = if currency {
            format_currency_brl(metric.value)
        } else {
            format!("{}", metric.value)
        };
        writeln!(
            out,
            "  {:>2}. {:<width$} {}",
            rank + 1,
            truncate_string(metric.label(), LABEL_WIDTH),
            value,
            width = LABEL_WIDTH
        )?;
    }
    Ok(())
}

fn write_text(out: &mut String, view: &DashboardView) -> std::fmt::Result {
    let report = &view.report;

    writeln!(
        out,
        "E-commerce dashboard {} to {} ({} line items)",
        report.range.start, report.range.end, report.row_count
    )?;
    writeln!(out)?;
    writeln!(out, "  Orders          {}", report.metrics.order_count)?;
    writeln!(out, "  Revenue         {}", format_currency_brl(report.metrics.total_revenue))?;
    writeln!(
        out,
        "  Average order   {}",
        optional_currency(report.metrics.average_order_value)
    )?;

    let histogram = &report.price_distribution;
    writeln!(
        out,
        "\nPrice distribution ({} prices, mean {})",
        histogram.sample_size,
        optional_currency(histogram.mean)
    )?;
    for bin in histogram.bins.iter().filter(|bin| bin.count > 0) {
        writeln!(
            out,
            "  {} - {}  {}",
            format_currency_brl(bin.lower),
            format_currency_brl(bin.upper),
            bin.count
        )?;
    }

    write_categories(out, "Top categories by average price", &report.top_price_categories, true)?;
    write_categories(out, "Top categories by items sold", &report.top_sales_categories, false)?;

    writeln!(out, "\nMonthly revenue")?;
    for point in &report.monthly_revenue {
        writeln!(out, "  {}  {}", point.label, format_currency_brl(point.revenue))?;
    }

    writeln!(out, "\nOrders by month of year")?;
    for point in &report.seasonal_orders {
        writeln!(out, "  {}  {}", point.label, point.orders)?;
    }

    writeln!(out, "\nPayment methods")?;
    for method in &report.payment_methods {
        writeln!(out, "  {:<16} {}", method.label(), method.count)?;
    }

    if let Some(cities) = &view.customer_distribution {
        writeln!(out, "\nCustomers by city")?;
        for city in cities {
            let location = city
                .coordinate
                .map_or_else(|| "no location".to_string(), |c| c.to_string());
            writeln!(
                out,
                "  {:<width$} {:>6}  {}",
                truncate_string(&city.city, LABEL_WIDTH),
                city.customers,
                location,
                width = LABEL_WIDTH
            )?;
        }
    }

    Ok(())
}

/// Human-readable summary with amounts in reais.
pub fn render_text(view: &DashboardView) -> AppResult<String> {
    let mut out = String::new();
    write_text(&mut out, view)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecomdash_analytics::{build_report, Dataset, FilterParams};
    use ecomdash_common::test_utils::{mock_date, order_fixtures::sample_orders};
    use ecomdash_config::ReportConfig;

    fn view(start: (i32, u32, u32), end: (i32, u32, u32)) -> DashboardView {
        let dataset = Dataset::from_orders(sample_orders());
        let params = FilterParams::new(
            mock_date(start.0, start.1, start.2),
            mock_date(end.0, end.1, end.2),
        );
        DashboardView {
            load_reports: Vec::new(),
            report: build_report(&dataset, &params, &ReportConfig::default()),
            customer_distribution: None,
        }
    }

    #[test]
    fn test_text_summary() {
        let text = render_text(&view((2018, 1, 1), (2018, 1, 31))).unwrap();

        assert!(text.contains("2018-01-01 to 2018-01-31 (3 line items)"));
        assert!(text.contains("Revenue         R$ 835,00"));
        assert!(text.contains("2018-01  R$ 835,00"));
        assert!(text.contains("Jan  3"));
        assert!(!text.contains("Customers by city"));
    }

    #[test]
    fn test_text_summary_without_data() {
        let text = render_text(&view((2019, 1, 1), (2019, 1, 31))).unwrap();

        assert!(text.contains("Average order   no data"));
        assert!(text.contains("Revenue         R$ 0,00"));
    }

    #[test]
    fn test_json_output() {
        let json = render_json(&view((2017, 11, 1), (2017, 11, 30))).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["report"]["metrics"]["order_count"], 2);
        assert_eq!(value["report"]["seasonal_orders"].as_array().unwrap().len(), 12);
        assert!(value["customer_distribution"].is_null());
    }
}
