//! Property tests for filtering and aggregation.

use chrono::{Duration, NaiveDate};
use ecomdash_analytics::{
    filter_by_date, revenue_by_category, DateRange, Frame, OrderCountReport, ReportAggregator,
    SeasonalOrdersReport, TopPriceCategoriesReport, TopSalesCategoriesReport, TotalRevenueReport,
};
use ecomdash_common::test_utils::mock_date;
use ecomdash_common::OrderRecord;
use proptest::prelude::*;

const CATEGORIES: [Option<&str>; 4] = [Some("beleza_saude"), Some("esporte_lazer"), Some("moveis_decoracao"), None];

fn base_date() -> NaiveDate {
    mock_date(2016, 9, 1)
}

fn order_strategy() -> impl Strategy<Value = OrderRecord> {
    (
        0u32..40,
        0i64..900 * 24 * 60,
        proptest::option::of(0.0f64..2_000.0),
        proptest::option::of(0.5f64..1_500.0),
        0usize..CATEGORIES.len(),
        1u32..6,
    )
        .prop_map(|(id, minutes, payment, price, category, item)| {
            let purchased_at = base_date()
                .and_hms_opt(0, 0, 0)
                .unwrap()
                + Duration::minutes(minutes);
            OrderRecord {
                order_id: format!("o{id}"),
                purchased_at,
                payment_value: payment,
                price,
                product_category: CATEGORIES[category].map(str::to_string),
                payment_type: Some("credit_card".to_string()),
                order_item_id: Some(item),
            }
        })
}

fn range_strategy() -> impl Strategy<Value = DateRange> {
    (0i64..900, 0i64..900).prop_map(|(a, b)| {
        DateRange::new(base_date() + Duration::days(a), base_date() + Duration::days(b))
    })
}

proptest! {
    #[test]
    fn filter_output_is_in_range_subset(orders in prop::collection::vec(order_strategy(), 0..80), range in range_strategy()) {
        let frame = Frame::new(&orders);
        let filtered = filter_by_date(&frame, &range);

        prop_assert!(filtered.len() <= orders.len());
        for order in filtered.iter() {
            prop_assert!(orders.iter().any(|o| std::ptr::eq(o, order)));
            prop_assert!(range.contains(&order.purchased_at));
        }
        if range.start > range.end {
            prop_assert!(filtered.is_empty());
        } else {
            let expected = orders.iter().filter(|o| range.contains(&o.purchased_at)).count();
            prop_assert_eq!(filtered.len(), expected);
        }
    }

    #[test]
    fn filter_is_idempotent(orders in prop::collection::vec(order_strategy(), 0..80), range in range_strategy()) {
        let frame = Frame::new(&orders);
        let once = filter_by_date(&frame, &range);
        let twice = filter_by_date(&once, &range);

        prop_assert_eq!(once.rows(), twice.rows());
    }

    #[test]
    fn category_revenue_sums_to_total(orders in prop::collection::vec(order_strategy(), 0..80), range in range_strategy()) {
        let frame = Frame::new(&orders);
        let filtered = filter_by_date(&frame, &range);

        let grouped: f64 = revenue_by_category(&filtered).iter().map(|m| m.value).sum();
        let total = TotalRevenueReport.aggregate(&filtered);
        prop_assert!((grouped - total).abs() <= 1e-6 * total.abs().max(1.0));
    }

    #[test]
    fn seasonal_has_twelve_months_summing_to_rows(orders in prop::collection::vec(order_strategy(), 0..80), range in range_strategy()) {
        let frame = Frame::new(&orders);
        let filtered = filter_by_date(&frame, &range);

        let seasonal = SeasonalOrdersReport.aggregate(&filtered);
        prop_assert_eq!(seasonal.len(), 12);
        let months: Vec<u32> = seasonal.iter().map(|p| p.month).collect();
        prop_assert_eq!(months, (1..=12).collect::<Vec<u32>>());
        prop_assert_eq!(seasonal.iter().map(|p| p.orders).sum::<u64>(), filtered.len() as u64);
    }

    #[test]
    fn top_n_is_bounded_sorted_subset(orders in prop::collection::vec(order_strategy(), 0..80), limit in 1usize..5) {
        let frame = Frame::new(&orders);

        let price = TopPriceCategoriesReport::with_limit(limit);
        let sales = TopSalesCategoriesReport::with_limit(limit);
        for (top, full) in [
            (price.aggregate(&frame), price.grouped(&frame)),
            (sales.aggregate(&frame), sales.grouped(&frame)),
        ] {
            prop_assert!(top.len() <= limit);
            prop_assert!(top.windows(2).all(|pair| pair[0].value >= pair[1].value));
            for metric in &top {
                prop_assert!(full.contains(metric));
            }
        }
    }

    #[test]
    fn order_count_never_exceeds_rows(orders in prop::collection::vec(order_strategy(), 0..80)) {
        let frame = Frame::new(&orders);
        prop_assert!(OrderCountReport.aggregate(&frame) as usize <= frame.len());
    }
}
