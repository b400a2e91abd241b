//! Test utilities and shared fixtures for the dashboard workspace.
//!
//! Enabled for unit tests and, through the `testing` feature, for the
//! integration tests of the other crates.

use crate::records::OrderRecord;
use chrono::{NaiveDate, NaiveDateTime};
use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Initialize logging for tests; safe to call from every test.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        let _ = fmt().with_test_writer().with_env_filter(filter).try_init();
    });
}

/// Build a naive timestamp from its parts.
pub fn mock_timestamp(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, min, sec))
        .expect("valid fixture timestamp")
}

/// Build a calendar date.
pub fn mock_date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid fixture date")
}

/// Assert that two floating point numbers are approximately equal within a tolerance.
pub fn assert_approx_eq(left: f64, right: f64, tolerance: f64) {
    let diff = (left - right).abs();
    assert!(
        diff <= tolerance,
        "assertion failed: `{left}` is not approximately equal to `{right}` (tolerance: {tolerance}, diff: {diff})"
    );
}

/// Write `contents` to a temporary `.csv` file that is removed on drop.
#[cfg(feature = "tempfile")]
pub fn write_temp_csv(contents: &str) -> tempfile::NamedTempFile {
    use std::io::Write;

    let mut file = tempfile::Builder::new()
        .suffix(".csv")
        .tempfile()
        .expect("Failed to create temporary file");
    file.write_all(contents.as_bytes())
        .expect("Failed to write temporary file");
    file.flush().expect("Failed to flush temporary file");
    file
}

/// In-memory order fixtures.
pub mod order_fixtures {
    use super::*;

    /// A fully populated line item.
    pub fn order(
        order_id: &str,
        purchased_at: NaiveDateTime,
        payment_value: f64,
        price: f64,
        category: Option<&str>,
        payment_type: &str,
        order_item_id: u32,
    ) -> OrderRecord {
        OrderRecord::new(order_id, purchased_at)
            .with_payment(payment_type, payment_value)
            .with_item(category, price, order_item_id)
    }

    /// Twelve line items over 2017-11 .. 2018-02 with repeated order ids,
    /// one uncategorized item and two payment types.
    pub fn sample_orders() -> Vec<OrderRecord> {
        vec![
            order("o1", mock_timestamp(2017, 11, 3, 10, 0, 0), 120.0, 100.0, Some("beleza_saude"), "credit_card", 1),
            order("o1", mock_timestamp(2017, 11, 3, 10, 0, 0), 120.0, 20.0, Some("beleza_saude"), "credit_card", 2),
            order("o2", mock_timestamp(2017, 11, 24, 23, 15, 0), 35.5, 29.9, Some("esporte_lazer"), "boleto", 1),
            order("o3", mock_timestamp(2017, 12, 1, 8, 30, 0), 250.0, 230.0, Some("informatica_acessorios"), "credit_card", 1),
            order("o4", mock_timestamp(2017, 12, 20, 14, 0, 0), 60.0, 49.0, None, "boleto", 1),
            order("o5", mock_timestamp(2017, 12, 31, 23, 59, 59), 89.9, 79.9, Some("esporte_lazer"), "credit_card", 1),
            order("o6", mock_timestamp(2018, 1, 1, 0, 0, 0), 15.0, 9.9, Some("beleza_saude"), "voucher", 1),
            order("o7", mock_timestamp(2018, 1, 15, 12, 0, 0), 410.0, 199.0, Some("informatica_acessorios"), "credit_card", 1),
            order("o7", mock_timestamp(2018, 1, 15, 12, 0, 0), 410.0, 199.0, Some("informatica_acessorios"), "credit_card", 2),
            order("o8", mock_timestamp(2018, 2, 2, 9, 45, 0), 44.0, 35.0, Some("esporte_lazer"), "boleto", 1),
            order("o9", mock_timestamp(2018, 2, 14, 18, 20, 0), 73.1, 59.0, Some("beleza_saude"), "credit_card", 1),
            order("o10", mock_timestamp(2018, 2, 28, 23, 59, 0), 19.9, 12.5, None, "debit_card", 1),
        ]
    }
}

/// CSV text fixtures mirroring the input file layouts.
pub mod csv_fixtures {
    /// Merged order table with extra columns the loader must ignore.
    pub const ORDERS_CSV: &str = "\
order_id,customer_id,order_status,order_purchase_timestamp,order_item_id,product_id,price,product_category_name,payment_type,payment_value
o1,c1,delivered,2017-11-03 10:00:00,1,p1,100.0,beleza_saude,credit_card,120.0
o1,c1,delivered,2017-11-03 10:00:00,2,p2,20.0,beleza_saude,credit_card,120.0
o2,c2,delivered,2017-11-24 23:15:00,1,p3,29.9,esporte_lazer,boleto,35.5
o3,c3,delivered,2017-12-01 08:30:00,1,p4,230.0,informatica_acessorios,credit_card,250.0
o4,c4,delivered,2017-12-20 14:00:00,1,p5,49.0,,boleto,60.0
";

    /// Orders with one unparseable timestamp on data line 3 (file line 4).
    pub const ORDERS_WITH_BAD_TIMESTAMP_CSV: &str = "\
order_id,order_purchase_timestamp,order_item_id,price,product_category_name,payment_type,payment_value
o1,2017-11-03 10:00:00,1,100.0,beleza_saude,credit_card,120.0
o2,2017-11-24 23:15:00,1,29.9,esporte_lazer,boleto,35.5
o3,not-a-date,1,230.0,informatica_acessorios,credit_card,250.0
";

    /// Orders missing the `payment_value` column.
    pub const ORDERS_MISSING_COLUMN_CSV: &str = "\
order_id,order_purchase_timestamp,order_item_id,price,product_category_name,payment_type
o1,2017-11-03 10:00:00,1,100.0,beleza_saude,credit_card
";

    pub const CUSTOMERS_CSV: &str = "\
customer_id,customer_unique_id,customer_zip_code_prefix,customer_city,customer_state
c1,u1,01037,sao paulo,SP
c2,u2,01046,sao paulo,SP
c3,u3,01046,sao paulo,SP
c4,u3,20040,rio de janeiro,RJ
c5,u5,1000,nowhere,XX
";

    pub const GEOLOCATION_CSV: &str = "\
geolocation_zip_code_prefix,geolocation_lat,geolocation_lng,geolocation_city,geolocation_state
01046,-23.546,-46.644,sao paulo,SP
01037,-23.545,-46.639,sao paulo,SP
01037,-23.547,-46.641,sao paulo,SP
20040,-22.906,-43.176,rio de janeiro,RJ
";
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_init_logging_multiple_calls() {
        init_test_logging();
        init_test_logging();
    }

    #[test]
    fn test_mock_timestamp() {
        let timestamp = mock_timestamp(2018, 1, 1, 12, 0, 0);
        assert_eq!(timestamp.year(), 2018);
        assert_eq!(timestamp.month(), 1);
        assert_eq!(timestamp.hour(), 12);
    }

    #[test]
    fn test_assert_approx_eq() {
        assert_approx_eq(1.0, 1.0001, 0.001);
    }

    #[test]
    #[should_panic]
    fn test_assert_approx_eq_fails() {
        assert_approx_eq(1.0, 1.1, 0.05);
    }

    #[test]
    fn test_sample_orders_shape() {
        let orders = order_fixtures::sample_orders();
        assert_eq!(orders.len(), 12);
        assert!(orders.iter().any(|o| o.product_category.is_none()));
    }
}
