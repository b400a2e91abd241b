//! Typed rows of the three input tables.

use crate::types::{Coordinate, ZipPrefix};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One order line item.
///
/// `order_id` repeats across the line items of the same order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order_id: String,
    /// Naive local purchase time, no timezone attached
    pub purchased_at: NaiveDateTime,
    pub payment_value: Option<f64>,
    pub price: Option<f64>,
    pub product_category: Option<String>,
    pub payment_type: Option<String>,
    /// Sequence number of the item within its order
    pub order_item_id: Option<u32>,
}

impl OrderRecord {
    /// Create a record with only the required fields set
    pub fn new(order_id: impl Into<String>, purchased_at: NaiveDateTime) -> Self {
        Self {
            order_id: order_id.into(),
            purchased_at,
            payment_value: None,
            price: None,
            product_category: None,
            payment_type: None,
            order_item_id: None,
        }
    }

    pub fn with_payment(mut self, payment_type: impl Into<String>, value: f64) -> Self {
        self.payment_type = Some(payment_type.into());
        self.payment_value = Some(value);
        self
    }

    pub fn with_item(mut self, category: Option<&str>, price: f64, order_item_id: u32) -> Self {
        self.product_category = category.map(str::to_string);
        self.price = Some(price);
        self.order_item_id = Some(order_item_id);
        self
    }
}

/// A customer account as referenced by orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub customer_id: String,
    /// Stable identity across accounts; distinct counts use this
    pub customer_unique_id: String,
    pub zip_prefix: ZipPrefix,
    pub city: String,
    pub state: Option<String>,
}

/// One latitude/longitude sample for a zip prefix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeolocationRecord {
    pub zip_prefix: ZipPrefix,
    pub coordinate: Coordinate,
    pub city: Option<String>,
    pub state: Option<String>,
}
