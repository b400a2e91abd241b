//! CSV loading into typed records.
//!
//! Each table declares the columns it needs. A missing file or column aborts
//! the load; a cell that does not convert fails only its own row, which is
//! then skipped or escalated according to [`RowErrorPolicy`].

use crate::time::parse_timestamp;
use csv::{ReaderBuilder, StringRecord, Trim};
use ecomdash_common::{
    Coordinate, CustomerRecord, DashboardError, GeolocationRecord, OrderRecord, Result,
    RowErrorPolicy, ZipPrefix,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// Row accounting for one loaded table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadReport {
    pub table: String,
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub skipped_rows: usize,
}

/// Typed rows plus their load accounting.
#[derive(Debug, Clone)]
pub struct LoadedTable<T> {
    pub rows: Vec<T>,
    pub report: LoadReport,
}

/// Columns the order table must provide.
pub const ORDER_COLUMNS: [&str; 7] = [
    "order_id",
    "order_purchase_timestamp",
    "payment_value",
    "price",
    "product_category_name",
    "payment_type",
    "order_item_id",
];

/// Columns the customer table must provide.
pub const CUSTOMER_COLUMNS: [&str; 4] = [
    "customer_id",
    "customer_unique_id",
    "customer_zip_code_prefix",
    "customer_city",
];

/// Columns the geolocation table must provide.
pub const GEOLOCATION_COLUMNS: [&str; 3] = [
    "geolocation_zip_code_prefix",
    "geolocation_lat",
    "geolocation_lng",
];

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawOrderRow {
    order_id: Option<String>,
    order_purchase_timestamp: Option<String>,
    payment_value: Option<String>,
    price: Option<String>,
    product_category_name: Option<String>,
    payment_type: Option<String>,
    order_item_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawCustomerRow {
    customer_id: Option<String>,
    customer_unique_id: Option<String>,
    customer_zip_code_prefix: Option<String>,
    customer_city: Option<String>,
    customer_state: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawGeolocationRow {
    geolocation_zip_code_prefix: Option<String>,
    geolocation_lat: Option<String>,
    geolocation_lng: Option<String>,
    geolocation_city: Option<String>,
    geolocation_state: Option<String>,
}

/// The cell that made a row unusable.
#[derive(Debug)]
struct CellError {
    column: &'static str,
    value: String,
}

impl CellError {
    fn new(column: &'static str, value: impl Into<String>) -> Self {
        Self {
            column,
            value: value.into(),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required_text(value: Option<String>, column: &'static str) -> std::result::Result<String, CellError> {
    non_blank(value).ok_or_else(|| CellError::new(column, ""))
}

fn optional_number(
    value: Option<String>,
    column: &'static str,
) -> std::result::Result<Option<f64>, CellError> {
    let Some(text) = non_blank(value) else {
        return Ok(None);
    };
    if text.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    match text.parse::<f64>() {
        Ok(number) if number.is_finite() => Ok(Some(number)),
        _ => Err(CellError::new(column, text)),
    }
}

fn required_number(value: Option<String>, column: &'static str) -> std::result::Result<f64, CellError> {
    optional_number(value, column)?.ok_or_else(|| CellError::new(column, ""))
}

/// Integers may arrive as `3` or, after a float round trip, as `3.0`.
fn optional_sequence(
    value: Option<String>,
    column: &'static str,
) -> std::result::Result<Option<u32>, CellError> {
    let Some(text) = non_blank(value) else {
        return Ok(None);
    };
    if let Ok(sequence) = text.parse::<u32>() {
        return Ok(Some(sequence));
    }
    match text.parse::<f64>() {
        Ok(number) if number.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&number) => {
            Ok(Some(number as u32))
        }
        _ => Err(CellError::new(column, text)),
    }
}

fn convert_order(raw: RawOrderRow) -> std::result::Result<OrderRecord, CellError> {
    let order_id = required_text(raw.order_id, "order_id")?;
    let timestamp = required_text(raw.order_purchase_timestamp, "order_purchase_timestamp")?;
    let purchased_at = parse_timestamp(&timestamp)
        .ok_or_else(|| CellError::new("order_purchase_timestamp", timestamp.clone()))?;

    Ok(OrderRecord {
        order_id,
        purchased_at,
        payment_value: optional_number(raw.payment_value, "payment_value")?,
        price: optional_number(raw.price, "price")?,
        product_category: non_blank(raw.product_category_name),
        payment_type: non_blank(raw.payment_type),
        order_item_id: optional_sequence(raw.order_item_id, "order_item_id")?,
    })
}

fn convert_customer(raw: RawCustomerRow) -> std::result::Result<CustomerRecord, CellError> {
    let zip_text = required_text(raw.customer_zip_code_prefix, "customer_zip_code_prefix")?;
    let zip_prefix = ZipPrefix::parse(&zip_text)
        .ok_or_else(|| CellError::new("customer_zip_code_prefix", zip_text.clone()))?;

    Ok(CustomerRecord {
        customer_id: required_text(raw.customer_id, "customer_id")?,
        customer_unique_id: required_text(raw.customer_unique_id, "customer_unique_id")?,
        zip_prefix,
        city: required_text(raw.customer_city, "customer_city")?,
        state: non_blank(raw.customer_state),
    })
}

fn convert_geolocation(raw: RawGeolocationRow) -> std::result::Result<GeolocationRecord, CellError> {
    let zip_text = required_text(raw.geolocation_zip_code_prefix, "geolocation_zip_code_prefix")?;
    let zip_prefix = ZipPrefix::parse(&zip_text)
        .ok_or_else(|| CellError::new("geolocation_zip_code_prefix", zip_text.clone()))?;

    Ok(GeolocationRecord {
        zip_prefix,
        coordinate: Coordinate::new(
            required_number(raw.geolocation_lat, "geolocation_lat")?,
            required_number(raw.geolocation_lng, "geolocation_lng")?,
        ),
        city: non_blank(raw.geolocation_city),
        state: non_blank(raw.geolocation_state),
    })
}

fn check_columns(headers: &StringRecord, required: &[&str], file: &str) -> Result<()> {
    for column in required {
        if !headers.iter().any(|header| header == *column) {
            return Err(DashboardError::missing_column(file, *column));
        }
    }
    Ok(())
}

fn read_table<Raw, T, F>(
    path: &Path,
    table: &str,
    required: &[&str],
    policy: RowErrorPolicy,
    convert: F,
) -> Result<LoadedTable<T>>
where
    Raw: DeserializeOwned,
    F: Fn(Raw) -> std::result::Result<T, CellError>,
{
    let file_name = path.display().to_string();
    let file = File::open(path).map_err(|e| DashboardError::data_unavailable_with_source(path, e))?;

    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(file);
    let headers = reader.headers()?.clone();
    check_columns(&headers, required, &file_name)?;

    let mut rows = Vec::new();
    let mut total_rows = 0usize;
    let mut skipped_rows = 0usize;

    for result in reader.records() {
        total_rows += 1;
        // header is line 1
        let fallback_line = total_rows as u64 + 1;

        let (line, converted) = match result {
            Ok(record) => {
                let line = record.position().map_or(fallback_line, |p| p.line());
                let converted = record
                    .deserialize::<Raw>(Some(&headers))
                    .map_err(|e| CellError::new("<row>", e.to_string()))
                    .and_then(&convert);
                (line, converted)
            }
            Err(err) if matches!(err.kind(), csv::ErrorKind::Utf8 { .. }) => {
                let line = err.position().map_or(fallback_line, |p| p.line());
                (line, Err(CellError::new("<row>", "invalid UTF-8")))
            }
            Err(err) => return Err(err.into()),
        };

        match converted {
            Ok(row) => rows.push(row),
            Err(cell) => {
                let error = DashboardError::parse_failure(&file_name, line, cell.column, cell.value);
                match policy {
                    RowErrorPolicy::Fail => return Err(error),
                    RowErrorPolicy::Skip => {
                        skipped_rows += 1;
                        debug!(%error, "Skipping row");
                    }
                }
            }
        }
    }

    let report = LoadReport {
        table: table.to_string(),
        total_rows,
        loaded_rows: rows.len(),
        skipped_rows,
    };

    if skipped_rows > 0 {
        warn!(table, skipped_rows, total_rows, "Skipped rows that failed to parse");
    }
    info!(table, loaded = report.loaded_rows, file = %file_name, "Loaded table");

    Ok(LoadedTable { rows, report })
}

/// Load the merged order/item/payment table.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_orders(path: impl AsRef<Path>, policy: RowErrorPolicy) -> Result<LoadedTable<OrderRecord>> {
    read_table(path.as_ref(), "orders", &ORDER_COLUMNS, policy, convert_order)
}

/// Load the customer table.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_customers(
    path: impl AsRef<Path>,
    policy: RowErrorPolicy,
) -> Result<LoadedTable<CustomerRecord>> {
    read_table(path.as_ref(), "customers", &CUSTOMER_COLUMNS, policy, convert_customer)
}

/// Load the zip-prefix geolocation samples.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_geolocations(
    path: impl AsRef<Path>,
    policy: RowErrorPolicy,
) -> Result<LoadedTable<GeolocationRecord>> {
    read_table(
        path.as_ref(),
        "geolocation",
        &GEOLOCATION_COLUMNS,
        policy,
        convert_geolocation,
    )
}
