//! The immutable in-memory data set of one dashboard session.

use crate::frame::Frame;
use crate::loader::{load_customers, load_geolocations, load_orders, LoadReport};
use chrono::NaiveDate;
use ecomdash_common::{CustomerRecord, GeolocationRecord, OrderRecord, Result};
use ecomdash_config::DataConfig;
use tracing::{info, instrument};

/// Customer and geolocation tables, loaded together or not at all.
#[derive(Debug, Clone, Default)]
pub struct Geography {
    pub customers: Vec<CustomerRecord>,
    pub geolocations: Vec<GeolocationRecord>,
}

/// Everything loaded at session start; never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    orders: Vec<OrderRecord>,
    geography: Option<Geography>,
    load_reports: Vec<LoadReport>,
}

impl Dataset {
    pub fn from_orders(orders: Vec<OrderRecord>) -> Self {
        Self {
            orders,
            geography: None,
            load_reports: Vec::new(),
        }
    }

    pub fn with_geography(
        mut self,
        customers: Vec<CustomerRecord>,
        geolocations: Vec<GeolocationRecord>,
    ) -> Self {
        self.geography = Some(Geography {
            customers,
            geolocations,
        });
        self
    }

    /// Load every configured table; any file or schema problem is fatal.
    #[instrument(skip_all, fields(orders = %config.orders_path.display()))]
    pub fn load(config: &DataConfig) -> Result<Self> {
        let orders = load_orders(&config.orders_path, config.row_errors)?;
        let mut load_reports = vec![orders.report];

        let geography = match (&config.customers_path, &config.geolocation_path) {
            (Some(customers_path), Some(geolocation_path)) => {
                let customers = load_customers(customers_path, config.row_errors)?;
                let geolocations = load_geolocations(geolocation_path, config.row_errors)?;
                load_reports.push(customers.report);
                load_reports.push(geolocations.report);
                Some(Geography {
                    customers: customers.rows,
                    geolocations: geolocations.rows,
                })
            }
            _ => None,
        };

        let dataset = Self {
            orders: orders.rows,
            geography,
            load_reports,
        };
        info!(
            orders = dataset.orders.len(),
            geography = dataset.geography.is_some(),
            "Dataset loaded"
        );
        Ok(dataset)
    }

    pub fn orders(&self) -> &[OrderRecord] {
        &self.orders
    }

    /// Frame over every order row.
    pub fn frame(&self) -> Frame<'_, OrderRecord> {
        Frame::new(&self.orders)
    }

    pub fn geography(&self) -> Option<&Geography> {
        self.geography.as_ref()
    }

    pub fn load_reports(&self) -> &[LoadReport] {
        &self.load_reports
    }

    /// Earliest and latest purchase date; the date picker defaults.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self.orders.iter().map(|order| order.purchased_at.date());
        let first = dates.next()?;
        Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }
}
