//! # Ecomdash Analytics
//!
//! Loading, date filtering and report aggregation for the e-commerce
//! dashboard.
//!
//! The flow of one rerun is: [`Dataset`] (loaded once) → [`filter_by_date`]
//! → every [`ReportAggregator`] → [`DashboardReport`]. [`DashboardSession`]
//! drives reruns for changing [`FilterParams`], caching reports and keeping
//! only the newest selection's result.

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod dataset;
pub mod filter;
pub mod frame;
pub mod geo;
pub mod histogram;
pub mod loader;
pub mod pipeline;
pub mod reports;
pub mod session;
pub mod time;

pub use cache::{CacheMetrics, ReportCache};
pub use dataset::{Dataset, Geography};
pub use filter::{filter_by_date, DateRange, FilterParams};
pub use frame::{Frame, GroupRow, Grouped, Reducer, Value};
pub use geo::{customers_by_city, left_join, CityCustomers, GeoIndex, GeoJoiner, JoinedCustomer};
pub use histogram::{HistogramBin, PriceHistogram};
pub use loader::{load_customers, load_geolocations, load_orders, LoadReport, LoadedTable};
pub use pipeline::{build_report, DashboardPipeline, DashboardReport, HeadlineMetrics};
pub use reports::*;
pub use session::{DashboardSession, Snapshot};
pub use time::{month_of, parse_timestamp, YearMonth};
