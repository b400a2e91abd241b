//! # Ecomdash
//!
//! Command-line front end of the e-commerce dashboard: loads the configured
//! tables, computes every panel for the selected date range and prints the
//! result as JSON or as a text summary.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod app;
pub mod error;
pub mod render;

pub use app::*;
pub use error::*;
pub use render::*;
