//! # Ecomdash Common
//!
//! Shared record types, errors, logging and utilities for the e-commerce
//! dashboard.
//!
//! This crate provides the foundational types used across all other crates
//! in the workspace.

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod logging;
pub mod records;
pub mod types;
pub mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod test_utils;

pub use error::{DashboardError, Result};
pub use logging::{init_default_logging, init_logging, LogFormat, LoggingConfig};
pub use records::*;
pub use types::*;
pub use utils::*;
