//! # Ecomdash Config
//!
//! Typed configuration management for the e-commerce dashboard.
//!
//! This crate provides configuration loading from YAML, environment
//! variable overrides, defaults and validation.

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod defaults;
pub mod loader;
pub mod schema;

pub use defaults::*;
pub use loader::*;
pub use schema::*;
