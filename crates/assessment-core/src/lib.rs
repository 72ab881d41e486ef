//! Student assessment records, validation, import, and
//! statistics.
//!
//! This crate defines the data model, the storage capability, the bulk
//! spreadsheet import pipeline, and the aggregation layer that the report
//! renderer and the CLI build on.

pub mod config;
pub mod error;
pub mod import;
pub mod model;
pub mod service;
pub mod spreadsheet;
pub mod statistics;
pub mod store;
pub mod traits;
pub mod validation;
