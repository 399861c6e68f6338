//! Core types and trait definitions for EduCards score aggregation.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod activity;
pub mod aggregator;
pub mod error;
pub mod play;
pub mod store;
pub mod summary;

pub use aggregator::{Aggregator, AggregatorConfig, RecordedPlay};
pub use error::{AggregationError, Error, Result};
