//! Delivery performance reporting.
//!
//! Classifies raw receipt text into a delivery status, aggregates orders by
//! base and by courier, and assembles rate reports with severity tiers.

pub mod aggregate;
pub mod api;
pub mod classifier;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod models;
pub mod rate;
pub mod report;
pub mod source;

pub use error::{ReportError, Result};
