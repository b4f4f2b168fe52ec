//! Financial report generation.
//!
//! This module provides pure business logic for generating financial reports:
//! - Trial Balance
//! - Profit & Loss
//! - Balance Sheet (with computed current earnings)
//! - A/R and A/P Aging
//! - Sales Summary
//! - General Ledger

pub mod aging;
pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

pub use aging::{AgingBucket, AgingService};
pub use error::ReportError;
pub use service::ReportService;
pub use types::*;
