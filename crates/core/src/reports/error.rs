//! Report error types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tally_shared::AppError;
use thiserror::Error;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Invalid date range.
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Start date.
        start: NaiveDate,
        /// End date.
        end: NaiveDate,
    },

    /// A statement that must balance does not.
    #[error("{report} is out of balance: {left} != {right}")]
    OutOfBalance {
        /// Which report.
        report: &'static str,
        /// Left-hand side (debits, or assets).
        left: Decimal,
        /// Right-hand side (credits, or liabilities plus equity).
        right: Decimal,
    },
}

impl From<ReportError> for AppError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::InvalidDateRange { .. } => Self::Validation(err.to_string()),
            ReportError::OutOfBalance { .. } => Self::Consistency(err.to_string()),
        }
    }
}
