//! Bill error types.

use rust_decimal::Decimal;
use tally_shared::AppError;
use thiserror::Error;
use uuid::Uuid;

use crate::settlement::TermsViolation;

/// Errors that can occur during bill operations.
#[derive(Debug, Error)]
pub enum BillError {
    /// Total or dates invalid.
    #[error(transparent)]
    Terms(#[from] TermsViolation),

    /// Supplier does not exist in the tenant.
    #[error("Supplier not found: {0}")]
    SupplierNotFound(Uuid),

    /// Bill does not exist in the tenant.
    #[error("Bill not found: {0}")]
    NotFound(Uuid),

    /// Only DRAFT bills can be approved.
    #[error("Bill is {status}; only DRAFT bills can be approved")]
    NotDraft {
        /// Current status.
        status: &'static str,
    },

    /// Cancelling requires no payments.
    #[error("Cannot cancel bill with {amount_paid} already paid")]
    HasPayments {
        /// Amount paid so far.
        amount_paid: Decimal,
    },

    /// Bill is already cancelled.
    #[error("Bill is already cancelled")]
    AlreadyCancelled,

    /// Bill number already used in the tenant.
    #[error("Bill number {0} already exists")]
    DuplicateNumber(String),
}

impl BillError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Terms(TermsViolation::NonPositiveTotal(_)) => "INVALID_TOTAL",
            Self::Terms(TermsViolation::DueBeforeDate { .. }) => "DUE_BEFORE_DATE",
            Self::SupplierNotFound(_) => "SUPPLIER_NOT_FOUND",
            Self::NotFound(_) => "BILL_NOT_FOUND",
            Self::NotDraft { .. } => "BILL_NOT_DRAFT",
            Self::HasPayments { .. } => "BILL_HAS_PAYMENTS",
            Self::AlreadyCancelled => "BILL_CANCELLED",
            Self::DuplicateNumber(_) => "DUPLICATE_BILL_NUMBER",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Terms(_) | Self::SupplierNotFound(_) => 400,
            Self::NotFound(_) => 404,
            Self::NotDraft { .. }
            | Self::HasPayments { .. }
            | Self::AlreadyCancelled
            | Self::DuplicateNumber(_) => 409,
        }
    }
}

impl From<BillError> for AppError {
    fn from(err: BillError) -> Self {
        Self::from_status(err.http_status_code(), err.to_string())
    }
}
