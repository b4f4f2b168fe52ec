//! Invoice error types.

use rust_decimal::Decimal;
use tally_shared::AppError;
use thiserror::Error;
use uuid::Uuid;

use crate::settlement::TermsViolation;

/// Errors that can occur during invoice operations.
#[derive(Debug, Error)]
pub enum InvoiceError {
    /// Total or dates invalid.
    #[error(transparent)]
    Terms(#[from] TermsViolation),

    /// Customer does not exist in the tenant.
    #[error("Customer not found: {0}")]
    CustomerNotFound(Uuid),

    /// Referenced sales order does not exist in the tenant.
    #[error("Sales order not found: {0}")]
    OrderNotFound(Uuid),

    /// Sales order already has an invoice.
    #[error("Sales order {0} is already invoiced")]
    OrderAlreadyInvoiced(Uuid),

    /// Invoice does not exist in the tenant.
    #[error("Invoice not found: {0}")]
    NotFound(Uuid),

    /// Only DRAFT invoices may be sent.
    #[error("Invoice is {status}; only DRAFT invoices can be sent")]
    NotDraft {
        /// Current status.
        status: &'static str,
    },

    /// Cancelling requires no settlements.
    #[error("Cannot cancel invoice with {amount_paid} already paid")]
    HasPayments {
        /// Amount settled so far.
        amount_paid: Decimal,
    },

    /// Invoice is already cancelled.
    #[error("Invoice is already cancelled")]
    AlreadyCancelled,

    /// Invoice number already used in the tenant.
    #[error("Invoice number {0} already exists")]
    DuplicateNumber(String),
}

impl InvoiceError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Terms(TermsViolation::NonPositiveTotal(_)) => "INVALID_TOTAL",
            Self::Terms(TermsViolation::DueBeforeDate { .. }) => "DUE_BEFORE_DATE",
            Self::CustomerNotFound(_) => "CUSTOMER_NOT_FOUND",
            Self::OrderNotFound(_) => "ORDER_NOT_FOUND",
            Self::OrderAlreadyInvoiced(_) => "ORDER_ALREADY_INVOICED",
            Self::NotFound(_) => "INVOICE_NOT_FOUND",
            Self::NotDraft { .. } => "INVOICE_NOT_DRAFT",
            Self::HasPayments { .. } => "INVOICE_HAS_PAYMENTS",
            Self::AlreadyCancelled => "INVOICE_CANCELLED",
            Self::DuplicateNumber(_) => "DUPLICATE_INVOICE_NUMBER",
        }
    }

    /// Returns the HTTP status code for this error.
    ///
    /// An unknown customer on create is a validation error, not a 404: the
    /// invoice is the resource being addressed.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Terms(_) | Self::CustomerNotFound(_) | Self::OrderNotFound(_) => 400,
            Self::NotFound(_) => 404,
            Self::NotDraft { .. }
            | Self::HasPayments { .. }
            | Self::AlreadyCancelled
            | Self::OrderAlreadyInvoiced(_)
            | Self::DuplicateNumber(_) => 409,
        }
    }
}

impl From<InvoiceError> for AppError {
    fn from(err: InvoiceError) -> Self {
        Self::from_status(err.http_status_code(), err.to_string())
    }
}
