//! Payment error types.

use rust_decimal::Decimal;
use tally_shared::AppError;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur while applying or removing settlements.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Amount must be strictly positive.
    #[error("Payment amount must be greater than zero, got {0}")]
    InvalidAmount(Decimal),

    /// Amount exceeds what is still owed. No partial clamping.
    #[error("Amount {amount:.2} exceeds amount due {amount_due:.2}")]
    Overpayment {
        /// Requested amount.
        amount: Decimal,
        /// Amount still owed.
        amount_due: Decimal,
    },

    /// Target document is not open for settlement.
    #[error("Cannot apply payment to a document in {status} status")]
    DocumentNotOpen {
        /// Current status.
        status: &'static str,
    },

    /// Payment, bill payment or credit memo not found (or already deleted).
    #[error("Payment not found: {0}")]
    NotFound(Uuid),

    /// Target document not found.
    #[error("Document not found: {0}")]
    DocumentNotFound(Uuid),

    /// Credit memo already voided.
    #[error("Credit memo {0} is already void")]
    AlreadyVoid(Uuid),

    /// Credit memo's customer differs from the invoice's.
    #[error("Credit memo customer does not match invoice customer")]
    CustomerMismatch,

    /// Idempotency key already used for a payment with different terms.
    #[error("Idempotency key {0} was already used for a different payment")]
    IdempotencyKeyReused(String),
}

impl PaymentError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::Overpayment { .. } => "OVERPAYMENT",
            Self::DocumentNotOpen { .. } => "DOCUMENT_NOT_OPEN",
            Self::NotFound(_) => "PAYMENT_NOT_FOUND",
            Self::DocumentNotFound(_) => "DOCUMENT_NOT_FOUND",
            Self::AlreadyVoid(_) => "ALREADY_VOID",
            Self::CustomerMismatch => "CUSTOMER_MISMATCH",
            Self::IdempotencyKeyReused(_) => "IDEMPOTENCY_KEY_REUSED",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidAmount(_) | Self::CustomerMismatch => 400,
            Self::NotFound(_) | Self::DocumentNotFound(_) => 404,
            Self::Overpayment { .. }
            | Self::DocumentNotOpen { .. }
            | Self::AlreadyVoid(_)
            | Self::IdempotencyKeyReused(_) => 409,
        }
    }
}

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        Self::from_status(err.http_status_code(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_overpayment_message() {
        let err = PaymentError::Overpayment {
            amount: dec!(700),
            amount_due: dec!(600),
        };
        assert_eq!(err.to_string(), "Amount 700.00 exceeds amount due 600.00");
        assert_eq!(err.http_status_code(), 409);
        assert_eq!(err.error_code(), "OVERPAYMENT");
    }

    #[test]
    fn test_app_error_mapping() {
        let app: AppError = PaymentError::InvalidAmount(dec!(0)).into();
        assert_eq!(app.status_code(), 400);
        let app: AppError = PaymentError::NotFound(Uuid::nil()).into();
        assert_eq!(app.status_code(), 404);
        let app: AppError = PaymentError::DocumentNotOpen { status: "DRAFT" }.into();
        assert_eq!(app.error_code(), "STATE_CONFLICT");
    }
}
