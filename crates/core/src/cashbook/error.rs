//! Cash transaction error types.

use rust_decimal::Decimal;
use tally_shared::AppError;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur while writing or voiding receipts and checks.
#[derive(Debug, Error)]
pub enum CashbookError {
    /// Amount must be strictly positive.
    #[error("Amount must be greater than zero, got {0}")]
    InvalidAmount(Decimal),

    /// A check needs someone to pay.
    #[error("Payee name is required")]
    MissingPayee,

    /// Checks are drawn on BANK accounts only.
    #[error("Account {0} is not a bank account")]
    NotBankAccount(Uuid),

    /// Checks are charged to expense or cost-of-sales accounts only.
    #[error("Account {0} is not an expense account")]
    NotExpenseAccount(Uuid),

    /// Customer does not exist in the tenant.
    #[error("Customer not found: {0}")]
    CustomerNotFound(Uuid),

    /// Supplier does not exist in the tenant.
    #[error("Supplier not found: {0}")]
    SupplierNotFound(Uuid),

    /// Receipt or check does not exist in the tenant.
    #[error("Cash transaction not found: {0}")]
    NotFound(Uuid),

    /// Receipt or check was voided before.
    #[error("Cash transaction {0} is already void")]
    AlreadyVoid(Uuid),

    /// Receipt or check number already used in the tenant.
    #[error("Number {0} already exists")]
    DuplicateNumber(String),
}

impl CashbookError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::MissingPayee => "MISSING_PAYEE",
            Self::NotBankAccount(_) => "NOT_BANK_ACCOUNT",
            Self::NotExpenseAccount(_) => "NOT_EXPENSE_ACCOUNT",
            Self::CustomerNotFound(_) => "CUSTOMER_NOT_FOUND",
            Self::SupplierNotFound(_) => "SUPPLIER_NOT_FOUND",
            Self::NotFound(_) => "CASH_TRANSACTION_NOT_FOUND",
            Self::AlreadyVoid(_) => "ALREADY_VOID",
            Self::DuplicateNumber(_) => "DUPLICATE_NUMBER",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidAmount(_)
            | Self::MissingPayee
            | Self::NotBankAccount(_)
            | Self::NotExpenseAccount(_)
            | Self::CustomerNotFound(_)
            | Self::SupplierNotFound(_) => 400,
            Self::NotFound(_) => 404,
            Self::AlreadyVoid(_) | Self::DuplicateNumber(_) => 409,
        }
    }
}

impl From<CashbookError> for AppError {
    fn from(err: CashbookError) -> Self {
        Self::from_status(err.http_status_code(), err.to_string())
    }
}
