//! Ledger error types for posting, account and entry errors.

use rust_decimal::Decimal;
use tally_shared::AppError;
use thiserror::Error;
use uuid::Uuid;

use super::types::EntrySource;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Entry must have at least 2 lines.
    #[error("Journal entry must have at least 2 lines")]
    InsufficientLines,

    /// A line has both or neither side set, or a negative amount.
    #[error("Line {index}: exactly one of debit or credit must be a positive amount")]
    InvalidLine {
        /// Zero-based line position.
        index: usize,
    },

    /// Entry has only debits or only credits.
    #[error("Journal entry must have both debit and credit lines")]
    SingleSided,

    /// Debits do not equal credits.
    #[error("Journal entry is not balanced. Debit: {debit}, Credit: {credit}")]
    Unbalanced {
        /// Total debits.
        debit: Decimal,
        /// Total credits.
        credit: Decimal,
    },

    /// Memo is empty.
    #[error("Journal entry memo is required")]
    MissingMemo,

    // ========== Account Errors ==========
    /// Account missing, or belongs to another tenant.
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// Account is inactive and cannot receive postings.
    #[error("Account {0} is inactive")]
    AccountInactive(Uuid),

    /// Account number already used in the tenant.
    #[error("Account number {0} already exists")]
    DuplicateAccountNumber(String),

    /// Parent account is in a different category.
    #[error("Parent account {parent_id} is not in the same category")]
    ParentCategoryMismatch {
        /// The proposed parent.
        parent_id: Uuid,
    },

    /// System accounts cannot be deleted or deactivated.
    #[error("Account {0} is a system account and cannot be removed")]
    SystemAccountProtected(Uuid),

    /// A seeded system account is missing from the tenant's chart.
    #[error("System account {0} is missing from the chart of accounts")]
    SystemAccountMissing(&'static str),

    // ========== Entry State Errors ==========
    /// Entry not found.
    #[error("Journal entry not found: {0}")]
    EntryNotFound(Uuid),

    /// Entry already has a reversal.
    #[error("Journal entry {0} has already been reversed")]
    AlreadyReversed(Uuid),

    /// Entry belongs to an invoice, payment or bill and is reversed through it.
    #[error("Journal entry {entry_id} was posted by {origin} and cannot be reversed directly")]
    DocumentOwned {
        /// The entry.
        entry_id: Uuid,
        /// What generated the entry.
        origin: &'static str,
    },

    // ========== Consistency Errors ==========
    /// An engine-generated posting failed to balance.
    #[error("Generated {origin} posting is not balanced. Debit: {debit}, Credit: {credit}")]
    GeneratedUnbalanced {
        /// What generated the posting.
        origin: &'static str,
        /// Total debits.
        debit: Decimal,
        /// Total credits.
        credit: Decimal,
    },
}

impl LedgerError {
    /// Re-labels an imbalance as a consistency failure when the engine built
    /// the lines. Manual submissions stay validation errors.
    #[must_use]
    pub fn for_source(self, source: EntrySource) -> Self {
        match self {
            Self::Unbalanced { debit, credit } if source.is_generated() => {
                Self::GeneratedUnbalanced {
                    origin: source.as_str(),
                    debit,
                    credit,
                }
            }
            other => other,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientLines => "INSUFFICIENT_LINES",
            Self::InvalidLine { .. } => "INVALID_LINE",
            Self::SingleSided => "SINGLE_SIDED_ENTRY",
            Self::Unbalanced { .. } => "UNBALANCED_ENTRY",
            Self::MissingMemo => "MISSING_MEMO",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::AccountInactive(_) => "ACCOUNT_INACTIVE",
            Self::DuplicateAccountNumber(_) => "DUPLICATE_ACCOUNT_NUMBER",
            Self::ParentCategoryMismatch { .. } => "PARENT_CATEGORY_MISMATCH",
            Self::SystemAccountProtected(_) => "SYSTEM_ACCOUNT_PROTECTED",
            Self::SystemAccountMissing(_) => "SYSTEM_ACCOUNT_MISSING",
            Self::EntryNotFound(_) => "ENTRY_NOT_FOUND",
            Self::AlreadyReversed(_) => "ALREADY_REVERSED",
            Self::DocumentOwned { .. } => "DOCUMENT_OWNED_ENTRY",
            Self::GeneratedUnbalanced { .. } => "GENERATED_ENTRY_UNBALANCED",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation errors
            Self::InsufficientLines
            | Self::InvalidLine { .. }
            | Self::SingleSided
            | Self::Unbalanced { .. }
            | Self::MissingMemo
            | Self::ParentCategoryMismatch { .. } => 400,

            // 404 Not Found - inactive accounts are treated as missing for posting
            Self::AccountNotFound(_) | Self::AccountInactive(_) | Self::EntryNotFound(_) => 404,

            // 409 Conflict
            Self::DuplicateAccountNumber(_)
            | Self::SystemAccountProtected(_)
            | Self::AlreadyReversed(_)
            | Self::DocumentOwned { .. } => 409,

            // 500 Internal Server Error
            Self::SystemAccountMissing(_) | Self::GeneratedUnbalanced { .. } => 500,
        }
    }

    /// Returns true when the ledger's own invariants were broken.
    #[must_use]
    pub fn is_consistency_error(&self) -> bool {
        matches!(
            self,
            Self::GeneratedUnbalanced { .. } | Self::SystemAccountMissing(_)
        )
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        if err.is_consistency_error() {
            Self::Consistency(err.to_string())
        } else {
            Self::from_status(err.http_status_code(), err.to_string())
        }
    }
}
