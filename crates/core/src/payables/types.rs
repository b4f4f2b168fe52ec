//! Bill domain types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::SupplierId;

use crate::settlement::Settleable;

/// Persisted bill status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillStatus {
    /// Entered, not yet approved.
    Draft,
    /// Approved and owed; A/P posted.
    Open,
    /// Some payments made.
    PartiallyPaid,
    /// Fully paid.
    Paid,
    /// Withdrawn. Terminal.
    Cancelled,
}

impl BillStatus {
    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Open => "OPEN",
            Self::PartiallyPaid => "PARTIALLY_PAID",
            Self::Paid => "PAID",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// True once the A/P posting exists.
    #[must_use]
    pub const fn is_posted(self) -> bool {
        !matches!(self, Self::Draft | Self::Cancelled)
    }
}

impl Settleable for BillStatus {
    fn accepts_settlement(self) -> bool {
        matches!(self, Self::Open | Self::PartiallyPaid)
    }

    fn is_closed(self) -> bool {
        matches!(self, Self::Paid | Self::Cancelled)
    }

    fn as_str(self) -> &'static str {
        Self::as_str(self)
    }
}

/// Bill status shown to clients, with OVERDUE derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillDisplayStatus {
    /// See [`BillStatus::Draft`].
    Draft,
    /// See [`BillStatus::Open`].
    Open,
    /// See [`BillStatus::PartiallyPaid`].
    PartiallyPaid,
    /// See [`BillStatus::Paid`].
    Paid,
    /// Past due with an amount still owing.
    Overdue,
    /// See [`BillStatus::Cancelled`].
    Cancelled,
}

impl From<BillStatus> for BillDisplayStatus {
    fn from(status: BillStatus) -> Self {
        match status {
            BillStatus::Draft => Self::Draft,
            BillStatus::Open => Self::Open,
            BillStatus::PartiallyPaid => Self::PartiallyPaid,
            BillStatus::Paid => Self::Paid,
            BillStatus::Cancelled => Self::Cancelled,
        }
    }
}

/// Input for entering a bill.
#[derive(Debug, Clone)]
pub struct NewBill {
    /// Supplier that issued the bill.
    pub supplier_id: SupplierId,
    /// Bill date.
    pub date: NaiveDate,
    /// Payment due date.
    pub due_date: NaiveDate,
    /// Bill total.
    pub total_amount: Decimal,
}
