//! Invoice domain types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{CustomerId, SalesOrderId};

use crate::settlement::Settleable;

/// Persisted invoice status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    /// Being prepared; nothing posted.
    Draft,
    /// Issued to the customer; A/R posted.
    Sent,
    /// Some payments received.
    PartiallyPaid,
    /// Fully settled.
    Paid,
    /// Withdrawn. Terminal.
    Cancelled,
}

impl InvoiceStatus {
    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Sent => "SENT",
            Self::PartiallyPaid => "PARTIALLY_PAID",
            Self::Paid => "PAID",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// True once the A/R posting exists.
    #[must_use]
    pub const fn is_posted(self) -> bool {
        !matches!(self, Self::Draft | Self::Cancelled)
    }
}

impl Settleable for InvoiceStatus {
    fn accepts_settlement(self) -> bool {
        matches!(self, Self::Sent | Self::PartiallyPaid)
    }

    fn is_closed(self) -> bool {
        matches!(self, Self::Paid | Self::Cancelled)
    }

    fn as_str(self) -> &'static str {
        Self::as_str(self)
    }
}

/// Status shown to clients, including the derived OVERDUE state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisplayStatus {
    /// See [`InvoiceStatus::Draft`].
    Draft,
    /// See [`InvoiceStatus::Sent`].
    Sent,
    /// See [`InvoiceStatus::PartiallyPaid`].
    PartiallyPaid,
    /// See [`InvoiceStatus::Paid`].
    Paid,
    /// Past due with an amount still owing.
    Overdue,
    /// See [`InvoiceStatus::Cancelled`].
    Cancelled,
}

impl From<InvoiceStatus> for DisplayStatus {
    fn from(status: InvoiceStatus) -> Self {
        match status {
            InvoiceStatus::Draft => Self::Draft,
            InvoiceStatus::Sent => Self::Sent,
            InvoiceStatus::PartiallyPaid => Self::PartiallyPaid,
            InvoiceStatus::Paid => Self::Paid,
            InvoiceStatus::Cancelled => Self::Cancelled,
        }
    }
}

/// Input for creating an invoice.
#[derive(Debug, Clone)]
pub struct NewInvoice {
    /// Billed customer.
    pub customer_id: CustomerId,
    /// Invoice date.
    pub date: NaiveDate,
    /// Payment due date.
    pub due_date: NaiveDate,
    /// Invoice total.
    pub total_amount: Decimal,
    /// Originating sales order, if any.
    pub sales_order_id: Option<SalesOrderId>,
}
