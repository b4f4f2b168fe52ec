//! Fulfillment error types.

use tally_shared::AppError;
use thiserror::Error;
use uuid::Uuid;

use super::types::StockShortfall;

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum FulfillmentError {
    /// Order has no lines.
    #[error("Sales order must have at least one line")]
    NoLines,

    /// Line quantity must be positive.
    #[error("Line {index}: quantity must be greater than zero")]
    InvalidQuantity {
        /// Zero-based line position.
        index: usize,
    },

    /// Line price must not be negative.
    #[error("Line {index}: unit price cannot be negative")]
    InvalidPrice {
        /// Zero-based line position.
        index: usize,
    },

    /// Customer does not exist in the tenant.
    #[error("Customer not found: {0}")]
    CustomerNotFound(Uuid),

    /// Product referenced by a line does not exist in the tenant.
    #[error("Product not found: {0}")]
    ProductNotFound(Uuid),

    /// Order does not exist in the tenant.
    #[error("Sales order not found: {0}")]
    OrderNotFound(Uuid),

    /// Order is not in DRAFT.
    #[error("Sales order is {status}; only DRAFT orders can be {action}")]
    NotDraft {
        /// Current status.
        status: &'static str,
        /// Attempted action.
        action: &'static str,
    },

    /// One or more lines exceed stock on hand.
    #[error("{}", join_shortfalls(.shortfalls))]
    InsufficientStock {
        /// Offending lines.
        shortfalls: Vec<StockShortfall>,
    },

    /// Stock adjustment would go negative.
    #[error("Stock for product {product_id} cannot go below zero (on hand {on_hand}, change {delta})")]
    NegativeStock {
        /// Product being adjusted.
        product_id: Uuid,
        /// Units on hand.
        on_hand: i32,
        /// Requested change.
        delta: i32,
    },

    /// Order number already used in the tenant.
    #[error("Order number {0} already exists")]
    DuplicateOrderNumber(String),

    /// SKU already used in the tenant.
    #[error("SKU {0} already exists")]
    DuplicateSku(String),
}

fn join_shortfalls(shortfalls: &[StockShortfall]) -> String {
    shortfalls
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl FulfillmentError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NoLines => "NO_LINES",
            Self::InvalidQuantity { .. } => "INVALID_QUANTITY",
            Self::InvalidPrice { .. } => "INVALID_PRICE",
            Self::CustomerNotFound(_) => "CUSTOMER_NOT_FOUND",
            Self::ProductNotFound(_) => "PRODUCT_NOT_FOUND",
            Self::OrderNotFound(_) => "ORDER_NOT_FOUND",
            Self::NotDraft { .. } => "ORDER_NOT_DRAFT",
            Self::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            Self::NegativeStock { .. } => "NEGATIVE_STOCK",
            Self::DuplicateOrderNumber(_) => "DUPLICATE_ORDER_NUMBER",
            Self::DuplicateSku(_) => "DUPLICATE_SKU",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::NoLines
            | Self::InvalidQuantity { .. }
            | Self::InvalidPrice { .. }
            | Self::CustomerNotFound(_)
            | Self::ProductNotFound(_) => 400,
            Self::OrderNotFound(_) => 404,
            Self::NotDraft { .. }
            | Self::InsufficientStock { .. }
            | Self::NegativeStock { .. }
            | Self::DuplicateOrderNumber(_)
            | Self::DuplicateSku(_) => 409,
        }
    }
}

impl From<FulfillmentError> for AppError {
    fn from(err: FulfillmentError) -> Self {
        Self::from_status(err.http_status_code(), err.to_string())
    }
}
