//! Sales order domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::ProductId;

/// Sales order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Editable, nothing reserved.
    Draft,
    /// Stock deducted and invoice raised. Terminal.
    Confirmed,
    /// Withdrawn before confirmation. Terminal.
    Cancelled,
}

impl OrderStatus {
    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Confirmed => "CONFIRMED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

/// A requested order line.
#[derive(Debug, Clone)]
pub struct NewOrderLine {
    /// Ordered product.
    pub product_id: ProductId,
    /// Units ordered.
    pub quantity: i32,
    /// Price per unit. Defaults to the product's price when absent.
    pub unit_price: Option<Decimal>,
}

/// One order line checked against the locked product row.
#[derive(Debug, Clone)]
pub struct StockCheck {
    /// Product on the line.
    pub product_id: ProductId,
    /// Product name, for error messages.
    pub product_name: String,
    /// Units ordered.
    pub requested: i32,
    /// Units on hand.
    pub available: i32,
}

/// A line that cannot be filled from stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockShortfall {
    /// Product on the line.
    pub product_id: ProductId,
    /// Product name.
    pub product_name: String,
    /// Units ordered across every line for the product.
    pub requested: i64,
    /// Units on hand.
    pub available: i32,
}

impl std::fmt::Display for StockShortfall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Insufficient stock for {} (Requested: {}, Available: {})",
            self.product_name, self.requested, self.available
        )
    }
}
