//! Payment domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ledger::SystemAccount;

/// How a payment was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Notes and coins.
    Cash,
    /// Bank transfer or cheque.
    Bank,
    /// Card payment, settled later by the processor.
    CreditCard,
    /// Anything else.
    Other,
}

impl PaymentMethod {
    /// Account that receives (or disburses) the money.
    #[must_use]
    pub const fn cash_account(self) -> SystemAccount {
        match self {
            Self::Cash => SystemAccount::CashOnHand,
            Self::Bank => SystemAccount::Checking,
            Self::CreditCard | Self::Other => SystemAccount::UndepositedFunds,
        }
    }

    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "CASH",
            Self::Bank => "BANK",
            Self::CreditCard => "CREDIT_CARD",
            Self::Other => "OTHER",
        }
    }
}

/// The terms a payment request commits to.
///
/// Two requests under one idempotency key must carry the same intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentIntent {
    /// Document being settled.
    pub document_id: Uuid,
    /// Amount applied.
    pub amount: Decimal,
    /// How the money arrived.
    pub method: PaymentMethod,
}

/// Credit memo status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreditMemoStatus {
    /// Applied to its invoice.
    Applied,
    /// Reversed. Terminal.
    Void,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cash_account_by_method() {
        assert_eq!(PaymentMethod::Cash.cash_account().number(), "1000");
        assert_eq!(PaymentMethod::Bank.cash_account().number(), "1010");
        assert_eq!(PaymentMethod::CreditCard.cash_account().number(), "1250");
        assert_eq!(PaymentMethod::Other.cash_account().number(), "1250");
    }

    #[test]
    fn test_method_wire_names() {
        let json = serde_json::to_string(&PaymentMethod::CreditCard).unwrap();
        assert_eq!(json, "\"CREDIT_CARD\"");
        let parsed: PaymentMethod = serde_json::from_str("\"BANK\"").unwrap();
        assert_eq!(parsed, PaymentMethod::Bank);
    }
}
