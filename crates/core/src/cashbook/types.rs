//! Cash transaction types.

use serde::{Deserialize, Serialize};

use crate::ledger::AccountInfo;

/// Status shared by sales receipts and checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CashDocumentStatus {
    /// Posted to the ledger.
    Posted,
    /// Reversed. Terminal.
    Void,
}

impl CashDocumentStatus {
    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Posted => "POSTED",
            Self::Void => "VOID",
        }
    }
}

/// The two accounts a check moves money between.
#[derive(Debug, Clone)]
pub struct CheckAccounts {
    /// Account the check is drawn on.
    pub bank: AccountInfo,
    /// Account charged with the spend.
    pub expense: AccountInfo,
}
