//! Account balance calculations.
//!
//! A posting changes an account's balance by `debit - credit` for debit-normal
//! accounts and by `credit - debit` for credit-normal ones. Posting is the only
//! way a stored balance changes, so replaying every posting must reproduce it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Which side increases an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalBalance {
    /// Debit-normal accounts (Asset, COGS, Expense).
    Debit,
    /// Credit-normal accounts (Liability, Equity, Income).
    Credit,
}

impl NormalBalance {
    /// Calculates the balance change for a single posting.
    #[must_use]
    pub fn calculate_balance_change(self, debit: Decimal, credit: Decimal) -> Decimal {
        match self {
            Self::Debit => debit - credit,
            Self::Credit => credit - debit,
        }
    }

    /// Replays a sequence of `(debit, credit)` postings from zero.
    #[must_use]
    pub fn replay<I>(self, postings: I) -> Decimal
    where
        I: IntoIterator<Item = (Decimal, Decimal)>,
    {
        postings
            .into_iter()
            .map(|(debit, credit)| self.calculate_balance_change(debit, credit))
            .sum()
    }

    /// Splits a signed balance into `(debit, credit)` trial balance columns.
    ///
    /// A positive balance sits in the normal column. A negative balance goes,
    /// as its absolute value, into the opposite column.
    #[must_use]
    pub fn split_columns(self, balance: Decimal) -> (Decimal, Decimal) {
        let magnitude = balance.abs();
        let on_normal_side = balance >= Decimal::ZERO;
        match (self, on_normal_side) {
            (Self::Debit, true) | (Self::Credit, false) => (magnitude, Decimal::ZERO),
            (Self::Debit, false) | (Self::Credit, true) => (Decimal::ZERO, magnitude),
        }
    }
}

/// Running balance for a single posted line, as shown in the general ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunningBalance {
    /// Balance before this line.
    pub previous_balance: Decimal,
    /// Balance after this line.
    pub current_balance: Decimal,
}

impl RunningBalance {
    /// Running balance for the first line on an account.
    #[must_use]
    pub fn first_entry(balance_change: Decimal) -> Self {
        Self {
            previous_balance: Decimal::ZERO,
            current_balance: balance_change,
        }
    }

    /// Running balance following `previous`.
    #[must_use]
    pub fn next_entry(previous: &Self, balance_change: Decimal) -> Self {
        Self {
            previous_balance: previous.current_balance,
            current_balance: previous.current_balance + balance_change,
        }
    }
}
