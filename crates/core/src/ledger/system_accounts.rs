//! The system chart of accounts seeded for every tenant.
//!
//! Invoice, payment and bill postings refer to these accounts by number, so
//! they can be renamed but never deleted.

use serde::{Deserialize, Serialize};

use super::types::AccountType;

/// Accounts the engine posts to without user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SystemAccount {
    /// 1000 Cash on Hand.
    CashOnHand,
    /// 1010 Checking Account.
    Checking,
    /// 1200 Accounts Receivable.
    AccountsReceivable,
    /// 1250 Undeposited Funds.
    UndepositedFunds,
    /// 2000 Accounts Payable.
    AccountsPayable,
    /// 3000 Owner's Equity.
    OwnersEquity,
    /// 4000 Sales Income.
    SalesIncome,
    /// 5000 Cost of Goods Sold.
    CostOfGoodsSold,
    /// 6000 Purchases.
    Purchases,
}

impl SystemAccount {
    /// Every system account, in chart order.
    pub const ALL: [Self; 9] = [
        Self::CashOnHand,
        Self::Checking,
        Self::AccountsReceivable,
        Self::UndepositedFunds,
        Self::AccountsPayable,
        Self::OwnersEquity,
        Self::SalesIncome,
        Self::CostOfGoodsSold,
        Self::Purchases,
    ];

    /// Stable account number.
    #[must_use]
    pub const fn number(self) -> &'static str {
        match self {
            Self::CashOnHand => "1000",
            Self::Checking => "1010",
            Self::AccountsReceivable => "1200",
            Self::UndepositedFunds => "1250",
            Self::AccountsPayable => "2000",
            Self::OwnersEquity => "3000",
            Self::SalesIncome => "4000",
            Self::CostOfGoodsSold => "5000",
            Self::Purchases => "6000",
        }
    }

    /// Default display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::CashOnHand => "Cash on Hand",
            Self::Checking => "Checking Account",
            Self::AccountsReceivable => "Accounts Receivable",
            Self::UndepositedFunds => "Undeposited Funds",
            Self::AccountsPayable => "Accounts Payable",
            Self::OwnersEquity => "Owner's Equity",
            Self::SalesIncome => "Sales Income",
            Self::CostOfGoodsSold => "Cost of Goods Sold",
            Self::Purchases => "Purchases",
        }
    }

    /// Account type the seeded row carries.
    #[must_use]
    pub const fn account_type(self) -> AccountType {
        match self {
            Self::CashOnHand | Self::Checking => AccountType::Bank,
            Self::AccountsReceivable => AccountType::AccountsReceivable,
            Self::UndepositedFunds => AccountType::OtherCurrentAsset,
            Self::AccountsPayable => AccountType::AccountsPayable,
            Self::OwnersEquity => AccountType::Equity,
            Self::SalesIncome => AccountType::Income,
            Self::CostOfGoodsSold => AccountType::CostOfGoodsSold,
            Self::Purchases => AccountType::Expense,
        }
    }

    /// Looks up a system account by number.
    #[must_use]
    pub fn from_number(number: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.number() == number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_numbers_are_unique() {
        let numbers: HashSet<_> = SystemAccount::ALL.iter().map(|a| a.number()).collect();
        assert_eq!(numbers.len(), SystemAccount::ALL.len());
    }

    #[test]
    fn test_from_number_round_trip() {
        for account in SystemAccount::ALL {
            assert_eq!(SystemAccount::from_number(account.number()), Some(account));
        }
        assert_eq!(SystemAccount::from_number("9999"), None);
    }

    #[test]
    fn test_control_account_types() {
        assert_eq!(
            SystemAccount::AccountsReceivable.account_type(),
            AccountType::AccountsReceivable
        );
        assert_eq!(
            SystemAccount::AccountsPayable.account_type(),
            AccountType::AccountsPayable
        );
        assert_eq!(SystemAccount::SalesIncome.account_type(), AccountType::Income);
    }
}
