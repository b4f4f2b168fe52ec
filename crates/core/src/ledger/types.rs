//! Ledger domain types for account classification and entry posting.
//!
//! This module defines the core types used for creating and validating
//! journal entries in the double-entry bookkeeping system.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{AccountId, TenantId};

use super::balance::NormalBalance;

/// Detailed account type, as stored on every account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    /// Cash and bank accounts.
    Bank,
    /// Amounts owed by customers.
    AccountsReceivable,
    /// Short-term assets other than cash and receivables.
    OtherCurrentAsset,
    /// Property, plant and equipment.
    FixedAsset,
    /// Long-term assets.
    OtherAsset,
    /// Amounts owed to suppliers.
    AccountsPayable,
    /// Credit card balances.
    CreditCard,
    /// Short-term liabilities.
    OtherCurrentLiability,
    /// Loans and other long-term liabilities.
    LongTermLiability,
    /// Owner's equity.
    Equity,
    /// Operating income.
    Income,
    /// Non-operating income.
    OtherIncome,
    /// Direct cost of goods sold.
    CostOfGoodsSold,
    /// Operating expenses.
    Expense,
    /// Non-operating expenses.
    OtherExpense,
}

impl AccountType {
    /// Every account type, in chart order.
    pub const ALL: [Self; 15] = [
        Self::Bank,
        Self::AccountsReceivable,
        Self::OtherCurrentAsset,
        Self::FixedAsset,
        Self::OtherAsset,
        Self::AccountsPayable,
        Self::CreditCard,
        Self::OtherCurrentLiability,
        Self::LongTermLiability,
        Self::Equity,
        Self::Income,
        Self::OtherIncome,
        Self::CostOfGoodsSold,
        Self::Expense,
        Self::OtherExpense,
    ];

    /// Returns the top-level category this type rolls up into.
    #[must_use]
    pub const fn category(self) -> AccountCategory {
        match self {
            Self::Bank
            | Self::AccountsReceivable
            | Self::OtherCurrentAsset
            | Self::FixedAsset
            | Self::OtherAsset => AccountCategory::Asset,
            Self::AccountsPayable
            | Self::CreditCard
            | Self::OtherCurrentLiability
            | Self::LongTermLiability => AccountCategory::Liability,
            Self::Equity => AccountCategory::Equity,
            Self::Income | Self::OtherIncome => AccountCategory::Income,
            Self::CostOfGoodsSold => AccountCategory::CostOfGoodsSold,
            Self::Expense | Self::OtherExpense => AccountCategory::Expense,
        }
    }

    /// Returns which side increases accounts of this type.
    #[must_use]
    pub const fn normal_balance(self) -> NormalBalance {
        self.category().normal_balance()
    }

    /// Returns the wire name, e.g. `ACCOUNTS_RECEIVABLE`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bank => "BANK",
            Self::AccountsReceivable => "ACCOUNTS_RECEIVABLE",
            Self::OtherCurrentAsset => "OTHER_CURRENT_ASSET",
            Self::FixedAsset => "FIXED_ASSET",
            Self::OtherAsset => "OTHER_ASSET",
            Self::AccountsPayable => "ACCOUNTS_PAYABLE",
            Self::CreditCard => "CREDIT_CARD",
            Self::OtherCurrentLiability => "OTHER_CURRENT_LIABILITY",
            Self::LongTermLiability => "LONG_TERM_LIABILITY",
            Self::Equity => "EQUITY",
            Self::Income => "INCOME",
            Self::OtherIncome => "OTHER_INCOME",
            Self::CostOfGoodsSold => "COST_OF_GOODS_SOLD",
            Self::Expense => "EXPENSE",
            Self::OtherExpense => "OTHER_EXPENSE",
        }
    }
}

/// The six top-level account categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountCategory {
    /// Things the business owns.
    Asset,
    /// Things the business owes.
    Liability,
    /// Owner's stake.
    Equity,
    /// Revenue.
    Income,
    /// Cost of goods sold.
    CostOfGoodsSold,
    /// Operating and other expenses.
    Expense,
}

impl AccountCategory {
    /// Debit-normal: Asset, COGS, Expense. Credit-normal: the rest.
    #[must_use]
    pub const fn normal_balance(self) -> NormalBalance {
        match self {
            Self::Asset | Self::CostOfGoodsSold | Self::Expense => NormalBalance::Debit,
            Self::Liability | Self::Equity | Self::Income => NormalBalance::Credit,
        }
    }

    /// True for categories that appear on the balance sheet.
    #[must_use]
    pub const fn is_balance_sheet(self) -> bool {
        matches!(self, Self::Asset | Self::Liability | Self::Equity)
    }
}

/// What produced a journal entry.
///
/// Manual entries come from a user; everything else is generated by the engine
/// and must balance by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntrySource {
    /// Hand-keyed journal entry.
    Manual,
    /// Invoice leaving DRAFT.
    Invoice,
    /// Customer payment.
    Payment,
    /// Credit memo applied to an invoice.
    CreditMemo,
    /// Supplier bill approval.
    Bill,
    /// Payment against a supplier bill.
    BillPayment,
    /// Cash sale without an invoice.
    SalesReceipt,
    /// Check written against a bank account.
    Check,
    /// Reversal of an earlier entry.
    Reversal,
}

impl EntrySource {
    /// Returns true if the engine, not a user, built the lines.
    #[must_use]
    pub const fn is_generated(self) -> bool {
        !matches!(self, Self::Manual)
    }

    /// Returns the stored name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Invoice => "invoice",
            Self::Payment => "payment",
            Self::CreditMemo => "credit_memo",
            Self::Bill => "bill",
            Self::BillPayment => "bill_payment",
            Self::SalesReceipt => "sales_receipt",
            Self::Check => "check",
            Self::Reversal => "reversal",
        }
    }
}

/// Input for a single journal line.
///
/// Exactly one of `debit` / `credit` must be nonzero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLineInput {
    /// The account to post to.
    pub account_id: AccountId,
    /// Debit amount, zero on credit lines.
    #[serde(default)]
    pub debit: Decimal,
    /// Credit amount, zero on debit lines.
    #[serde(default)]
    pub credit: Decimal,
    /// Optional line memo.
    #[serde(default)]
    pub memo: Option<String>,
}

impl JournalLineInput {
    /// Creates a debit line.
    #[must_use]
    pub fn debit(account_id: AccountId, amount: Decimal, memo: impl Into<String>) -> Self {
        Self {
            account_id,
            debit: amount,
            credit: Decimal::ZERO,
            memo: Some(memo.into()),
        }
    }

    /// Creates a credit line.
    #[must_use]
    pub fn credit(account_id: AccountId, amount: Decimal, memo: impl Into<String>) -> Self {
        Self {
            account_id,
            debit: Decimal::ZERO,
            credit: amount,
            memo: Some(memo.into()),
        }
    }

    /// Signed amount: positive for debits, negative for credits.
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        self.debit - self.credit
    }
}

/// Input for posting a journal entry.
#[derive(Debug, Clone)]
pub struct PostEntryInput {
    /// The tenant that owns the entry.
    pub tenant_id: TenantId,
    /// Accounting date.
    pub date: NaiveDate,
    /// Entry memo.
    pub memo: String,
    /// Period-end adjusting entry.
    pub is_adjusting: bool,
    /// What produced this entry.
    pub source: EntrySource,
    /// Lines in posting order.
    pub lines: Vec<JournalLineInput>,
}

/// Debit and credit sums for an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryTotals {
    /// Total debits.
    pub debit: Decimal,
    /// Total credits.
    pub credit: Decimal,
    /// Whether debits equal credits exactly.
    pub is_balanced: bool,
}

impl EntryTotals {
    /// Creates totals from debit and credit sums.
    #[must_use]
    pub fn new(debit: Decimal, credit: Decimal) -> Self {
        Self {
            debit,
            credit,
            is_balanced: debit == credit,
        }
    }

    /// Returns the difference between debits and credits.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        self.debit - self.credit
    }
}

/// Formats a journal entry number from its per-tenant sequence value.
#[must_use]
pub fn format_entry_number(sequence: i64) -> String {
    format!("JE-{sequence:06}")
}
