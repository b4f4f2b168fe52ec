//! Report data types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{AccountId, JournalEntryId};
use uuid::Uuid;

use super::aging::AgingBucket;
use crate::ledger::{AccountType, EntrySource};

/// An account and its signed (normal-side positive) balance or activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountBalance {
    /// Account ID.
    pub account_id: AccountId,
    /// Account number.
    pub account_number: String,
    /// Account name.
    pub name: String,
    /// Detailed type.
    pub account_type: AccountType,
    /// Balance (or period activity), positive on the normal side.
    pub balance: Decimal,
}

// ============================================================================
// Trial Balance
// ============================================================================

/// Trial balance row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialBalanceRow {
    /// Account ID.
    pub account_id: AccountId,
    /// Account number.
    pub account_number: String,
    /// Account name.
    pub name: String,
    /// Detailed type.
    pub account_type: AccountType,
    /// Debit column.
    pub debit: Decimal,
    /// Credit column.
    pub credit: Decimal,
}

/// Trial balance report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialBalanceReport {
    /// As of date.
    pub as_of: NaiveDate,
    /// One row per account with a nonzero balance.
    pub rows: Vec<TrialBalanceRow>,
    /// Sum of the debit column.
    pub total_debit: Decimal,
    /// Sum of the credit column.
    pub total_credit: Decimal,
    /// Whether debits equal credits.
    pub is_balanced: bool,
}

// ============================================================================
// Profit & Loss
// ============================================================================

/// Account line within a statement section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementLine {
    /// Account ID, absent for computed lines.
    pub account_id: Option<AccountId>,
    /// Account number, absent for computed lines.
    pub account_number: Option<String>,
    /// Line label.
    pub name: String,
    /// Amount, positive on the section's normal side.
    pub amount: Decimal,
}

/// Statement section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatementSection {
    /// Section total.
    pub total: Decimal,
    /// Lines in this section.
    pub lines: Vec<StatementLine>,
}

/// Profit and loss report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfitLossReport {
    /// Period start date.
    pub from: NaiveDate,
    /// Period end date.
    pub to: NaiveDate,
    /// Income and other income.
    pub income: StatementSection,
    /// Cost of goods sold.
    pub cost_of_goods_sold: StatementSection,
    /// Gross profit (income - COGS).
    pub gross_profit: Decimal,
    /// Expenses and other expenses.
    pub expenses: StatementSection,
    /// Net income (gross profit - expenses).
    pub net_income: Decimal,
}

// ============================================================================
// Balance Sheet
// ============================================================================

/// Balance sheet report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceSheetReport {
    /// As of date.
    pub as_of: NaiveDate,
    /// Assets section.
    pub assets: StatementSection,
    /// Liabilities section.
    pub liabilities: StatementSection,
    /// Equity section, including the computed current earnings line.
    pub equity: StatementSection,
    /// Cumulative income - COGS - expenses up to `as_of`.
    pub current_earnings: Decimal,
    /// Total assets.
    pub total_assets: Decimal,
    /// Total liabilities.
    pub total_liabilities: Decimal,
    /// Total equity.
    pub total_equity: Decimal,
    /// Liabilities plus equity.
    pub liabilities_and_equity: Decimal,
    /// Whether assets equal liabilities plus equity.
    pub is_balanced: bool,
}

// ============================================================================
// Aging
// ============================================================================

/// Which side of the ledger an aging report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgingKind {
    /// Customer invoices.
    Receivables,
    /// Supplier bills.
    Payables,
}

/// An open invoice or bill to be aged.
#[derive(Debug, Clone)]
pub struct OpenDocument {
    /// Invoice or bill ID.
    pub id: Uuid,
    /// Invoice or bill number.
    pub number: String,
    /// Customer or supplier name.
    pub party_name: String,
    /// Due date.
    pub due_date: NaiveDate,
    /// Outstanding amount.
    pub amount_due: Decimal,
}

/// A document placed in its bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgedDocument {
    /// Invoice or bill ID.
    pub id: Uuid,
    /// Invoice or bill number.
    pub number: String,
    /// Due date.
    pub due_date: NaiveDate,
    /// Days past due (zero or negative when not yet due).
    pub days_past_due: i64,
    /// Outstanding amount.
    pub amount_due: Decimal,
    /// Assigned bucket.
    pub bucket: AgingBucket,
}

/// Per-bucket totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketTotals {
    /// Not yet due.
    pub current: Decimal,
    /// 1-30 days past due.
    pub days_1_30: Decimal,
    /// 31-60 days past due.
    pub days_31_60: Decimal,
    /// 61-90 days past due.
    pub days_61_90: Decimal,
    /// More than 90 days past due.
    pub over_90: Decimal,
    /// Sum of all buckets.
    pub total: Decimal,
}

/// Aging row for one customer or supplier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgingRow {
    /// Customer or supplier name.
    pub party_name: String,
    /// Bucket totals for this party.
    pub buckets: BucketTotals,
    /// Contributing documents.
    pub documents: Vec<AgedDocument>,
}

/// Aging report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgingReport {
    /// Receivables or payables.
    pub kind: AgingKind,
    /// Date ages are measured from.
    pub as_of: NaiveDate,
    /// One row per party, sorted by name.
    pub rows: Vec<AgingRow>,
    /// Column totals.
    pub totals: BucketTotals,
    /// Sum of every open document's amount due.
    pub grand_total: Decimal,
}

// ============================================================================
// Sales Summary
// ============================================================================

/// An invoice as seen by the sales summary.
#[derive(Debug, Clone)]
pub struct SalesInvoice {
    /// Invoice date.
    pub date: NaiveDate,
    /// Invoice total.
    pub total_amount: Decimal,
    /// Amount settled so far.
    pub amount_paid: Decimal,
}

/// Revenue for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlySales {
    /// Month as `YYYY-MM`.
    pub month: String,
    /// Invoiced total.
    pub revenue: Decimal,
    /// Invoice count.
    pub count: u64,
}

/// Sales summary report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesSummaryReport {
    /// Period start date.
    pub from: NaiveDate,
    /// Period end date.
    pub to: NaiveDate,
    /// Total invoiced.
    pub total_invoiced: Decimal,
    /// Total collected against those invoices.
    pub total_collected: Decimal,
    /// Invoiced minus collected.
    pub outstanding: Decimal,
    /// Number of invoices.
    pub invoice_count: u64,
    /// Average invoice total, rounded to cents.
    pub average_invoice: Decimal,
    /// Most recent months first, at most 12.
    pub monthly: Vec<MonthlySales>,
}

// ============================================================================
// General Ledger
// ============================================================================

/// A posted line as loaded for the general ledger.
#[derive(Debug, Clone)]
pub struct PostedLine {
    /// Entry ID.
    pub entry_id: JournalEntryId,
    /// Entry number.
    pub entry_number: String,
    /// Entry date.
    pub date: NaiveDate,
    /// Account ID.
    pub account_id: AccountId,
    /// Account number.
    pub account_number: String,
    /// Account name.
    pub account_name: String,
    /// Detailed type.
    pub account_type: AccountType,
    /// Line memo, falling back to the entry memo.
    pub description: String,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// What produced the entry.
    pub source: EntrySource,
}

/// General ledger row with running balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralLedgerRow {
    /// Entry ID.
    pub entry_id: JournalEntryId,
    /// Entry number.
    pub entry_number: String,
    /// Entry date.
    pub date: NaiveDate,
    /// Description.
    pub description: String,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// What produced the entry.
    pub source: EntrySource,
    /// Balance after this line, positive on the normal side.
    pub running_balance: Decimal,
}

/// One account's section of the general ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralLedgerAccount {
    /// Account ID.
    pub account_id: AccountId,
    /// Account number.
    pub account_number: String,
    /// Account name.
    pub name: String,
    /// Balance before the period.
    pub opening_balance: Decimal,
    /// Lines in date order.
    pub rows: Vec<GeneralLedgerRow>,
    /// Balance after the period.
    pub closing_balance: Decimal,
}

/// General ledger report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralLedgerReport {
    /// Period start date.
    pub from: NaiveDate,
    /// Period end date.
    pub to: NaiveDate,
    /// Accounts with activity, by account number.
    pub accounts: Vec<GeneralLedgerAccount>,
    /// Sum of all debits in the period.
    pub total_debit: Decimal,
    /// Sum of all credits in the period.
    pub total_credit: Decimal,
}
