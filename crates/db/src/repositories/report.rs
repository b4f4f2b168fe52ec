//! Report repository for financial report database operations.
//!
//! Every report reads inside one repeatable-read, read-only transaction, so
//! all the queries behind a report see the same committed snapshot. The
//! arithmetic lives in `tally_core::reports`; this module only loads rows.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    AccessMode, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr,
    EntityTrait, FromQueryResult, IsolationLevel, JoinType, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, TransactionTrait, sea_query::Expr,
};
use tally_core::ledger::AccountType as DomainAccountType;
use tally_core::reports::{
    AccountBalance, AgingKind, AgingReport, AgingService, BalanceSheetReport, GeneralLedgerReport,
    OpenDocument, PostedLine, ProfitLossReport, ReportError, ReportService, SalesInvoice,
    SalesSummaryReport, TrialBalanceReport,
};
use tally_core::settlement;
use tally_shared::AppError;
use tally_shared::types::{AccountId, JournalEntryId, TenantId};
use tracing::debug;
use uuid::Uuid;

use super::database_error;
use crate::entities::sea_orm_active_enums::{AccountType, BillStatus, EntrySource, InvoiceStatus};
use crate::entities::{accounts, bills, customers, invoices, journal_entries, journal_lines, suppliers};

/// Error types for report operations.
#[derive(Debug, thiserror::Error)]
pub enum ReportStoreError {
    /// Invalid parameters or an out-of-balance statement.
    #[error(transparent)]
    Report(#[from] ReportError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<ReportStoreError> for AppError {
    fn from(err: ReportStoreError) -> Self {
        match err {
            ReportStoreError::Report(e) => e.into(),
            ReportStoreError::Database(e) => database_error(&e),
        }
    }
}

/// Report repository.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    db: DatabaseConnection,
}

impl ReportRepository {
    /// Creates a new report repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn snapshot(&self) -> Result<DatabaseTransaction, DbErr> {
        self.db
            .begin_with_config(
                Some(IsolationLevel::RepeatableRead),
                Some(AccessMode::ReadOnly),
            )
            .await
    }

    /// Trial balance as of a date.
    ///
    /// # Errors
    ///
    /// Returns `OutOfBalance` if debits and credits differ, which means the
    /// ledger itself is corrupt.
    pub async fn trial_balance(
        &self,
        tenant_id: TenantId,
        as_of: NaiveDate,
    ) -> Result<TrialBalanceReport, ReportStoreError> {
        let txn = self.snapshot().await?;
        let balances = account_balances(&txn, tenant_id, None, as_of).await?;
        txn.commit().await?;

        let report = ReportService::generate_trial_balance(as_of, balances);
        ReportService::ensure_trial_balance(&report)?;
        debug!(tenant_id = %tenant_id, rows = report.rows.len(), "Trial balance generated");
        Ok(report)
    }

    /// Profit and loss over `from..=to`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` if `from > to`.
    pub async fn profit_loss(
        &self,
        tenant_id: TenantId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<ProfitLossReport, ReportStoreError> {
        ReportService::validate_date_range(from, to)?;

        let txn = self.snapshot().await?;
        let activity = account_balances(&txn, tenant_id, Some(from), to).await?;
        txn.commit().await?;

        Ok(ReportService::generate_profit_loss(from, to, activity))
    }

    /// Balance sheet as of a date, with computed current earnings.
    ///
    /// # Errors
    ///
    /// Returns `OutOfBalance` if the accounting equation does not hold.
    pub async fn balance_sheet(
        &self,
        tenant_id: TenantId,
        as_of: NaiveDate,
    ) -> Result<BalanceSheetReport, ReportStoreError> {
        let txn = self.snapshot().await?;
        let balances = account_balances(&txn, tenant_id, None, as_of).await?;
        txn.commit().await?;

        let report = ReportService::generate_balance_sheet(as_of, balances);
        ReportService::ensure_balance_sheet(&report)?;
        Ok(report)
    }

    /// A/R or A/P aging as of a date.
    ///
    /// Every document that is neither PAID nor CANCELLED counts, DRAFT
    /// included, whatever its date.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn aging(
        &self,
        tenant_id: TenantId,
        kind: AgingKind,
        as_of: NaiveDate,
    ) -> Result<AgingReport, ReportStoreError> {
        let tenant = tenant_id.into_inner();
        let txn = self.snapshot().await?;

        let documents: Vec<OpenDocument> = match kind {
            AgingKind::Receivables => invoices::Entity::find()
                .filter(invoices::Column::TenantId.eq(tenant))
                .filter(
                    invoices::Column::Status
                        .is_not_in([InvoiceStatus::Paid, InvoiceStatus::Cancelled]),
                )
                .find_also_related(customers::Entity)
                .all(&txn)
                .await?
                .into_iter()
                .map(|(invoice, customer)| OpenDocument {
                    id: invoice.id,
                    number: invoice.invoice_number,
                    party_name: customer.map(|c| c.name).unwrap_or_default(),
                    due_date: invoice.due_date,
                    amount_due: settlement::amount_due(invoice.total_amount, invoice.amount_paid),
                })
                .collect(),
            AgingKind::Payables => bills::Entity::find()
                .filter(bills::Column::TenantId.eq(tenant))
                .filter(bills::Column::Status.is_not_in([BillStatus::Paid, BillStatus::Cancelled]))
                .find_also_related(suppliers::Entity)
                .all(&txn)
                .await?
                .into_iter()
                .map(|(bill, supplier)| OpenDocument {
                    id: bill.id,
                    number: bill.bill_number,
                    party_name: supplier.map(|s| s.name).unwrap_or_default(),
                    due_date: bill.due_date,
                    amount_due: settlement::amount_due(bill.total_amount, bill.amount_paid),
                })
                .collect(),
        };
        txn.commit().await?;

        Ok(AgingService::build(kind, as_of, documents))
    }

    /// Sales summary over `from..=to`, excluding DRAFT and CANCELLED invoices.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` if `from > to`.
    pub async fn sales_summary(
        &self,
        tenant_id: TenantId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<SalesSummaryReport, ReportStoreError> {
        ReportService::validate_date_range(from, to)?;

        let txn = self.snapshot().await?;
        let invoices: Vec<SalesInvoice> = invoices::Entity::find()
            .filter(invoices::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(
                invoices::Column::Status
                    .is_not_in([InvoiceStatus::Draft, InvoiceStatus::Cancelled]),
            )
            .filter(invoices::Column::Date.between(from, to))
            .all(&txn)
            .await?
            .into_iter()
            .map(|invoice| SalesInvoice {
                date: invoice.date,
                total_amount: invoice.total_amount,
                amount_paid: invoice.amount_paid,
            })
            .collect();
        txn.commit().await?;

        Ok(ReportService::generate_sales_summary(from, to, &invoices))
    }

    /// General ledger over `from..=to`, optionally for a single account.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` if `from > to`.
    pub async fn general_ledger(
        &self,
        tenant_id: TenantId,
        from: NaiveDate,
        to: NaiveDate,
        account_id: Option<Uuid>,
    ) -> Result<GeneralLedgerReport, ReportStoreError> {
        ReportService::validate_date_range(from, to)?;

        let txn = self.snapshot().await?;
        let openings: HashMap<AccountId, Decimal> = match from.pred_opt() {
            Some(day_before) => account_balances(&txn, tenant_id, None, day_before)
                .await?
                .into_iter()
                .map(|balance| (balance.account_id, balance.balance))
                .collect(),
            None => HashMap::new(),
        };
        let lines = posted_lines(&txn, tenant_id, from, to, account_id).await?;
        txn.commit().await?;

        Ok(ReportService::generate_general_ledger(from, to, lines, &openings))
    }
}

#[derive(Debug, FromQueryResult)]
struct AccountTotals {
    account_id: Uuid,
    debit: Option<Decimal>,
    credit: Option<Decimal>,
}

#[derive(Debug, FromQueryResult)]
struct PostedLineRow {
    entry_id: Uuid,
    entry_number: String,
    date: NaiveDate,
    entry_memo: String,
    source: EntrySource,
    account_id: Uuid,
    account_number: String,
    account_name: String,
    account_type: AccountType,
    line_memo: Option<String>,
    debit: Decimal,
    credit: Decimal,
}

/// Every account of the tenant with its normal-side balance over the window.
///
/// `from = None` means from the beginning of the ledger.
async fn account_balances<C: ConnectionTrait>(
    conn: &C,
    tenant_id: TenantId,
    from: Option<NaiveDate>,
    to: NaiveDate,
) -> Result<Vec<AccountBalance>, DbErr> {
    let tenant = tenant_id.into_inner();

    let mut totals_query = journal_lines::Entity::find()
        .select_only()
        .column(journal_lines::Column::AccountId)
        .column_as(
            Expr::col((journal_lines::Entity, journal_lines::Column::Debit)).sum(),
            "debit",
        )
        .column_as(
            Expr::col((journal_lines::Entity, journal_lines::Column::Credit)).sum(),
            "credit",
        )
        .join(
            JoinType::InnerJoin,
            journal_lines::Relation::JournalEntries.def(),
        )
        .filter(journal_entries::Column::TenantId.eq(tenant))
        .filter(journal_entries::Column::Date.lte(to));
    if let Some(from) = from {
        totals_query = totals_query.filter(journal_entries::Column::Date.gte(from));
    }
    let totals: HashMap<Uuid, (Decimal, Decimal)> = totals_query
        .group_by(journal_lines::Column::AccountId)
        .into_model::<AccountTotals>()
        .all(conn)
        .await?
        .into_iter()
        .map(|t| {
            (
                t.account_id,
                (t.debit.unwrap_or_default(), t.credit.unwrap_or_default()),
            )
        })
        .collect();

    let accounts = accounts::Entity::find()
        .filter(accounts::Column::TenantId.eq(tenant))
        .order_by_asc(accounts::Column::AccountNumber)
        .all(conn)
        .await?;

    Ok(accounts
        .into_iter()
        .map(|account| {
            let account_type: DomainAccountType = account.account_type.into();
            let (debit, credit) = totals.get(&account.id).copied().unwrap_or_default();
            AccountBalance {
                account_id: AccountId::from_uuid(account.id),
                account_number: account.account_number,
                name: account.name,
                account_type,
                balance: account_type
                    .normal_balance()
                    .calculate_balance_change(debit, credit),
            }
        })
        .collect())
}

/// Posted lines over `from..=to`, ordered by account then posting order.
pub(crate) async fn posted_lines<C: ConnectionTrait>(
    conn: &C,
    tenant_id: TenantId,
    from: NaiveDate,
    to: NaiveDate,
    account_id: Option<Uuid>,
) -> Result<Vec<PostedLine>, DbErr> {
    let mut query = journal_lines::Entity::find()
        .select_only()
        .column(journal_lines::Column::EntryId)
        .column(journal_lines::Column::AccountId)
        .column(journal_lines::Column::Debit)
        .column(journal_lines::Column::Credit)
        .column_as(journal_lines::Column::Memo, "line_memo")
        .column(journal_entries::Column::EntryNumber)
        .column(journal_entries::Column::Date)
        .column_as(journal_entries::Column::Memo, "entry_memo")
        .column(journal_entries::Column::Source)
        .column(accounts::Column::AccountNumber)
        .column_as(accounts::Column::Name, "account_name")
        .column(accounts::Column::AccountType)
        .join(
            JoinType::InnerJoin,
            journal_lines::Relation::JournalEntries.def(),
        )
        .join(JoinType::InnerJoin, journal_lines::Relation::Accounts.def())
        .filter(journal_entries::Column::TenantId.eq(tenant_id.into_inner()))
        .filter(journal_entries::Column::Date.between(from, to));
    if let Some(account_id) = account_id {
        query = query.filter(journal_lines::Column::AccountId.eq(account_id));
    }

    let rows = query
        .order_by_asc(accounts::Column::AccountNumber)
        .order_by_asc(journal_entries::Column::Date)
        .order_by_asc(journal_entries::Column::EntryNumber)
        .order_by_asc(journal_lines::Column::SortOrder)
        .into_model::<PostedLineRow>()
        .all(conn)
        .await?;

    Ok(rows
        .into_iter()
        .map(|row| PostedLine {
            entry_id: JournalEntryId::from_uuid(row.entry_id),
            entry_number: row.entry_number,
            date: row.date,
            account_id: AccountId::from_uuid(row.account_id),
            account_number: row.account_number,
            account_name: row.account_name,
            account_type: row.account_type.into(),
            description: row
                .line_memo
                .filter(|memo| !memo.is_empty())
                .unwrap_or(row.entry_memo),
            debit: row.debit,
            credit: row.credit,
            source: row.source.into(),
        })
        .collect())
}
