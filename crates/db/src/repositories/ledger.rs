//! Ledger store: journal posting, reversal and balance queries.
//!
//! `post_entry` is the only code path that changes an account balance. Every
//! invoice, payment, credit memo, bill, sales receipt and check operation
//! calls it inside its own database transaction.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
    prelude::DateTimeWithTimeZone, sea_query::Expr,
};
use tally_core::ledger::{
    AccountInfo, EntrySource, JournalLineInput, LedgerError, LedgerService, OriginalLine,
    PostEntryInput, ReversalService, SystemAccount, format_entry_number,
};
use tally_core::reports::{GeneralLedgerAccount, ReportService};
use tally_shared::AppError;
use tally_shared::types::{AccountId, TenantId};
use tracing::info;
use uuid::Uuid;

use super::sequence::{Sequence, next_value};
use super::{database_error, is_unique_violation, report};
use crate::entities::{accounts, journal_entries, journal_lines};

/// Error types for ledger store operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerStoreError {
    /// Ledger rule violation.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<LedgerStoreError> for AppError {
    fn from(err: LedgerStoreError) -> Self {
        match err {
            LedgerStoreError::Ledger(e) => e.into(),
            LedgerStoreError::Database(e) => database_error(&e),
        }
    }
}

/// Input for a manually submitted journal entry.
#[derive(Debug, Clone)]
pub struct ManualEntryInput {
    /// Accounting date.
    pub date: NaiveDate,
    /// Entry memo.
    pub memo: String,
    /// Period-end adjusting entry.
    pub is_adjusting: bool,
    /// Lines in posting order.
    pub lines: Vec<JournalLineInput>,
}

/// A journal entry with its lines in posting order.
#[derive(Debug, Clone)]
pub struct EntryWithLines {
    /// Entry header.
    pub entry: journal_entries::Model,
    /// Lines ordered by `sort_order`.
    pub lines: Vec<journal_lines::Model>,
}

/// Ledger repository for posting and querying journal entries.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    db: DatabaseConnection,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Posts a manual journal entry.
    ///
    /// # Errors
    ///
    /// Returns a validation error for malformed or unbalanced lines, and
    /// `AccountNotFound`/`AccountInactive` for unusable accounts. Nothing is
    /// written on error.
    pub async fn post_manual(
        &self,
        tenant_id: TenantId,
        input: ManualEntryInput,
    ) -> Result<EntryWithLines, LedgerStoreError> {
        let post = PostEntryInput {
            tenant_id,
            date: input.date,
            memo: input.memo,
            is_adjusting: input.is_adjusting,
            source: EntrySource::Manual,
            lines: input.lines,
        };

        let txn = self.db.begin().await?;
        let entry = post_entry(&txn, &post, None).await?;
        let lines = load_lines(&txn, entry.id).await?;
        txn.commit().await?;

        Ok(EntryWithLines { entry, lines })
    }

    /// Posts the reversing entry of a manual journal entry.
    ///
    /// Generated entries are reversed through their documents instead.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound`, `DocumentOwned` or `AlreadyReversed`.
    pub async fn reverse(
        &self,
        tenant_id: TenantId,
        entry_id: Uuid,
        date: Option<NaiveDate>,
        reason: Option<String>,
    ) -> Result<EntryWithLines, LedgerStoreError> {
        let txn = self.db.begin().await?;

        let original = find_entry(&txn, tenant_id, entry_id).await?;
        ReversalService::validate_owner(original.id, original.source.into())?;

        let date = date.unwrap_or_else(|| Utc::now().date_naive());
        let entry = reverse_loaded(&txn, tenant_id, &original, date, reason.as_deref()).await?;
        let lines = load_lines(&txn, entry.id).await?;
        txn.commit().await?;

        info!(
            tenant_id = %tenant_id,
            original_id = %original.id,
            reversal_id = %entry.id,
            "Journal entry reversed"
        );

        Ok(EntryWithLines { entry, lines })
    }

    /// Gets a journal entry with its lines.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound` if the entry does not exist in the tenant.
    pub async fn get_entry(
        &self,
        tenant_id: TenantId,
        entry_id: Uuid,
    ) -> Result<EntryWithLines, LedgerStoreError> {
        let entry = journal_entries::Entity::find_by_id(entry_id)
            .filter(journal_entries::Column::TenantId.eq(tenant_id.into_inner()))
            .one(&self.db)
            .await?
            .ok_or(LedgerError::EntryNotFound(entry_id))?;
        let lines = load_lines(&self.db, entry.id).await?;
        Ok(EntryWithLines { entry, lines })
    }

    /// Lists journal entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_entries(
        &self,
        tenant_id: TenantId,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<journal_entries::Model>, u64), LedgerStoreError> {
        use sea_orm::PaginatorTrait;

        let mut query = journal_entries::Entity::find()
            .filter(journal_entries::Column::TenantId.eq(tenant_id.into_inner()));
        if let Some(from) = from {
            query = query.filter(journal_entries::Column::Date.gte(from));
        }
        if let Some(to) = to {
            query = query.filter(journal_entries::Column::Date.lte(to));
        }

        let total = query.clone().count(&self.db).await?;
        let entries = query
            .order_by_desc(journal_entries::Column::Date)
            .order_by_desc(journal_entries::Column::EntryNumber)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await?;

        Ok((entries, total))
    }

    /// Account balance from committed postings.
    ///
    /// Without `as_of` this is the stored running balance. With `as_of` the
    /// postings dated on or before it are replayed.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if the account is not in the tenant.
    pub async fn get_balance(
        &self,
        tenant_id: TenantId,
        account_id: Uuid,
        as_of: Option<NaiveDate>,
    ) -> Result<Decimal, LedgerStoreError> {
        let account = find_account(&self.db, tenant_id, account_id).await?;
        let Some(as_of) = as_of else {
            return Ok(account.balance);
        };

        let (debit, credit): (Option<Decimal>, Option<Decimal>) = journal_lines::Entity::find()
            .select_only()
            .column_as(Expr::col(journal_lines::Column::Debit).sum(), "debit")
            .column_as(Expr::col(journal_lines::Column::Credit).sum(), "credit")
            .join(
                JoinType::InnerJoin,
                journal_lines::Relation::JournalEntries.def(),
            )
            .filter(journal_lines::Column::AccountId.eq(account.id))
            .filter(journal_entries::Column::Date.lte(as_of))
            .into_tuple()
            .one(&self.db)
            .await?
            .unwrap_or((None, None));

        let account_type: tally_core::ledger::AccountType = account.account_type.into();
        Ok(account_type
            .normal_balance()
            .calculate_balance_change(debit.unwrap_or_default(), credit.unwrap_or_default()))
    }

    /// Postings to one account over a date range, with a running balance.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if the account is not in the tenant.
    pub async fn list_account_entries(
        &self,
        tenant_id: TenantId,
        account_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<GeneralLedgerAccount, LedgerStoreError> {
        let account = find_account(&self.db, tenant_id, account_id).await?;
        let id = AccountId::from_uuid(account.id);

        let opening = match from.pred_opt() {
            Some(day_before) => self.get_balance(tenant_id, account.id, Some(day_before)).await?,
            None => Decimal::ZERO,
        };
        let lines = report::posted_lines(&self.db, tenant_id, from, to, Some(account.id)).await?;
        let openings = HashMap::from([(id, opening)]);

        let ledger = ReportService::generate_general_ledger(from, to, lines, &openings);
        Ok(ledger
            .accounts
            .into_iter()
            .next()
            .unwrap_or(GeneralLedgerAccount {
                account_id: id,
                account_number: account.account_number,
                name: account.name,
                opening_balance: opening,
                rows: Vec::new(),
                closing_balance: opening,
            }))
    }
}

// ============================================================
// Transaction-scoped helpers shared by the document repositories
// ============================================================

/// Validates and appends a journal entry, then applies its balance changes.
///
/// The tenant's journal counter is taken first, then the referenced accounts
/// are locked `FOR UPDATE` in ascending id order before validation. Document
/// numbering also locks the tenant row before any account, so every posting
/// transaction acquires locks in the same order.
pub(crate) async fn post_entry(
    txn: &DatabaseTransaction,
    input: &PostEntryInput,
    reverses_entry_id: Option<Uuid>,
) -> Result<journal_entries::Model, LedgerStoreError> {
    let tenant_id = input.tenant_id.into_inner();
    let sequence = next_value(txn, tenant_id, Sequence::Journal).await?;

    let mut account_ids: Vec<Uuid> = input
        .lines
        .iter()
        .map(|line| line.account_id.into_inner())
        .collect();
    account_ids.sort_unstable();
    account_ids.dedup();

    let accounts: HashMap<AccountId, AccountInfo> = accounts::Entity::find()
        .filter(accounts::Column::TenantId.eq(tenant_id))
        .filter(accounts::Column::Id.is_in(account_ids))
        .order_by_asc(accounts::Column::Id)
        .lock_exclusive()
        .all(txn)
        .await?
        .into_iter()
        .map(|account| {
            let id = AccountId::from_uuid(account.id);
            let info = AccountInfo {
                id,
                account_type: account.account_type.into(),
                is_active: account.is_active,
            };
            (id, info)
        })
        .collect();

    let (resolved, totals) = LedgerService::validate_entry(input, |id| {
        accounts
            .get(&id)
            .cloned()
            .ok_or(LedgerError::AccountNotFound(id.into_inner()))
    })?;

    let now: DateTimeWithTimeZone = Utc::now().into();

    let entry = journal_entries::ActiveModel {
        id: Set(Uuid::now_v7()),
        tenant_id: Set(tenant_id),
        entry_number: Set(format_entry_number(sequence)),
        date: Set(input.date),
        memo: Set(input.memo.trim().to_string()),
        is_adjusting: Set(input.is_adjusting),
        source: Set(input.source.into()),
        reverses_entry_id: Set(reverses_entry_id),
        created_at: Set(now),
    }
    .insert(txn)
    .await
    .map_err(|err| match reverses_entry_id {
        Some(original) if is_unique_violation(&err) => {
            LedgerStoreError::Ledger(LedgerError::AlreadyReversed(original))
        }
        _ => err.into(),
    })?;

    let lines = resolved
        .iter()
        .zip(0_i32..)
        .map(|(line, sort_order)| journal_lines::ActiveModel {
            id: Set(Uuid::now_v7()),
            entry_id: Set(entry.id),
            account_id: Set(line.account_id.into_inner()),
            debit: Set(line.debit),
            credit: Set(line.credit),
            memo: Set(line.memo.clone()),
            sort_order: Set(sort_order),
            created_at: Set(now),
        });
    journal_lines::Entity::insert_many(lines).exec(txn).await?;

    for (account_id, delta) in LedgerService::balance_deltas(&resolved) {
        accounts::Entity::update_many()
            .col_expr(
                accounts::Column::Balance,
                Expr::col(accounts::Column::Balance).add(delta),
            )
            .col_expr(accounts::Column::UpdatedAt, Expr::value(now))
            .filter(accounts::Column::Id.eq(account_id.into_inner()))
            .exec(txn)
            .await?;
    }

    info!(
        tenant_id = %tenant_id,
        entry_id = %entry.id,
        entry_number = %entry.entry_number,
        source = input.source.as_str(),
        amount = %totals.debit,
        "Journal entry posted"
    );

    Ok(entry)
}

/// Posts the reversal of an entry owned by a document.
pub(crate) async fn reverse_entry(
    txn: &DatabaseTransaction,
    tenant_id: TenantId,
    entry_id: Uuid,
    date: NaiveDate,
    reason: &str,
) -> Result<journal_entries::Model, LedgerStoreError> {
    let original = find_entry(txn, tenant_id, entry_id).await?;
    reverse_loaded(txn, tenant_id, &original, date, Some(reason)).await
}

async fn reverse_loaded(
    txn: &DatabaseTransaction,
    tenant_id: TenantId,
    original: &journal_entries::Model,
    date: NaiveDate,
    reason: Option<&str>,
) -> Result<journal_entries::Model, LedgerStoreError> {
    let already_reversed = journal_entries::Entity::find()
        .filter(journal_entries::Column::ReversesEntryId.eq(original.id))
        .one(txn)
        .await?
        .is_some();
    ReversalService::validate_can_reverse(original.id, already_reversed)?;

    let original_lines: Vec<OriginalLine> = load_lines(txn, original.id)
        .await?
        .into_iter()
        .map(|line| OriginalLine {
            account_id: AccountId::from_uuid(line.account_id),
            debit: line.debit,
            credit: line.credit,
            memo: line.memo,
        })
        .collect();

    let input = PostEntryInput {
        tenant_id,
        date,
        memo: ReversalService::reversal_memo(&original.entry_number, reason),
        is_adjusting: original.is_adjusting,
        source: EntrySource::Reversal,
        lines: ReversalService::create_reversing_lines(&original_lines),
    };

    post_entry(txn, &input, Some(original.id)).await
}

/// Resolves a system account of the tenant's chart.
pub(crate) async fn system_account(
    txn: &DatabaseTransaction,
    tenant_id: TenantId,
    account: SystemAccount,
) -> Result<AccountId, LedgerStoreError> {
    let id = accounts::Entity::find()
        .select_only()
        .column(accounts::Column::Id)
        .filter(accounts::Column::TenantId.eq(tenant_id.into_inner()))
        .filter(accounts::Column::AccountNumber.eq(account.number()))
        .filter(accounts::Column::IsSystem.eq(true))
        .into_tuple::<Uuid>()
        .one(txn)
        .await?
        .ok_or(LedgerError::SystemAccountMissing(account.number()))?;

    Ok(AccountId::from_uuid(id))
}

async fn find_entry<C: sea_orm::ConnectionTrait>(
    conn: &C,
    tenant_id: TenantId,
    entry_id: Uuid,
) -> Result<journal_entries::Model, LedgerStoreError> {
    let entry = journal_entries::Entity::find_by_id(entry_id)
        .filter(journal_entries::Column::TenantId.eq(tenant_id.into_inner()))
        .one(conn)
        .await?
        .ok_or(LedgerError::EntryNotFound(entry_id))?;
    Ok(entry)
}

async fn find_account<C: sea_orm::ConnectionTrait>(
    conn: &C,
    tenant_id: TenantId,
    account_id: Uuid,
) -> Result<accounts::Model, LedgerStoreError> {
    let account = accounts::Entity::find_by_id(account_id)
        .filter(accounts::Column::TenantId.eq(tenant_id.into_inner()))
        .one(conn)
        .await?
        .ok_or(LedgerError::AccountNotFound(account_id))?;
    Ok(account)
}

async fn load_lines<C: sea_orm::ConnectionTrait>(
    conn: &C,
    entry_id: Uuid,
) -> Result<Vec<journal_lines::Model>, DbErr> {
    journal_lines::Entity::find()
        .filter(journal_lines::Column::EntryId.eq(entry_id))
        .order_by_asc(journal_lines::Column::SortOrder)
        .all(conn)
        .await
}
