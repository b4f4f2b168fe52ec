//! Check repository.
//!
//! A check pays money straight out of a bank account: Debit the expense
//! account, Credit the bank account. Without an explicit expense account the
//! spend goes to Purchases.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tally_core::cashbook::{CashDocumentStatus, CashbookError, CashbookService, CheckAccounts};
use tally_core::ledger::{AccountInfo, EntrySource, LedgerError, PostEntryInput, SystemAccount};
use tally_shared::types::{AccountId, SupplierId, TenantId};
use tracing::info;
use uuid::Uuid;

use super::is_unique_violation;
use super::ledger::{LedgerStoreError, post_entry, reverse_entry, system_account};
use super::sales_receipt::CashbookStoreError;
use super::sequence::{Sequence, next_value};
use crate::entities::{accounts, checks, suppliers};

/// Input for writing a check.
#[derive(Debug, Clone)]
pub struct CreateCheckInput {
    /// BANK account the check is drawn on.
    pub bank_account_id: AccountId,
    /// Account charged; Purchases when absent.
    pub expense_account_id: Option<AccountId>,
    /// Supplier paid, when the payee is one.
    pub supplier_id: Option<SupplierId>,
    /// Name printed on the check; the supplier's name when absent.
    pub payee_name: Option<String>,
    /// Explicit check number; allocated from the tenant sequence when absent.
    pub check_number: Option<String>,
    /// Check date.
    pub date: NaiveDate,
    /// Amount paid, greater than zero.
    pub total_amount: Decimal,
    /// Free-text memo.
    pub memo: Option<String>,
}

/// Check repository.
#[derive(Debug, Clone)]
pub struct CheckRepository {
    db: DatabaseConnection,
}

impl CheckRepository {
    /// Creates a new check repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Writes a check and posts it.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount`, `MissingPayee`, `SupplierNotFound`,
    /// `NotBankAccount`, `NotExpenseAccount`, `DuplicateNumber`, or
    /// `AccountNotFound` for an account outside the tenant.
    pub async fn create(
        &self,
        tenant_id: TenantId,
        input: CreateCheckInput,
    ) -> Result<checks::Model, CashbookStoreError> {
        CashbookService::validate_amount(input.total_amount)?;

        let txn = self.db.begin().await?;
        let supplier_name = match input.supplier_id {
            Some(supplier_id) => Some(supplier_name(&txn, tenant_id, supplier_id).await?),
            None => None,
        };
        let payee = CashbookService::resolve_payee(
            input.payee_name.as_deref(),
            supplier_name.as_deref(),
        )?;

        let expense_id = match input.expense_account_id {
            Some(id) => id,
            None => system_account(&txn, tenant_id, SystemAccount::Purchases).await?,
        };
        let pair = CheckAccounts {
            bank: account_info(&txn, tenant_id, input.bank_account_id).await?,
            expense: account_info(&txn, tenant_id, expense_id).await?,
        };
        CashbookService::validate_check_accounts(&pair)?;

        let number = match input
            .check_number
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
        {
            Some(number) => number,
            None => CashbookService::next_check_number(
                next_value(&txn, tenant_id.into_inner(), Sequence::Check).await?,
            ),
        };
        let memo = format!("Check {number} to {payee}");
        let entry = post_entry(
            &txn,
            &PostEntryInput {
                tenant_id,
                date: input.date,
                memo: memo.clone(),
                is_adjusting: false,
                source: EntrySource::Check,
                lines: CashbookService::check_lines(&pair, input.total_amount, &memo),
            },
            None,
        )
        .await?;

        let now = Utc::now().into();
        let check = checks::ActiveModel {
            id: Set(Uuid::now_v7()),
            tenant_id: Set(tenant_id.into_inner()),
            check_number: Set(number.clone()),
            bank_account_id: Set(pair.bank.id.into_inner()),
            expense_account_id: Set(pair.expense.id.into_inner()),
            supplier_id: Set(input.supplier_id.map(SupplierId::into_inner)),
            payee_name: Set(payee),
            date: Set(input.date),
            total_amount: Set(input.total_amount),
            memo: Set(input.memo),
            status: Set(CashDocumentStatus::Posted.into()),
            journal_entry_id: Set(entry.id),
            reversal_entry_id: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                CashbookStoreError::Cashbook(CashbookError::DuplicateNumber(number.clone()))
            } else {
                err.into()
            }
        })?;
        txn.commit().await?;

        info!(
            tenant_id = %tenant_id,
            check_id = %check.id,
            check_number = %check.check_number,
            amount = %check.total_amount,
            "Check written"
        );
        Ok(check)
    }

    /// Voids a check, reversing its entry.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `AlreadyVoid`.
    pub async fn void(
        &self,
        tenant_id: TenantId,
        check_id: Uuid,
    ) -> Result<checks::Model, CashbookStoreError> {
        let txn = self.db.begin().await?;
        let check = checks::Entity::find_by_id(check_id)
            .filter(checks::Column::TenantId.eq(tenant_id.into_inner()))
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(CashbookError::NotFound(check_id))?;
        CashbookService::validate_can_void(check.id, check.status.into())?;

        let reversal = reverse_entry(
            &txn,
            tenant_id,
            check.journal_entry_id,
            Utc::now().date_naive(),
            "Check voided",
        )
        .await?;

        let mut active = check.into_active_model();
        active.status = Set(CashDocumentStatus::Void.into());
        active.reversal_entry_id = Set(Some(reversal.id));
        active.updated_at = Set(Utc::now().into());
        let check = active.update(&txn).await?;
        txn.commit().await?;

        info!(tenant_id = %tenant_id, check_id = %check.id, "Check voided");
        Ok(check)
    }

    /// Gets a check.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if it is not in the tenant.
    pub async fn get(
        &self,
        tenant_id: TenantId,
        check_id: Uuid,
    ) -> Result<checks::Model, CashbookStoreError> {
        let check = checks::Entity::find_by_id(check_id)
            .filter(checks::Column::TenantId.eq(tenant_id.into_inner()))
            .one(&self.db)
            .await?
            .ok_or(CashbookError::NotFound(check_id))?;
        Ok(check)
    }

    /// Lists checks, optionally drawn on one bank account, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        tenant_id: TenantId,
        bank_account_id: Option<Uuid>,
    ) -> Result<Vec<checks::Model>, CashbookStoreError> {
        let mut query =
            checks::Entity::find().filter(checks::Column::TenantId.eq(tenant_id.into_inner()));
        if let Some(bank_account_id) = bank_account_id {
            query = query.filter(checks::Column::BankAccountId.eq(bank_account_id));
        }
        let checks = query
            .order_by_desc(checks::Column::Date)
            .order_by_desc(checks::Column::CheckNumber)
            .all(&self.db)
            .await?;
        Ok(checks)
    }
}

async fn supplier_name(
    txn: &DatabaseTransaction,
    tenant_id: TenantId,
    supplier_id: SupplierId,
) -> Result<String, CashbookStoreError> {
    let supplier = suppliers::Entity::find_by_id(supplier_id.into_inner())
        .filter(suppliers::Column::TenantId.eq(tenant_id.into_inner()))
        .one(txn)
        .await?
        .ok_or(CashbookError::SupplierNotFound(supplier_id.into_inner()))?;
    Ok(supplier.name)
}

async fn account_info(
    txn: &DatabaseTransaction,
    tenant_id: TenantId,
    account_id: AccountId,
) -> Result<AccountInfo, CashbookStoreError> {
    let account = accounts::Entity::find_by_id(account_id.into_inner())
        .filter(accounts::Column::TenantId.eq(tenant_id.into_inner()))
        .one(txn)
        .await?
        .ok_or_else(|| {
            LedgerStoreError::from(LedgerError::AccountNotFound(account_id.into_inner()))
        })?;
    Ok(AccountInfo {
        id: account_id,
        account_type: account.account_type.into(),
        is_active: account.is_active,
    })
}
