//! Sales receipt repository.
//!
//! A sales receipt is a cash sale with no invoice: Debit Bank/Cash by payment
//! method, Credit Sales Income. Voiding reverses the entry and keeps the row.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tally_core::cashbook::{CashDocumentStatus, CashbookError, CashbookService};
use tally_core::ledger::{EntrySource, PostEntryInput, SystemAccount};
use tally_core::payments::PaymentMethod;
use tally_shared::AppError;
use tally_shared::types::{CustomerId, TenantId};
use tracing::info;
use uuid::Uuid;

use super::ledger::{LedgerStoreError, post_entry, reverse_entry, system_account};
use super::sequence::{Sequence, next_value};
use super::{database_error, is_unique_violation};
use crate::entities::{customers, sales_receipts};

/// Error types for sales receipt and check operations.
#[derive(Debug, thiserror::Error)]
pub enum CashbookStoreError {
    /// Cash transaction rule violation.
    #[error(transparent)]
    Cashbook(#[from] CashbookError),

    /// Ledger posting failure.
    #[error(transparent)]
    Posting(#[from] LedgerStoreError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<CashbookStoreError> for AppError {
    fn from(err: CashbookStoreError) -> Self {
        match err {
            CashbookStoreError::Cashbook(e) => e.into(),
            CashbookStoreError::Posting(e) => e.into(),
            CashbookStoreError::Database(e) => database_error(&e),
        }
    }
}

/// Input for recording a cash sale.
#[derive(Debug, Clone)]
pub struct CreateSalesReceiptInput {
    /// Buyer, when known.
    pub customer_id: Option<CustomerId>,
    /// Explicit number; allocated from the tenant sequence when absent.
    pub receipt_number: Option<String>,
    /// Sale date.
    pub date: NaiveDate,
    /// Amount received, greater than zero.
    pub total_amount: Decimal,
    /// How the money arrived; picks the account debited.
    pub payment_method: PaymentMethod,
    /// Free-text notes.
    pub notes: Option<String>,
}

/// Sales receipt repository.
#[derive(Debug, Clone)]
pub struct SalesReceiptRepository {
    db: DatabaseConnection,
}

impl SalesReceiptRepository {
    /// Creates a new sales receipt repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a cash sale and posts it.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount`, `CustomerNotFound`, or `DuplicateNumber` for a
    /// receipt number already in use.
    pub async fn create(
        &self,
        tenant_id: TenantId,
        input: CreateSalesReceiptInput,
    ) -> Result<sales_receipts::Model, CashbookStoreError> {
        CashbookService::validate_amount(input.total_amount)?;

        let txn = self.db.begin().await?;
        if let Some(customer_id) = input.customer_id {
            ensure_customer(&txn, tenant_id, customer_id).await?;
        }

        let number = match input
            .receipt_number
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
        {
            Some(number) => number,
            None => CashbookService::next_receipt_number(
                next_value(&txn, tenant_id.into_inner(), Sequence::SalesReceipt).await?,
            ),
        };
        let cash = system_account(&txn, tenant_id, input.payment_method.cash_account()).await?;
        let income = system_account(&txn, tenant_id, SystemAccount::SalesIncome).await?;
        let memo = format!("Sales receipt {number}");
        let entry = post_entry(
            &txn,
            &PostEntryInput {
                tenant_id,
                date: input.date,
                memo: memo.clone(),
                is_adjusting: false,
                source: EntrySource::SalesReceipt,
                lines: CashbookService::sales_receipt_lines(
                    cash,
                    income,
                    input.total_amount,
                    &memo,
                ),
            },
            None,
        )
        .await?;

        let now = Utc::now().into();
        let receipt = sales_receipts::ActiveModel {
            id: Set(Uuid::now_v7()),
            tenant_id: Set(tenant_id.into_inner()),
            receipt_number: Set(number.clone()),
            customer_id: Set(input.customer_id.map(CustomerId::into_inner)),
            date: Set(input.date),
            total_amount: Set(input.total_amount),
            payment_method: Set(input.payment_method.into()),
            deposit_account_id: Set(cash.into_inner()),
            status: Set(CashDocumentStatus::Posted.into()),
            notes: Set(input.notes),
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
            receipt_id = %receipt.id,
            receipt_number = %receipt.receipt_number,
            amount = %receipt.total_amount,
            "Sales receipt recorded"
        );
        Ok(receipt)
    }

    /// Voids a sales receipt, reversing its entry.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `AlreadyVoid`.
    pub async fn void(
        &self,
        tenant_id: TenantId,
        receipt_id: Uuid,
    ) -> Result<sales_receipts::Model, CashbookStoreError> {
        let txn = self.db.begin().await?;
        let receipt = sales_receipts::Entity::find_by_id(receipt_id)
            .filter(sales_receipts::Column::TenantId.eq(tenant_id.into_inner()))
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(CashbookError::NotFound(receipt_id))?;
        CashbookService::validate_can_void(receipt.id, receipt.status.into())?;

        let reversal = reverse_entry(
            &txn,
            tenant_id,
            receipt.journal_entry_id,
            Utc::now().date_naive(),
            "Sales receipt voided",
        )
        .await?;

        let mut active = receipt.into_active_model();
        active.status = Set(CashDocumentStatus::Void.into());
        active.reversal_entry_id = Set(Some(reversal.id));
        active.updated_at = Set(Utc::now().into());
        let receipt = active.update(&txn).await?;
        txn.commit().await?;

        info!(tenant_id = %tenant_id, receipt_id = %receipt.id, "Sales receipt voided");
        Ok(receipt)
    }

    /// Gets a sales receipt.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if it is not in the tenant.
    pub async fn get(
        &self,
        tenant_id: TenantId,
        receipt_id: Uuid,
    ) -> Result<sales_receipts::Model, CashbookStoreError> {
        let receipt = sales_receipts::Entity::find_by_id(receipt_id)
            .filter(sales_receipts::Column::TenantId.eq(tenant_id.into_inner()))
            .one(&self.db)
            .await?
            .ok_or(CashbookError::NotFound(receipt_id))?;
        Ok(receipt)
    }

    /// Lists sales receipts, optionally for one customer, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        tenant_id: TenantId,
        customer_id: Option<Uuid>,
    ) -> Result<Vec<sales_receipts::Model>, CashbookStoreError> {
        let mut query = sales_receipts::Entity::find()
            .filter(sales_receipts::Column::TenantId.eq(tenant_id.into_inner()));
        if let Some(customer_id) = customer_id {
            query = query.filter(sales_receipts::Column::CustomerId.eq(customer_id));
        }
        let receipts = query
            .order_by_desc(sales_receipts::Column::Date)
            .order_by_desc(sales_receipts::Column::ReceiptNumber)
            .all(&self.db)
            .await?;
        Ok(receipts)
    }
}

async fn ensure_customer<C: ConnectionTrait>(
    conn: &C,
    tenant_id: TenantId,
    customer_id: CustomerId,
) -> Result<(), CashbookStoreError> {
    let found = customers::Entity::find_by_id(customer_id.into_inner())
        .filter(customers::Column::TenantId.eq(tenant_id.into_inner()))
        .count(conn)
        .await?;
    if found == 0 {
        return Err(CashbookError::CustomerNotFound(customer_id.into_inner()).into());
    }
    Ok(())
}
