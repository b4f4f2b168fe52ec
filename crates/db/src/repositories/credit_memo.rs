//! Credit memo repository.
//!
//! A credit memo reduces what a customer owes on one invoice without cash
//! moving: Debit Sales Income, Credit A/R.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tally_core::invoicing::{InvoiceError, InvoiceStatus};
use tally_core::ledger::{EntrySource, PostEntryInput, SystemAccount};
use tally_core::payments::{CreditMemoStatus, PaymentError, PaymentService};
use tally_core::settlement;
use tally_shared::types::{CustomerId, TenantId};
use tracing::info;
use uuid::Uuid;

use super::invoice::{InvoiceStoreError, lock_invoice, settle};
use super::is_unique_violation;
use super::ledger::{post_entry, reverse_entry, system_account};
use super::sequence::{Sequence, next_value};
use crate::entities::credit_memos;

/// Input for issuing a credit memo.
#[derive(Debug, Clone)]
pub struct CreateCreditMemoInput {
    /// Customer credited; must own the invoice.
    pub customer_id: CustomerId,
    /// Invoice the credit is applied to.
    pub invoice_id: Uuid,
    /// Explicit number; allocated from the tenant sequence when absent.
    pub memo_number: Option<String>,
    /// Memo date.
    pub date: NaiveDate,
    /// Credit amount, at most the invoice's amount due.
    pub total_amount: Decimal,
    /// Free-text notes.
    pub notes: Option<String>,
}

/// Credit memo repository.
#[derive(Debug, Clone)]
pub struct CreditMemoRepository {
    db: DatabaseConnection,
}

impl CreditMemoRepository {
    /// Creates a new credit memo repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Issues a credit memo and applies it to its invoice.
    ///
    /// # Errors
    ///
    /// Returns `CustomerMismatch` when the invoice belongs to another customer,
    /// plus the same amount and status errors as a payment.
    pub async fn create(
        &self,
        tenant_id: TenantId,
        input: CreateCreditMemoInput,
    ) -> Result<credit_memos::Model, InvoiceStoreError> {
        let txn = self.db.begin().await?;
        let invoice = lock_invoice(&txn, tenant_id, input.invoice_id).await?;
        if invoice.customer_id != input.customer_id.into_inner() {
            return Err(PaymentError::CustomerMismatch.into());
        }

        let amount_due = settlement::amount_due(invoice.total_amount, invoice.amount_paid);
        let status: InvoiceStatus = invoice.status.into();
        PaymentService::validate_application(input.total_amount, amount_due, status)?;

        let number = match input
            .memo_number
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
        {
            Some(number) => number,
            None => PaymentService::next_memo_number(
                next_value(&txn, tenant_id.into_inner(), Sequence::CreditMemo).await?,
            ),
        };
        let income = system_account(&txn, tenant_id, SystemAccount::SalesIncome).await?;
        let receivable = system_account(&txn, tenant_id, SystemAccount::AccountsReceivable).await?;
        let memo = format!("Credit memo {number} for invoice {}", invoice.invoice_number);
        let entry = post_entry(
            &txn,
            &PostEntryInput {
                tenant_id,
                date: input.date,
                memo: memo.clone(),
                is_adjusting: false,
                source: EntrySource::CreditMemo,
                lines: PaymentService::credit_memo_lines(
                    income,
                    receivable,
                    input.total_amount,
                    &memo,
                ),
            },
            None,
        )
        .await?;

        let now = Utc::now().into();
        let credit_memo = credit_memos::ActiveModel {
            id: Set(Uuid::now_v7()),
            tenant_id: Set(tenant_id.into_inner()),
            memo_number: Set(number.clone()),
            customer_id: Set(invoice.customer_id),
            invoice_id: Set(invoice.id),
            date: Set(input.date),
            total_amount: Set(input.total_amount),
            status: Set(CreditMemoStatus::Applied.into()),
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
                InvoiceStoreError::Invoice(InvoiceError::DuplicateNumber(number.clone()))
            } else {
                err.into()
            }
        })?;

        let new_paid = invoice.amount_paid + credit_memo.total_amount;
        settle(&txn, invoice, new_paid).await?;
        txn.commit().await?;

        info!(
            tenant_id = %tenant_id,
            credit_memo_id = %credit_memo.id,
            memo_number = %credit_memo.memo_number,
            invoice_id = %credit_memo.invoice_id,
            amount = %credit_memo.total_amount,
            "Credit memo applied"
        );
        Ok(credit_memo)
    }

    /// Voids a credit memo, reversing its entry and restoring the amount due.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::NotFound` or `AlreadyVoid`.
    pub async fn void(
        &self,
        tenant_id: TenantId,
        credit_memo_id: Uuid,
    ) -> Result<credit_memos::Model, InvoiceStoreError> {
        let txn = self.db.begin().await?;

        let invoice_id = self.get_in(&txn, tenant_id, credit_memo_id).await?.invoice_id;
        let invoice = lock_invoice(&txn, tenant_id, invoice_id).await?;
        let credit_memo = credit_memos::Entity::find_by_id(credit_memo_id)
            .filter(credit_memos::Column::TenantId.eq(tenant_id.into_inner()))
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(PaymentError::NotFound(credit_memo_id))?;
        PaymentService::validate_can_void(credit_memo.id, credit_memo.status.into())?;

        let today = Utc::now().date_naive();
        let reversal = reverse_entry(
            &txn,
            tenant_id,
            credit_memo.journal_entry_id,
            today,
            "Credit memo voided",
        )
        .await?;

        let amount = credit_memo.total_amount;
        let mut active = credit_memo.into_active_model();
        active.status = Set(CreditMemoStatus::Void.into());
        active.reversal_entry_id = Set(Some(reversal.id));
        active.updated_at = Set(Utc::now().into());
        let credit_memo = active.update(&txn).await?;

        let new_paid = PaymentService::unapply(invoice.amount_paid, amount);
        settle(&txn, invoice, new_paid).await?;
        txn.commit().await?;

        info!(
            tenant_id = %tenant_id,
            credit_memo_id = %credit_memo.id,
            amount = %amount,
            "Credit memo voided"
        );
        Ok(credit_memo)
    }

    /// Gets a credit memo.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::NotFound` if it is not in the tenant.
    pub async fn get(
        &self,
        tenant_id: TenantId,
        credit_memo_id: Uuid,
    ) -> Result<credit_memos::Model, InvoiceStoreError> {
        self.get_in(&self.db, tenant_id, credit_memo_id).await
    }

    /// Lists credit memos, optionally for one invoice, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        tenant_id: TenantId,
        invoice_id: Option<Uuid>,
    ) -> Result<Vec<credit_memos::Model>, InvoiceStoreError> {
        let mut query = credit_memos::Entity::find()
            .filter(credit_memos::Column::TenantId.eq(tenant_id.into_inner()));
        if let Some(invoice_id) = invoice_id {
            query = query.filter(credit_memos::Column::InvoiceId.eq(invoice_id));
        }
        let memos = query
            .order_by_desc(credit_memos::Column::Date)
            .order_by_desc(credit_memos::Column::MemoNumber)
            .all(&self.db)
            .await?;
        Ok(memos)
    }

    async fn get_in<C: sea_orm::ConnectionTrait>(
        &self,
        conn: &C,
        tenant_id: TenantId,
        credit_memo_id: Uuid,
    ) -> Result<credit_memos::Model, InvoiceStoreError> {
        let credit_memo = credit_memos::Entity::find_by_id(credit_memo_id)
            .filter(credit_memos::Column::TenantId.eq(tenant_id.into_inner()))
            .one(conn)
            .await?
            .ok_or(PaymentError::NotFound(credit_memo_id))?;
        Ok(credit_memo)
    }
}
