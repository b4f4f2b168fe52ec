//! Customer payment repository.
//!
//! Recording a payment posts Debit Bank/Cash, Credit A/R and raises the
//! invoice's `amount_paid` in one transaction. Deleting a payment is a soft
//! delete: the row stays, its entry is reversed and the invoice re-opens.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tally_core::invoicing::InvoiceStatus;
use tally_core::ledger::{EntrySource, PostEntryInput, SystemAccount};
use tally_core::payments::{PaymentError, PaymentIntent, PaymentMethod, PaymentService};
use tally_core::settlement;
use tally_shared::types::TenantId;
use tracing::{info, warn};
use uuid::Uuid;

use super::invoice::{InvoiceStoreError, lock_invoice, settle};
use super::is_unique_violation;
use super::ledger::{post_entry, reverse_entry, system_account};
use crate::entities::payments;

/// Input for recording a customer payment.
#[derive(Debug, Clone)]
pub struct RecordPaymentInput {
    /// Amount received, greater than zero and at most the amount due.
    pub amount: Decimal,
    /// Payment date.
    pub date: NaiveDate,
    /// How the money arrived.
    pub payment_method: PaymentMethod,
    /// External reference such as a cheque number.
    pub reference: Option<String>,
    /// Client-supplied key; a matching replay returns the payment already recorded.
    pub idempotency_key: Option<String>,
}

/// Payment repository.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    db: DatabaseConnection,
}

impl PaymentRepository {
    /// Creates a new payment repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a payment against an invoice.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount`, `Overpayment`, `DocumentNotOpen`, `NotFound`
    /// for an unknown invoice, or `IdempotencyKeyReused` when the key belongs
    /// to a payment with a different invoice, amount or method.
    pub async fn record(
        &self,
        tenant_id: TenantId,
        invoice_id: Uuid,
        input: RecordPaymentInput,
    ) -> Result<payments::Model, InvoiceStoreError> {
        let intent = PaymentIntent {
            document_id: invoice_id,
            amount: input.amount,
            method: input.payment_method,
        };
        if let Some(key) = input.idempotency_key.as_deref() {
            if let Some(existing) = self.find_by_key(tenant_id, key).await? {
                return replay(tenant_id, key, existing, intent);
            }
        }

        let txn = self.db.begin().await?;
        let invoice = lock_invoice(&txn, tenant_id, invoice_id).await?;
        let amount_due = settlement::amount_due(invoice.total_amount, invoice.amount_paid);
        let status: InvoiceStatus = invoice.status.into();
        PaymentService::validate_application(input.amount, amount_due, status)?;

        let cash = system_account(&txn, tenant_id, input.payment_method.cash_account()).await?;
        let receivable = system_account(&txn, tenant_id, SystemAccount::AccountsReceivable).await?;
        let memo = format!("Payment for invoice {}", invoice.invoice_number);
        let entry = post_entry(
            &txn,
            &PostEntryInput {
                tenant_id,
                date: input.date,
                memo: memo.clone(),
                is_adjusting: false,
                source: EntrySource::Payment,
                lines: PaymentService::receipt_lines(cash, receivable, input.amount, &memo),
            },
            None,
        )
        .await?;

        let inserted = payments::ActiveModel {
            id: Set(Uuid::now_v7()),
            tenant_id: Set(tenant_id.into_inner()),
            invoice_id: Set(invoice.id),
            amount: Set(input.amount),
            date: Set(input.date),
            payment_method: Set(input.payment_method.into()),
            reference: Set(input.reference),
            idempotency_key: Set(input.idempotency_key.clone()),
            journal_entry_id: Set(entry.id),
            reversal_entry_id: Set(None),
            deleted_at: Set(None),
            created_at: Set(Utc::now().into()),
        }
        .insert(&txn)
        .await;

        let payment = match inserted {
            Ok(payment) => payment,
            Err(err) if is_unique_violation(&err) => {
                // A concurrent request with the same key committed first.
                txn.rollback().await?;
                let key = input.idempotency_key.as_deref().unwrap_or_default();
                warn!(tenant_id = %tenant_id, "Idempotency key raced; returning stored payment");
                let existing = self
                    .find_by_key(tenant_id, key)
                    .await?
                    .ok_or_else(|| InvoiceStoreError::from(err))?;
                return replay(tenant_id, key, existing, intent);
            }
            Err(err) => return Err(err.into()),
        };

        let new_paid = invoice.amount_paid + payment.amount;
        let invoice = settle(&txn, invoice, new_paid).await?;
        txn.commit().await?;

        info!(
            tenant_id = %tenant_id,
            payment_id = %payment.id,
            invoice_id = %invoice.id,
            amount = %payment.amount,
            amount_paid = %invoice.amount_paid,
            "Payment recorded"
        );
        Ok(payment)
    }

    /// Soft-deletes a payment, reversing its entry and re-opening the invoice.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::NotFound` for an unknown or already deleted payment.
    pub async fn delete(
        &self,
        tenant_id: TenantId,
        payment_id: Uuid,
    ) -> Result<payments::Model, InvoiceStoreError> {
        let txn = self.db.begin().await?;

        let invoice_id = payments::Entity::find_by_id(payment_id)
            .filter(payments::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(payments::Column::DeletedAt.is_null())
            .one(&txn)
            .await?
            .ok_or(PaymentError::NotFound(payment_id))?
            .invoice_id;

        // Invoice first, then payment, in the same order `record` locks them.
        let invoice = lock_invoice(&txn, tenant_id, invoice_id).await?;
        let payment = payments::Entity::find_by_id(payment_id)
            .filter(payments::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(payments::Column::DeletedAt.is_null())
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(PaymentError::NotFound(payment_id))?;

        let today = Utc::now().date_naive();
        let reversal = reverse_entry(
            &txn,
            tenant_id,
            payment.journal_entry_id,
            today,
            "Payment deleted",
        )
        .await?;

        let amount = payment.amount;
        let mut active = payment.into_active_model();
        active.deleted_at = Set(Some(Utc::now().into()));
        active.reversal_entry_id = Set(Some(reversal.id));
        let payment = active.update(&txn).await?;

        let new_paid = PaymentService::unapply(invoice.amount_paid, amount);
        let invoice = settle(&txn, invoice, new_paid).await?;
        txn.commit().await?;

        info!(
            tenant_id = %tenant_id,
            payment_id = %payment.id,
            invoice_id = %invoice.id,
            amount = %amount,
            "Payment deleted"
        );
        Ok(payment)
    }

    /// Gets a live payment.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::NotFound` for an unknown or deleted payment.
    pub async fn get(
        &self,
        tenant_id: TenantId,
        payment_id: Uuid,
    ) -> Result<payments::Model, InvoiceStoreError> {
        let payment = payments::Entity::find_by_id(payment_id)
            .filter(payments::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(payments::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?
            .ok_or(PaymentError::NotFound(payment_id))?;
        Ok(payment)
    }

    /// Lists live payments of an invoice, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_invoice(
        &self,
        tenant_id: TenantId,
        invoice_id: Uuid,
    ) -> Result<Vec<payments::Model>, InvoiceStoreError> {
        let payments = payments::Entity::find()
            .filter(payments::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(payments::Column::InvoiceId.eq(invoice_id))
            .filter(payments::Column::DeletedAt.is_null())
            .order_by_asc(payments::Column::Date)
            .order_by_asc(payments::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(payments)
    }

    async fn find_by_key(
        &self,
        tenant_id: TenantId,
        key: &str,
    ) -> Result<Option<payments::Model>, InvoiceStoreError> {
        let payment = payments::Entity::find()
            .filter(payments::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(payments::Column::IdempotencyKey.eq(key))
            .one(&self.db)
            .await?;
        Ok(payment)
    }
}

/// Returns the stored payment if the replayed request matches it.
fn replay(
    tenant_id: TenantId,
    key: &str,
    existing: payments::Model,
    requested: PaymentIntent,
) -> Result<payments::Model, InvoiceStoreError> {
    let stored = PaymentIntent {
        document_id: existing.invoice_id,
        amount: existing.amount,
        method: existing.payment_method.into(),
    };
    PaymentService::validate_replay(key, stored, requested)?;
    info!(
        tenant_id = %tenant_id,
        payment_id = %existing.id,
        "Idempotent payment replay"
    );
    Ok(existing)
}
