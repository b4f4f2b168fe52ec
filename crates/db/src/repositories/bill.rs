//! Supplier bill repository.
//!
//! Bills mirror invoices on the payables side: approval posts Debit
//! Purchases, Credit A/P and each bill payment posts Debit A/P, Credit
//! Bank/Cash.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tally_core::ledger::{EntrySource, PostEntryInput, SystemAccount};
use tally_core::payables::{BillDisplayStatus, BillError, BillService, BillStatus, NewBill};
use tally_core::payments::{PaymentError, PaymentMethod, PaymentService};
use tally_core::settlement;
use tally_shared::AppError;
use tally_shared::types::{SupplierId, TenantId};
use tracing::info;
use uuid::Uuid;

use super::ledger::{LedgerStoreError, post_entry, reverse_entry, system_account};
use super::sequence::{Sequence, next_value};
use super::{database_error, is_unique_violation};
use crate::entities::{bill_payments, bills, suppliers};

/// Error types for bill operations.
#[derive(Debug, thiserror::Error)]
pub enum BillStoreError {
    /// Bill lifecycle rule violation.
    #[error(transparent)]
    Bill(#[from] BillError),

    /// Payment application rule violation.
    #[error(transparent)]
    Payment(#[from] PaymentError),

    /// Ledger posting failure.
    #[error(transparent)]
    Posting(#[from] LedgerStoreError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<BillStoreError> for AppError {
    fn from(err: BillStoreError) -> Self {
        match err {
            BillStoreError::Bill(e) => e.into(),
            BillStoreError::Payment(e) => e.into(),
            BillStoreError::Posting(e) => e.into(),
            BillStoreError::Database(e) => database_error(&e),
        }
    }
}

/// Input for entering a supplier bill.
#[derive(Debug, Clone)]
pub struct CreateBillInput {
    /// Billing supplier.
    pub supplier_id: SupplierId,
    /// Supplier's bill number; allocated from the tenant sequence when absent.
    pub bill_number: Option<String>,
    /// Bill date.
    pub date: NaiveDate,
    /// Due date, on or after `date`.
    pub due_date: NaiveDate,
    /// Total, greater than zero.
    pub total_amount: Decimal,
    /// Payment terms as printed, e.g. "Net 30".
    pub terms: Option<String>,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Approve and post immediately instead of leaving a DRAFT.
    pub approve: bool,
}

/// Input for paying a bill.
#[derive(Debug, Clone)]
pub struct PayBillInput {
    /// Amount paid, greater than zero and at most the amount due.
    pub amount: Decimal,
    /// Payment date.
    pub date: NaiveDate,
    /// Account the money leaves from.
    pub payment_method: PaymentMethod,
    /// External reference.
    pub reference: Option<String>,
}

/// Filter options for listing bills.
#[derive(Debug, Clone, Default)]
pub struct BillFilter {
    /// Filter by persisted status.
    pub status: Option<BillStatus>,
    /// Filter by supplier.
    pub supplier_id: Option<Uuid>,
}

/// Bill with derived amounts and its live payments.
#[derive(Debug, Clone)]
pub struct BillDetail {
    /// The bill record.
    pub bill: bills::Model,
    /// `total_amount - amount_paid`.
    pub amount_due: Decimal,
    /// Status as shown on read, including OVERDUE.
    pub display_status: BillDisplayStatus,
    /// Payments not deleted, oldest first.
    pub payments: Vec<bill_payments::Model>,
}

impl BillDetail {
    fn new(bill: bills::Model, payments: Vec<bill_payments::Model>, today: NaiveDate) -> Self {
        let amount_due = settlement::amount_due(bill.total_amount, bill.amount_paid);
        let display_status =
            BillService::display_status(bill.status.into(), amount_due, bill.due_date, today);
        Self {
            bill,
            amount_due,
            display_status,
            payments,
        }
    }
}

/// Bill repository.
#[derive(Debug, Clone)]
pub struct BillRepository {
    db: DatabaseConnection,
}

impl BillRepository {
    /// Creates a new bill repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Enters a bill, as DRAFT or directly approved.
    ///
    /// # Errors
    ///
    /// Returns a validation error, `SupplierNotFound` or `DuplicateNumber`.
    pub async fn create(
        &self,
        tenant_id: TenantId,
        input: CreateBillInput,
    ) -> Result<BillDetail, BillStoreError> {
        let tenant = tenant_id.into_inner();
        let txn = self.db.begin().await?;

        let supplier_exists = suppliers::Entity::find_by_id(input.supplier_id.into_inner())
            .filter(suppliers::Column::TenantId.eq(tenant))
            .count(&txn)
            .await?
            > 0;
        BillService::validate_new(
            &NewBill {
                supplier_id: input.supplier_id,
                date: input.date,
                due_date: input.due_date,
                total_amount: input.total_amount,
            },
            |_| supplier_exists,
        )?;

        let number = match input
            .bill_number
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
        {
            Some(number) => number,
            None => BillService::next_number(next_value(&txn, tenant, Sequence::Bill).await?),
        };

        let now = Utc::now().into();
        let bill = bills::ActiveModel {
            id: Set(Uuid::now_v7()),
            tenant_id: Set(tenant),
            bill_number: Set(number.clone()),
            supplier_id: Set(input.supplier_id.into_inner()),
            date: Set(input.date),
            due_date: Set(input.due_date),
            total_amount: Set(input.total_amount),
            amount_paid: Set(Decimal::ZERO),
            status: Set(BillStatus::Draft.into()),
            terms: Set(input.terms),
            notes: Set(input.notes),
            journal_entry_id: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                BillStoreError::Bill(BillError::DuplicateNumber(number.clone()))
            } else {
                err.into()
            }
        })?;

        info!(
            tenant_id = %tenant_id,
            bill_id = %bill.id,
            bill_number = %bill.bill_number,
            total = %bill.total_amount,
            "Bill created"
        );

        let bill = if input.approve {
            approve_in(&txn, tenant_id, bill).await?
        } else {
            bill
        };
        txn.commit().await?;

        Ok(BillDetail::new(bill, Vec::new(), Utc::now().date_naive()))
    }

    /// Approves a DRAFT bill, posting Debit Purchases, Credit A/P.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `NotDraft`.
    pub async fn approve(
        &self,
        tenant_id: TenantId,
        bill_id: Uuid,
    ) -> Result<BillDetail, BillStoreError> {
        let txn = self.db.begin().await?;
        let bill = lock_bill(&txn, tenant_id, bill_id).await?;
        BillService::validate_can_approve(bill.status.into())?;

        let bill = approve_in(&txn, tenant_id, bill).await?;
        txn.commit().await?;

        self.get(tenant_id, bill.id).await
    }

    /// Cancels a bill with nothing paid, reversing its A/P posting.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `AlreadyCancelled` or `HasPayments`.
    pub async fn cancel(
        &self,
        tenant_id: TenantId,
        bill_id: Uuid,
    ) -> Result<BillDetail, BillStoreError> {
        let txn = self.db.begin().await?;
        let bill = lock_bill(&txn, tenant_id, bill_id).await?;
        BillService::validate_can_cancel(bill.status.into(), bill.amount_paid)?;

        if let Some(entry_id) = bill.journal_entry_id {
            let today = Utc::now().date_naive();
            reverse_entry(&txn, tenant_id, entry_id, today, "Bill cancelled").await?;
        }

        let mut active = bill.into_active_model();
        active.status = Set(BillStatus::Cancelled.into());
        active.updated_at = Set(Utc::now().into());
        let bill = active.update(&txn).await?;
        txn.commit().await?;

        info!(tenant_id = %tenant_id, bill_id = %bill.id, "Bill cancelled");
        self.get(tenant_id, bill.id).await
    }

    /// Gets a bill with its live payments.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the bill is not in the tenant.
    pub async fn get(
        &self,
        tenant_id: TenantId,
        bill_id: Uuid,
    ) -> Result<BillDetail, BillStoreError> {
        let bill = bills::Entity::find_by_id(bill_id)
            .filter(bills::Column::TenantId.eq(tenant_id.into_inner()))
            .one(&self.db)
            .await?
            .ok_or(BillError::NotFound(bill_id))?;

        let payments = bill_payments::Entity::find()
            .filter(bill_payments::Column::BillId.eq(bill.id))
            .filter(bill_payments::Column::DeletedAt.is_null())
            .order_by_asc(bill_payments::Column::Date)
            .order_by_asc(bill_payments::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(BillDetail::new(bill, payments, Utc::now().date_naive()))
    }

    /// Lists bills, newest first. Payments are not loaded.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        tenant_id: TenantId,
        filter: BillFilter,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<BillDetail>, u64), BillStoreError> {
        let mut query =
            bills::Entity::find().filter(bills::Column::TenantId.eq(tenant_id.into_inner()));
        if let Some(status) = filter.status {
            let status: crate::entities::sea_orm_active_enums::BillStatus = status.into();
            query = query.filter(bills::Column::Status.eq(status));
        }
        if let Some(supplier_id) = filter.supplier_id {
            query = query.filter(bills::Column::SupplierId.eq(supplier_id));
        }

        let total = query.clone().count(&self.db).await?;
        let today = Utc::now().date_naive();
        let bills = query
            .order_by_desc(bills::Column::Date)
            .order_by_desc(bills::Column::BillNumber)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|bill| BillDetail::new(bill, Vec::new(), today))
            .collect();

        Ok((bills, total))
    }

    /// Pays a bill, posting Debit A/P, Credit Bank/Cash.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount`, `Overpayment`, `DocumentNotOpen` or `NotFound`.
    pub async fn pay(
        &self,
        tenant_id: TenantId,
        bill_id: Uuid,
        input: PayBillInput,
    ) -> Result<bill_payments::Model, BillStoreError> {
        let txn = self.db.begin().await?;
        let bill = lock_bill(&txn, tenant_id, bill_id).await?;
        let amount_due = settlement::amount_due(bill.total_amount, bill.amount_paid);
        let status: BillStatus = bill.status.into();
        PaymentService::validate_application(input.amount, amount_due, status)?;

        let payable = system_account(&txn, tenant_id, SystemAccount::AccountsPayable).await?;
        let cash = system_account(&txn, tenant_id, input.payment_method.cash_account()).await?;
        let memo = format!("Payment for bill {}", bill.bill_number);
        let entry = post_entry(
            &txn,
            &PostEntryInput {
                tenant_id,
                date: input.date,
                memo: memo.clone(),
                is_adjusting: false,
                source: EntrySource::BillPayment,
                lines: PaymentService::disbursement_lines(payable, cash, input.amount, &memo),
            },
            None,
        )
        .await?;

        let payment = bill_payments::ActiveModel {
            id: Set(Uuid::now_v7()),
            tenant_id: Set(tenant_id.into_inner()),
            bill_id: Set(bill.id),
            amount: Set(input.amount),
            date: Set(input.date),
            payment_method: Set(input.payment_method.into()),
            reference: Set(input.reference),
            journal_entry_id: Set(entry.id),
            reversal_entry_id: Set(None),
            deleted_at: Set(None),
            created_at: Set(Utc::now().into()),
        }
        .insert(&txn)
        .await?;

        let new_paid = bill.amount_paid + payment.amount;
        let bill = settle(&txn, bill, new_paid).await?;
        txn.commit().await?;

        info!(
            tenant_id = %tenant_id,
            bill_payment_id = %payment.id,
            bill_id = %bill.id,
            amount = %payment.amount,
            "Bill payment recorded"
        );
        Ok(payment)
    }

    /// Soft-deletes a bill payment and re-opens the bill.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::NotFound` for an unknown or deleted payment.
    pub async fn delete_payment(
        &self,
        tenant_id: TenantId,
        payment_id: Uuid,
    ) -> Result<bill_payments::Model, BillStoreError> {
        let txn = self.db.begin().await?;

        let bill_id = bill_payments::Entity::find_by_id(payment_id)
            .filter(bill_payments::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(bill_payments::Column::DeletedAt.is_null())
            .one(&txn)
            .await?
            .ok_or(PaymentError::NotFound(payment_id))?
            .bill_id;

        let bill = lock_bill(&txn, tenant_id, bill_id).await?;
        let payment = bill_payments::Entity::find_by_id(payment_id)
            .filter(bill_payments::Column::DeletedAt.is_null())
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
            "Bill payment deleted",
        )
        .await?;

        let amount = payment.amount;
        let mut active = payment.into_active_model();
        active.deleted_at = Set(Some(Utc::now().into()));
        active.reversal_entry_id = Set(Some(reversal.id));
        let payment = active.update(&txn).await?;

        let new_paid = PaymentService::unapply(bill.amount_paid, amount);
        settle(&txn, bill, new_paid).await?;
        txn.commit().await?;

        info!(
            tenant_id = %tenant_id,
            bill_payment_id = %payment.id,
            amount = %amount,
            "Bill payment deleted"
        );
        Ok(payment)
    }
}

/// Posts the approval entry and marks the bill OPEN.
async fn approve_in(
    txn: &DatabaseTransaction,
    tenant_id: TenantId,
    bill: bills::Model,
) -> Result<bills::Model, BillStoreError> {
    let purchases = system_account(txn, tenant_id, SystemAccount::Purchases).await?;
    let payable = system_account(txn, tenant_id, SystemAccount::AccountsPayable).await?;
    let entry = post_entry(
        txn,
        &PostEntryInput {
            tenant_id,
            date: bill.date,
            memo: format!("Bill {}", bill.bill_number),
            is_adjusting: false,
            source: EntrySource::Bill,
            lines: BillService::approval_lines(
                purchases,
                payable,
                bill.total_amount,
                &bill.bill_number,
            ),
        },
        None,
    )
    .await?;

    let mut active = bill.into_active_model();
    active.status = Set(BillStatus::Open.into());
    active.journal_entry_id = Set(Some(entry.id));
    active.updated_at = Set(Utc::now().into());
    let bill = active.update(txn).await?;

    info!(
        tenant_id = %tenant_id,
        bill_id = %bill.id,
        entry_id = %entry.id,
        "Bill approved"
    );
    Ok(bill)
}

async fn lock_bill(
    txn: &DatabaseTransaction,
    tenant_id: TenantId,
    bill_id: Uuid,
) -> Result<bills::Model, BillStoreError> {
    let bill = bills::Entity::find_by_id(bill_id)
        .filter(bills::Column::TenantId.eq(tenant_id.into_inner()))
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or(BillError::NotFound(bill_id))?;
    Ok(bill)
}

async fn settle(
    txn: &DatabaseTransaction,
    bill: bills::Model,
    amount_paid: Decimal,
) -> Result<bills::Model, DbErr> {
    let status = BillService::recompute_status(bill.status.into(), bill.total_amount, amount_paid);

    let mut active = bill.into_active_model();
    active.amount_paid = Set(amount_paid);
    active.status = Set(status.into());
    active.updated_at = Set(Utc::now().into());
    active.update(txn).await
}
