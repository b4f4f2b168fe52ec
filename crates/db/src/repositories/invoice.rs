//! Invoice repository: creation, sending, cancellation and reads.
//!
//! An invoice row is locked `FOR UPDATE` by every operation that changes
//! `amount_paid` or `status`, so payments, credit memos and cancellation
//! against the same invoice serialize.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tally_core::invoicing::{DisplayStatus, InvoiceError, InvoiceService, InvoiceStatus, NewInvoice};
use tally_core::ledger::{EntrySource, PostEntryInput, SystemAccount};
use tally_core::payments::PaymentError;
use tally_core::settlement;
use tally_shared::AppError;
use tally_shared::types::{CustomerId, SalesOrderId, TenantId};
use tracing::info;
use uuid::Uuid;

use super::ledger::{LedgerStoreError, post_entry, reverse_entry, system_account};
use super::sequence::{Sequence, next_value};
use super::{database_error, is_unique_violation};
use crate::entities::{customers, invoices, payments, sales_orders};

/// Error types for invoice, payment and credit memo operations.
#[derive(Debug, thiserror::Error)]
pub enum InvoiceStoreError {
    /// Invoice lifecycle rule violation.
    #[error(transparent)]
    Invoice(#[from] InvoiceError),

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

impl From<InvoiceStoreError> for AppError {
    fn from(err: InvoiceStoreError) -> Self {
        match err {
            InvoiceStoreError::Invoice(e) => e.into(),
            InvoiceStoreError::Payment(e) => e.into(),
            InvoiceStoreError::Posting(e) => e.into(),
            InvoiceStoreError::Database(e) => database_error(&e),
        }
    }
}

/// Input for creating an invoice.
#[derive(Debug, Clone)]
pub struct CreateInvoiceInput {
    /// Billed customer.
    pub customer_id: CustomerId,
    /// Explicit number; allocated from the tenant sequence when absent.
    pub invoice_number: Option<String>,
    /// Invoice date.
    pub date: NaiveDate,
    /// Due date, on or after `date`.
    pub due_date: NaiveDate,
    /// Total, greater than zero.
    pub total_amount: Decimal,
    /// Originating sales order.
    pub sales_order_id: Option<SalesOrderId>,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Post and mark SENT immediately instead of leaving a DRAFT.
    pub send: bool,
}

/// Filter options for listing invoices.
#[derive(Debug, Clone, Default)]
pub struct InvoiceFilter {
    /// Filter by persisted status.
    pub status: Option<InvoiceStatus>,
    /// Filter by customer.
    pub customer_id: Option<Uuid>,
}

/// Invoice with its derived amounts.
#[derive(Debug, Clone)]
pub struct InvoiceSummary {
    /// The invoice record.
    pub invoice: invoices::Model,
    /// `total_amount - amount_paid`.
    pub amount_due: Decimal,
    /// Status as shown on read, including OVERDUE.
    pub display_status: DisplayStatus,
}

impl InvoiceSummary {
    /// Derives amount due and display status as of `today`.
    #[must_use]
    pub fn new(invoice: invoices::Model, today: NaiveDate) -> Self {
        let amount_due = settlement::amount_due(invoice.total_amount, invoice.amount_paid);
        let display_status = InvoiceService::display_status(
            invoice.status.into(),
            amount_due,
            invoice.due_date,
            today,
        );
        Self {
            invoice,
            amount_due,
            display_status,
        }
    }
}

/// Invoice with its live payments.
#[derive(Debug, Clone)]
pub struct InvoiceDetail {
    /// Invoice and derived amounts.
    pub summary: InvoiceSummary,
    /// Payments not deleted, oldest first.
    pub payments: Vec<payments::Model>,
}

/// Invoice repository.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    db: DatabaseConnection,
}

impl InvoiceRepository {
    /// Creates a new invoice repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an invoice, as DRAFT or directly as SENT.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a non-positive total, a due date before
    /// the invoice date or an unknown customer; `DuplicateNumber` for a reused
    /// number.
    pub async fn create(
        &self,
        tenant_id: TenantId,
        input: CreateInvoiceInput,
    ) -> Result<InvoiceDetail, InvoiceStoreError> {
        let txn = self.db.begin().await?;
        let invoice = create_in(&txn, tenant_id, input).await?;
        txn.commit().await?;

        Ok(InvoiceDetail {
            summary: InvoiceSummary::new(invoice, Utc::now().date_naive()),
            payments: Vec::new(),
        })
    }

    /// Sends a DRAFT invoice, posting Debit A/R and Credit Sales Income.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, or `NotDraft` if the invoice already left DRAFT.
    pub async fn send(
        &self,
        tenant_id: TenantId,
        invoice_id: Uuid,
    ) -> Result<InvoiceDetail, InvoiceStoreError> {
        let txn = self.db.begin().await?;
        let invoice = lock_invoice(&txn, tenant_id, invoice_id).await?;
        InvoiceService::validate_can_send(invoice.status.into())?;
        let invoice = issue_in(&txn, tenant_id, invoice).await?;
        txn.commit().await?;

        self.get(tenant_id, invoice.id).await
    }

    /// Cancels an invoice with nothing paid, reversing its A/R posting.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `AlreadyCancelled` or `HasPayments`.
    pub async fn cancel(
        &self,
        tenant_id: TenantId,
        invoice_id: Uuid,
    ) -> Result<InvoiceDetail, InvoiceStoreError> {
        let txn = self.db.begin().await?;
        let invoice = lock_invoice(&txn, tenant_id, invoice_id).await?;
        InvoiceService::validate_can_cancel(invoice.status.into(), invoice.amount_paid)?;

        if let Some(entry_id) = invoice.journal_entry_id {
            let today = Utc::now().date_naive();
            reverse_entry(&txn, tenant_id, entry_id, today, "Invoice cancelled").await?;
        }

        let mut active = invoice.into_active_model();
        active.status = Set(InvoiceStatus::Cancelled.into());
        active.updated_at = Set(Utc::now().into());
        let invoice = active.update(&txn).await?;
        txn.commit().await?;

        info!(
            tenant_id = %tenant_id,
            invoice_id = %invoice.id,
            invoice_number = %invoice.invoice_number,
            "Invoice cancelled"
        );
        self.get(tenant_id, invoice.id).await
    }

    /// Gets an invoice with its live payments.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the invoice is not in the tenant.
    pub async fn get(
        &self,
        tenant_id: TenantId,
        invoice_id: Uuid,
    ) -> Result<InvoiceDetail, InvoiceStoreError> {
        let invoice = invoices::Entity::find_by_id(invoice_id)
            .filter(invoices::Column::TenantId.eq(tenant_id.into_inner()))
            .one(&self.db)
            .await?
            .ok_or(InvoiceError::NotFound(invoice_id))?;

        let payments = payments::Entity::find()
            .filter(payments::Column::InvoiceId.eq(invoice.id))
            .filter(payments::Column::DeletedAt.is_null())
            .order_by_asc(payments::Column::Date)
            .order_by_asc(payments::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(InvoiceDetail {
            summary: InvoiceSummary::new(invoice, Utc::now().date_naive()),
            payments,
        })
    }

    /// Lists invoices, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        tenant_id: TenantId,
        filter: InvoiceFilter,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<InvoiceSummary>, u64), InvoiceStoreError> {
        let mut query =
            invoices::Entity::find().filter(invoices::Column::TenantId.eq(tenant_id.into_inner()));
        if let Some(status) = filter.status {
            let status: crate::entities::sea_orm_active_enums::InvoiceStatus = status.into();
            query = query.filter(invoices::Column::Status.eq(status));
        }
        if let Some(customer_id) = filter.customer_id {
            query = query.filter(invoices::Column::CustomerId.eq(customer_id));
        }

        let total = query.clone().count(&self.db).await?;
        let today = Utc::now().date_naive();
        let invoices = query
            .order_by_desc(invoices::Column::Date)
            .order_by_desc(invoices::Column::InvoiceNumber)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|invoice| InvoiceSummary::new(invoice, today))
            .collect();

        Ok((invoices, total))
    }
}

// ============================================================
// Transaction-scoped helpers
// ============================================================

/// Creates an invoice inside the caller's transaction.
pub(crate) async fn create_in(
    txn: &DatabaseTransaction,
    tenant_id: TenantId,
    input: CreateInvoiceInput,
) -> Result<invoices::Model, InvoiceStoreError> {
    let tenant = tenant_id.into_inner();

    let customer_exists = customers::Entity::find_by_id(input.customer_id.into_inner())
        .filter(customers::Column::TenantId.eq(tenant))
        .count(txn)
        .await?
        > 0;
    let new_invoice = NewInvoice {
        customer_id: input.customer_id,
        date: input.date,
        due_date: input.due_date,
        total_amount: input.total_amount,
        sales_order_id: input.sales_order_id,
    };
    InvoiceService::validate_new(&new_invoice, |_| customer_exists)?;

    if let Some(order_id) = input.sales_order_id {
        ensure_order_uninvoiced(txn, tenant, order_id.into_inner()).await?;
    }

    let number = match input
        .invoice_number
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
    {
        Some(number) => number,
        None => InvoiceService::next_number(next_value(txn, tenant, Sequence::Invoice).await?),
    };

    let now = Utc::now().into();
    let invoice = invoices::ActiveModel {
        id: Set(Uuid::now_v7()),
        tenant_id: Set(tenant),
        invoice_number: Set(number.clone()),
        customer_id: Set(input.customer_id.into_inner()),
        sales_order_id: Set(input.sales_order_id.map(SalesOrderId::into_inner)),
        date: Set(input.date),
        due_date: Set(input.due_date),
        total_amount: Set(input.total_amount),
        amount_paid: Set(Decimal::ZERO),
        status: Set(InvoiceStatus::Draft.into()),
        notes: Set(input.notes),
        journal_entry_id: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(txn)
    .await
    .map_err(|err| {
        if is_unique_violation(&err) {
            InvoiceStoreError::Invoice(InvoiceError::DuplicateNumber(number.clone()))
        } else {
            err.into()
        }
    })?;

    info!(
        tenant_id = %tenant_id,
        invoice_id = %invoice.id,
        invoice_number = %invoice.invoice_number,
        total = %invoice.total_amount,
        "Invoice created"
    );

    if input.send {
        issue_in(txn, tenant_id, invoice).await
    } else {
        Ok(invoice)
    }
}

async fn ensure_order_uninvoiced(
    txn: &DatabaseTransaction,
    tenant: Uuid,
    order_id: Uuid,
) -> Result<(), InvoiceStoreError> {
    let order_exists = sales_orders::Entity::find_by_id(order_id)
        .filter(sales_orders::Column::TenantId.eq(tenant))
        .count(txn)
        .await?
        > 0;
    if !order_exists {
        return Err(InvoiceError::OrderNotFound(order_id).into());
    }

    let invoiced = invoices::Entity::find()
        .filter(invoices::Column::SalesOrderId.eq(order_id))
        .count(txn)
        .await?
        > 0;
    if invoiced {
        return Err(InvoiceError::OrderAlreadyInvoiced(order_id).into());
    }
    Ok(())
}

/// Posts the issue entry and marks the invoice SENT.
async fn issue_in(
    txn: &DatabaseTransaction,
    tenant_id: TenantId,
    invoice: invoices::Model,
) -> Result<invoices::Model, InvoiceStoreError> {
    let receivable = system_account(txn, tenant_id, SystemAccount::AccountsReceivable).await?;
    let income = system_account(txn, tenant_id, SystemAccount::SalesIncome).await?;

    let entry = post_entry(
        txn,
        &PostEntryInput {
            tenant_id,
            date: invoice.date,
            memo: format!("Invoice {}", invoice.invoice_number),
            is_adjusting: false,
            source: EntrySource::Invoice,
            lines: InvoiceService::issue_lines(
                receivable,
                income,
                invoice.total_amount,
                &invoice.invoice_number,
            ),
        },
        None,
    )
    .await?;

    let mut active = invoice.into_active_model();
    active.status = Set(InvoiceStatus::Sent.into());
    active.journal_entry_id = Set(Some(entry.id));
    active.updated_at = Set(Utc::now().into());
    let invoice = active.update(txn).await?;

    info!(
        tenant_id = %tenant_id,
        invoice_id = %invoice.id,
        entry_id = %entry.id,
        "Invoice sent"
    );
    Ok(invoice)
}

/// Loads an invoice and takes its row lock.
pub(crate) async fn lock_invoice(
    txn: &DatabaseTransaction,
    tenant_id: TenantId,
    invoice_id: Uuid,
) -> Result<invoices::Model, InvoiceStoreError> {
    let invoice = invoices::Entity::find_by_id(invoice_id)
        .filter(invoices::Column::TenantId.eq(tenant_id.into_inner()))
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or(InvoiceError::NotFound(invoice_id))?;
    Ok(invoice)
}

/// Writes a new `amount_paid` and the status recomputed from it.
pub(crate) async fn settle(
    txn: &DatabaseTransaction,
    invoice: invoices::Model,
    amount_paid: Decimal,
) -> Result<invoices::Model, DbErr> {
    let status =
        InvoiceService::recompute_status(invoice.status.into(), invoice.total_amount, amount_paid);

    let mut active = invoice.into_active_model();
    active.amount_paid = Set(amount_paid);
    active.status = Set(status.into());
    active.updated_at = Set(Utc::now().into());
    active.update(txn).await
}
