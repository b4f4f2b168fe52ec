//! Invoice routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_core::invoicing::{DisplayStatus, InvoiceStatus};
use tally_db::{
    InvoiceRepository, PaymentRepository,
    repositories::{CreateInvoiceInput, InvoiceDetail, InvoiceFilter, InvoiceSummary},
};
use tally_shared::types::{CustomerId, PageRequest, PageResponse, SalesOrderId};
use uuid::Uuid;

use super::{parse_amount, payments::PaymentResponse};
use crate::{AppState, error::ApiResult, middleware::CurrentTenant};

/// Creates the invoice routes (mounted behind the tenant guard).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/tenants/{tenant_id}/invoices",
            get(list_invoices).post(create_invoice),
        )
        .route(
            "/tenants/{tenant_id}/invoices/{invoice_id}",
            get(get_invoice),
        )
        .route(
            "/tenants/{tenant_id}/invoices/{invoice_id}/send",
            post(send_invoice),
        )
        .route(
            "/tenants/{tenant_id}/invoices/{invoice_id}/cancel",
            post(cancel_invoice),
        )
        .route(
            "/tenants/{tenant_id}/invoices/{invoice_id}/payments",
            get(list_invoice_payments),
        )
}

/// Request body for creating an invoice.
#[derive(Debug, Deserialize)]
pub struct CreateInvoiceRequest {
    /// Billed customer.
    pub customer_id: Uuid,
    /// Invoice number; generated when absent.
    pub invoice_number: Option<String>,
    /// Issue date.
    pub date: NaiveDate,
    /// Due date, on or after `date`.
    pub due_date: NaiveDate,
    /// Total as a decimal string.
    pub total_amount: String,
    /// Originating sales order.
    pub sales_order_id: Option<Uuid>,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Issue immediately instead of saving a draft.
    #[serde(default)]
    pub send: bool,
}

impl CreateInvoiceRequest {
    fn into_input(self) -> ApiResult<CreateInvoiceInput> {
        Ok(CreateInvoiceInput {
            customer_id: CustomerId::from_uuid(self.customer_id),
            invoice_number: self.invoice_number,
            date: self.date,
            due_date: self.due_date,
            total_amount: parse_amount("total_amount", &self.total_amount)?,
            sales_order_id: self.sales_order_id.map(SalesOrderId::from_uuid),
            notes: self.notes,
            send: self.send,
        })
    }
}

/// Query parameters for listing invoices.
#[derive(Debug, Deserialize)]
pub struct ListInvoicesQuery {
    /// Filter by persisted status.
    pub status: Option<InvoiceStatus>,
    /// Filter by customer.
    pub customer_id: Option<Uuid>,
}

/// Response for an invoice.
#[derive(Debug, Serialize)]
pub struct InvoiceResponse {
    /// Invoice ID.
    pub id: Uuid,
    /// Invoice number.
    pub invoice_number: String,
    /// Billed customer.
    pub customer_id: Uuid,
    /// Originating sales order.
    pub sales_order_id: Option<Uuid>,
    /// Issue date.
    pub date: NaiveDate,
    /// Due date.
    pub due_date: NaiveDate,
    /// Invoice total.
    pub total_amount: Decimal,
    /// Sum of live payments and applied credit memos.
    pub amount_paid: Decimal,
    /// Amount still owed.
    pub amount_due: Decimal,
    /// Persisted status.
    pub status: InvoiceStatus,
    /// Status including OVERDUE.
    pub display_status: DisplayStatus,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Issue posting.
    pub journal_entry_id: Option<Uuid>,
    /// Live payments, on single-invoice reads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payments: Option<Vec<PaymentResponse>>,
}

impl From<InvoiceSummary> for InvoiceResponse {
    fn from(summary: InvoiceSummary) -> Self {
        let invoice = summary.invoice;
        Self {
            id: invoice.id,
            invoice_number: invoice.invoice_number,
            customer_id: invoice.customer_id,
            sales_order_id: invoice.sales_order_id,
            date: invoice.date,
            due_date: invoice.due_date,
            total_amount: invoice.total_amount,
            amount_paid: invoice.amount_paid,
            amount_due: summary.amount_due,
            status: invoice.status.into(),
            display_status: summary.display_status,
            notes: invoice.notes,
            journal_entry_id: invoice.journal_entry_id,
            payments: None,
        }
    }
}

impl From<InvoiceDetail> for InvoiceResponse {
    fn from(detail: InvoiceDetail) -> Self {
        let mut response = Self::from(detail.summary);
        response.payments = Some(detail.payments.into_iter().map(Into::into).collect());
        response
    }
}

/// POST `/tenants/{tenant_id}/invoices` - Create a draft (or sent) invoice.
async fn create_invoice(
    State(state): State<AppState>,
    CurrentTenant(tenant_id): CurrentTenant,
    Json(payload): Json<CreateInvoiceRequest>,
) -> ApiResult<(StatusCode, Json<InvoiceResponse>)> {
    let input = payload.into_input()?;
    let detail = InvoiceRepository::new(state.conn())
        .create(tenant_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(detail.into())))
}

/// GET `/tenants/{tenant_id}/invoices` - List invoices.
async fn list_invoices(
    State(state): State<AppState>,
    CurrentTenant(tenant_id): CurrentTenant,
    Query(page): Query<PageRequest>,
    Query(query): Query<ListInvoicesQuery>,
) -> ApiResult<Json<PageResponse<InvoiceResponse>>> {
    let filter = InvoiceFilter {
        status: query.status,
        customer_id: query.customer_id,
    };
    let (invoices, total) = InvoiceRepository::new(state.conn())
        .list(tenant_id, filter, page.offset(), page.limit())
        .await?;
    let data = invoices.into_iter().map(Into::into).collect();
    Ok(Json(PageResponse::new(data, &page, total)))
}

/// GET `/tenants/{tenant_id}/invoices/{invoice_id}` - Invoice with payments.
async fn get_invoice(
    State(state): State<AppState>,
    CurrentTenant(tenant_id): CurrentTenant,
    Path((_, invoice_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<InvoiceResponse>> {
    let detail = InvoiceRepository::new(state.conn())
        .get(tenant_id, invoice_id)
        .await?;
    Ok(Json(detail.into()))
}

/// POST `/tenants/{tenant_id}/invoices/{invoice_id}/send` - Issue a draft.
async fn send_invoice(
    State(state): State<AppState>,
    CurrentTenant(tenant_id): CurrentTenant,
    Path((_, invoice_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<InvoiceResponse>> {
    let detail = InvoiceRepository::new(state.conn())
        .send(tenant_id, invoice_id)
        .await?;
    Ok(Json(detail.into()))
}

/// POST `/tenants/{tenant_id}/invoices/{invoice_id}/cancel` - Cancel an unpaid invoice.
async fn cancel_invoice(
    State(state): State<AppState>,
    CurrentTenant(tenant_id): CurrentTenant,
    Path((_, invoice_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<InvoiceResponse>> {
    let detail = InvoiceRepository::new(state.conn())
        .cancel(tenant_id, invoice_id)
        .await?;
    Ok(Json(detail.into()))
}

/// GET `/tenants/{tenant_id}/invoices/{invoice_id}/payments` - Live payments.
async fn list_invoice_payments(
    State(state): State<AppState>,
    CurrentTenant(tenant_id): CurrentTenant,
    Path((_, invoice_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<Vec<PaymentResponse>>> {
    let payments = PaymentRepository::new(state.conn())
        .list_for_invoice(tenant_id, invoice_id)
        .await?;
    Ok(Json(payments.into_iter().map(Into::into).collect()))
}
