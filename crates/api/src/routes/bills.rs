//! Supplier bill routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_core::payables::{BillDisplayStatus, BillStatus};
use tally_core::payments::PaymentMethod;
use tally_db::{
    BillRepository,
    entities::bill_payments,
    repositories::{BillDetail, BillFilter, CreateBillInput, PayBillInput},
};
use tally_shared::types::{PageRequest, PageResponse, SupplierId};
use uuid::Uuid;

use super::parse_amount;
use crate::{AppState, error::ApiResult, middleware::CurrentTenant};

/// Creates the bill routes (mounted behind the tenant guard).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tenants/{tenant_id}/bills", get(list_bills).post(create_bill))
        .route("/tenants/{tenant_id}/bills/{bill_id}", get(get_bill))
        .route(
            "/tenants/{tenant_id}/bills/{bill_id}/approve",
            post(approve_bill),
        )
        .route(
            "/tenants/{tenant_id}/bills/{bill_id}/cancel",
            post(cancel_bill),
        )
        .route(
            "/tenants/{tenant_id}/bills/{bill_id}/payments",
            post(pay_bill),
        )
        .route(
            "/tenants/{tenant_id}/bill-payments/{payment_id}",
            delete(delete_bill_payment),
        )
}

/// Request body for creating a bill.
#[derive(Debug, Deserialize)]
pub struct CreateBillRequest {
    /// Billing supplier.
    pub supplier_id: Uuid,
    /// Bill number; generated when absent.
    pub bill_number: Option<String>,
    /// Bill date.
    pub date: NaiveDate,
    /// Due date, on or after `date`.
    pub due_date: NaiveDate,
    /// Total as a decimal string.
    pub total_amount: String,
    /// Payment terms text, e.g. "Net 30".
    pub terms: Option<String>,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Approve (and post) immediately.
    #[serde(default)]
    pub approve: bool,
}

/// Request body for paying a bill.
#[derive(Debug, Deserialize)]
pub struct PayBillRequest {
    /// Amount as a decimal string.
    pub amount: String,
    /// Payment date.
    pub date: NaiveDate,
    /// Account the money leaves from.
    pub payment_method: PaymentMethod,
    /// External reference.
    pub reference: Option<String>,
}

/// Query parameters for listing bills.
#[derive(Debug, Deserialize)]
pub struct ListBillsQuery {
    /// Filter by persisted status.
    pub status: Option<BillStatus>,
    /// Filter by supplier.
    pub supplier_id: Option<Uuid>,
}

/// Response for a bill payment.
#[derive(Debug, Serialize)]
pub struct BillPaymentResponse {
    /// Payment ID.
    pub id: Uuid,
    /// Bill paid.
    pub bill_id: Uuid,
    /// Amount paid.
    pub amount: Decimal,
    /// Payment date.
    pub date: NaiveDate,
    /// Account the money left from.
    pub payment_method: PaymentMethod,
    /// External reference.
    pub reference: Option<String>,
    /// Disbursement posting.
    pub journal_entry_id: Uuid,
    /// Whether the payment has been deleted.
    pub deleted: bool,
}

impl From<bill_payments::Model> for BillPaymentResponse {
    fn from(p: bill_payments::Model) -> Self {
        Self {
            id: p.id,
            bill_id: p.bill_id,
            amount: p.amount,
            date: p.date,
            payment_method: p.payment_method.into(),
            reference: p.reference,
            journal_entry_id: p.journal_entry_id,
            deleted: p.deleted_at.is_some(),
        }
    }
}

/// Response for a bill.
#[derive(Debug, Serialize)]
pub struct BillResponse {
    /// Bill ID.
    pub id: Uuid,
    /// Bill number.
    pub bill_number: String,
    /// Billing supplier.
    pub supplier_id: Uuid,
    /// Bill date.
    pub date: NaiveDate,
    /// Due date.
    pub due_date: NaiveDate,
    /// Bill total.
    pub total_amount: Decimal,
    /// Sum of live payments.
    pub amount_paid: Decimal,
    /// Amount still owed.
    pub amount_due: Decimal,
    /// Persisted status.
    pub status: BillStatus,
    /// Status including OVERDUE.
    pub display_status: BillDisplayStatus,
    /// Payment terms text.
    pub terms: Option<String>,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Approval posting.
    pub journal_entry_id: Option<Uuid>,
    /// Live payments.
    pub payments: Vec<BillPaymentResponse>,
}

impl From<BillDetail> for BillResponse {
    fn from(detail: BillDetail) -> Self {
        let bill = detail.bill;
        Self {
            id: bill.id,
            bill_number: bill.bill_number,
            supplier_id: bill.supplier_id,
            date: bill.date,
            due_date: bill.due_date,
            total_amount: bill.total_amount,
            amount_paid: bill.amount_paid,
            amount_due: detail.amount_due,
            status: bill.status.into(),
            display_status: detail.display_status,
            terms: bill.terms,
            notes: bill.notes,
            journal_entry_id: bill.journal_entry_id,
            payments: detail.payments.into_iter().map(Into::into).collect(),
        }
    }
}

/// POST `/tenants/{tenant_id}/bills` - Record a bill.
async fn create_bill(
    State(state): State<AppState>,
    CurrentTenant(tenant_id): CurrentTenant,
    Json(payload): Json<CreateBillRequest>,
) -> ApiResult<(StatusCode, Json<BillResponse>)> {
    let input = CreateBillInput {
        supplier_id: SupplierId::from_uuid(payload.supplier_id),
        bill_number: payload.bill_number,
        date: payload.date,
        due_date: payload.due_date,
        total_amount: parse_amount("total_amount", &payload.total_amount)?,
        terms: payload.terms,
        notes: payload.notes,
        approve: payload.approve,
    };
    let detail = BillRepository::new(state.conn())
        .create(tenant_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(detail.into())))
}

/// GET `/tenants/{tenant_id}/bills` - List bills.
async fn list_bills(
    State(state): State<AppState>,
    CurrentTenant(tenant_id): CurrentTenant,
    Query(page): Query<PageRequest>,
    Query(query): Query<ListBillsQuery>,
) -> ApiResult<Json<PageResponse<BillResponse>>> {
    let filter = BillFilter {
        status: query.status,
        supplier_id: query.supplier_id,
    };
    let (bills, total) = BillRepository::new(state.conn())
        .list(tenant_id, filter, page.offset(), page.limit())
        .await?;
    let data = bills.into_iter().map(Into::into).collect();
    Ok(Json(PageResponse::new(data, &page, total)))
}

/// GET `/tenants/{tenant_id}/bills/{bill_id}` - Bill with payments.
async fn get_bill(
    State(state): State<AppState>,
    CurrentTenant(tenant_id): CurrentTenant,
    Path((_, bill_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<BillResponse>> {
    let detail = BillRepository::new(state.conn())
        .get(tenant_id, bill_id)
        .await?;
    Ok(Json(detail.into()))
}

/// POST `/tenants/{tenant_id}/bills/{bill_id}/approve` - Approve a draft.
async fn approve_bill(
    State(state): State<AppState>,
    CurrentTenant(tenant_id): CurrentTenant,
    Path((_, bill_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<BillResponse>> {
    let detail = BillRepository::new(state.conn())
        .approve(tenant_id, bill_id)
        .await?;
    Ok(Json(detail.into()))
}

/// POST `/tenants/{tenant_id}/bills/{bill_id}/cancel` - Cancel an unpaid bill.
async fn cancel_bill(
    State(state): State<AppState>,
    CurrentTenant(tenant_id): CurrentTenant,
    Path((_, bill_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<BillResponse>> {
    let detail = BillRepository::new(state.conn())
        .cancel(tenant_id, bill_id)
        .await?;
    Ok(Json(detail.into()))
}

/// POST `/tenants/{tenant_id}/bills/{bill_id}/payments` - Pay a bill.
async fn pay_bill(
    State(state): State<AppState>,
    CurrentTenant(tenant_id): CurrentTenant,
    Path((_, bill_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<PayBillRequest>,
) -> ApiResult<(StatusCode, Json<BillPaymentResponse>)> {
    let input = PayBillInput {
        amount: parse_amount("amount", &payload.amount)?,
        date: payload.date,
        payment_method: payload.payment_method,
        reference: payload.reference,
    };
    let payment = BillRepository::new(state.conn())
        .pay(tenant_id, bill_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(payment.into())))
}

/// DELETE `/tenants/{tenant_id}/bill-payments/{payment_id}` - Soft-delete and reverse.
async fn delete_bill_payment(
    State(state): State<AppState>,
    CurrentTenant(tenant_id): CurrentTenant,
    Path((_, payment_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<BillPaymentResponse>> {
    let payment = BillRepository::new(state.conn())
        .delete_payment(tenant_id, payment_id)
        .await?;
    Ok(Json(payment.into()))
}
