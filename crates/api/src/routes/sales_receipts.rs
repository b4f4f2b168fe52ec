//! Sales receipt routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_core::cashbook::CashDocumentStatus;
use tally_core::payments::PaymentMethod;
use tally_db::{
    SalesReceiptRepository, entities::sales_receipts, repositories::CreateSalesReceiptInput,
};
use tally_shared::types::CustomerId;
use uuid::Uuid;

use super::parse_amount;
use crate::{AppState, error::ApiResult, middleware::CurrentTenant};

/// Creates the sales receipt routes (mounted behind the tenant guard).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/tenants/{tenant_id}/sales-receipts",
            get(list_sales_receipts).post(create_sales_receipt),
        )
        .route(
            "/tenants/{tenant_id}/sales-receipts/{receipt_id}",
            get(get_sales_receipt),
        )
        .route(
            "/tenants/{tenant_id}/sales-receipts/{receipt_id}/void",
            post(void_sales_receipt),
        )
}

/// Request body for a cash sale.
#[derive(Debug, Deserialize)]
pub struct CreateSalesReceiptRequest {
    /// Buyer, when known.
    pub customer_id: Option<Uuid>,
    /// Receipt number; generated when absent.
    pub receipt_number: Option<String>,
    /// Sale date.
    pub date: NaiveDate,
    /// Amount as a decimal string.
    pub total_amount: String,
    /// How the money arrived.
    pub payment_method: PaymentMethod,
    /// Free-text notes.
    pub notes: Option<String>,
}

/// Query parameters for listing sales receipts.
#[derive(Debug, Deserialize)]
pub struct ListSalesReceiptsQuery {
    /// Restrict to one customer.
    pub customer_id: Option<Uuid>,
}

/// Response for a sales receipt.
#[derive(Debug, Serialize)]
pub struct SalesReceiptResponse {
    /// Receipt ID.
    pub id: Uuid,
    /// Receipt number.
    pub receipt_number: String,
    /// Buyer, when known.
    pub customer_id: Option<Uuid>,
    /// Sale date.
    pub date: NaiveDate,
    /// Amount received.
    pub total_amount: Decimal,
    /// How the money arrived.
    pub payment_method: PaymentMethod,
    /// Account debited.
    pub deposit_account_id: Uuid,
    /// POSTED or VOID.
    pub status: CashDocumentStatus,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Sale posting.
    pub journal_entry_id: Uuid,
    /// Reversal posting, once voided.
    pub reversal_entry_id: Option<Uuid>,
}

impl From<sales_receipts::Model> for SalesReceiptResponse {
    fn from(r: sales_receipts::Model) -> Self {
        Self {
            id: r.id,
            receipt_number: r.receipt_number,
            customer_id: r.customer_id,
            date: r.date,
            total_amount: r.total_amount,
            payment_method: r.payment_method.into(),
            deposit_account_id: r.deposit_account_id,
            status: r.status.into(),
            notes: r.notes,
            journal_entry_id: r.journal_entry_id,
            reversal_entry_id: r.reversal_entry_id,
        }
    }
}

/// POST `/tenants/{tenant_id}/sales-receipts` - Record a cash sale.
async fn create_sales_receipt(
    State(state): State<AppState>,
    CurrentTenant(tenant_id): CurrentTenant,
    Json(payload): Json<CreateSalesReceiptRequest>,
) -> ApiResult<(StatusCode, Json<SalesReceiptResponse>)> {
    let input = CreateSalesReceiptInput {
        customer_id: payload.customer_id.map(CustomerId::from_uuid),
        receipt_number: payload.receipt_number,
        date: payload.date,
        total_amount: parse_amount("total_amount", &payload.total_amount)?,
        payment_method: payload.payment_method,
        notes: payload.notes,
    };
    let receipt = SalesReceiptRepository::new(state.conn())
        .create(tenant_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(receipt.into())))
}

/// GET `/tenants/{tenant_id}/sales-receipts` - List sales receipts.
async fn list_sales_receipts(
    State(state): State<AppState>,
    CurrentTenant(tenant_id): CurrentTenant,
    Query(query): Query<ListSalesReceiptsQuery>,
) -> ApiResult<Json<Vec<SalesReceiptResponse>>> {
    let receipts = SalesReceiptRepository::new(state.conn())
        .list(tenant_id, query.customer_id)
        .await?;
    Ok(Json(receipts.into_iter().map(Into::into).collect()))
}

/// GET `/tenants/{tenant_id}/sales-receipts/{receipt_id}` - Get a sales receipt.
async fn get_sales_receipt(
    State(state): State<AppState>,
    CurrentTenant(tenant_id): CurrentTenant,
    Path((_, receipt_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<SalesReceiptResponse>> {
    let receipt = SalesReceiptRepository::new(state.conn())
        .get(tenant_id, receipt_id)
        .await?;
    Ok(Json(receipt.into()))
}

/// POST `/tenants/{tenant_id}/sales-receipts/{receipt_id}/void` - Void and reverse.
async fn void_sales_receipt(
    State(state): State<AppState>,
    CurrentTenant(tenant_id): CurrentTenant,
    Path((_, receipt_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<SalesReceiptResponse>> {
    let receipt = SalesReceiptRepository::new(state.conn())
        .void(tenant_id, receipt_id)
        .await?;
    Ok(Json(receipt.into()))
}
