//! Credit memo routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_core::payments::CreditMemoStatus;
use tally_db::{
    CreditMemoRepository, entities::credit_memos, repositories::CreateCreditMemoInput,
};
use tally_shared::types::CustomerId;
use uuid::Uuid;

use super::parse_amount;
use crate::{AppState, error::ApiResult, middleware::CurrentTenant};

/// Creates the credit memo routes (mounted behind the tenant guard).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/tenants/{tenant_id}/credit-memos",
            get(list_credit_memos).post(create_credit_memo),
        )
        .route(
            "/tenants/{tenant_id}/credit-memos/{credit_memo_id}",
            get(get_credit_memo),
        )
        .route(
            "/tenants/{tenant_id}/credit-memos/{credit_memo_id}/void",
            post(void_credit_memo),
        )
}

/// Request body for a credit memo.
#[derive(Debug, Deserialize)]
pub struct CreateCreditMemoRequest {
    /// Customer credited; must own the invoice.
    pub customer_id: Uuid,
    /// Invoice the credit is applied to.
    pub invoice_id: Uuid,
    /// Memo number; generated when absent.
    pub memo_number: Option<String>,
    /// Memo date.
    pub date: NaiveDate,
    /// Amount as a decimal string.
    pub total_amount: String,
    /// Free-text notes.
    pub notes: Option<String>,
}

/// Query parameters for listing credit memos.
#[derive(Debug, Deserialize)]
pub struct ListCreditMemosQuery {
    /// Restrict to one invoice.
    pub invoice_id: Option<Uuid>,
}

/// Response for a credit memo.
#[derive(Debug, Serialize)]
pub struct CreditMemoResponse {
    /// Memo ID.
    pub id: Uuid,
    /// Memo number.
    pub memo_number: String,
    /// Customer credited.
    pub customer_id: Uuid,
    /// Invoice credited.
    pub invoice_id: Uuid,
    /// Memo date.
    pub date: NaiveDate,
    /// Amount applied.
    pub total_amount: Decimal,
    /// APPLIED or VOID.
    pub status: CreditMemoStatus,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Credit posting.
    pub journal_entry_id: Uuid,
    /// Reversal posting, once voided.
    pub reversal_entry_id: Option<Uuid>,
}

impl From<credit_memos::Model> for CreditMemoResponse {
    fn from(m: credit_memos::Model) -> Self {
        Self {
            id: m.id,
            memo_number: m.memo_number,
            customer_id: m.customer_id,
            invoice_id: m.invoice_id,
            date: m.date,
            total_amount: m.total_amount,
            status: m.status.into(),
            notes: m.notes,
            journal_entry_id: m.journal_entry_id,
            reversal_entry_id: m.reversal_entry_id,
        }
    }
}

/// POST `/tenants/{tenant_id}/credit-memos` - Apply a credit memo.
async fn create_credit_memo(
    State(state): State<AppState>,
    CurrentTenant(tenant_id): CurrentTenant,
    Json(payload): Json<CreateCreditMemoRequest>,
) -> ApiResult<(StatusCode, Json<CreditMemoResponse>)> {
    let input = CreateCreditMemoInput {
        customer_id: CustomerId::from_uuid(payload.customer_id),
        invoice_id: payload.invoice_id,
        memo_number: payload.memo_number,
        date: payload.date,
        total_amount: parse_amount("total_amount", &payload.total_amount)?,
        notes: payload.notes,
    };
    let memo = CreditMemoRepository::new(state.conn())
        .create(tenant_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(memo.into())))
}

/// GET `/tenants/{tenant_id}/credit-memos` - List credit memos.
async fn list_credit_memos(
    State(state): State<AppState>,
    CurrentTenant(tenant_id): CurrentTenant,
    Query(query): Query<ListCreditMemosQuery>,
) -> ApiResult<Json<Vec<CreditMemoResponse>>> {
    let memos = CreditMemoRepository::new(state.conn())
        .list(tenant_id, query.invoice_id)
        .await?;
    Ok(Json(memos.into_iter().map(Into::into).collect()))
}

/// GET `/tenants/{tenant_id}/credit-memos/{credit_memo_id}` - Get a credit memo.
async fn get_credit_memo(
    State(state): State<AppState>,
    CurrentTenant(tenant_id): CurrentTenant,
    Path((_, credit_memo_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<CreditMemoResponse>> {
    let memo = CreditMemoRepository::new(state.conn())
        .get(tenant_id, credit_memo_id)
        .await?;
    Ok(Json(memo.into()))
}

/// POST `/tenants/{tenant_id}/credit-memos/{credit_memo_id}/void` - Void and reverse.
async fn void_credit_memo(
    State(state): State<AppState>,
    CurrentTenant(tenant_id): CurrentTenant,
    Path((_, credit_memo_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<CreditMemoResponse>> {
    let memo = CreditMemoRepository::new(state.conn())
        .void(tenant_id, credit_memo_id)
        .await?;
    Ok(Json(memo.into()))
}
