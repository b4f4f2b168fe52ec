//! Check routes.

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
use tally_db::{CheckRepository, entities::checks, repositories::CreateCheckInput};
use tally_shared::types::{AccountId, SupplierId};
use uuid::Uuid;

use super::parse_amount;
use crate::{AppState, error::ApiResult, middleware::CurrentTenant};

/// Creates the check routes (mounted behind the tenant guard).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/tenants/{tenant_id}/checks",
            get(list_checks).post(create_check),
        )
        .route("/tenants/{tenant_id}/checks/{check_id}", get(get_check))
        .route(
            "/tenants/{tenant_id}/checks/{check_id}/void",
            post(void_check),
        )
}

/// Request body for writing a check.
#[derive(Debug, Deserialize)]
pub struct CreateCheckRequest {
    /// BANK account the check is drawn on.
    pub bank_account_id: Uuid,
    /// Account charged; Purchases when absent.
    pub expense_account_id: Option<Uuid>,
    /// Supplier paid, when the payee is one.
    pub supplier_id: Option<Uuid>,
    /// Name printed on the check.
    pub payee_name: Option<String>,
    /// Check number; generated when absent.
    pub check_number: Option<String>,
    /// Check date.
    pub date: NaiveDate,
    /// Amount as a decimal string.
    pub total_amount: String,
    /// Free-text memo.
    pub memo: Option<String>,
}

/// Query parameters for listing checks.
#[derive(Debug, Deserialize)]
pub struct ListChecksQuery {
    /// Restrict to one bank account.
    pub bank_account_id: Option<Uuid>,
}

/// Response for a check.
#[derive(Debug, Serialize)]
pub struct CheckResponse {
    /// Check ID.
    pub id: Uuid,
    /// Check number.
    pub check_number: String,
    /// Account drawn on.
    pub bank_account_id: Uuid,
    /// Account charged.
    pub expense_account_id: Uuid,
    /// Supplier paid, if any.
    pub supplier_id: Option<Uuid>,
    /// Name printed on the check.
    pub payee_name: String,
    /// Check date.
    pub date: NaiveDate,
    /// Amount paid.
    pub total_amount: Decimal,
    /// Free-text memo.
    pub memo: Option<String>,
    /// POSTED or VOID.
    pub status: CashDocumentStatus,
    /// Check posting.
    pub journal_entry_id: Uuid,
    /// Reversal posting, once voided.
    pub reversal_entry_id: Option<Uuid>,
}

impl From<checks::Model> for CheckResponse {
    fn from(c: checks::Model) -> Self {
        Self {
            id: c.id,
            check_number: c.check_number,
            bank_account_id: c.bank_account_id,
            expense_account_id: c.expense_account_id,
            supplier_id: c.supplier_id,
            payee_name: c.payee_name,
            date: c.date,
            total_amount: c.total_amount,
            memo: c.memo,
            status: c.status.into(),
            journal_entry_id: c.journal_entry_id,
            reversal_entry_id: c.reversal_entry_id,
        }
    }
}

/// POST `/tenants/{tenant_id}/checks` - Write a check.
async fn create_check(
    State(state): State<AppState>,
    CurrentTenant(tenant_id): CurrentTenant,
    Json(payload): Json<CreateCheckRequest>,
) -> ApiResult<(StatusCode, Json<CheckResponse>)> {
    let input = CreateCheckInput {
        bank_account_id: AccountId::from_uuid(payload.bank_account_id),
        expense_account_id: payload.expense_account_id.map(AccountId::from_uuid),
        supplier_id: payload.supplier_id.map(SupplierId::from_uuid),
        payee_name: payload.payee_name,
        check_number: payload.check_number,
        date: payload.date,
        total_amount: parse_amount("total_amount", &payload.total_amount)?,
        memo: payload.memo,
    };
    let check = CheckRepository::new(state.conn())
        .create(tenant_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(check.into())))
}

/// GET `/tenants/{tenant_id}/checks` - List checks.
async fn list_checks(
    State(state): State<AppState>,
    CurrentTenant(tenant_id): CurrentTenant,
    Query(query): Query<ListChecksQuery>,
) -> ApiResult<Json<Vec<CheckResponse>>> {
    let checks = CheckRepository::new(state.conn())
        .list(tenant_id, query.bank_account_id)
        .await?;
    Ok(Json(checks.into_iter().map(Into::into).collect()))
}

/// GET `/tenants/{tenant_id}/checks/{check_id}` - Get a check.
async fn get_check(
    State(state): State<AppState>,
    CurrentTenant(tenant_id): CurrentTenant,
    Path((_, check_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<CheckResponse>> {
    let check = CheckRepository::new(state.conn())
        .get(tenant_id, check_id)
        .await?;
    Ok(Json(check.into()))
}

/// POST `/tenants/{tenant_id}/checks/{check_id}/void` - Void and reverse.
async fn void_check(
    State(state): State<AppState>,
    CurrentTenant(tenant_id): CurrentTenant,
    Path((_, check_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<CheckResponse>> {
    let check = CheckRepository::new(state.conn())
        .void(tenant_id, check_id)
        .await?;
    Ok(Json(check.into()))
}
