//! Customer payment routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_core::payments::PaymentMethod;
use tally_db::{PaymentRepository, entities::payments, repositories::RecordPaymentInput};
use uuid::Uuid;

use super::parse_amount;
use crate::{AppState, error::ApiResult, middleware::CurrentTenant};

/// Header carrying a client idempotency key, as an alternative to the body field.
pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

/// Creates the payment routes (mounted behind the tenant guard).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tenants/{tenant_id}/payments", post(record_payment))
        .route(
            "/tenants/{tenant_id}/payments/{payment_id}",
            get(get_payment).delete(delete_payment),
        )
}

/// Request body for recording a payment.
#[derive(Debug, Deserialize)]
pub struct RecordPaymentRequest {
    /// Invoice being paid.
    pub invoice_id: Uuid,
    /// Amount as a decimal string.
    pub amount: String,
    /// Payment date.
    pub date: NaiveDate,
    /// How the money arrived.
    pub payment_method: PaymentMethod,
    /// External reference such as a cheque number.
    pub reference: Option<String>,
    /// Client idempotency key.
    pub idempotency_key: Option<String>,
}

impl RecordPaymentRequest {
    fn into_input(self, header_key: Option<String>) -> ApiResult<(Uuid, RecordPaymentInput)> {
        let input = RecordPaymentInput {
            amount: parse_amount("amount", &self.amount)?,
            date: self.date,
            payment_method: self.payment_method,
            reference: self.reference,
            idempotency_key: self.idempotency_key.or(header_key),
        };
        Ok((self.invoice_id, input))
    }
}

/// Response for a payment.
#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    /// Payment ID.
    pub id: Uuid,
    /// Invoice paid.
    pub invoice_id: Uuid,
    /// Amount received.
    pub amount: Decimal,
    /// Payment date.
    pub date: NaiveDate,
    /// How the money arrived.
    pub payment_method: PaymentMethod,
    /// External reference.
    pub reference: Option<String>,
    /// Receipt posting.
    pub journal_entry_id: Uuid,
    /// Reversal posting, once deleted.
    pub reversal_entry_id: Option<Uuid>,
    /// Whether the payment has been deleted.
    pub deleted: bool,
}

impl From<payments::Model> for PaymentResponse {
    fn from(p: payments::Model) -> Self {
        Self {
            id: p.id,
            invoice_id: p.invoice_id,
            amount: p.amount,
            date: p.date,
            payment_method: p.payment_method.into(),
            reference: p.reference,
            journal_entry_id: p.journal_entry_id,
            reversal_entry_id: p.reversal_entry_id,
            deleted: p.deleted_at.is_some(),
        }
    }
}

/// POST `/tenants/{tenant_id}/payments` - Apply a payment to an invoice.
async fn record_payment(
    State(state): State<AppState>,
    CurrentTenant(tenant_id): CurrentTenant,
    headers: HeaderMap,
    Json(payload): Json<RecordPaymentRequest>,
) -> ApiResult<(StatusCode, Json<PaymentResponse>)> {
    let header_key = headers
        .get(IDEMPOTENCY_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let (invoice_id, input) = payload.into_input(header_key)?;
    let payment = PaymentRepository::new(state.conn())
        .record(tenant_id, invoice_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(payment.into())))
}

/// GET `/tenants/{tenant_id}/payments/{payment_id}` - Get a payment.
async fn get_payment(
    State(state): State<AppState>,
    CurrentTenant(tenant_id): CurrentTenant,
    Path((_, payment_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<PaymentResponse>> {
    let payment = PaymentRepository::new(state.conn())
        .get(tenant_id, payment_id)
        .await?;
    Ok(Json(payment.into()))
}

/// DELETE `/tenants/{tenant_id}/payments/{payment_id}` - Soft-delete and reverse.
async fn delete_payment(
    State(state): State<AppState>,
    CurrentTenant(tenant_id): CurrentTenant,
    Path((_, payment_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<PaymentResponse>> {
    let payment = PaymentRepository::new(state.conn())
        .delete(tenant_id, payment_id)
        .await?;
    Ok(Json(payment.into()))
}
