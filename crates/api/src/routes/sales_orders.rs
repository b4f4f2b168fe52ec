//! Sales order routes, including confirmation.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_core::fulfillment::{NewOrderLine, OrderStatus};
use tally_db::{
    SalesOrderRepository,
    repositories::{ConfirmedOrder, CreateOrderInput, OrderDetail},
};
use tally_shared::types::{CustomerId, ProductId};
use uuid::Uuid;

use super::parse_amount;
use crate::{AppState, error::ApiResult, middleware::CurrentTenant};

/// Creates the sales order routes (mounted behind the tenant guard).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tenants/{tenant_id}/sales-orders", post(create_order))
        .route("/tenants/{tenant_id}/sales-orders/{order_id}", get(get_order))
        .route(
            "/tenants/{tenant_id}/sales-orders/{order_id}/confirm",
            post(confirm_order),
        )
        .route(
            "/tenants/{tenant_id}/sales-orders/{order_id}/cancel",
            post(cancel_order),
        )
}

/// One requested order line.
#[derive(Debug, Deserialize)]
pub struct OrderLineRequest {
    /// Ordered product.
    pub product_id: Uuid,
    /// Units ordered, greater than zero.
    pub quantity: i32,
    /// Unit price as a decimal string; defaults to the product price.
    pub unit_price: Option<String>,
}

/// Request body for creating a sales order.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    /// Order number, unique within the tenant.
    pub order_number: String,
    /// Ordering customer.
    pub customer_id: Uuid,
    /// Order date.
    pub date: NaiveDate,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Requested lines.
    pub lines: Vec<OrderLineRequest>,
}

impl CreateOrderRequest {
    fn into_input(self) -> ApiResult<CreateOrderInput> {
        let lines = self
            .lines
            .into_iter()
            .enumerate()
            .map(|(index, line)| {
                let unit_price = line
                    .unit_price
                    .map(|raw| parse_amount(&format!("lines[{index}].unit_price"), &raw))
                    .transpose()?;
                Ok(NewOrderLine {
                    product_id: ProductId::from_uuid(line.product_id),
                    quantity: line.quantity,
                    unit_price,
                })
            })
            .collect::<ApiResult<Vec<_>>>()?;
        Ok(CreateOrderInput {
            order_number: self.order_number,
            customer_id: CustomerId::from_uuid(self.customer_id),
            date: self.date,
            notes: self.notes,
            lines,
        })
    }
}

/// A stored order line.
#[derive(Debug, Serialize)]
pub struct OrderLineResponse {
    /// Ordered product.
    pub product_id: Uuid,
    /// Units ordered.
    pub quantity: i32,
    /// Price per unit.
    pub unit_price: Decimal,
}

/// Response for a sales order.
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    /// Order ID.
    pub id: Uuid,
    /// Order number.
    pub order_number: String,
    /// Ordering customer.
    pub customer_id: Uuid,
    /// Order date.
    pub date: NaiveDate,
    /// DRAFT, CONFIRMED or CANCELLED.
    pub status: OrderStatus,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Lines in entry order.
    pub lines: Vec<OrderLineResponse>,
    /// Sum of quantity times unit price.
    pub total: Decimal,
    /// Invoice raised on confirmation.
    pub invoice_id: Option<Uuid>,
}

impl From<OrderDetail> for OrderResponse {
    fn from(detail: OrderDetail) -> Self {
        let order = detail.order;
        Self {
            id: order.id,
            order_number: order.order_number,
            customer_id: order.customer_id,
            date: order.date,
            status: order.status.into(),
            notes: order.notes,
            lines: detail
                .lines
                .into_iter()
                .map(|l| OrderLineResponse {
                    product_id: l.product_id,
                    quantity: l.quantity,
                    unit_price: l.unit_price,
                })
                .collect(),
            total: detail.total,
            invoice_id: detail.invoice_id,
        }
    }
}

/// Response for a confirmation.
#[derive(Debug, Serialize)]
pub struct ConfirmOrderResponse {
    /// Order ID.
    pub order_id: Uuid,
    /// Status after confirmation.
    pub order_status: OrderStatus,
    /// Invoice raised for the order.
    pub invoice_id: Uuid,
    /// Invoice number, `INV-{order_number}`.
    pub invoice_number: String,
    /// Invoice total.
    pub total_amount: Decimal,
    /// Invoice due date.
    pub due_date: NaiveDate,
}

impl From<ConfirmedOrder> for ConfirmOrderResponse {
    fn from(confirmed: ConfirmedOrder) -> Self {
        Self {
            order_id: confirmed.order.id,
            order_status: confirmed.order.status.into(),
            invoice_id: confirmed.invoice.id,
            invoice_number: confirmed.invoice.invoice_number,
            total_amount: confirmed.invoice.total_amount,
            due_date: confirmed.invoice.due_date,
        }
    }
}

/// POST `/tenants/{tenant_id}/sales-orders` - Create a draft order.
async fn create_order(
    State(state): State<AppState>,
    CurrentTenant(tenant_id): CurrentTenant,
    Json(payload): Json<CreateOrderRequest>,
) -> ApiResult<(StatusCode, Json<OrderResponse>)> {
    let input = payload.into_input()?;
    let detail = SalesOrderRepository::new(state.conn())
        .create(tenant_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(detail.into())))
}

/// GET `/tenants/{tenant_id}/sales-orders/{order_id}` - Order with lines.
async fn get_order(
    State(state): State<AppState>,
    CurrentTenant(tenant_id): CurrentTenant,
    Path((_, order_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<OrderResponse>> {
    let detail = SalesOrderRepository::new(state.conn())
        .get(tenant_id, order_id)
        .await?;
    Ok(Json(detail.into()))
}

/// POST `/tenants/{tenant_id}/sales-orders/{order_id}/confirm` - Reserve stock and invoice.
async fn confirm_order(
    State(state): State<AppState>,
    CurrentTenant(tenant_id): CurrentTenant,
    Path((_, order_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<ConfirmOrderResponse>> {
    let confirmed = SalesOrderRepository::new(state.conn())
        .confirm(tenant_id, order_id, state.billing.payment_terms_days)
        .await?;
    Ok(Json(confirmed.into()))
}

/// POST `/tenants/{tenant_id}/sales-orders/{order_id}/cancel` - Cancel a draft order.
async fn cancel_order(
    State(state): State<AppState>,
    CurrentTenant(tenant_id): CurrentTenant,
    Path((_, order_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<OrderResponse>> {
    let detail = SalesOrderRepository::new(state.conn())
        .cancel(tenant_id, order_id)
        .await?;
    Ok(Json(detail.into()))
}
