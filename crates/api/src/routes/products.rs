//! Product and stock routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_db::{ProductRepository, entities::products, repositories::CreateProductInput};
use uuid::Uuid;

use super::parse_amount;
use crate::{AppState, error::ApiResult, middleware::CurrentTenant};

/// Creates the product routes (mounted behind the tenant guard).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/tenants/{tenant_id}/products",
            get(list_products).post(create_product),
        )
        .route(
            "/tenants/{tenant_id}/products/{product_id}",
            get(get_product),
        )
        .route(
            "/tenants/{tenant_id}/products/{product_id}/stock",
            post(adjust_stock),
        )
}

/// Request body for creating a product.
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    /// Stock keeping unit, unique within the tenant.
    pub sku: String,
    /// Product name.
    pub name: String,
    /// Default unit price as a decimal string.
    pub unit_price: String,
    /// Opening stock.
    #[serde(default)]
    pub stock_quantity: i32,
}

/// Request body for a stock adjustment.
#[derive(Debug, Deserialize)]
pub struct AdjustStockRequest {
    /// Units to add (positive) or remove (negative).
    pub delta: i32,
}

/// Response for a product.
#[derive(Debug, Serialize)]
pub struct ProductResponse {
    /// Product ID.
    pub id: Uuid,
    /// Stock keeping unit.
    pub sku: String,
    /// Product name.
    pub name: String,
    /// Default unit price.
    pub unit_price: Decimal,
    /// Units on hand.
    pub stock_quantity: i32,
}

impl From<products::Model> for ProductResponse {
    fn from(p: products::Model) -> Self {
        Self {
            id: p.id,
            sku: p.sku,
            name: p.name,
            unit_price: p.unit_price,
            stock_quantity: p.stock_quantity,
        }
    }
}

async fn create_product(
    State(state): State<AppState>,
    CurrentTenant(tenant_id): CurrentTenant,
    Json(payload): Json<CreateProductRequest>,
) -> ApiResult<(StatusCode, Json<ProductResponse>)> {
    let input = CreateProductInput {
        sku: payload.sku,
        name: payload.name,
        unit_price: parse_amount("unit_price", &payload.unit_price)?,
        stock_quantity: payload.stock_quantity,
    };
    let product = ProductRepository::new(state.conn())
        .create(tenant_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(product.into())))
}

async fn list_products(
    State(state): State<AppState>,
    CurrentTenant(tenant_id): CurrentTenant,
) -> ApiResult<Json<Vec<ProductResponse>>> {
    let products = ProductRepository::new(state.conn()).list(tenant_id).await?;
    Ok(Json(products.into_iter().map(Into::into).collect()))
}

async fn get_product(
    State(state): State<AppState>,
    CurrentTenant(tenant_id): CurrentTenant,
    Path((_, product_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<ProductResponse>> {
    let product = ProductRepository::new(state.conn())
        .get(tenant_id, product_id)
        .await?;
    Ok(Json(product.into()))
}

/// POST `/tenants/{tenant_id}/products/{product_id}/stock` - Adjust stock by a delta.
async fn adjust_stock(
    State(state): State<AppState>,
    CurrentTenant(tenant_id): CurrentTenant,
    Path((_, product_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<AdjustStockRequest>,
) -> ApiResult<Json<ProductResponse>> {
    let product = ProductRepository::new(state.conn())
        .adjust_stock(tenant_id, product_id, payload.delta)
        .await?;
    Ok(Json(product.into()))
}
