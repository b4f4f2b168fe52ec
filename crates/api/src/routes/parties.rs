//! Customer and supplier routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use serde::{Deserialize, Serialize};
use tally_db::{
    PartyRepository,
    entities::{customers, suppliers},
    repositories::CreatePartyInput,
};
use uuid::Uuid;

use crate::{AppState, error::ApiResult, middleware::CurrentTenant};

/// Creates the customer and supplier routes (mounted behind the tenant guard).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/tenants/{tenant_id}/customers",
            get(list_customers).post(create_customer),
        )
        .route(
            "/tenants/{tenant_id}/customers/{customer_id}",
            get(get_customer),
        )
        .route(
            "/tenants/{tenant_id}/suppliers",
            get(list_suppliers).post(create_supplier),
        )
        .route(
            "/tenants/{tenant_id}/suppliers/{supplier_id}",
            get(get_supplier),
        )
}

/// Request body for a customer or supplier.
#[derive(Debug, Deserialize)]
pub struct CreatePartyRequest {
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
}

impl From<CreatePartyRequest> for CreatePartyInput {
    fn from(r: CreatePartyRequest) -> Self {
        Self {
            name: r.name,
            email: r.email,
            phone: r.phone,
        }
    }
}

/// Response for a customer or supplier.
#[derive(Debug, Serialize)]
pub struct PartyResponse {
    /// Party ID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
}

impl From<customers::Model> for PartyResponse {
    fn from(c: customers::Model) -> Self {
        Self {
            id: c.id,
            name: c.name,
            email: c.email,
            phone: c.phone,
        }
    }
}

impl From<suppliers::Model> for PartyResponse {
    fn from(s: suppliers::Model) -> Self {
        Self {
            id: s.id,
            name: s.name,
            email: s.email,
            phone: s.phone,
        }
    }
}

async fn create_customer(
    State(state): State<AppState>,
    CurrentTenant(tenant_id): CurrentTenant,
    Json(payload): Json<CreatePartyRequest>,
) -> ApiResult<(StatusCode, Json<PartyResponse>)> {
    let customer = PartyRepository::new(state.conn())
        .create_customer(tenant_id, payload.into())
        .await?;
    Ok((StatusCode::CREATED, Json(customer.into())))
}

async fn list_customers(
    State(state): State<AppState>,
    CurrentTenant(tenant_id): CurrentTenant,
) -> ApiResult<Json<Vec<PartyResponse>>> {
    let customers = PartyRepository::new(state.conn())
        .list_customers(tenant_id)
        .await?;
    Ok(Json(customers.into_iter().map(Into::into).collect()))
}

async fn get_customer(
    State(state): State<AppState>,
    CurrentTenant(tenant_id): CurrentTenant,
    Path((_, customer_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<PartyResponse>> {
    let customer = PartyRepository::new(state.conn())
        .get_customer(tenant_id, customer_id)
        .await?;
    Ok(Json(customer.into()))
}

async fn create_supplier(
    State(state): State<AppState>,
    CurrentTenant(tenant_id): CurrentTenant,
    Json(payload): Json<CreatePartyRequest>,
) -> ApiResult<(StatusCode, Json<PartyResponse>)> {
    let supplier = PartyRepository::new(state.conn())
        .create_supplier(tenant_id, payload.into())
        .await?;
    Ok((StatusCode::CREATED, Json(supplier.into())))
}

async fn list_suppliers(
    State(state): State<AppState>,
    CurrentTenant(tenant_id): CurrentTenant,
) -> ApiResult<Json<Vec<PartyResponse>>> {
    let suppliers = PartyRepository::new(state.conn())
        .list_suppliers(tenant_id)
        .await?;
    Ok(Json(suppliers.into_iter().map(Into::into).collect()))
}

async fn get_supplier(
    State(state): State<AppState>,
    CurrentTenant(tenant_id): CurrentTenant,
    Path((_, supplier_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<PartyResponse>> {
    let supplier = PartyRepository::new(state.conn())
        .get_supplier(tenant_id, supplier_id)
        .await?;
    Ok(Json(supplier.into()))
}
