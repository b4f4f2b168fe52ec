//! Tenant routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use tally_db::{TenantRepository, entities::tenants};
use tally_shared::types::TenantId;
use uuid::Uuid;

use crate::{AppState, error::ApiResult};

/// Creates the tenant routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tenants", post(create_tenant))
        .route("/tenants/{tenant_id}", get(get_tenant))
}

/// Request body for creating a tenant.
#[derive(Debug, Deserialize)]
pub struct CreateTenantRequest {
    /// Display name.
    pub name: String,
}

/// Response for a tenant.
#[derive(Debug, Serialize)]
pub struct TenantResponse {
    /// Tenant ID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Creation timestamp.
    pub created_at: DateTime<FixedOffset>,
}

impl From<tenants::Model> for TenantResponse {
    fn from(t: tenants::Model) -> Self {
        Self {
            id: t.id,
            name: t.name,
            created_at: t.created_at,
        }
    }
}

/// POST `/tenants` - Create a tenant with its system chart of accounts.
async fn create_tenant(
    State(state): State<AppState>,
    Json(payload): Json<CreateTenantRequest>,
) -> ApiResult<(StatusCode, Json<TenantResponse>)> {
    let tenant = TenantRepository::new(state.conn())
        .create(&payload.name)
        .await?;
    Ok((StatusCode::CREATED, Json(tenant.into())))
}

/// GET `/tenants/{tenant_id}` - Get a tenant.
async fn get_tenant(
    State(state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
) -> ApiResult<Json<TenantResponse>> {
    let tenant = TenantRepository::new(state.conn())
        .get(TenantId::from_uuid(tenant_id))
        .await?;
    Ok(Json(tenant.into()))
}
