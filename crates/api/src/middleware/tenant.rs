//! Tenant resolution for routes nested under `/tenants/{tenant_id}`.

use std::collections::HashMap;

use axum::{
    extract::{FromRequestParts, Path, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use tally_db::TenantRepository;
use tally_shared::AppError;
use tally_shared::types::TenantId;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// Resolves `{tenant_id}` from the matched route and rejects unknown tenants.
///
/// The resolved ID is stored in request extensions for `CurrentTenant`.
pub async fn tenant_guard(
    State(state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let raw = params
        .get("tenant_id")
        .ok_or_else(|| ApiError::validation("Missing tenant ID"))?;
    let tenant_id = Uuid::parse_str(raw)
        .map(TenantId::from_uuid)
        .map_err(|_| ApiError::validation(format!("Invalid tenant ID: {raw}")))?;

    if !TenantRepository::new(state.conn()).exists(tenant_id).await? {
        return Err(ApiError(AppError::NotFound(format!(
            "Tenant not found: {tenant_id}"
        ))));
    }

    request.extensions_mut().insert(tenant_id);
    Ok(next.run(request).await)
}

/// Extractor for the tenant resolved by `tenant_guard`.
#[derive(Debug, Clone, Copy)]
pub struct CurrentTenant(pub TenantId);

impl<S> FromRequestParts<S> for CurrentTenant
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<TenantId>()
            .copied()
            .map(CurrentTenant)
            .ok_or_else(|| ApiError(AppError::Internal("Tenant not resolved".to_string())))
    }
}
