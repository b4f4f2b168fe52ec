//! Chart of accounts routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use tally_core::ledger::{AccountRemoval, AccountType};
use tally_core::reports::GeneralLedgerAccount;
use tally_db::{
    AccountRepository, LedgerRepository,
    entities::accounts,
    repositories::{AccountFilter, CreateAccountInput, UpdateAccountInput},
};
use uuid::Uuid;

use crate::{AppState, error::ApiResult, middleware::CurrentTenant};

/// Creates the account routes (mounted behind the tenant guard).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/tenants/{tenant_id}/accounts",
            get(list_accounts).post(create_account),
        )
        .route(
            "/tenants/{tenant_id}/accounts/{account_id}",
            get(get_account).put(update_account).delete(delete_account),
        )
        .route(
            "/tenants/{tenant_id}/accounts/{account_id}/balance",
            get(get_account_balance),
        )
        .route(
            "/tenants/{tenant_id}/accounts/{account_id}/ledger",
            get(get_account_ledger),
        )
}

/// Query parameters for listing accounts.
#[derive(Debug, Deserialize)]
pub struct ListAccountsQuery {
    /// Filter by account type, e.g. `BANK`.
    #[serde(rename = "type")]
    pub account_type: Option<AccountType>,
    /// Filter by active status.
    pub active: Option<bool>,
}

/// Request body for creating an account.
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    /// Account number (unique within the tenant).
    pub account_number: String,
    /// Account name.
    pub name: String,
    /// Detailed account type.
    #[serde(rename = "type")]
    pub account_type: AccountType,
    /// Free-text detail type.
    pub detail_type: Option<String>,
    /// Account description.
    pub description: Option<String>,
    /// Parent account ID.
    pub parent_id: Option<Uuid>,
}

/// Request body for updating an account.
///
/// `description` and `detail_type` may be sent as `null` to clear them.
#[derive(Debug, Deserialize)]
pub struct UpdateAccountRequest {
    /// Account name.
    pub name: Option<String>,
    /// Account description.
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    /// Free-text detail type.
    #[serde(default, deserialize_with = "double_option")]
    pub detail_type: Option<Option<String>>,
    /// Whether the account accepts postings.
    pub is_active: Option<bool>,
}

/// Distinguishes an absent field from an explicit `null`.
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Response for an account.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    /// Account ID.
    pub id: Uuid,
    /// Account number.
    pub account_number: String,
    /// Account name.
    pub name: String,
    /// Detailed account type.
    #[serde(rename = "type")]
    pub account_type: AccountType,
    /// Free-text detail type.
    pub detail_type: Option<String>,
    /// Account description.
    pub description: Option<String>,
    /// Parent account ID.
    pub parent_id: Option<Uuid>,
    /// Current balance in the account's normal direction.
    pub balance: Decimal,
    /// Whether the account accepts postings.
    pub is_active: bool,
    /// Seeded system account.
    pub is_system: bool,
}

impl From<accounts::Model> for AccountResponse {
    fn from(a: accounts::Model) -> Self {
        Self {
            id: a.id,
            account_number: a.account_number,
            name: a.name,
            account_type: a.account_type.into(),
            detail_type: a.detail_type,
            description: a.description,
            parent_id: a.parent_id,
            balance: a.balance,
            is_active: a.is_active,
            is_system: a.is_system,
        }
    }
}

/// Response for a delete request.
#[derive(Debug, Serialize)]
pub struct DeleteAccountResponse {
    /// Account ID.
    pub id: Uuid,
    /// `deleted`, or `deactivated` when postings exist.
    pub result: &'static str,
}

/// Query parameters for a point-in-time balance.
#[derive(Debug, Deserialize)]
pub struct BalanceQuery {
    /// Date to get balance as of. Defaults to today.
    pub as_of: Option<NaiveDate>,
}

/// Balance response.
#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    /// Account ID.
    pub account_id: Uuid,
    /// Cut-off date, if any.
    pub as_of: Option<NaiveDate>,
    /// Balance in the account's normal direction.
    pub balance: Decimal,
}

/// Query parameters for an account ledger.
#[derive(Debug, Deserialize)]
pub struct LedgerQuery {
    /// Start date (inclusive). Defaults to January 1 of the `to` year.
    pub from: Option<NaiveDate>,
    /// End date (inclusive). Defaults to today.
    pub to: Option<NaiveDate>,
}

/// GET `/tenants/{tenant_id}/accounts` - List accounts with balances.
async fn list_accounts(
    State(state): State<AppState>,
    CurrentTenant(tenant_id): CurrentTenant,
    Query(query): Query<ListAccountsQuery>,
) -> ApiResult<Json<Vec<AccountResponse>>> {
    let filter = AccountFilter {
        account_type: query.account_type,
        is_active: query.active,
    };
    let accounts = AccountRepository::new(state.conn())
        .list(tenant_id, filter)
        .await?;
    Ok(Json(accounts.into_iter().map(Into::into).collect()))
}

/// POST `/tenants/{tenant_id}/accounts` - Create an account.
async fn create_account(
    State(state): State<AppState>,
    CurrentTenant(tenant_id): CurrentTenant,
    Json(payload): Json<CreateAccountRequest>,
) -> ApiResult<(StatusCode, Json<AccountResponse>)> {
    let input = CreateAccountInput {
        account_number: payload.account_number,
        name: payload.name,
        account_type: payload.account_type,
        detail_type: payload.detail_type,
        description: payload.description,
        parent_id: payload.parent_id,
    };
    let account = AccountRepository::new(state.conn())
        .create(tenant_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(account.into())))
}

/// GET `/tenants/{tenant_id}/accounts/{account_id}` - Get an account.
async fn get_account(
    State(state): State<AppState>,
    CurrentTenant(tenant_id): CurrentTenant,
    Path((_, account_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<AccountResponse>> {
    let account = AccountRepository::new(state.conn())
        .get(tenant_id, account_id)
        .await?;
    Ok(Json(account.into()))
}

/// PUT `/tenants/{tenant_id}/accounts/{account_id}` - Update an account.
async fn update_account(
    State(state): State<AppState>,
    CurrentTenant(tenant_id): CurrentTenant,
    Path((_, account_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateAccountRequest>,
) -> ApiResult<Json<AccountResponse>> {
    let input = UpdateAccountInput {
        name: payload.name,
        description: payload.description,
        detail_type: payload.detail_type,
        is_active: payload.is_active,
    };
    let account = AccountRepository::new(state.conn())
        .update(tenant_id, account_id, input)
        .await?;
    Ok(Json(account.into()))
}

/// DELETE `/tenants/{tenant_id}/accounts/{account_id}` - Delete or deactivate.
async fn delete_account(
    State(state): State<AppState>,
    CurrentTenant(tenant_id): CurrentTenant,
    Path((_, account_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<DeleteAccountResponse>> {
    let removal = AccountRepository::new(state.conn())
        .delete(tenant_id, account_id)
        .await?;
    let result = match removal {
        AccountRemoval::Delete => "deleted",
        AccountRemoval::Deactivate => "deactivated",
    };
    Ok(Json(DeleteAccountResponse {
        id: account_id,
        result,
    }))
}

/// GET `/tenants/{tenant_id}/accounts/{account_id}/balance` - Balance as of a date.
async fn get_account_balance(
    State(state): State<AppState>,
    CurrentTenant(tenant_id): CurrentTenant,
    Path((_, account_id)): Path<(Uuid, Uuid)>,
    Query(query): Query<BalanceQuery>,
) -> ApiResult<Json<BalanceResponse>> {
    let balance = LedgerRepository::new(state.conn())
        .get_balance(tenant_id, account_id, query.as_of)
        .await?;
    Ok(Json(BalanceResponse {
        account_id,
        as_of: query.as_of,
        balance,
    }))
}

/// GET `/tenants/{tenant_id}/accounts/{account_id}/ledger` - Postings with running balance.
async fn get_account_ledger(
    State(state): State<AppState>,
    CurrentTenant(tenant_id): CurrentTenant,
    Path((_, account_id)): Path<(Uuid, Uuid)>,
    Query(query): Query<LedgerQuery>,
) -> ApiResult<Json<GeneralLedgerAccount>> {
    let to = query.to.unwrap_or_else(|| Utc::now().date_naive());
    let from = query
        .from
        .or_else(|| NaiveDate::from_ymd_opt(to.year(), 1, 1))
        .unwrap_or(to);
    let ledger = LedgerRepository::new(state.conn())
        .list_account_entries(tenant_id, account_id, from, to)
        .await?;
    Ok(Json(ledger))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_distinguishes_null_from_absent() {
        let body: UpdateAccountRequest =
            serde_json::from_str(r#"{"description": null, "is_active": false}"#).unwrap();
        assert_eq!(body.description, Some(None));
        assert_eq!(body.detail_type, None);
        assert_eq!(body.is_active, Some(false));
    }

    #[test]
    fn test_create_request_parses_account_type() {
        let body: CreateAccountRequest = serde_json::from_str(
            r#"{"account_number": "6100", "name": "Rent", "type": "EXPENSE"}"#,
        )
        .unwrap();
        assert_eq!(body.account_type, AccountType::Expense);
        assert!(body.parent_id.is_none());
    }
}
