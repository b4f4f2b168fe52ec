//! API route definitions.

use axum::{Router, middleware};
use rust_decimal::Decimal;
use tally_shared::types::parse_money;

use crate::{AppState, error::ApiError, middleware::tenant_guard};

pub mod accounts;
pub mod bills;
pub mod checks;
pub mod credit_memos;
pub mod health;
pub mod invoices;
pub mod journal_entries;
pub mod parties;
pub mod payments;
pub mod products;
pub mod reports;
pub mod sales_orders;
pub mod sales_receipts;
pub mod tenants;

/// Creates the API router with tenant-scoped routes behind the tenant guard.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    // Everything under /tenants/{tenant_id}/...
    let tenant_routes = Router::new()
        .merge(accounts::routes())
        .merge(journal_entries::routes())
        .merge(parties::routes())
        .merge(invoices::routes())
        .merge(payments::routes())
        .merge(credit_memos::routes())
        .merge(bills::routes())
        .merge(sales_receipts::routes())
        .merge(checks::routes())
        .merge(products::routes())
        .merge(sales_orders::routes())
        .merge(reports::routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), tenant_guard));

    Router::new()
        .merge(health::routes())
        .merge(tenants::routes())
        .merge(tenant_routes)
}

/// Parses a monetary request field, naming the field on failure.
pub(crate) fn parse_amount(field: &str, raw: &str) -> Result<Decimal, ApiError> {
    parse_money(raw).map_err(|e| ApiError::validation(format!("{field}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case("100", dec!(100))]
    #[case(" 12.50 ", dec!(12.5))]
    #[case("0.10", dec!(0.1))]
    fn test_parse_amount_accepts(#[case] raw: &str, #[case] expected: rust_decimal::Decimal) {
        assert_eq!(parse_amount("amount", raw).unwrap(), expected);
    }

    #[rstest]
    #[case("abc")]
    #[case("1.005")]
    #[case("")]
    fn test_parse_amount_rejects(#[case] raw: &str) {
        let err = parse_amount("total_amount", raw).unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
    }
}
