//! Report routes.
//!
//! Every report reads from a single snapshot, so figures within one response
//! agree with each other even while postings continue.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use chrono::{Datelike, NaiveDate, Utc};
use serde::Deserialize;
use tally_core::reports::{
    AgingKind, AgingReport, BalanceSheetReport, GeneralLedgerReport, ProfitLossReport,
    SalesSummaryReport, TrialBalanceReport,
};
use tally_db::ReportRepository;
use uuid::Uuid;

use crate::{AppState, error::ApiResult, middleware::CurrentTenant};

/// Creates the report routes (mounted behind the tenant guard).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/tenants/{tenant_id}/reports/trial-balance",
            get(get_trial_balance),
        )
        .route(
            "/tenants/{tenant_id}/reports/profit-loss",
            get(get_profit_loss),
        )
        .route(
            "/tenants/{tenant_id}/reports/balance-sheet",
            get(get_balance_sheet),
        )
        .route("/tenants/{tenant_id}/reports/ar-aging", get(get_ar_aging))
        .route("/tenants/{tenant_id}/reports/ap-aging", get(get_ap_aging))
        .route(
            "/tenants/{tenant_id}/reports/sales-summary",
            get(get_sales_summary),
        )
        .route(
            "/tenants/{tenant_id}/reports/general-ledger",
            get(get_general_ledger),
        )
}

/// Query parameters for point-in-time reports.
#[derive(Debug, Deserialize)]
pub struct AsOfQuery {
    /// As of date (defaults to today).
    pub as_of: Option<NaiveDate>,
}

impl AsOfQuery {
    fn resolve(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(|| Utc::now().date_naive())
    }
}

/// Query parameters for period reports.
#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    /// Start date (defaults to the first of the current month).
    pub from: Option<NaiveDate>,
    /// End date (defaults to today).
    pub to: Option<NaiveDate>,
    /// Restrict the general ledger to one account.
    pub account_id: Option<Uuid>,
}

impl PeriodQuery {
    fn resolve(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let to = self.to.unwrap_or(today);
        let from = self.from.unwrap_or_else(|| {
            NaiveDate::from_ymd_opt(to.year(), to.month(), 1).unwrap_or(to)
        });
        (from, to)
    }
}

/// GET `/tenants/{tenant_id}/reports/trial-balance`
async fn get_trial_balance(
    State(state): State<AppState>,
    CurrentTenant(tenant_id): CurrentTenant,
    Query(query): Query<AsOfQuery>,
) -> ApiResult<Json<TrialBalanceReport>> {
    let report = ReportRepository::new(state.conn())
        .trial_balance(tenant_id, query.resolve())
        .await?;
    Ok(Json(report))
}

/// GET `/tenants/{tenant_id}/reports/profit-loss`
async fn get_profit_loss(
    State(state): State<AppState>,
    CurrentTenant(tenant_id): CurrentTenant,
    Query(query): Query<PeriodQuery>,
) -> ApiResult<Json<ProfitLossReport>> {
    let (from, to) = query.resolve(Utc::now().date_naive());
    let report = ReportRepository::new(state.conn())
        .profit_loss(tenant_id, from, to)
        .await?;
    Ok(Json(report))
}

/// GET `/tenants/{tenant_id}/reports/balance-sheet`
async fn get_balance_sheet(
    State(state): State<AppState>,
    CurrentTenant(tenant_id): CurrentTenant,
    Query(query): Query<AsOfQuery>,
) -> ApiResult<Json<BalanceSheetReport>> {
    let report = ReportRepository::new(state.conn())
        .balance_sheet(tenant_id, query.resolve())
        .await?;
    Ok(Json(report))
}

/// GET `/tenants/{tenant_id}/reports/ar-aging`
async fn get_ar_aging(
    State(state): State<AppState>,
    CurrentTenant(tenant_id): CurrentTenant,
    Query(query): Query<AsOfQuery>,
) -> ApiResult<Json<AgingReport>> {
    let report = ReportRepository::new(state.conn())
        .aging(tenant_id, AgingKind::Receivables, query.resolve())
        .await?;
    Ok(Json(report))
}

/// GET `/tenants/{tenant_id}/reports/ap-aging`
async fn get_ap_aging(
    State(state): State<AppState>,
    CurrentTenant(tenant_id): CurrentTenant,
    Query(query): Query<AsOfQuery>,
) -> ApiResult<Json<AgingReport>> {
    let report = ReportRepository::new(state.conn())
        .aging(tenant_id, AgingKind::Payables, query.resolve())
        .await?;
    Ok(Json(report))
}

/// GET `/tenants/{tenant_id}/reports/sales-summary`
async fn get_sales_summary(
    State(state): State<AppState>,
    CurrentTenant(tenant_id): CurrentTenant,
    Query(query): Query<PeriodQuery>,
) -> ApiResult<Json<SalesSummaryReport>> {
    let (from, to) = query.resolve(Utc::now().date_naive());
    let report = ReportRepository::new(state.conn())
        .sales_summary(tenant_id, from, to)
        .await?;
    Ok(Json(report))
}

/// GET `/tenants/{tenant_id}/reports/general-ledger`
async fn get_general_ledger(
    State(state): State<AppState>,
    CurrentTenant(tenant_id): CurrentTenant,
    Query(query): Query<PeriodQuery>,
) -> ApiResult<Json<GeneralLedgerReport>> {
    let (from, to) = query.resolve(Utc::now().date_naive());
    let report = ReportRepository::new(state.conn())
        .general_ledger(tenant_id, from, to, query.account_id)
        .await?;
    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case(None, None, date(2026, 5, 1), date(2026, 5, 20))]
    #[case(Some(date(2026, 1, 1)), None, date(2026, 1, 1), date(2026, 5, 20))]
    #[case(None, Some(date(2026, 2, 14)), date(2026, 2, 1), date(2026, 2, 14))]
    #[case(Some(date(2026, 3, 9)), Some(date(2026, 3, 1)), date(2026, 3, 9), date(2026, 3, 1))]
    fn test_period_defaults(
        #[case] from: Option<NaiveDate>,
        #[case] to: Option<NaiveDate>,
        #[case] expected_from: NaiveDate,
        #[case] expected_to: NaiveDate,
    ) {
        let query = PeriodQuery {
            from,
            to,
            account_id: None,
        };
        assert_eq!(
            query.resolve(date(2026, 5, 20)),
            (expected_from, expected_to)
        );
    }
}
