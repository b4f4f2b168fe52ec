//! Journal entry routes: manual postings and reversals.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_core::ledger::{EntrySource, JournalLineInput};
use tally_db::{
    LedgerRepository,
    repositories::{EntryWithLines, ManualEntryInput},
};
use tally_shared::types::{AccountId, PageRequest, PageResponse};
use uuid::Uuid;

use super::parse_amount;
use crate::{AppState, error::ApiResult, middleware::CurrentTenant};

/// Creates the journal entry routes (mounted behind the tenant guard).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/tenants/{tenant_id}/journal-entries",
            get(list_entries).post(create_entry),
        )
        .route(
            "/tenants/{tenant_id}/journal-entries/{entry_id}",
            get(get_entry),
        )
        .route(
            "/tenants/{tenant_id}/journal-entries/{entry_id}/reverse",
            post(reverse_entry),
        )
}

/// One line of a manual entry. Amounts are decimal strings.
#[derive(Debug, Deserialize)]
pub struct JournalLineRequest {
    /// Account to post to.
    pub account_id: Uuid,
    /// Debit amount; omit or `"0"` on credit lines.
    pub debit: Option<String>,
    /// Credit amount; omit or `"0"` on debit lines.
    pub credit: Option<String>,
    /// Line memo.
    pub memo: Option<String>,
}

impl JournalLineRequest {
    fn into_input(self, index: usize) -> ApiResult<JournalLineInput> {
        let amount = |field: &str, raw: Option<String>| match raw {
            Some(raw) => parse_amount(&format!("lines[{index}].{field}"), &raw),
            None => Ok(Decimal::ZERO),
        };
        Ok(JournalLineInput {
            account_id: AccountId::from_uuid(self.account_id),
            debit: amount("debit", self.debit)?,
            credit: amount("credit", self.credit)?,
            memo: self.memo,
        })
    }
}

/// Request body for a manual journal entry.
#[derive(Debug, Deserialize)]
pub struct CreateEntryRequest {
    /// Accounting date.
    pub date: NaiveDate,
    /// Entry memo.
    pub memo: String,
    /// Period-end adjusting entry.
    #[serde(default)]
    pub is_adjusting: bool,
    /// Lines in posting order.
    pub lines: Vec<JournalLineRequest>,
}

impl CreateEntryRequest {
    fn into_input(self) -> ApiResult<ManualEntryInput> {
        let lines = self
            .lines
            .into_iter()
            .enumerate()
            .map(|(index, line)| line.into_input(index))
            .collect::<ApiResult<Vec<_>>>()?;
        Ok(ManualEntryInput {
            date: self.date,
            memo: self.memo,
            is_adjusting: self.is_adjusting,
            lines,
        })
    }
}

/// Request body for reversing an entry.
#[derive(Debug, Default, Deserialize)]
pub struct ReverseEntryRequest {
    /// Reversal date. Defaults to today.
    pub date: Option<NaiveDate>,
    /// Reason, appended to the reversal memo.
    pub memo: Option<String>,
}

/// Query parameters for listing entries.
#[derive(Debug, Deserialize)]
pub struct ListEntriesQuery {
    /// Start date (inclusive).
    pub from: Option<NaiveDate>,
    /// End date (inclusive).
    pub to: Option<NaiveDate>,
}

/// A posted line.
#[derive(Debug, Serialize)]
pub struct JournalLineResponse {
    /// Line ID.
    pub id: Uuid,
    /// Account posted to.
    pub account_id: Uuid,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Line memo.
    pub memo: Option<String>,
}

/// A journal entry header, with lines when fetched individually.
#[derive(Debug, Serialize)]
pub struct JournalEntryResponse {
    /// Entry ID.
    pub id: Uuid,
    /// Sequential entry number, e.g. `JE-000042`.
    pub entry_number: String,
    /// Accounting date.
    pub date: NaiveDate,
    /// Entry memo.
    pub memo: String,
    /// Period-end adjusting entry.
    pub is_adjusting: bool,
    /// What produced the entry.
    pub source: EntrySource,
    /// Entry this one reverses.
    pub reverses_entry_id: Option<Uuid>,
    /// Lines in posting order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub lines: Vec<JournalLineResponse>,
}

impl From<tally_db::entities::journal_entries::Model> for JournalEntryResponse {
    fn from(e: tally_db::entities::journal_entries::Model) -> Self {
        Self {
            id: e.id,
            entry_number: e.entry_number,
            date: e.date,
            memo: e.memo,
            is_adjusting: e.is_adjusting,
            source: e.source.into(),
            reverses_entry_id: e.reverses_entry_id,
            lines: Vec::new(),
        }
    }
}

impl From<EntryWithLines> for JournalEntryResponse {
    fn from(posted: EntryWithLines) -> Self {
        let mut response = Self::from(posted.entry);
        response.lines = posted
            .lines
            .into_iter()
            .map(|l| JournalLineResponse {
                id: l.id,
                account_id: l.account_id,
                debit: l.debit,
                credit: l.credit,
                memo: l.memo,
            })
            .collect();
        response
    }
}

/// POST `/tenants/{tenant_id}/journal-entries` - Post a manual entry.
async fn create_entry(
    State(state): State<AppState>,
    CurrentTenant(tenant_id): CurrentTenant,
    Json(payload): Json<CreateEntryRequest>,
) -> ApiResult<(StatusCode, Json<JournalEntryResponse>)> {
    let input = payload.into_input()?;
    let posted = LedgerRepository::new(state.conn())
        .post_manual(tenant_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(posted.into())))
}

/// GET `/tenants/{tenant_id}/journal-entries` - List entry headers.
async fn list_entries(
    State(state): State<AppState>,
    CurrentTenant(tenant_id): CurrentTenant,
    Query(page): Query<PageRequest>,
    Query(query): Query<ListEntriesQuery>,
) -> ApiResult<Json<PageResponse<JournalEntryResponse>>> {
    let (entries, total) = LedgerRepository::new(state.conn())
        .list_entries(tenant_id, query.from, query.to, page.offset(), page.limit())
        .await?;
    let data = entries.into_iter().map(Into::into).collect();
    Ok(Json(PageResponse::new(data, &page, total)))
}

/// GET `/tenants/{tenant_id}/journal-entries/{entry_id}` - Entry with lines.
async fn get_entry(
    State(state): State<AppState>,
    CurrentTenant(tenant_id): CurrentTenant,
    Path((_, entry_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<JournalEntryResponse>> {
    let posted = LedgerRepository::new(state.conn())
        .get_entry(tenant_id, entry_id)
        .await?;
    Ok(Json(posted.into()))
}

/// POST `/tenants/{tenant_id}/journal-entries/{entry_id}/reverse` - Post the reversal.
async fn reverse_entry(
    State(state): State<AppState>,
    CurrentTenant(tenant_id): CurrentTenant,
    Path((_, entry_id)): Path<(Uuid, Uuid)>,
    payload: Option<Json<ReverseEntryRequest>>,
) -> ApiResult<(StatusCode, Json<JournalEntryResponse>)> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    let reversal = LedgerRepository::new(state.conn())
        .reverse(tenant_id, entry_id, payload.date, payload.memo)
        .await?;
    Ok((StatusCode::CREATED, Json(reversal.into())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_entry_request_converts_lines_in_order() {
        let body: CreateEntryRequest = serde_json::from_str(
            r#"{
                "date": "2026-01-31",
                "memo": "Accrue rent",
                "is_adjusting": true,
                "lines": [
                    {"account_id": "0190a5c4-0000-7000-8000-000000000001", "debit": "1200.00"},
                    {"account_id": "0190a5c4-0000-7000-8000-000000000002", "credit": "1200"}
                ]
            }"#,
        )
        .unwrap();

        let input = body.into_input().unwrap();
        assert!(input.is_adjusting);
        assert_eq!(input.lines[0].debit, dec!(1200));
        assert_eq!(input.lines[0].credit, Decimal::ZERO);
        assert_eq!(input.lines[1].credit, dec!(1200));
    }

    #[test]
    fn test_entry_request_names_bad_line() {
        let body: CreateEntryRequest = serde_json::from_str(
            r#"{
                "date": "2026-01-31",
                "memo": "Typo",
                "lines": [
                    {"account_id": "0190a5c4-0000-7000-8000-000000000001", "debit": "10"},
                    {"account_id": "0190a5c4-0000-7000-8000-000000000002", "credit": "1O"}
                ]
            }"#,
        )
        .unwrap();

        let err = body.into_input().unwrap_err();
        assert!(err.0.to_string().contains("lines[1].credit"));
    }
}
