//! Integration tests for database triggers.
//!
//! The triggers enforce ledger integrity even when application checks are
//! bypassed: posted lines are immutable and every entry balances at commit.

mod common;

use chrono::Utc;
use rust_decimal_macros::dec;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter,
    TransactionTrait,
};
use uuid::Uuid;

use common::{Fixture, date};
use tally_core::ledger::{JournalLineInput, SystemAccount};
use tally_db::entities::{journal_entries, journal_lines, sea_orm_active_enums::EntrySource};
use tally_db::repositories::{LedgerRepository, ManualEntryInput};

async fn posted_entry(fx: &Fixture) -> Uuid {
    let cash = fx.account_id(SystemAccount::CashOnHand).await;
    let equity = fx.account_id(SystemAccount::OwnersEquity).await;
    LedgerRepository::new(fx.db.clone())
        .post_manual(
            fx.tenant_id,
            ManualEntryInput {
                date: date(2026, 1, 2),
                memo: "Opening capital".to_string(),
                is_adjusting: false,
                lines: vec![
                    JournalLineInput::debit(cash, dec!(500), "Capital"),
                    JournalLineInput::credit(equity, dec!(500), "Capital"),
                ],
            },
        )
        .await
        .expect("post entry")
        .entry
        .id
}

#[tokio::test]
async fn test_trigger_prevents_line_update() {
    let Some(fx) = Fixture::setup().await else {
        return;
    };
    let entry_id = posted_entry(&fx).await;

    let line = journal_lines::Entity::find()
        .filter(journal_lines::Column::EntryId.eq(entry_id))
        .one(&fx.db)
        .await
        .unwrap()
        .unwrap();
    let mut active = line.into_active_model();
    active.debit = Set(dec!(1));

    let result = active.update(&fx.db).await;
    assert!(result.is_err(), "posted line must be immutable");
}

#[tokio::test]
async fn test_trigger_prevents_line_delete() {
    let Some(fx) = Fixture::setup().await else {
        return;
    };
    let entry_id = posted_entry(&fx).await;

    let result = journal_lines::Entity::delete_many()
        .filter(journal_lines::Column::EntryId.eq(entry_id))
        .exec(&fx.db)
        .await;
    assert!(result.is_err(), "posted lines must not be deleted");
}

#[tokio::test]
async fn test_trigger_prevents_entry_update() {
    let Some(fx) = Fixture::setup().await else {
        return;
    };
    let entry_id = posted_entry(&fx).await;

    let entry = journal_entries::Entity::find_by_id(entry_id)
        .one(&fx.db)
        .await
        .unwrap()
        .unwrap();
    let mut active = entry.into_active_model();
    active.memo = Set("Rewritten history".to_string());

    assert!(active.update(&fx.db).await.is_err());
}

#[tokio::test]
async fn test_trigger_rejects_unbalanced_insert_at_commit() {
    let Some(fx) = Fixture::setup().await else {
        return;
    };
    let cash = fx.system_account(SystemAccount::CashOnHand).await;
    let equity = fx.system_account(SystemAccount::OwnersEquity).await;
    let now = Utc::now().into();
    let entry_id = Uuid::now_v7();

    let txn = fx.db.begin().await.unwrap();
    journal_entries::ActiveModel {
        id: Set(entry_id),
        tenant_id: Set(fx.tenant_id.into_inner()),
        entry_number: Set("JE-RAW-1".to_string()),
        date: Set(date(2026, 1, 3)),
        memo: Set("Bypassing the service".to_string()),
        is_adjusting: Set(false),
        source: Set(EntrySource::Manual),
        reverses_entry_id: Set(None),
        created_at: Set(now),
    }
    .insert(&txn)
    .await
    .unwrap();

    for (account_id, debit, credit) in [(cash.id, dec!(100), dec!(0)), (equity.id, dec!(0), dec!(60))] {
        journal_lines::ActiveModel {
            id: Set(Uuid::now_v7()),
            entry_id: Set(entry_id),
            account_id: Set(account_id),
            debit: Set(debit),
            credit: Set(credit),
            memo: Set(None),
            sort_order: Set(0),
            created_at: Set(now),
        }
        .insert(&txn)
        .await
        .unwrap();
    }

    // The balance check is deferred, so the failure surfaces on commit.
    assert!(txn.commit().await.is_err());

    let found = journal_entries::Entity::find_by_id(entry_id)
        .one(&fx.db)
        .await
        .unwrap();
    assert!(found.is_none());
}
