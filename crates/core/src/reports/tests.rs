//! Property and example tests for the reports module.
//!
//! Ledgers are generated as sequences of balanced two-line postings, replayed
//! into per-account balances, then fed to the report builders.

use std::collections::HashMap;

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tally_shared::types::{AccountId, JournalEntryId};
use uuid::Uuid;

use super::aging::AgingService;
use super::service::ReportService;
use super::types::{AccountBalance, AgingKind, OpenDocument, PostedLine, SalesInvoice};
use crate::ledger::{AccountType, EntrySource};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A fixed chart touching every category.
fn chart() -> Vec<(AccountId, &'static str, AccountType)> {
    vec![
        (AccountId::from_uuid(Uuid::from_u128(1)), "1000", AccountType::Bank),
        (AccountId::from_uuid(Uuid::from_u128(2)), "1200", AccountType::AccountsReceivable),
        (AccountId::from_uuid(Uuid::from_u128(3)), "2000", AccountType::AccountsPayable),
        (AccountId::from_uuid(Uuid::from_u128(4)), "2100", AccountType::CreditCard),
        (AccountId::from_uuid(Uuid::from_u128(5)), "3000", AccountType::Equity),
        (AccountId::from_uuid(Uuid::from_u128(6)), "4000", AccountType::Income),
        (AccountId::from_uuid(Uuid::from_u128(7)), "5000", AccountType::CostOfGoodsSold),
        (AccountId::from_uuid(Uuid::from_u128(8)), "6000", AccountType::Expense),
    ]
}

/// Strategy for one balanced posting: (debit account index, credit account index, amount).
fn arb_posting() -> impl Strategy<Value = (usize, usize, Decimal)> {
    (0usize..8, 0usize..8, 1i64..10_000_000i64).prop_map(|(d, c, n)| (d, c, Decimal::new(n, 2)))
}

/// Replays postings into normal-side balances per account.
fn replay(postings: &[(usize, usize, Decimal)]) -> Vec<AccountBalance> {
    let chart = chart();
    let mut balances = vec![Decimal::ZERO; chart.len()];
    for (d, c, amount) in postings {
        balances[*d] += chart[*d].2.normal_balance().calculate_balance_change(*amount, Decimal::ZERO);
        balances[*c] += chart[*c].2.normal_balance().calculate_balance_change(Decimal::ZERO, *amount);
    }
    chart
        .into_iter()
        .zip(balances)
        .map(|((account_id, number, account_type), balance)| AccountBalance {
            account_id,
            account_number: number.to_string(),
            name: format!("Account {number}"),
            account_type,
            balance,
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Trial balance debits equal credits for any balanced ledger.
    #[test]
    fn prop_trial_balance_balances(postings in prop::collection::vec(arb_posting(), 0..40)) {
        let report = ReportService::generate_trial_balance(date(2026, 12, 31), replay(&postings));

        prop_assert_eq!(report.total_debit, report.total_credit);
        prop_assert!(report.is_balanced);
        prop_assert!(ReportService::ensure_trial_balance(&report).is_ok());
        for row in &report.rows {
            prop_assert!(row.debit >= Decimal::ZERO && row.credit >= Decimal::ZERO);
            prop_assert!(row.debit == Decimal::ZERO || row.credit == Decimal::ZERO);
        }
    }

    /// Assets equal liabilities plus equity (with current earnings).
    #[test]
    fn prop_balance_sheet_equation_holds(postings in prop::collection::vec(arb_posting(), 0..40)) {
        let report = ReportService::generate_balance_sheet(date(2026, 12, 31), replay(&postings));

        prop_assert_eq!(report.total_assets, report.total_liabilities + report.total_equity);
        prop_assert!(ReportService::ensure_balance_sheet(&report).is_ok());
    }

    /// Current earnings on the balance sheet equal P&L net income over all time.
    #[test]
    fn prop_current_earnings_matches_net_income(
        postings in prop::collection::vec(arb_posting(), 0..40),
    ) {
        let balances = replay(&postings);
        let pl = ReportService::generate_profit_loss(date(2000, 1, 1), date(2026, 12, 31), balances.clone());
        let bs = ReportService::generate_balance_sheet(date(2026, 12, 31), balances);

        prop_assert_eq!(pl.net_income, bs.current_earnings);
        prop_assert_eq!(pl.gross_profit - pl.expenses.total, pl.net_income);
    }

    /// Aging grand total equals the sum of amount_due, each document in one bucket.
    #[test]
    fn prop_aging_grand_total(
        docs in prop::collection::vec((0usize..4, -200i64..400i64, 1i64..1_000_000i64), 0..30),
    ) {
        let today = date(2026, 6, 15);
        let parties = ["Acme", "Globex", "Initech", "Umbrella"];
        let documents: Vec<OpenDocument> = docs
            .iter()
            .map(|(p, offset, cents)| OpenDocument {
                id: Uuid::new_v4(),
                number: format!("INV-{cents}"),
                party_name: parties[*p].to_string(),
                due_date: today - chrono::Duration::days(*offset),
                amount_due: Decimal::new(*cents, 2),
            })
            .collect();
        let expected: Decimal = documents.iter().map(|d| d.amount_due).sum();
        let count = documents.len();

        let report = AgingService::build(AgingKind::Receivables, today, documents);

        prop_assert_eq!(report.grand_total, expected);
        let t = report.totals;
        prop_assert_eq!(t.current + t.days_1_30 + t.days_31_60 + t.days_61_90 + t.over_90, expected);
        let placed: usize = report.rows.iter().map(|r| r.documents.len()).sum();
        prop_assert_eq!(placed, count);
        let row_total: Decimal = report.rows.iter().map(|r| r.buckets.total).sum();
        prop_assert_eq!(row_total, expected);
    }
}

#[test]
fn test_negative_balance_moves_to_opposite_column() {
    let bank = AccountBalance {
        account_id: AccountId::new(),
        account_number: "1000".to_string(),
        name: "Cash on Hand".to_string(),
        account_type: AccountType::Bank,
        balance: dec!(-25.00),
    };
    let report = ReportService::generate_trial_balance(date(2026, 1, 31), vec![bank]);
    assert_eq!(report.rows[0].debit, dec!(0));
    assert_eq!(report.rows[0].credit, dec!(25.00));
}

#[test]
fn test_profit_loss_groups_other_income_and_expense() {
    let make = |number: &str, account_type, balance| AccountBalance {
        account_id: AccountId::new(),
        account_number: number.to_string(),
        name: number.to_string(),
        account_type,
        balance,
    };
    let report = ReportService::generate_profit_loss(
        date(2026, 1, 1),
        date(2026, 1, 31),
        vec![
            make("4000", AccountType::Income, dec!(1000)),
            make("4900", AccountType::OtherIncome, dec!(50)),
            make("5000", AccountType::CostOfGoodsSold, dec!(400)),
            make("6000", AccountType::Expense, dec!(200)),
            make("6900", AccountType::OtherExpense, dec!(25)),
            make("1000", AccountType::Bank, dec!(999)),
        ],
    );

    assert_eq!(report.income.total, dec!(1050));
    assert_eq!(report.cost_of_goods_sold.total, dec!(400));
    assert_eq!(report.gross_profit, dec!(650));
    assert_eq!(report.expenses.total, dec!(225));
    assert_eq!(report.net_income, dec!(425));
}

#[test]
fn test_unbalanced_balance_sheet_is_consistency_error() {
    let report = ReportService::generate_balance_sheet(
        date(2026, 1, 31),
        vec![AccountBalance {
            account_id: AccountId::new(),
            account_number: "1000".to_string(),
            name: "Cash".to_string(),
            account_type: AccountType::Bank,
            balance: dec!(10),
        }],
    );
    assert!(!report.is_balanced);
    let err: tally_shared::AppError = ReportService::ensure_balance_sheet(&report).unwrap_err().into();
    assert_eq!(err.error_code(), "CONSISTENCY_ERROR");
}

#[test]
fn test_date_range_validation() {
    assert!(ReportService::validate_date_range(date(2026, 1, 1), date(2026, 1, 1)).is_ok());
    let err: tally_shared::AppError =
        ReportService::validate_date_range(date(2026, 2, 1), date(2026, 1, 1)).unwrap_err().into();
    assert_eq!(err.status_code(), 400);
}

#[test]
fn test_sales_summary() {
    let invoices = vec![
        SalesInvoice { date: date(2026, 1, 5), total_amount: dec!(100), amount_paid: dec!(100) },
        SalesInvoice { date: date(2026, 1, 20), total_amount: dec!(50), amount_paid: dec!(0) },
        SalesInvoice { date: date(2026, 3, 2), total_amount: dec!(25), amount_paid: dec!(10) },
    ];
    let report = ReportService::generate_sales_summary(date(2026, 1, 1), date(2026, 3, 31), &invoices);

    assert_eq!(report.total_invoiced, dec!(175));
    assert_eq!(report.total_collected, dec!(110));
    assert_eq!(report.outstanding, dec!(65));
    assert_eq!(report.invoice_count, 3);
    assert_eq!(report.average_invoice, dec!(58.33));
    assert_eq!(report.monthly.len(), 2);
    assert_eq!(report.monthly[0].month, "2026-03");
    assert_eq!(report.monthly[1].revenue, dec!(150));
    assert_eq!(report.monthly[1].count, 2);
}

#[test]
fn test_sales_summary_keeps_twelve_most_recent_months() {
    let invoices: Vec<SalesInvoice> = (1..=12)
        .flat_map(|m| [date(2025, m, 1), date(2026, m, 1)])
        .map(|d| SalesInvoice { date: d, total_amount: dec!(1), amount_paid: dec!(0) })
        .collect();
    let report = ReportService::generate_sales_summary(date(2025, 1, 1), date(2026, 12, 31), &invoices);
    assert_eq!(report.monthly.len(), 12);
    assert_eq!(report.monthly[0].month, "2026-12");
    assert_eq!(report.monthly[11].month, "2026-01");
}

#[test]
fn test_general_ledger_running_balance() {
    let cash = AccountId::new();
    let line = |number: &str, debit, credit| PostedLine {
        entry_id: JournalEntryId::new(),
        entry_number: number.to_string(),
        date: date(2026, 2, 1),
        account_id: cash,
        account_number: "1000".to_string(),
        account_name: "Cash on Hand".to_string(),
        account_type: AccountType::Bank,
        description: "Payment".to_string(),
        debit,
        credit,
        source: EntrySource::Payment,
    };
    let openings = HashMap::from([(cash, dec!(100))]);

    let report = ReportService::generate_general_ledger(
        date(2026, 2, 1),
        date(2026, 2, 28),
        vec![line("JE-000010", dec!(50), dec!(0)), line("JE-000011", dec!(0), dec!(30))],
        &openings,
    );

    assert_eq!(report.accounts.len(), 1);
    let account = &report.accounts[0];
    assert_eq!(account.opening_balance, dec!(100));
    assert_eq!(account.rows[0].running_balance, dec!(150));
    assert_eq!(account.rows[1].running_balance, dec!(120));
    assert_eq!(account.closing_balance, dec!(120));
    assert_eq!(report.total_debit, dec!(50));
    assert_eq!(report.total_credit, dec!(30));
}
