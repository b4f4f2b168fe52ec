//! Integration tests for report queries and bills.
//!
//! Builds a small set of books (two sales, one collection, one supplier bill)
//! and checks that every statement ties out.

mod common;

use rust_decimal_macros::dec;

use common::{Fixture, date};
use tally_core::ledger::SystemAccount;
use tally_core::payables::BillError;
use tally_core::payments::{PaymentError, PaymentMethod};
use tally_core::reports::{AgingKind, ReportError};
use tally_db::entities::sea_orm_active_enums::BillStatus;
use tally_db::repositories::{
    BillRepository, BillStoreError, CreateBillInput, CreateInvoiceInput, InvoiceRepository,
    PayBillInput, PaymentRepository, RecordPaymentInput, ReportRepository, ReportStoreError,
};

fn bill(fx: &Fixture, approve: bool) -> CreateBillInput {
    CreateBillInput {
        supplier_id: fx.supplier_id,
        bill_number: None,
        date: date(2026, 2, 1),
        due_date: date(2026, 3, 3),
        total_amount: dec!(300),
        terms: Some("Net 30".to_string()),
        notes: None,
        approve,
    }
}

async fn books(fx: &Fixture) {
    let invoices = InvoiceRepository::new(fx.db.clone());
    let payments = PaymentRepository::new(fx.db.clone());

    let first = fx.sent_invoice(dec!(500)).await;
    payments
        .record(
            fx.tenant_id,
            first,
            RecordPaymentInput {
                amount: dec!(200),
                date: date(2026, 3, 15),
                payment_method: PaymentMethod::Bank,
                reference: Some("CHQ-118".to_string()),
                idempotency_key: None,
            },
        )
        .await
        .unwrap();

    invoices
        .create(
            fx.tenant_id,
            CreateInvoiceInput {
                customer_id: fx.customer_id,
                invoice_number: None,
                date: date(2026, 1, 10),
                due_date: date(2026, 1, 20),
                total_amount: dec!(150),
                sales_order_id: None,
                notes: None,
                send: true,
            },
        )
        .await
        .unwrap();

    BillRepository::new(fx.db.clone())
        .create(fx.tenant_id, bill(fx, true))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_trial_balance_and_balance_sheet_tie_out() {
    let Some(fx) = Fixture::setup().await else {
        return;
    };
    books(&fx).await;
    let reports = ReportRepository::new(fx.db.clone());

    let trial = reports
        .trial_balance(fx.tenant_id, date(2026, 12, 31))
        .await
        .expect("trial balance");
    assert!(trial.is_balanced);
    assert_eq!(trial.total_debit, trial.total_credit);
    assert_eq!(trial.total_debit, dec!(950));

    let sheet = reports
        .balance_sheet(fx.tenant_id, date(2026, 12, 31))
        .await
        .expect("balance sheet");
    assert!(sheet.is_balanced);
    assert_eq!(sheet.total_assets, dec!(650));
    assert_eq!(sheet.total_liabilities, dec!(300));
    // Income 650 less purchases 300, held as current earnings.
    assert_eq!(sheet.current_earnings, dec!(350));
}

#[tokio::test]
async fn test_profit_loss_for_period() {
    let Some(fx) = Fixture::setup().await else {
        return;
    };
    books(&fx).await;
    let reports = ReportRepository::new(fx.db.clone());

    let february = reports
        .profit_loss(fx.tenant_id, date(2026, 2, 1), date(2026, 2, 28))
        .await
        .unwrap();
    assert_eq!(february.income.total, dec!(0));
    assert_eq!(february.expenses.total, dec!(300));
    assert_eq!(february.net_income, dec!(-300));

    let year = reports
        .profit_loss(fx.tenant_id, date(2026, 1, 1), date(2026, 12, 31))
        .await
        .unwrap();
    assert_eq!(year.income.total, dec!(650));
    assert_eq!(year.gross_profit, dec!(650));
    assert_eq!(year.net_income, dec!(350));

    let err = reports
        .profit_loss(fx.tenant_id, date(2026, 2, 1), date(2026, 1, 1))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ReportStoreError::Report(ReportError::InvalidDateRange { .. })
    ));
}

#[tokio::test]
async fn test_receivables_aging_totals_open_amounts() {
    let Some(fx) = Fixture::setup().await else {
        return;
    };
    books(&fx).await;

    let aging = ReportRepository::new(fx.db.clone())
        .aging(fx.tenant_id, AgingKind::Receivables, date(2026, 4, 15))
        .await
        .unwrap();

    // 300 still owed on the March invoice plus the untouched 150.
    assert_eq!(aging.totals.total, dec!(450));
    assert_eq!(aging.rows.len(), 1);
    assert_eq!(aging.rows[0].party_name, "Acme Retail");
    assert_eq!(aging.rows[0].documents.len(), 2);
    // Due 2026-03-31: 15 days late. Due 2026-01-20: 85 days late.
    assert_eq!(aging.totals.days_1_30, dec!(300));
    assert_eq!(aging.totals.days_61_90, dec!(150));
}

#[tokio::test]
async fn test_aging_counts_draft_and_future_documents() {
    let Some(fx) = Fixture::setup().await else {
        return;
    };
    let invoices = InvoiceRepository::new(fx.db.clone());
    fx.sent_invoice(dec!(50)).await;
    invoices
        .create(
            fx.tenant_id,
            CreateInvoiceInput {
                customer_id: fx.customer_id,
                invoice_number: None,
                date: date(2026, 5, 1),
                due_date: date(2026, 5, 31),
                total_amount: dec!(100),
                sales_order_id: None,
                notes: None,
                send: false,
            },
        )
        .await
        .unwrap();
    let bills = BillRepository::new(fx.db.clone());
    bills.create(fx.tenant_id, bill(&fx, false)).await.unwrap();

    let reports = ReportRepository::new(fx.db.clone());
    let receivables = reports
        .aging(fx.tenant_id, AgingKind::Receivables, date(2026, 4, 15))
        .await
        .unwrap();
    // Sent 50 plus the May draft of 100, which is not yet due.
    assert_eq!(receivables.totals.total, dec!(150));
    assert_eq!(receivables.totals.current, dec!(100));
    assert_eq!(receivables.totals.days_1_30, dec!(50));

    let payables = reports
        .aging(fx.tenant_id, AgingKind::Payables, date(2026, 4, 15))
        .await
        .unwrap();
    assert_eq!(payables.totals.total, dec!(300));
}

#[tokio::test]
async fn test_sales_summary_and_general_ledger() {
    let Some(fx) = Fixture::setup().await else {
        return;
    };
    books(&fx).await;
    let reports = ReportRepository::new(fx.db.clone());

    let summary = reports
        .sales_summary(fx.tenant_id, date(2026, 1, 1), date(2026, 12, 31))
        .await
        .unwrap();
    assert_eq!(summary.invoice_count, 2);
    assert_eq!(summary.total_invoiced, dec!(650));
    assert_eq!(summary.total_collected, dec!(200));
    assert_eq!(summary.outstanding, dec!(450));
    assert_eq!(summary.monthly.len(), 2);
    assert_eq!(summary.monthly[0].month, "2026-03");

    let receivable = fx.system_account(SystemAccount::AccountsReceivable).await;
    let ledger = reports
        .general_ledger(
            fx.tenant_id,
            date(2026, 3, 1),
            date(2026, 3, 31),
            Some(receivable.id),
        )
        .await
        .unwrap();
    assert_eq!(ledger.accounts.len(), 1);
    let section = &ledger.accounts[0];
    assert_eq!(section.opening_balance, dec!(150));
    assert_eq!(section.rows.len(), 2);
    assert_eq!(section.closing_balance, dec!(450));
}

#[tokio::test]
async fn test_bill_lifecycle() {
    let Some(fx) = Fixture::setup().await else {
        return;
    };
    let bills = BillRepository::new(fx.db.clone());

    let draft = bills.create(fx.tenant_id, bill(&fx, false)).await.unwrap();
    assert_eq!(draft.bill.status, BillStatus::Draft);
    assert_eq!(fx.balance(SystemAccount::AccountsPayable).await, dec!(0));

    let open = bills.approve(fx.tenant_id, draft.bill.id).await.unwrap();
    assert_eq!(open.bill.status, BillStatus::Open);
    assert_eq!(fx.balance(SystemAccount::AccountsPayable).await, dec!(300));
    assert_eq!(fx.balance(SystemAccount::Purchases).await, dec!(300));

    let paid = bills
        .pay(
            fx.tenant_id,
            draft.bill.id,
            PayBillInput {
                amount: dec!(100),
                date: date(2026, 2, 20),
                payment_method: PaymentMethod::Bank,
                reference: None,
            },
        )
        .await
        .unwrap();
    let detail = bills.get(fx.tenant_id, draft.bill.id).await.unwrap();
    assert_eq!(detail.bill.status, BillStatus::PartiallyPaid);
    assert_eq!(detail.amount_due, dec!(200));
    assert_eq!(fx.balance(SystemAccount::Checking).await, dec!(-100));

    let err = bills
        .pay(
            fx.tenant_id,
            draft.bill.id,
            PayBillInput {
                amount: dec!(250),
                date: date(2026, 2, 21),
                payment_method: PaymentMethod::Bank,
                reference: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        BillStoreError::Payment(PaymentError::Overpayment { .. })
    ));

    let err = bills.cancel(fx.tenant_id, draft.bill.id).await.unwrap_err();
    assert!(matches!(
        err,
        BillStoreError::Bill(BillError::HasPayments { .. })
    ));

    bills.delete_payment(fx.tenant_id, paid.id).await.unwrap();
    let cancelled = bills.cancel(fx.tenant_id, draft.bill.id).await.unwrap();
    assert_eq!(cancelled.bill.status, BillStatus::Cancelled);
    assert_eq!(fx.balance(SystemAccount::AccountsPayable).await, dec!(0));
    assert_eq!(fx.balance(SystemAccount::Checking).await, dec!(0));
}
