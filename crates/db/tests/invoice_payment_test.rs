//! Integration tests for the invoice lifecycle, payments and credit memos.

mod common;

use rust_decimal_macros::dec;

use common::{Fixture, date};
use tally_core::invoicing::{DisplayStatus, InvoiceError};
use tally_core::ledger::SystemAccount;
use tally_core::payments::{PaymentError, PaymentMethod};
use tally_db::entities::sea_orm_active_enums::{CreditMemoStatus, InvoiceStatus};
use tally_db::repositories::{
    CreateCreditMemoInput, CreateInvoiceInput, CreditMemoRepository, InvoiceFilter,
    InvoiceRepository, InvoiceStoreError, PaymentRepository, RecordPaymentInput,
};

fn payment(amount: rust_decimal::Decimal) -> RecordPaymentInput {
    RecordPaymentInput {
        amount,
        date: date(2026, 3, 10),
        payment_method: PaymentMethod::Bank,
        reference: None,
        idempotency_key: None,
    }
}

#[tokio::test]
async fn test_invoice_paid_in_two_installments() {
    let Some(fx) = Fixture::setup().await else {
        return;
    };
    let invoices = InvoiceRepository::new(fx.db.clone());
    let payments = PaymentRepository::new(fx.db.clone());
    let invoice_id = fx.sent_invoice(dec!(100)).await;

    assert_eq!(fx.balance(SystemAccount::AccountsReceivable).await, dec!(100));
    assert_eq!(fx.balance(SystemAccount::SalesIncome).await, dec!(100));

    payments
        .record(fx.tenant_id, invoice_id, payment(dec!(40)))
        .await
        .expect("first payment");
    let detail = invoices.get(fx.tenant_id, invoice_id).await.unwrap();
    assert_eq!(detail.summary.invoice.status, InvoiceStatus::PartiallyPaid);
    assert_eq!(detail.summary.amount_due, dec!(60));

    payments
        .record(fx.tenant_id, invoice_id, payment(dec!(60)))
        .await
        .expect("second payment");
    let detail = invoices.get(fx.tenant_id, invoice_id).await.unwrap();
    assert_eq!(detail.summary.invoice.status, InvoiceStatus::Paid);
    assert_eq!(detail.summary.amount_due, dec!(0));
    assert_eq!(detail.summary.display_status, DisplayStatus::Paid);
    assert_eq!(detail.payments.len(), 2);

    assert_eq!(fx.balance(SystemAccount::AccountsReceivable).await, dec!(0));
    assert_eq!(fx.balance(SystemAccount::Checking).await, dec!(100));
}

#[tokio::test]
async fn test_overpayment_rejected_and_nothing_posted() {
    let Some(fx) = Fixture::setup().await else {
        return;
    };
    let invoice_id = fx.sent_invoice(dec!(100)).await;

    let err = PaymentRepository::new(fx.db.clone())
        .record(fx.tenant_id, invoice_id, payment(dec!(100.01)))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        InvoiceStoreError::Payment(PaymentError::Overpayment { .. })
    ));
    assert_eq!(fx.balance(SystemAccount::Checking).await, dec!(0));
    assert_eq!(fx.balance(SystemAccount::AccountsReceivable).await, dec!(100));
}

#[tokio::test]
async fn test_payment_on_draft_rejected() {
    let Some(fx) = Fixture::setup().await else {
        return;
    };
    let draft = InvoiceRepository::new(fx.db.clone())
        .create(
            fx.tenant_id,
            CreateInvoiceInput {
                customer_id: fx.customer_id,
                invoice_number: Some("INV-DRAFT-1".to_string()),
                date: date(2026, 3, 1),
                due_date: date(2026, 3, 31),
                total_amount: dec!(75),
                sales_order_id: None,
                notes: None,
                send: false,
            },
        )
        .await
        .unwrap();
    assert_eq!(fx.balance(SystemAccount::AccountsReceivable).await, dec!(0));

    let err = PaymentRepository::new(fx.db.clone())
        .record(fx.tenant_id, draft.summary.invoice.id, payment(dec!(10)))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        InvoiceStoreError::Payment(PaymentError::DocumentNotOpen { .. })
    ));
}

#[tokio::test]
async fn test_deleting_payment_reopens_paid_invoice() {
    let Some(fx) = Fixture::setup().await else {
        return;
    };
    let invoices = InvoiceRepository::new(fx.db.clone());
    let payments = PaymentRepository::new(fx.db.clone());
    let invoice_id = fx.sent_invoice(dec!(100)).await;

    payments
        .record(fx.tenant_id, invoice_id, payment(dec!(30)))
        .await
        .unwrap();
    let last = payments
        .record(fx.tenant_id, invoice_id, payment(dec!(70)))
        .await
        .unwrap();

    let deleted = payments.delete(fx.tenant_id, last.id).await.unwrap();
    assert!(deleted.deleted_at.is_some());
    assert!(deleted.reversal_entry_id.is_some());

    let detail = invoices.get(fx.tenant_id, invoice_id).await.unwrap();
    assert_eq!(detail.summary.invoice.status, InvoiceStatus::PartiallyPaid);
    assert_eq!(detail.summary.invoice.amount_paid, dec!(30));
    assert_eq!(detail.payments.len(), 1);
    assert_eq!(fx.balance(SystemAccount::Checking).await, dec!(30));

    let again = payments.delete(fx.tenant_id, last.id).await.unwrap_err();
    assert!(matches!(
        again,
        InvoiceStoreError::Payment(PaymentError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_idempotency_key_replays_payment() {
    let Some(fx) = Fixture::setup().await else {
        return;
    };
    let payments = PaymentRepository::new(fx.db.clone());
    let invoice_id = fx.sent_invoice(dec!(100)).await;

    let mut input = payment(dec!(25));
    input.idempotency_key = Some("client-req-7".to_string());
    let first = payments
        .record(fx.tenant_id, invoice_id, input.clone())
        .await
        .unwrap();
    let replay = payments
        .record(fx.tenant_id, invoice_id, input)
        .await
        .unwrap();

    assert_eq!(first.id, replay.id);
    let live = payments
        .list_for_invoice(fx.tenant_id, invoice_id)
        .await
        .unwrap();
    assert_eq!(live.len(), 1);
    assert_eq!(fx.balance(SystemAccount::Checking).await, dec!(25));
}

#[tokio::test]
async fn test_reused_idempotency_key_with_other_terms_conflicts() {
    let Some(fx) = Fixture::setup().await else {
        return;
    };
    let payments = PaymentRepository::new(fx.db.clone());
    let invoice_id = fx.sent_invoice(dec!(100)).await;
    let other_invoice = fx.sent_invoice(dec!(100)).await;

    let mut input = payment(dec!(25));
    input.idempotency_key = Some("client-req-8".to_string());
    payments
        .record(fx.tenant_id, invoice_id, input.clone())
        .await
        .unwrap();

    let mut larger = input.clone();
    larger.amount = dec!(40);
    let mut by_cash = input.clone();
    by_cash.payment_method = PaymentMethod::Cash;
    for (target, request) in [
        (invoice_id, larger),
        (invoice_id, by_cash),
        (other_invoice, input),
    ] {
        let err = payments
            .record(fx.tenant_id, target, request)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            InvoiceStoreError::Payment(PaymentError::IdempotencyKeyReused(_))
        ));
    }

    // Nothing beyond the first payment was posted or applied.
    assert_eq!(fx.balance(SystemAccount::Checking).await, dec!(25));
    assert_eq!(fx.balance(SystemAccount::CashOnHand).await, dec!(0));
    let detail = InvoiceRepository::new(fx.db.clone())
        .get(fx.tenant_id, other_invoice)
        .await
        .unwrap();
    assert_eq!(detail.summary.amount_due, dec!(100));
}

#[tokio::test]
async fn test_other_tenant_cannot_delete_payment_or_void_memo() {
    let (Some(fx), Some(intruder)) = (Fixture::setup().await, Fixture::setup().await) else {
        return;
    };
    let invoice_id = fx.sent_invoice(dec!(100)).await;
    let payment = PaymentRepository::new(fx.db.clone())
        .record(fx.tenant_id, invoice_id, payment(dec!(30)))
        .await
        .unwrap();
    let memo = CreditMemoRepository::new(fx.db.clone())
        .create(
            fx.tenant_id,
            CreateCreditMemoInput {
                customer_id: fx.customer_id,
                invoice_id,
                memo_number: None,
                date: date(2026, 3, 5),
                total_amount: dec!(10),
                notes: None,
            },
        )
        .await
        .unwrap();

    let err = PaymentRepository::new(fx.db.clone())
        .delete(intruder.tenant_id, payment.id)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        InvoiceStoreError::Payment(PaymentError::NotFound(_))
    ));
    let err = CreditMemoRepository::new(fx.db.clone())
        .void(intruder.tenant_id, memo.id)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        InvoiceStoreError::Payment(PaymentError::NotFound(_))
    ));

    let detail = InvoiceRepository::new(fx.db.clone())
        .get(fx.tenant_id, invoice_id)
        .await
        .unwrap();
    assert_eq!(detail.summary.amount_due, dec!(60));
}

#[tokio::test]
async fn test_send_and_cancel_rules() {
    let Some(fx) = Fixture::setup().await else {
        return;
    };
    let invoices = InvoiceRepository::new(fx.db.clone());
    let invoice_id = fx.sent_invoice(dec!(100)).await;

    let err = invoices.send(fx.tenant_id, invoice_id).await.unwrap_err();
    assert!(matches!(
        err,
        InvoiceStoreError::Invoice(InvoiceError::NotDraft { .. })
    ));

    PaymentRepository::new(fx.db.clone())
        .record(fx.tenant_id, invoice_id, payment(dec!(10)))
        .await
        .unwrap();
    let err = invoices.cancel(fx.tenant_id, invoice_id).await.unwrap_err();
    assert!(matches!(
        err,
        InvoiceStoreError::Invoice(InvoiceError::HasPayments { .. })
    ));

    let unpaid = fx.sent_invoice(dec!(40)).await;
    let cancelled = invoices.cancel(fx.tenant_id, unpaid).await.unwrap();
    assert_eq!(cancelled.summary.invoice.status, InvoiceStatus::Cancelled);
    // The first invoice stays receivable less its payment.
    assert_eq!(fx.balance(SystemAccount::AccountsReceivable).await, dec!(90));

    let (open, total) = invoices
        .list(
            fx.tenant_id,
            InvoiceFilter {
                status: Some(tally_core::invoicing::InvoiceStatus::PartiallyPaid),
                customer_id: None,
            },
            0,
            20,
        )
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(open[0].invoice.id, invoice_id);
}

#[tokio::test]
async fn test_overdue_is_derived_on_read() {
    let Some(fx) = Fixture::setup().await else {
        return;
    };
    // Dated in the past, so it is already overdue today.
    let invoice_id = InvoiceRepository::new(fx.db.clone())
        .create(
            fx.tenant_id,
            CreateInvoiceInput {
                customer_id: fx.customer_id,
                invoice_number: None,
                date: date(2020, 1, 1),
                due_date: date(2020, 1, 31),
                total_amount: dec!(50),
                sales_order_id: None,
                notes: None,
                send: true,
            },
        )
        .await
        .unwrap()
        .summary
        .invoice
        .id;

    let detail = InvoiceRepository::new(fx.db.clone())
        .get(fx.tenant_id, invoice_id)
        .await
        .unwrap();
    assert_eq!(detail.summary.display_status, DisplayStatus::Overdue);
    assert_eq!(detail.summary.invoice.status, InvoiceStatus::Sent);
}

#[tokio::test]
async fn test_credit_memo_apply_and_void() {
    let Some(fx) = Fixture::setup().await else {
        return;
    };
    let invoices = InvoiceRepository::new(fx.db.clone());
    let memos = CreditMemoRepository::new(fx.db.clone());
    let invoice_id = fx.sent_invoice(dec!(100)).await;

    let memo = memos
        .create(
            fx.tenant_id,
            CreateCreditMemoInput {
                customer_id: fx.customer_id,
                invoice_id,
                memo_number: None,
                date: date(2026, 3, 5),
                total_amount: dec!(20),
                notes: Some("Damaged goods".to_string()),
            },
        )
        .await
        .expect("apply credit memo");
    assert_eq!(memo.memo_number, "CM-000001");

    let detail = invoices.get(fx.tenant_id, invoice_id).await.unwrap();
    assert_eq!(detail.summary.amount_due, dec!(80));
    assert_eq!(fx.balance(SystemAccount::SalesIncome).await, dec!(80));
    assert_eq!(fx.balance(SystemAccount::AccountsReceivable).await, dec!(80));

    let voided = memos.void(fx.tenant_id, memo.id).await.unwrap();
    assert_eq!(voided.status, CreditMemoStatus::Void);
    let detail = invoices.get(fx.tenant_id, invoice_id).await.unwrap();
    assert_eq!(detail.summary.amount_due, dec!(100));
    assert_eq!(detail.summary.invoice.status, InvoiceStatus::Sent);

    let err = memos.void(fx.tenant_id, memo.id).await.unwrap_err();
    assert!(matches!(
        err,
        InvoiceStoreError::Payment(PaymentError::AlreadyVoid(_))
    ));
}

#[tokio::test]
async fn test_invoice_validation_errors() {
    let Some(fx) = Fixture::setup().await else {
        return;
    };
    let invoices = InvoiceRepository::new(fx.db.clone());
    let base = CreateInvoiceInput {
        customer_id: fx.customer_id,
        invoice_number: None,
        date: date(2026, 3, 1),
        due_date: date(2026, 3, 31),
        total_amount: dec!(10),
        sales_order_id: None,
        notes: None,
        send: false,
    };

    let mut zero = base.clone();
    zero.total_amount = dec!(0);
    assert!(matches!(
        invoices.create(fx.tenant_id, zero).await.unwrap_err(),
        InvoiceStoreError::Invoice(InvoiceError::Terms(_))
    ));

    let mut backwards = base.clone();
    backwards.due_date = date(2026, 2, 1);
    assert!(matches!(
        invoices.create(fx.tenant_id, backwards).await.unwrap_err(),
        InvoiceStoreError::Invoice(InvoiceError::Terms(_))
    ));

    let mut stranger = base.clone();
    stranger.customer_id = tally_shared::types::CustomerId::new();
    assert!(matches!(
        invoices.create(fx.tenant_id, stranger).await.unwrap_err(),
        InvoiceStoreError::Invoice(InvoiceError::CustomerNotFound(_))
    ));

    let mut numbered = base.clone();
    numbered.invoice_number = Some("INV-CUSTOM".to_string());
    invoices
        .create(fx.tenant_id, numbered.clone())
        .await
        .unwrap();
    assert!(matches!(
        invoices.create(fx.tenant_id, numbered).await.unwrap_err(),
        InvoiceStoreError::Invoice(InvoiceError::DuplicateNumber(_))
    ));
}
