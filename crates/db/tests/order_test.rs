//! Integration tests for sales orders and the confirmation workflow.

mod common;

use rust_decimal_macros::dec;

use common::{Fixture, date};
use tally_core::fulfillment::{FulfillmentError, NewOrderLine};
use tally_core::ledger::SystemAccount;
use tally_db::entities::sea_orm_active_enums::{InvoiceStatus, SalesOrderStatus};
use tally_db::repositories::{
    CreateOrderInput, OrderStoreError, ProductRepository, SalesOrderRepository,
};
use tally_shared::types::ProductId;

fn order(fx: &Fixture, number: &str, lines: Vec<NewOrderLine>) -> CreateOrderInput {
    CreateOrderInput {
        order_number: number.to_string(),
        customer_id: fx.customer_id,
        date: date(2026, 4, 1),
        notes: None,
        lines,
    }
}

fn line(product_id: uuid::Uuid, quantity: i32) -> NewOrderLine {
    NewOrderLine {
        product_id: ProductId::from_uuid(product_id),
        quantity,
        unit_price: None,
    }
}

#[tokio::test]
async fn test_confirm_deducts_stock_and_raises_invoice() {
    let Some(fx) = Fixture::setup().await else {
        return;
    };
    let orders = SalesOrderRepository::new(fx.db.clone());
    let widget = fx.product("WID-1", dec!(12.50), 5).await;

    let draft = orders
        .create(fx.tenant_id, order(&fx, "SO-1001", vec![line(widget.id, 5)]))
        .await
        .expect("create order");
    assert_eq!(draft.total, dec!(62.50));
    assert_eq!(draft.lines[0].unit_price, dec!(12.50));

    let confirmed = orders
        .confirm(fx.tenant_id, draft.order.id, 30)
        .await
        .expect("confirm order");

    assert_eq!(confirmed.order.status, SalesOrderStatus::Confirmed);
    assert_eq!(confirmed.invoice.invoice_number, "INV-SO-1001");
    assert_eq!(confirmed.invoice.status, InvoiceStatus::Sent);
    assert_eq!(confirmed.invoice.total_amount, dec!(62.50));
    assert_eq!(
        confirmed.invoice.due_date - confirmed.invoice.date,
        chrono::Duration::days(30)
    );
    assert_eq!(fx.stock(widget.id).await.unwrap(), 0);
    assert_eq!(
        fx.balance(SystemAccount::AccountsReceivable).await,
        dec!(62.50)
    );

    let detail = orders.get(fx.tenant_id, draft.order.id).await.unwrap();
    assert_eq!(detail.invoice_id, Some(confirmed.invoice.id));

    let again = orders
        .confirm(fx.tenant_id, draft.order.id, 30)
        .await
        .unwrap_err();
    assert!(matches!(
        again,
        OrderStoreError::Fulfillment(FulfillmentError::NotDraft { .. })
    ));
}

#[tokio::test]
async fn test_insufficient_stock_changes_nothing() {
    let Some(fx) = Fixture::setup().await else {
        return;
    };
    let orders = SalesOrderRepository::new(fx.db.clone());
    let widget = fx.product("WID-2", dec!(10), 3).await;
    let gadget = fx.product("GAD-2", dec!(4), 10).await;

    let draft = orders
        .create(
            fx.tenant_id,
            order(&fx, "SO-1002", vec![line(gadget.id, 2), line(widget.id, 4)]),
        )
        .await
        .unwrap();

    let err = orders
        .confirm(fx.tenant_id, draft.order.id, 30)
        .await
        .unwrap_err();
    match err {
        OrderStoreError::Fulfillment(FulfillmentError::InsufficientStock { shortfalls }) => {
            assert_eq!(shortfalls.len(), 1);
            assert_eq!(shortfalls[0].product_id.into_inner(), widget.id);
            assert_eq!(shortfalls[0].requested, 4);
            assert_eq!(shortfalls[0].available, 3);
        }
        other => panic!("expected InsufficientStock, got {other:?}"),
    }

    assert_eq!(fx.stock(widget.id).await.unwrap(), 3);
    assert_eq!(fx.stock(gadget.id).await.unwrap(), 10);
    let detail = orders.get(fx.tenant_id, draft.order.id).await.unwrap();
    assert_eq!(detail.order.status, SalesOrderStatus::Draft);
    assert_eq!(detail.invoice_id, None);
    assert_eq!(fx.balance(SystemAccount::AccountsReceivable).await, dec!(0));
}

#[tokio::test]
async fn test_repeated_lines_past_i32_max_cannot_oversell() {
    let Some(fx) = Fixture::setup().await else {
        return;
    };
    let orders = SalesOrderRepository::new(fx.db.clone());
    let washer = fx.product("WSH-9", dec!(0.01), 10).await;

    let draft = orders
        .create(
            fx.tenant_id,
            order(
                &fx,
                "SO-1009",
                vec![line(washer.id, 1_500_000_000), line(washer.id, 1_500_000_000)],
            ),
        )
        .await
        .unwrap();

    let err = orders
        .confirm(fx.tenant_id, draft.order.id, 30)
        .await
        .unwrap_err();
    match err {
        OrderStoreError::Fulfillment(FulfillmentError::InsufficientStock { shortfalls }) => {
            assert_eq!(shortfalls[0].requested, 3_000_000_000);
        }
        other => panic!("expected InsufficientStock, got {other:?}"),
    }
    assert_eq!(fx.stock(washer.id).await.unwrap(), 10);
}

#[tokio::test]
async fn test_cancel_only_from_draft() {
    let Some(fx) = Fixture::setup().await else {
        return;
    };
    let orders = SalesOrderRepository::new(fx.db.clone());
    let widget = fx.product("WID-3", dec!(1), 100).await;

    let draft = orders
        .create(fx.tenant_id, order(&fx, "SO-1003", vec![line(widget.id, 1)]))
        .await
        .unwrap();
    let cancelled = orders.cancel(fx.tenant_id, draft.order.id).await.unwrap();
    assert_eq!(cancelled.order.status, SalesOrderStatus::Cancelled);

    let err = orders
        .confirm(fx.tenant_id, draft.order.id, 30)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        OrderStoreError::Fulfillment(FulfillmentError::NotDraft { .. })
    ));
    assert_eq!(fx.stock(widget.id).await.unwrap(), 100);
}

#[tokio::test]
async fn test_order_validation() {
    let Some(fx) = Fixture::setup().await else {
        return;
    };
    let orders = SalesOrderRepository::new(fx.db.clone());
    let widget = fx.product("WID-4", dec!(1), 1).await;

    let err = orders
        .create(fx.tenant_id, order(&fx, "SO-1004", vec![]))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        OrderStoreError::Fulfillment(FulfillmentError::NoLines)
    ));

    let err = orders
        .create(fx.tenant_id, order(&fx, "SO-1004", vec![line(uuid::Uuid::now_v7(), 1)]))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        OrderStoreError::Fulfillment(FulfillmentError::ProductNotFound(_))
    ));

    orders
        .create(fx.tenant_id, order(&fx, "SO-1004", vec![line(widget.id, 1)]))
        .await
        .unwrap();
    let err = orders
        .create(fx.tenant_id, order(&fx, "SO-1004", vec![line(widget.id, 1)]))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        OrderStoreError::Fulfillment(FulfillmentError::DuplicateOrderNumber(_))
    ));
}

#[tokio::test]
async fn test_stock_adjustment_never_negative() {
    let Some(fx) = Fixture::setup().await else {
        return;
    };
    let products = ProductRepository::new(fx.db.clone());
    let widget = fx.product("WID-5", dec!(2), 4).await;

    let restocked = products
        .adjust_stock(fx.tenant_id, widget.id, 6)
        .await
        .unwrap();
    assert_eq!(restocked.stock_quantity, 10);

    let err = products
        .adjust_stock(fx.tenant_id, widget.id, -11)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        OrderStoreError::Fulfillment(FulfillmentError::NegativeStock { .. })
    ));
    assert_eq!(fx.stock(widget.id).await.unwrap(), 10);
}
