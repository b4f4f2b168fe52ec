//! Sales order repository and the order confirmation workflow.
//!
//! Confirming an order checks and deducts stock, raises a SENT invoice and
//! marks the order CONFIRMED in one transaction. Product rows are locked in
//! ascending id order for the whole unit, so concurrent confirmations cannot
//! oversell and never deadlock on each other.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tally_core::fulfillment::{
    FulfillmentError, FulfillmentService, NewOrderLine, OrderStatus, StockCheck,
};
use tally_core::invoicing::InvoiceService;
use tally_shared::AppError;
use tally_shared::types::{CustomerId, ProductId, SalesOrderId, TenantId};
use tracing::info;
use uuid::Uuid;

use super::invoice::{CreateInvoiceInput, InvoiceStoreError, create_in};
use super::{database_error, is_unique_violation};
use crate::entities::{customers, invoices, products, sales_order_lines, sales_orders};

/// Error types for sales order and product operations.
#[derive(Debug, thiserror::Error)]
pub enum OrderStoreError {
    /// Fulfillment rule violation.
    #[error(transparent)]
    Fulfillment(#[from] FulfillmentError),

    /// Failure while raising the order's invoice.
    #[error(transparent)]
    Invoicing(#[from] InvoiceStoreError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<OrderStoreError> for AppError {
    fn from(err: OrderStoreError) -> Self {
        match err {
            OrderStoreError::Fulfillment(e) => e.into(),
            OrderStoreError::Invoicing(e) => e.into(),
            OrderStoreError::Database(e) => database_error(&e),
        }
    }
}

/// Input for creating a DRAFT sales order.
#[derive(Debug, Clone)]
pub struct CreateOrderInput {
    /// Order number, unique within the tenant.
    pub order_number: String,
    /// Ordering customer.
    pub customer_id: CustomerId,
    /// Order date.
    pub date: NaiveDate,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Requested lines.
    pub lines: Vec<NewOrderLine>,
}

/// Sales order with its lines.
#[derive(Debug, Clone)]
pub struct OrderDetail {
    /// The order record.
    pub order: sales_orders::Model,
    /// Lines in entry order.
    pub lines: Vec<sales_order_lines::Model>,
    /// Sum of line totals.
    pub total: Decimal,
    /// Invoice raised on confirmation.
    pub invoice_id: Option<Uuid>,
}

/// Result of confirming an order.
#[derive(Debug, Clone)]
pub struct ConfirmedOrder {
    /// The order, now CONFIRMED.
    pub order: sales_orders::Model,
    /// The SENT invoice raised for it.
    pub invoice: invoices::Model,
}

/// Sales order repository.
#[derive(Debug, Clone)]
pub struct SalesOrderRepository {
    db: DatabaseConnection,
}

impl SalesOrderRepository {
    /// Creates a new sales order repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a DRAFT order. Lines without a price take the product's price.
    ///
    /// # Errors
    ///
    /// Returns `NoLines`, `InvalidQuantity`, `InvalidPrice`, `CustomerNotFound`,
    /// `ProductNotFound` or `DuplicateOrderNumber`.
    pub async fn create(
        &self,
        tenant_id: TenantId,
        input: CreateOrderInput,
    ) -> Result<OrderDetail, OrderStoreError> {
        FulfillmentService::validate_lines(&input.lines)?;
        let tenant = tenant_id.into_inner();
        let txn = self.db.begin().await?;

        let customer_id = input.customer_id.into_inner();
        let customer_exists = customers::Entity::find_by_id(customer_id)
            .filter(customers::Column::TenantId.eq(tenant))
            .count(&txn)
            .await?
            > 0;
        if !customer_exists {
            return Err(FulfillmentError::CustomerNotFound(customer_id).into());
        }

        let product_ids: Vec<Uuid> = input
            .lines
            .iter()
            .map(|line| line.product_id.into_inner())
            .collect();
        let prices: HashMap<Uuid, Decimal> = products::Entity::find()
            .filter(products::Column::TenantId.eq(tenant))
            .filter(products::Column::Id.is_in(product_ids))
            .all(&txn)
            .await?
            .into_iter()
            .map(|product| (product.id, product.unit_price))
            .collect();

        let number = input.order_number.trim().to_string();
        let now = Utc::now().into();
        let order = sales_orders::ActiveModel {
            id: Set(Uuid::now_v7()),
            tenant_id: Set(tenant),
            order_number: Set(number.clone()),
            customer_id: Set(customer_id),
            date: Set(input.date),
            status: Set(OrderStatus::Draft.into()),
            notes: Set(input.notes),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                OrderStoreError::Fulfillment(FulfillmentError::DuplicateOrderNumber(number.clone()))
            } else {
                err.into()
            }
        })?;

        let mut lines = Vec::with_capacity(input.lines.len());
        for (line, sort_order) in input.lines.iter().zip(0_i32..) {
            let product_id = line.product_id.into_inner();
            let catalogue_price = prices
                .get(&product_id)
                .copied()
                .ok_or(FulfillmentError::ProductNotFound(product_id))?;
            lines.push(sales_order_lines::ActiveModel {
                id: Set(Uuid::now_v7()),
                order_id: Set(order.id),
                product_id: Set(product_id),
                quantity: Set(line.quantity),
                unit_price: Set(line.unit_price.unwrap_or(catalogue_price)),
                sort_order: Set(sort_order),
            });
        }
        sales_order_lines::Entity::insert_many(lines).exec(&txn).await?;
        txn.commit().await?;

        info!(
            tenant_id = %tenant_id,
            order_id = %order.id,
            order_number = %order.order_number,
            "Sales order created"
        );
        self.get(tenant_id, order.id).await
    }

    /// Gets an order with its lines and invoice reference.
    ///
    /// # Errors
    ///
    /// Returns `OrderNotFound` if the order is not in the tenant.
    pub async fn get(
        &self,
        tenant_id: TenantId,
        order_id: Uuid,
    ) -> Result<OrderDetail, OrderStoreError> {
        let order = sales_orders::Entity::find_by_id(order_id)
            .filter(sales_orders::Column::TenantId.eq(tenant_id.into_inner()))
            .one(&self.db)
            .await?
            .ok_or(FulfillmentError::OrderNotFound(order_id))?;

        let lines = sales_order_lines::Entity::find()
            .filter(sales_order_lines::Column::OrderId.eq(order.id))
            .order_by_asc(sales_order_lines::Column::SortOrder)
            .all(&self.db)
            .await?;

        let invoice_id = invoices::Entity::find()
            .select_only()
            .column(invoices::Column::Id)
            .filter(invoices::Column::SalesOrderId.eq(order.id))
            .into_tuple::<Uuid>()
            .one(&self.db)
            .await?;

        let total =
            FulfillmentService::order_total(lines.iter().map(|line| (line.quantity, line.unit_price)));

        Ok(OrderDetail {
            order,
            lines,
            total,
            invoice_id,
        })
    }

    /// Confirms a DRAFT order: deducts stock, raises the invoice, and marks the
    /// order CONFIRMED, all or nothing.
    ///
    /// # Errors
    ///
    /// Returns `OrderNotFound`, `NotDraft`, `InsufficientStock` listing every
    /// short product, or an invoicing error. Nothing is written on failure.
    pub async fn confirm(
        &self,
        tenant_id: TenantId,
        order_id: Uuid,
        payment_terms_days: u32,
    ) -> Result<ConfirmedOrder, OrderStoreError> {
        let tenant = tenant_id.into_inner();
        let txn = self.db.begin().await?;

        let order = sales_orders::Entity::find_by_id(order_id)
            .filter(sales_orders::Column::TenantId.eq(tenant))
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(FulfillmentError::OrderNotFound(order_id))?;
        FulfillmentService::validate_can_confirm(order.status.into())?;

        let lines = sales_order_lines::Entity::find()
            .filter(sales_order_lines::Column::OrderId.eq(order.id))
            .order_by_asc(sales_order_lines::Column::SortOrder)
            .all(&txn)
            .await?;

        let mut product_ids: Vec<Uuid> = lines.iter().map(|line| line.product_id).collect();
        product_ids.sort_unstable();
        product_ids.dedup();
        let stock: HashMap<Uuid, products::Model> = products::Entity::find()
            .filter(products::Column::TenantId.eq(tenant))
            .filter(products::Column::Id.is_in(product_ids))
            .order_by_asc(products::Column::Id)
            .lock_exclusive()
            .all(&txn)
            .await?
            .into_iter()
            .map(|product| (product.id, product))
            .collect();

        let mut checks = Vec::with_capacity(lines.len());
        for line in &lines {
            let product = stock
                .get(&line.product_id)
                .ok_or(FulfillmentError::ProductNotFound(line.product_id))?;
            checks.push(StockCheck {
                product_id: ProductId::from_uuid(product.id),
                product_name: product.name.clone(),
                requested: line.quantity,
                available: product.stock_quantity,
            });
        }
        let deductions = FulfillmentService::check_stock(&checks)?;

        for (product_id, quantity) in deductions {
            let product_id = product_id.into_inner();
            let Some(product) = stock.get(&product_id) else {
                continue;
            };
            let remaining =
                FulfillmentService::adjust_stock(product_id, product.stock_quantity, -quantity)?;
            let mut active = product.clone().into_active_model();
            active.stock_quantity = Set(remaining);
            active.updated_at = Set(Utc::now().into());
            active.update(&txn).await?;
        }

        let today = Utc::now().date_naive();
        let total =
            FulfillmentService::order_total(lines.iter().map(|line| (line.quantity, line.unit_price)));
        let invoice = create_in(
            &txn,
            tenant_id,
            CreateInvoiceInput {
                customer_id: CustomerId::from_uuid(order.customer_id),
                invoice_number: Some(InvoiceService::number_for_order(&order.order_number)),
                date: today,
                due_date: FulfillmentService::due_date(today, payment_terms_days),
                total_amount: total,
                sales_order_id: Some(SalesOrderId::from_uuid(order.id)),
                notes: None,
                send: true,
            },
        )
        .await?;

        let mut active = order.into_active_model();
        active.status = Set(OrderStatus::Confirmed.into());
        active.updated_at = Set(Utc::now().into());
        let order = active.update(&txn).await?;
        txn.commit().await?;

        info!(
            tenant_id = %tenant_id,
            order_id = %order.id,
            invoice_id = %invoice.id,
            total = %total,
            "Sales order confirmed"
        );
        Ok(ConfirmedOrder { order, invoice })
    }

    /// Cancels a DRAFT order.
    ///
    /// # Errors
    ///
    /// Returns `OrderNotFound` or `NotDraft`.
    pub async fn cancel(
        &self,
        tenant_id: TenantId,
        order_id: Uuid,
    ) -> Result<OrderDetail, OrderStoreError> {
        let txn = self.db.begin().await?;
        let order = sales_orders::Entity::find_by_id(order_id)
            .filter(sales_orders::Column::TenantId.eq(tenant_id.into_inner()))
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(FulfillmentError::OrderNotFound(order_id))?;
        FulfillmentService::validate_can_cancel(order.status.into())?;

        let mut active = order.into_active_model();
        active.status = Set(OrderStatus::Cancelled.into());
        active.updated_at = Set(Utc::now().into());
        active.update(&txn).await?;
        txn.commit().await?;

        info!(tenant_id = %tenant_id, order_id = %order_id, "Sales order cancelled");
        self.get(tenant_id, order_id).await
    }
}
