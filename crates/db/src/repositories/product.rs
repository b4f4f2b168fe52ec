//! Product repository with stock adjustments.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tally_core::fulfillment::{FulfillmentError, FulfillmentService};
use tally_shared::types::TenantId;
use tracing::info;
use uuid::Uuid;

use super::is_unique_violation;
use super::order::OrderStoreError;
use crate::entities::products;

/// Input for creating a product.
#[derive(Debug, Clone)]
pub struct CreateProductInput {
    /// Stock keeping unit, unique within the tenant.
    pub sku: String,
    /// Display name.
    pub name: String,
    /// Default price per unit.
    pub unit_price: Decimal,
    /// Opening stock.
    pub stock_quantity: i32,
}

/// Product repository.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    db: DatabaseConnection,
}

impl ProductRepository {
    /// Creates a new product repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a product.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPrice` for a negative price, `NegativeStock` for negative
    /// opening stock, or `DuplicateSku`.
    pub async fn create(
        &self,
        tenant_id: TenantId,
        input: CreateProductInput,
    ) -> Result<products::Model, OrderStoreError> {
        if input.unit_price < Decimal::ZERO {
            return Err(FulfillmentError::InvalidPrice { index: 0 }.into());
        }
        let id = Uuid::now_v7();
        let stock_quantity = FulfillmentService::adjust_stock(id, 0, input.stock_quantity)?;

        let sku = input.sku.trim().to_string();
        let now = Utc::now().into();
        let product = products::ActiveModel {
            id: Set(id),
            tenant_id: Set(tenant_id.into_inner()),
            sku: Set(sku.clone()),
            name: Set(input.name),
            unit_price: Set(input.unit_price),
            stock_quantity: Set(stock_quantity),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                OrderStoreError::Fulfillment(FulfillmentError::DuplicateSku(sku.clone()))
            } else {
                err.into()
            }
        })?;

        info!(
            tenant_id = %tenant_id,
            product_id = %product.id,
            sku = %product.sku,
            "Product created"
        );
        Ok(product)
    }

    /// Gets a product.
    ///
    /// # Errors
    ///
    /// Returns `ProductNotFound` if the product is not in the tenant.
    pub async fn get(
        &self,
        tenant_id: TenantId,
        product_id: Uuid,
    ) -> Result<products::Model, OrderStoreError> {
        let product = products::Entity::find_by_id(product_id)
            .filter(products::Column::TenantId.eq(tenant_id.into_inner()))
            .one(&self.db)
            .await?
            .ok_or(FulfillmentError::ProductNotFound(product_id))?;
        Ok(product)
    }

    /// Lists products ordered by SKU.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, tenant_id: TenantId) -> Result<Vec<products::Model>, OrderStoreError> {
        let products = products::Entity::find()
            .filter(products::Column::TenantId.eq(tenant_id.into_inner()))
            .order_by_asc(products::Column::Sku)
            .all(&self.db)
            .await?;
        Ok(products)
    }

    /// Adds `delta` units to stock on hand. Negative deltas remove stock.
    ///
    /// # Errors
    ///
    /// Returns `ProductNotFound`, or `NegativeStock` if stock would drop below zero.
    pub async fn adjust_stock(
        &self,
        tenant_id: TenantId,
        product_id: Uuid,
        delta: i32,
    ) -> Result<products::Model, OrderStoreError> {
        let txn = self.db.begin().await?;
        let product = products::Entity::find_by_id(product_id)
            .filter(products::Column::TenantId.eq(tenant_id.into_inner()))
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(FulfillmentError::ProductNotFound(product_id))?;

        let stock_quantity =
            FulfillmentService::adjust_stock(product.id, product.stock_quantity, delta)?;
        let mut active = product.into_active_model();
        active.stock_quantity = Set(stock_quantity);
        active.updated_at = Set(Utc::now().into());
        let product = active.update(&txn).await?;
        txn.commit().await?;

        info!(
            tenant_id = %tenant_id,
            product_id = %product.id,
            delta,
            stock_quantity = product.stock_quantity,
            "Stock adjusted"
        );
        Ok(product)
    }
}
