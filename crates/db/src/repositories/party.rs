//! Customer and supplier repository.
//!
//! Parties carry only what documents need to reference them.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use tally_shared::AppError;
use tally_shared::types::TenantId;
use tracing::info;
use uuid::Uuid;

use super::database_error;
use crate::entities::{customers, suppliers};

/// Error types for party operations.
#[derive(Debug, thiserror::Error)]
pub enum PartyError {
    /// Customer or supplier not found.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// "Customer" or "Supplier".
        kind: &'static str,
        /// The requested ID.
        id: Uuid,
    },

    /// Name is blank.
    #[error("Name is required")]
    MissingName,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<PartyError> for AppError {
    fn from(err: PartyError) -> Self {
        match err {
            PartyError::NotFound { .. } => Self::NotFound(err.to_string()),
            PartyError::MissingName => Self::Validation(err.to_string()),
            PartyError::Database(e) => database_error(&e),
        }
    }
}

/// Input for creating a customer or supplier.
#[derive(Debug, Clone)]
pub struct CreatePartyInput {
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
}

impl CreatePartyInput {
    fn validated_name(&self) -> Result<String, PartyError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(PartyError::MissingName);
        }
        Ok(name.to_string())
    }
}

/// Repository for customers and suppliers.
#[derive(Debug, Clone)]
pub struct PartyRepository {
    db: DatabaseConnection,
}

impl PartyRepository {
    /// Creates a new party repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a customer.
    ///
    /// # Errors
    ///
    /// Returns `MissingName` or a database error.
    pub async fn create_customer(
        &self,
        tenant_id: TenantId,
        input: CreatePartyInput,
    ) -> Result<customers::Model, PartyError> {
        let name = input.validated_name()?;
        let now = Utc::now().into();
        let customer = customers::ActiveModel {
            id: Set(Uuid::now_v7()),
            tenant_id: Set(tenant_id.into_inner()),
            name: Set(name),
            email: Set(input.email),
            phone: Set(input.phone),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        info!(tenant_id = %tenant_id, customer_id = %customer.id, "Customer created");
        Ok(customer)
    }

    /// Lists customers by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_customers(
        &self,
        tenant_id: TenantId,
    ) -> Result<Vec<customers::Model>, PartyError> {
        let customers = customers::Entity::find()
            .filter(customers::Column::TenantId.eq(tenant_id.into_inner()))
            .order_by_asc(customers::Column::Name)
            .all(&self.db)
            .await?;
        Ok(customers)
    }

    /// Gets a customer by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the customer is not in the tenant.
    pub async fn get_customer(
        &self,
        tenant_id: TenantId,
        customer_id: Uuid,
    ) -> Result<customers::Model, PartyError> {
        customers::Entity::find_by_id(customer_id)
            .filter(customers::Column::TenantId.eq(tenant_id.into_inner()))
            .one(&self.db)
            .await?
            .ok_or(PartyError::NotFound {
                kind: "Customer",
                id: customer_id,
            })
    }

    /// Creates a supplier.
    ///
    /// # Errors
    ///
    /// Returns `MissingName` or a database error.
    pub async fn create_supplier(
        &self,
        tenant_id: TenantId,
        input: CreatePartyInput,
    ) -> Result<suppliers::Model, PartyError> {
        let name = input.validated_name()?;
        let now = Utc::now().into();
        let supplier = suppliers::ActiveModel {
            id: Set(Uuid::now_v7()),
            tenant_id: Set(tenant_id.into_inner()),
            name: Set(name),
            email: Set(input.email),
            phone: Set(input.phone),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        info!(tenant_id = %tenant_id, supplier_id = %supplier.id, "Supplier created");
        Ok(supplier)
    }

    /// Lists suppliers by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_suppliers(
        &self,
        tenant_id: TenantId,
    ) -> Result<Vec<suppliers::Model>, PartyError> {
        let suppliers = suppliers::Entity::find()
            .filter(suppliers::Column::TenantId.eq(tenant_id.into_inner()))
            .order_by_asc(suppliers::Column::Name)
            .all(&self.db)
            .await?;
        Ok(suppliers)
    }

    /// Gets a supplier by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the supplier is not in the tenant.
    pub async fn get_supplier(
        &self,
        tenant_id: TenantId,
        supplier_id: Uuid,
    ) -> Result<suppliers::Model, PartyError> {
        suppliers::Entity::find_by_id(supplier_id)
            .filter(suppliers::Column::TenantId.eq(tenant_id.into_inner()))
            .one(&self.db)
            .await?
            .ok_or(PartyError::NotFound {
                kind: "Supplier",
                id: supplier_id,
            })
    }
}
