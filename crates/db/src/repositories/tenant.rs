//! Tenant repository.
//!
//! Creating a tenant seeds its system chart of accounts in the same
//! transaction, so every tenant can post invoices and payments immediately.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, Set, TransactionTrait,
};
use tally_core::ledger::SystemAccount;
use tally_shared::AppError;
use tally_shared::types::TenantId;
use tracing::info;
use uuid::Uuid;

use super::database_error;
use crate::entities::{accounts, tenants};

/// Error types for tenant operations.
#[derive(Debug, thiserror::Error)]
pub enum TenantError {
    /// Tenant not found.
    #[error("Tenant not found: {0}")]
    NotFound(Uuid),

    /// Tenant name is blank.
    #[error("Tenant name is required")]
    MissingName,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<TenantError> for AppError {
    fn from(err: TenantError) -> Self {
        match err {
            TenantError::NotFound(_) => Self::NotFound(err.to_string()),
            TenantError::MissingName => Self::Validation(err.to_string()),
            TenantError::Database(e) => database_error(&e),
        }
    }
}

/// Tenant repository.
#[derive(Debug, Clone)]
pub struct TenantRepository {
    db: DatabaseConnection,
}

impl TenantRepository {
    /// Creates a new tenant repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a tenant and seeds its system chart of accounts.
    ///
    /// # Errors
    ///
    /// Returns `MissingName` for a blank name, or a database error.
    pub async fn create(&self, name: &str) -> Result<tenants::Model, TenantError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TenantError::MissingName);
        }

        let now = Utc::now().into();
        let txn = self.db.begin().await?;

        let tenant = tenants::ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(name.to_string()),
            journal_sequence: Set(0),
            invoice_sequence: Set(0),
            bill_sequence: Set(0),
            credit_memo_sequence: Set(0),
            sales_receipt_sequence: Set(0),
            check_sequence: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let chart = SystemAccount::ALL.iter().map(|system| accounts::ActiveModel {
            id: Set(Uuid::now_v7()),
            tenant_id: Set(tenant.id),
            account_number: Set(system.number().to_string()),
            name: Set(system.name().to_string()),
            account_type: Set(system.account_type().into()),
            detail_type: Set(None),
            description: Set(None),
            parent_id: Set(None),
            balance: Set(Decimal::ZERO),
            is_active: Set(true),
            is_system: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        });
        accounts::Entity::insert_many(chart).exec(&txn).await?;

        txn.commit().await?;

        info!(tenant_id = %tenant.id, name = %tenant.name, "Tenant created");
        Ok(tenant)
    }

    /// Gets a tenant by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the tenant does not exist.
    pub async fn get(&self, tenant_id: TenantId) -> Result<tenants::Model, TenantError> {
        let id = tenant_id.into_inner();
        tenants::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(TenantError::NotFound(id))
    }

    /// Returns true if the tenant exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn exists(&self, tenant_id: TenantId) -> Result<bool, TenantError> {
        let count = tenants::Entity::find()
            .filter(tenants::Column::Id.eq(tenant_id.into_inner()))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }
}
