//! Account repository for chart of accounts database operations.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tally_core::ledger::{AccountRemoval, AccountType, LedgerError, LedgerService};
use tally_shared::types::TenantId;
use tracing::info;
use uuid::Uuid;

use super::is_unique_violation;
use super::ledger::LedgerStoreError;
use crate::entities::{accounts, journal_lines};

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// Account number, unique within the tenant.
    pub account_number: String,
    /// Account name.
    pub name: String,
    /// Detailed account type.
    pub account_type: AccountType,
    /// Free-text detail type.
    pub detail_type: Option<String>,
    /// Account description.
    pub description: Option<String>,
    /// Parent account in the same category.
    pub parent_id: Option<Uuid>,
}

/// Input for updating an account.
///
/// The number and type are fixed once created.
#[derive(Debug, Clone, Default)]
pub struct UpdateAccountInput {
    /// Account name.
    pub name: Option<String>,
    /// Account description.
    pub description: Option<Option<String>>,
    /// Free-text detail type.
    pub detail_type: Option<Option<String>>,
    /// Whether the account accepts postings.
    pub is_active: Option<bool>,
}

/// Filter options for listing accounts.
#[derive(Debug, Clone, Default)]
pub struct AccountFilter {
    /// Filter by account type.
    pub account_type: Option<AccountType>,
    /// Filter by active flag.
    pub is_active: Option<bool>,
}

/// Account repository for chart of accounts CRUD.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new account with a zero balance.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateAccountNumber`, `AccountNotFound` for an unknown parent,
    /// or `ParentCategoryMismatch`.
    pub async fn create(
        &self,
        tenant_id: TenantId,
        input: CreateAccountInput,
    ) -> Result<accounts::Model, LedgerStoreError> {
        if let Some(parent_id) = input.parent_id {
            let parent = self.get(tenant_id, parent_id).await?;
            LedgerService::validate_parent(
                input.account_type,
                parent_id,
                parent.account_type.into(),
            )?;
        }

        let now = Utc::now().into();
        let number = input.account_number.trim().to_string();
        let account = accounts::ActiveModel {
            id: Set(Uuid::now_v7()),
            tenant_id: Set(tenant_id.into_inner()),
            account_number: Set(number.clone()),
            name: Set(input.name),
            account_type: Set(input.account_type.into()),
            detail_type: Set(input.detail_type),
            description: Set(input.description),
            parent_id: Set(input.parent_id),
            balance: Set(rust_decimal::Decimal::ZERO),
            is_active: Set(true),
            is_system: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                LedgerStoreError::Ledger(LedgerError::DuplicateAccountNumber(number.clone()))
            } else {
                err.into()
            }
        })?;

        info!(
            tenant_id = %tenant_id,
            account_id = %account.id,
            account_number = %account.account_number,
            "Account created"
        );
        Ok(account)
    }

    /// Lists accounts ordered by account number.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        tenant_id: TenantId,
        filter: AccountFilter,
    ) -> Result<Vec<accounts::Model>, LedgerStoreError> {
        let mut query =
            accounts::Entity::find().filter(accounts::Column::TenantId.eq(tenant_id.into_inner()));

        if let Some(account_type) = filter.account_type {
            query = query.filter(
                accounts::Column::AccountType
                    .eq(crate::entities::sea_orm_active_enums::AccountType::from(account_type)),
            );
        }
        if let Some(is_active) = filter.is_active {
            query = query.filter(accounts::Column::IsActive.eq(is_active));
        }

        let accounts = query
            .order_by_asc(accounts::Column::AccountNumber)
            .all(&self.db)
            .await?;
        Ok(accounts)
    }

    /// Gets an account by ID.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if the account is not in the tenant.
    pub async fn get(
        &self,
        tenant_id: TenantId,
        account_id: Uuid,
    ) -> Result<accounts::Model, LedgerStoreError> {
        let account = accounts::Entity::find_by_id(account_id)
            .filter(accounts::Column::TenantId.eq(tenant_id.into_inner()))
            .one(&self.db)
            .await?
            .ok_or(LedgerError::AccountNotFound(account_id))?;
        Ok(account)
    }

    /// Updates an account's descriptive fields or active flag.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound`, or `SystemAccountProtected` when deactivating
    /// a system account.
    pub async fn update(
        &self,
        tenant_id: TenantId,
        account_id: Uuid,
        input: UpdateAccountInput,
    ) -> Result<accounts::Model, LedgerStoreError> {
        let account = self.get(tenant_id, account_id).await?;
        if account.is_system && input.is_active == Some(false) {
            return Err(LedgerError::SystemAccountProtected(account_id).into());
        }

        let mut active = account.into_active_model();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(detail_type) = input.detail_type {
            active.detail_type = Set(detail_type);
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&self.db).await?;
        info!(tenant_id = %tenant_id, account_id = %account_id, "Account updated");
        Ok(updated)
    }

    /// Deletes an account, or deactivates it when postings reference it.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` or `SystemAccountProtected`.
    pub async fn delete(
        &self,
        tenant_id: TenantId,
        account_id: Uuid,
    ) -> Result<AccountRemoval, LedgerStoreError> {
        let txn = self.db.begin().await?;

        let account = accounts::Entity::find_by_id(account_id)
            .filter(accounts::Column::TenantId.eq(tenant_id.into_inner()))
            .one(&txn)
            .await?
            .ok_or(LedgerError::AccountNotFound(account_id))?;

        let postings = journal_lines::Entity::find()
            .filter(journal_lines::Column::AccountId.eq(account_id))
            .count(&txn)
            .await?;

        let children = accounts::Entity::find()
            .filter(accounts::Column::ParentId.eq(account_id))
            .count(&txn)
            .await?;

        // Sub-accounts keep their parent reference, so a parent is only deactivated.
        let referenced = postings > 0 || children > 0;
        let removal = LedgerService::plan_removal(account_id, account.is_system, referenced)?;
        match removal {
            AccountRemoval::Delete => {
                accounts::Entity::delete_by_id(account_id).exec(&txn).await?;
            }
            AccountRemoval::Deactivate => {
                let mut active = account.into_active_model();
                active.is_active = Set(false);
                active.updated_at = Set(Utc::now().into());
                active.update(&txn).await?;
            }
        }
        txn.commit().await?;

        info!(tenant_id = %tenant_id, account_id = %account_id, removal = ?removal, "Account removed");
        Ok(removal)
    }
}
