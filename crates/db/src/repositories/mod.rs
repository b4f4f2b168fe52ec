//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.
//! Every mutating method runs in a single database transaction.

pub mod account;
pub mod bill;
pub mod check;
pub mod credit_memo;
pub mod invoice;
pub mod ledger;
pub mod order;
pub mod party;
pub mod payment;
pub mod product;
pub mod report;
pub mod sales_receipt;
pub(crate) mod sequence;
pub mod tenant;

pub use account::{AccountFilter, AccountRepository, CreateAccountInput, UpdateAccountInput};
pub use bill::{
    BillDetail, BillFilter, BillRepository, BillStoreError, CreateBillInput, PayBillInput,
};
pub use check::{CheckRepository, CreateCheckInput};
pub use credit_memo::{CreateCreditMemoInput, CreditMemoRepository};
pub use invoice::{
    CreateInvoiceInput, InvoiceDetail, InvoiceFilter, InvoiceRepository, InvoiceStoreError,
    InvoiceSummary,
};
pub use ledger::{EntryWithLines, LedgerRepository, LedgerStoreError, ManualEntryInput};
pub use order::{
    ConfirmedOrder, CreateOrderInput, OrderDetail, OrderStoreError, SalesOrderRepository,
};
pub use party::{CreatePartyInput, PartyError, PartyRepository};
pub use payment::{PaymentRepository, RecordPaymentInput};
pub use product::{CreateProductInput, ProductRepository};
pub use report::{ReportRepository, ReportStoreError};
pub use sales_receipt::{CashbookStoreError, CreateSalesReceiptInput, SalesReceiptRepository};
pub use tenant::{TenantError, TenantRepository};

use sea_orm::{DbErr, SqlErr};
use tally_shared::AppError;

/// Logs a database failure and hides its details from the client.
pub(crate) fn database_error(err: &DbErr) -> AppError {
    tracing::error!(error = %err, "Database error");
    AppError::Database("A database error occurred".to_string())
}

/// True when `err` is a unique constraint violation.
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
