//! Entity re-exports under their table names.

pub use super::accounts::Entity as Accounts;
pub use super::bill_payments::Entity as BillPayments;
pub use super::bills::Entity as Bills;
pub use super::checks::Entity as Checks;
pub use super::credit_memos::Entity as CreditMemos;
pub use super::customers::Entity as Customers;
pub use super::invoices::Entity as Invoices;
pub use super::journal_entries::Entity as JournalEntries;
pub use super::journal_lines::Entity as JournalLines;
pub use super::payments::Entity as Payments;
pub use super::products::Entity as Products;
pub use super::sales_order_lines::Entity as SalesOrderLines;
pub use super::sales_orders::Entity as SalesOrders;
pub use super::sales_receipts::Entity as SalesReceipts;
pub use super::suppliers::Entity as Suppliers;
pub use super::tenants::Entity as Tenants;
