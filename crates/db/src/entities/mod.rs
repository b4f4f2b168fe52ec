//! `SeaORM` entity definitions.

pub mod prelude;

pub mod accounts;
pub mod bill_payments;
pub mod bills;
pub mod checks;
pub mod credit_memos;
pub mod customers;
pub mod invoices;
pub mod journal_entries;
pub mod journal_lines;
pub mod payments;
pub mod products;
pub mod sales_receipts;
pub mod sales_order_lines;
pub mod sales_orders;
pub mod sea_orm_active_enums;
pub mod suppliers;
pub mod tenants;
