//! Core business logic for Tally.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `ledger` - Double-entry bookkeeping: account types, posting validation, reversals
//! - `settlement` - Shared open/paid/overdue rules for invoices and bills
//! - `invoicing` - Invoice lifecycle and A/R postings
//! - `payments` - Payment application, overpayment guard, credit memos
//! - `fulfillment` - Sales order confirmation and stock checks
//! - `payables` - Supplier bills and A/P postings
//! - `cashbook` - Sales receipts and checks that settle on the spot
//! - `reports` - Financial statements and aging

pub mod cashbook;
pub mod fulfillment;
pub mod invoicing;
pub mod ledger;
pub mod payables;
pub mod payments;
pub mod reports;
pub mod settlement;
