//! Supplier bills.
//!
//! Bills mirror invoices on the payables side: approval posts Debit Purchases,
//! Credit A/P, and bill payments post Debit A/P, Credit Bank/Cash.

pub mod error;
pub mod service;
pub mod types;

pub use error::BillError;
pub use service::BillService;
pub use types::{BillDisplayStatus, BillStatus, NewBill};
