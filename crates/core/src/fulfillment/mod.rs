//! Sales order fulfillment.
//!
//! Confirming a DRAFT order checks stock for every line, deducts it, and
//! raises an invoice. The storage layer runs all of it in one transaction;
//! this module holds the rules.

pub mod error;
pub mod service;
pub mod types;

pub use error::FulfillmentError;
pub use service::FulfillmentService;
pub use types::{NewOrderLine, OrderStatus, StockCheck, StockShortfall};
