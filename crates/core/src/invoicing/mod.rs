//! Invoice lifecycle.
//!
//! State machine: `DRAFT -> SENT -> PARTIALLY_PAID -> PAID`, with `CANCELLED`
//! reachable from DRAFT and SENT. `OVERDUE` is derived on read and never stored.

pub mod error;
pub mod service;
pub mod types;

pub use error::InvoiceError;
pub use service::InvoiceService;
pub use types::{DisplayStatus, InvoiceStatus, NewInvoice};
