//! Cash transactions that settle on the spot.
//!
//! A sales receipt records a cash sale with no invoice behind it, and a check
//! records money paid straight out of a bank account. Both post a single
//! balanced entry when written and are voided by reversing it.

pub mod error;
pub mod service;
pub mod types;

pub use error::CashbookError;
pub use service::CashbookService;
pub use types::{CashDocumentStatus, CheckAccounts};
