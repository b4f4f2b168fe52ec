//! Payment application.
//!
//! Applies cash payments and credit memos to open documents, guards against
//! overpayment, and builds the matching ledger postings.

pub mod error;
pub mod service;
pub mod types;

pub use error::PaymentError;
pub use service::PaymentService;
pub use types::{CreditMemoStatus, PaymentIntent, PaymentMethod};
