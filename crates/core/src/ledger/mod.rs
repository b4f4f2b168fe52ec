//! Double-entry bookkeeping logic.
//!
//! This module implements the core ledger functionality:
//! - Account types, categories and normal balances
//! - Journal line validation (exact debit/credit equality)
//! - Balance change and replay calculations
//! - Reversing entries
//! - The seeded system chart of accounts

pub mod balance;
pub mod error;
pub mod reversal;
pub mod service;
pub mod system_accounts;
pub mod types;
pub mod validation;

#[cfg(test)]
mod reversal_props;

pub use balance::{NormalBalance, RunningBalance};
pub use error::LedgerError;
pub use reversal::{OriginalLine, REVERSAL_PREFIX, ReversalService};
pub use service::{AccountInfo, AccountRemoval, LedgerService, ResolvedLine};
pub use system_accounts::SystemAccount;
pub use types::{
    AccountCategory, AccountType, EntrySource, EntryTotals, JournalLineInput, PostEntryInput,
    format_entry_number,
};
pub use validation::validate_lines;
