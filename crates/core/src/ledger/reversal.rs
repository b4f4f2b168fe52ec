//! Reversing entries.
//!
//! Posted entries are immutable. A correction posts a new entry with every
//! line's debit and credit swapped, which nets the original to zero.

use rust_decimal::Decimal;
use tally_shared::types::AccountId;
use uuid::Uuid;

use super::error::LedgerError;
use super::types::{EntrySource, JournalLineInput};

/// Memo prefix carried by every reversing line and entry.
pub const REVERSAL_PREFIX: &str = "Reversal: ";

/// A posted line to be reversed.
#[derive(Debug, Clone)]
pub struct OriginalLine {
    /// The account ID.
    pub account_id: AccountId,
    /// The debit amount (0 if credit).
    pub debit: Decimal,
    /// The credit amount (0 if debit).
    pub credit: Decimal,
    /// Optional memo.
    pub memo: Option<String>,
}

/// Stateless service for creating reversing entries.
pub struct ReversalService;

impl ReversalService {
    /// Create reversing lines by swapping debits and credits.
    ///
    /// For each original line:
    /// - Debits become credits
    /// - Credits become debits
    /// - Account and amount are preserved
    /// - Memo is prefixed with "Reversal: "
    #[must_use]
    pub fn create_reversing_lines(original: &[OriginalLine]) -> Vec<JournalLineInput> {
        original
            .iter()
            .map(|line| JournalLineInput {
                account_id: line.account_id,
                debit: line.credit,
                credit: line.debit,
                memo: Some(format!(
                    "{REVERSAL_PREFIX}{}",
                    line.memo.as_deref().unwrap_or_default()
                )),
            })
            .collect()
    }

    /// Memo for the reversing entry itself.
    #[must_use]
    pub fn reversal_memo(original_number: &str, reason: Option<&str>) -> String {
        match reason {
            Some(reason) if !reason.trim().is_empty() => {
                format!("{REVERSAL_PREFIX}{original_number}. Reason: {}", reason.trim())
            }
            _ => format!("{REVERSAL_PREFIX}{original_number}"),
        }
    }

    /// Validate that original lines are balanced.
    ///
    /// This should always be true for posted entries.
    #[must_use]
    pub fn validate_reversal(original: &[OriginalLine]) -> bool {
        let total_debit: Decimal = original.iter().map(|l| l.debit).sum();
        let total_credit: Decimal = original.iter().map(|l| l.credit).sum();

        total_debit == total_credit
    }

    /// An entry may be reversed once, and a reversal is never itself reversed
    /// through this path.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyReversed` if a reversal already exists.
    pub fn validate_can_reverse(entry_id: Uuid, already_reversed: bool) -> Result<(), LedgerError> {
        if already_reversed {
            return Err(LedgerError::AlreadyReversed(entry_id));
        }
        Ok(())
    }

    /// Only manual entries are reversed directly; generated entries follow
    /// their document (payment deletion, invoice cancellation).
    ///
    /// # Errors
    ///
    /// Returns `DocumentOwned` for any non-manual source.
    pub fn validate_owner(entry_id: Uuid, source: EntrySource) -> Result<(), LedgerError> {
        if source != EntrySource::Manual {
            return Err(LedgerError::DocumentOwned {
                entry_id,
                origin: source.as_str(),
            });
        }
        Ok(())
    }
}
