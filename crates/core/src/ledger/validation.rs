//! Business rule validation for journal lines.

use rust_decimal::Decimal;

use super::error::LedgerError;
use super::types::{EntryTotals, JournalLineInput};

/// Validates the shape of a set of journal lines and returns their totals.
///
/// Rules, in order:
/// 1. At least two lines.
/// 2. Each line has exactly one positive side and no negative amounts.
/// 3. Both sides are present.
/// 4. Debits equal credits exactly. No rounding tolerance.
///
/// # Errors
///
/// Returns the first rule the lines break.
pub fn validate_lines(lines: &[JournalLineInput]) -> Result<EntryTotals, LedgerError> {
    if lines.len() < 2 {
        return Err(LedgerError::InsufficientLines);
    }

    let mut total_debit = Decimal::ZERO;
    let mut total_credit = Decimal::ZERO;

    for (index, line) in lines.iter().enumerate() {
        let is_debit = line.debit > Decimal::ZERO;
        let is_credit = line.credit > Decimal::ZERO;
        if line.debit < Decimal::ZERO || line.credit < Decimal::ZERO || is_debit == is_credit {
            return Err(LedgerError::InvalidLine { index });
        }
        total_debit += line.debit;
        total_credit += line.credit;
    }

    if total_debit == Decimal::ZERO || total_credit == Decimal::ZERO {
        return Err(LedgerError::SingleSided);
    }

    let totals = EntryTotals::new(total_debit, total_credit);
    if !totals.is_balanced {
        return Err(LedgerError::Unbalanced {
            debit: total_debit,
            credit: total_credit,
        });
    }

    Ok(totals)
}
