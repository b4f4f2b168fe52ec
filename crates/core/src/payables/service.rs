//! Bill lifecycle rules.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tally_shared::types::{AccountId, SupplierId};

use super::error::BillError;
use super::types::{BillDisplayStatus, BillStatus, NewBill};
use crate::ledger::JournalLineInput;
use crate::settlement::{self, Progress};

/// Stateless bill lifecycle service.
pub struct BillService;

impl BillService {
    /// Validate a new bill.
    ///
    /// # Errors
    ///
    /// Returns `Terms` or `SupplierNotFound`.
    pub fn validate_new<S>(input: &NewBill, supplier_exists: S) -> Result<(), BillError>
    where
        S: Fn(SupplierId) -> bool,
    {
        settlement::check_terms(input.total_amount, input.date, input.due_date)?;
        if !supplier_exists(input.supplier_id) {
            return Err(BillError::SupplierNotFound(input.supplier_id.into_inner()));
        }
        Ok(())
    }

    /// Validate that a bill can be approved.
    ///
    /// # Errors
    ///
    /// Returns `NotDraft` for any status other than DRAFT.
    pub fn validate_can_approve(status: BillStatus) -> Result<(), BillError> {
        if status != BillStatus::Draft {
            return Err(BillError::NotDraft {
                status: status.as_str(),
            });
        }
        Ok(())
    }

    /// Validate that a bill can be cancelled.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyCancelled` or `HasPayments`.
    pub fn validate_can_cancel(status: BillStatus, amount_paid: Decimal) -> Result<(), BillError> {
        if status == BillStatus::Cancelled {
            return Err(BillError::AlreadyCancelled);
        }
        if amount_paid > Decimal::ZERO {
            return Err(BillError::HasPayments { amount_paid });
        }
        Ok(())
    }

    /// Recompute the persisted status after a payment mutation.
    #[must_use]
    pub fn recompute_status(
        current: BillStatus,
        total_amount: Decimal,
        amount_paid: Decimal,
    ) -> BillStatus {
        if !current.is_posted() {
            return current;
        }
        match settlement::progress(total_amount, amount_paid) {
            Progress::Unpaid => BillStatus::Open,
            Progress::Partial => BillStatus::PartiallyPaid,
            Progress::Settled => BillStatus::Paid,
        }
    }

    /// Status as shown on read, with OVERDUE derived against `today`.
    #[must_use]
    pub fn display_status(
        status: BillStatus,
        amount_due: Decimal,
        due_date: NaiveDate,
        today: NaiveDate,
    ) -> BillDisplayStatus {
        if status != BillStatus::Draft && settlement::is_overdue(status, amount_due, due_date, today)
        {
            BillDisplayStatus::Overdue
        } else {
            status.into()
        }
    }

    /// Lines posted on approval: Debit Purchases, Credit A/P.
    #[must_use]
    pub fn approval_lines(
        purchases: AccountId,
        payable: AccountId,
        total_amount: Decimal,
        bill_number: &str,
    ) -> Vec<JournalLineInput> {
        let memo = format!("Bill {bill_number}");
        vec![
            JournalLineInput::debit(purchases, total_amount, memo.clone()),
            JournalLineInput::credit(payable, total_amount, memo),
        ]
    }

    /// Auto-generated bill number.
    #[must_use]
    pub fn next_number(sequence: i64) -> String {
        format!("BILL-{sequence:06}")
    }
}
