//! Invoice lifecycle rules.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tally_shared::types::{AccountId, CustomerId};

use super::error::InvoiceError;
use super::types::{DisplayStatus, InvoiceStatus, NewInvoice};
use crate::ledger::JournalLineInput;
use crate::settlement::{self, Progress};

/// Stateless invoice lifecycle service.
pub struct InvoiceService;

impl InvoiceService {
    /// Validate a new invoice.
    ///
    /// # Errors
    ///
    /// Returns `Terms` for a non-positive total or a due date before the
    /// invoice date, `CustomerNotFound` if the customer is unknown.
    pub fn validate_new<C>(input: &NewInvoice, customer_exists: C) -> Result<(), InvoiceError>
    where
        C: Fn(CustomerId) -> bool,
    {
        settlement::check_terms(input.total_amount, input.date, input.due_date)?;
        if !customer_exists(input.customer_id) {
            return Err(InvoiceError::CustomerNotFound(input.customer_id.into_inner()));
        }
        Ok(())
    }

    /// Validate that an invoice can be sent.
    ///
    /// # Errors
    ///
    /// Returns `NotDraft` for any status other than DRAFT.
    pub fn validate_can_send(status: InvoiceStatus) -> Result<(), InvoiceError> {
        if status != InvoiceStatus::Draft {
            return Err(InvoiceError::NotDraft {
                status: status.as_str(),
            });
        }
        Ok(())
    }

    /// Validate that an invoice can be cancelled.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyCancelled` or `HasPayments`.
    pub fn validate_can_cancel(
        status: InvoiceStatus,
        amount_paid: Decimal,
    ) -> Result<(), InvoiceError> {
        if status == InvoiceStatus::Cancelled {
            return Err(InvoiceError::AlreadyCancelled);
        }
        if amount_paid > Decimal::ZERO {
            return Err(InvoiceError::HasPayments { amount_paid });
        }
        Ok(())
    }

    /// Recompute the persisted status after a payment mutation.
    ///
    /// DRAFT and CANCELLED are left alone. Posted invoices move between SENT,
    /// PARTIALLY_PAID and PAID purely on `amount_paid` versus `total_amount`,
    /// so deleting a payment re-opens a PAID invoice.
    #[must_use]
    pub fn recompute_status(
        current: InvoiceStatus,
        total_amount: Decimal,
        amount_paid: Decimal,
    ) -> InvoiceStatus {
        if !current.is_posted() {
            return current;
        }
        match settlement::progress(total_amount, amount_paid) {
            Progress::Unpaid => InvoiceStatus::Sent,
            Progress::Partial => InvoiceStatus::PartiallyPaid,
            Progress::Settled => InvoiceStatus::Paid,
        }
    }

    /// Status as shown on read, with OVERDUE derived against `today`.
    #[must_use]
    pub fn display_status(
        status: InvoiceStatus,
        amount_due: Decimal,
        due_date: NaiveDate,
        today: NaiveDate,
    ) -> DisplayStatus {
        // DRAFT is never receivable, so it never shows as overdue.
        if status != InvoiceStatus::Draft
            && settlement::is_overdue(status, amount_due, due_date, today)
        {
            DisplayStatus::Overdue
        } else {
            status.into()
        }
    }

    /// Lines posted when an invoice leaves DRAFT: Debit A/R, Credit Sales Income.
    #[must_use]
    pub fn issue_lines(
        receivable: AccountId,
        income: AccountId,
        total_amount: Decimal,
        invoice_number: &str,
    ) -> Vec<JournalLineInput> {
        let memo = format!("Invoice {invoice_number}");
        vec![
            JournalLineInput::debit(receivable, total_amount, memo.clone()),
            JournalLineInput::credit(income, total_amount, memo),
        ]
    }

    /// Auto-generated invoice number from a per-tenant sequence value.
    #[must_use]
    pub fn next_number(sequence: i64) -> String {
        format!("INV-{sequence:06}")
    }

    /// Invoice number for an invoice generated by confirming an order.
    #[must_use]
    pub fn number_for_order(order_number: &str) -> String {
        format!("INV-{order_number}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    use crate::ledger::validate_lines;
    use crate::settlement::TermsViolation;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn new_invoice(total: Decimal, due_date: NaiveDate) -> NewInvoice {
        NewInvoice {
            customer_id: CustomerId::new(),
            date: date(2026, 3, 1),
            due_date,
            total_amount: total,
            sales_order_id: None,
        }
    }

    #[test]
    fn test_validate_new_ok() {
        let input = new_invoice(dec!(1000.00), date(2026, 3, 31));
        assert!(InvoiceService::validate_new(&input, |_| true).is_ok());
    }

    #[rstest]
    #[case(dec!(0))]
    #[case(dec!(-10))]
    fn test_validate_new_rejects_non_positive_total(#[case] total: Decimal) {
        let input = new_invoice(total, date(2026, 3, 31));
        let err = InvoiceService::validate_new(&input, |_| true).unwrap_err();
        assert!(matches!(err, InvoiceError::Terms(TermsViolation::NonPositiveTotal(_))));
        assert_eq!(err.http_status_code(), 400);
    }

    #[test]
    fn test_validate_new_rejects_due_before_date() {
        let input = new_invoice(dec!(10), date(2026, 2, 28));
        assert!(matches!(
            InvoiceService::validate_new(&input, |_| true),
            Err(InvoiceError::Terms(TermsViolation::DueBeforeDate { .. }))
        ));
    }

    #[test]
    fn test_validate_new_rejects_unknown_customer() {
        let input = new_invoice(dec!(10), date(2026, 3, 31));
        let err = InvoiceService::validate_new(&input, |_| false).unwrap_err();
        assert!(matches!(err, InvoiceError::CustomerNotFound(_)));
        assert_eq!(err.http_status_code(), 400);
    }

    #[rstest]
    #[case(InvoiceStatus::Sent)]
    #[case(InvoiceStatus::PartiallyPaid)]
    #[case(InvoiceStatus::Paid)]
    #[case(InvoiceStatus::Cancelled)]
    fn test_only_draft_can_be_sent(#[case] status: InvoiceStatus) {
        assert!(InvoiceService::validate_can_send(InvoiceStatus::Draft).is_ok());
        assert!(matches!(
            InvoiceService::validate_can_send(status),
            Err(InvoiceError::NotDraft { .. })
        ));
    }

    #[test]
    fn test_cancel_rules() {
        assert!(InvoiceService::validate_can_cancel(InvoiceStatus::Sent, dec!(0)).is_ok());
        assert!(InvoiceService::validate_can_cancel(InvoiceStatus::Draft, dec!(0)).is_ok());
        assert!(matches!(
            InvoiceService::validate_can_cancel(InvoiceStatus::PartiallyPaid, dec!(1)),
            Err(InvoiceError::HasPayments { .. })
        ));
        assert!(matches!(
            InvoiceService::validate_can_cancel(InvoiceStatus::Cancelled, dec!(0)),
            Err(InvoiceError::AlreadyCancelled)
        ));
    }

    #[rstest]
    #[case(InvoiceStatus::Sent, dec!(0), InvoiceStatus::Sent)]
    #[case(InvoiceStatus::Sent, dec!(400), InvoiceStatus::PartiallyPaid)]
    #[case(InvoiceStatus::PartiallyPaid, dec!(1000), InvoiceStatus::Paid)]
    #[case(InvoiceStatus::Paid, dec!(400), InvoiceStatus::PartiallyPaid)]
    #[case(InvoiceStatus::Paid, dec!(0), InvoiceStatus::Sent)]
    #[case(InvoiceStatus::Draft, dec!(0), InvoiceStatus::Draft)]
    #[case(InvoiceStatus::Cancelled, dec!(0), InvoiceStatus::Cancelled)]
    fn test_recompute_status(
        #[case] current: InvoiceStatus,
        #[case] paid: Decimal,
        #[case] expected: InvoiceStatus,
    ) {
        assert_eq!(
            InvoiceService::recompute_status(current, dec!(1000), paid),
            expected
        );
    }

    #[test]
    fn test_display_status_overdue() {
        let today = date(2026, 6, 1);
        let yesterday = date(2026, 5, 31);
        assert_eq!(
            InvoiceService::display_status(InvoiceStatus::Sent, dec!(10), yesterday, today),
            DisplayStatus::Overdue
        );
        assert_eq!(
            InvoiceService::display_status(InvoiceStatus::PartiallyPaid, dec!(10), today, today),
            DisplayStatus::PartiallyPaid
        );
        assert_eq!(
            InvoiceService::display_status(InvoiceStatus::Paid, dec!(0), yesterday, today),
            DisplayStatus::Paid
        );
        assert_eq!(
            InvoiceService::display_status(InvoiceStatus::Draft, dec!(10), yesterday, today),
            DisplayStatus::Draft
        );
        assert_eq!(
            InvoiceService::display_status(InvoiceStatus::Cancelled, dec!(10), yesterday, today),
            DisplayStatus::Cancelled
        );
    }

    #[test]
    fn test_issue_lines_balance() {
        let lines =
            InvoiceService::issue_lines(AccountId::new(), AccountId::new(), dec!(1000.00), "INV-000001");
        let totals = validate_lines(&lines).unwrap();
        assert_eq!(totals.debit, dec!(1000.00));
        assert_eq!(lines[0].debit, dec!(1000.00));
        assert_eq!(lines[1].credit, dec!(1000.00));
        assert_eq!(lines[0].memo.as_deref(), Some("Invoice INV-000001"));
    }

    #[test]
    fn test_invoice_numbers() {
        assert_eq!(InvoiceService::next_number(42), "INV-000042");
        assert_eq!(InvoiceService::number_for_order("SO-1001"), "INV-SO-1001");
    }
}
