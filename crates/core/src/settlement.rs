//! Settlement rules shared by receivables (invoices) and payables (bills).
//!
//! Both documents carry a total, an amount settled so far and a due date. The
//! amount due, the paid/partial split and the derived overdue flag are the same
//! arithmetic on either side of the ledger.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Invalid document terms.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TermsViolation {
    /// Total must be strictly positive.
    #[error("Total amount must be greater than zero, got {0}")]
    NonPositiveTotal(Decimal),

    /// Due date precedes the document date.
    #[error("Due date {due_date} is before document date {date}")]
    DueBeforeDate {
        /// Document date.
        date: NaiveDate,
        /// Due date.
        due_date: NaiveDate,
    },
}

/// How much of a document has been settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Nothing settled.
    Unpaid,
    /// Some but not all settled.
    Partial,
    /// Fully settled.
    Settled,
}

/// A document status that can receive payments or credits.
pub trait Settleable: Copy {
    /// True while the document is posted and not yet closed.
    fn accepts_settlement(self) -> bool;

    /// True once the document can no longer become overdue.
    fn is_closed(self) -> bool;

    /// Wire name of the status, for error messages.
    fn as_str(self) -> &'static str;
}

/// Validates a document's total and dates.
///
/// # Errors
///
/// Returns the first violated rule.
pub fn check_terms(
    total_amount: Decimal,
    date: NaiveDate,
    due_date: NaiveDate,
) -> Result<(), TermsViolation> {
    if total_amount <= Decimal::ZERO {
        return Err(TermsViolation::NonPositiveTotal(total_amount));
    }
    if due_date < date {
        return Err(TermsViolation::DueBeforeDate { date, due_date });
    }
    Ok(())
}

/// `total_amount - amount_paid`.
#[must_use]
pub fn amount_due(total_amount: Decimal, amount_paid: Decimal) -> Decimal {
    total_amount - amount_paid
}

/// Classifies how far settlement has progressed.
#[must_use]
pub fn progress(total_amount: Decimal, amount_paid: Decimal) -> Progress {
    if amount_paid <= Decimal::ZERO {
        Progress::Unpaid
    } else if amount_paid >= total_amount {
        Progress::Settled
    } else {
        Progress::Partial
    }
}

/// Days between the due date and `today`. Zero or negative means not yet late.
#[must_use]
pub fn days_past_due(due_date: NaiveDate, today: NaiveDate) -> i64 {
    (today - due_date).num_days()
}

/// Derived overdue flag: something still owed, past due, and not closed.
#[must_use]
pub fn is_overdue<S: Settleable>(
    status: S,
    amount_due: Decimal,
    due_date: NaiveDate,
    today: NaiveDate,
) -> bool {
    !status.is_closed() && amount_due > Decimal::ZERO && due_date < today
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[derive(Clone, Copy)]
    struct Open(bool);

    impl Settleable for Open {
        fn accepts_settlement(self) -> bool {
            self.0
        }
        fn is_closed(self) -> bool {
            !self.0
        }
        fn as_str(self) -> &'static str {
            if self.0 { "OPEN" } else { "CLOSED" }
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_check_terms() {
        let d = date(2026, 3, 1);
        assert!(check_terms(dec!(10), d, d).is_ok());
        assert_eq!(
            check_terms(dec!(0), d, d),
            Err(TermsViolation::NonPositiveTotal(dec!(0)))
        );
        assert!(matches!(
            check_terms(dec!(10), d, date(2026, 2, 28)),
            Err(TermsViolation::DueBeforeDate { .. })
        ));
    }

    #[test]
    fn test_progress() {
        assert_eq!(progress(dec!(1000), dec!(0)), Progress::Unpaid);
        assert_eq!(progress(dec!(1000), dec!(400)), Progress::Partial);
        assert_eq!(progress(dec!(1000), dec!(1000)), Progress::Settled);
    }

    #[test]
    fn test_overdue_boundaries() {
        let today = date(2026, 5, 10);
        assert!(is_overdue(Open(true), dec!(1), date(2026, 5, 9), today));
        assert!(!is_overdue(Open(true), dec!(1), today, today));
        assert!(!is_overdue(Open(true), dec!(0), date(2026, 1, 1), today));
        assert!(!is_overdue(Open(false), dec!(1), date(2026, 1, 1), today));
    }

    #[test]
    fn test_days_past_due() {
        let today = date(2026, 5, 10);
        assert_eq!(days_past_due(date(2026, 5, 9), today), 1);
        assert_eq!(days_past_due(today, today), 0);
        assert_eq!(days_past_due(date(2026, 5, 20), today), -10);
    }
}
