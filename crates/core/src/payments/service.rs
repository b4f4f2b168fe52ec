//! Payment application rules.

use rust_decimal::Decimal;
use tally_shared::types::AccountId;
use uuid::Uuid;

use super::error::PaymentError;
use super::types::{CreditMemoStatus, PaymentIntent};
use crate::ledger::JournalLineInput;
use crate::settlement::Settleable;

/// Stateless payment application service.
pub struct PaymentService;

impl PaymentService {
    /// Validate applying `amount` to a document.
    ///
    /// The caller must hold the document's row lock while calling this and
    /// writing the result, otherwise two concurrent payments can both pass.
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` if `amount <= 0`
    /// - `DocumentNotOpen` if the status does not accept settlements
    /// - `Overpayment` if `amount > amount_due`
    pub fn validate_application<S: Settleable>(
        amount: Decimal,
        amount_due: Decimal,
        status: S,
    ) -> Result<(), PaymentError> {
        if amount <= Decimal::ZERO {
            return Err(PaymentError::InvalidAmount(amount));
        }
        if !status.accepts_settlement() {
            return Err(PaymentError::DocumentNotOpen {
                status: status.as_str(),
            });
        }
        if amount > amount_due {
            return Err(PaymentError::Overpayment { amount, amount_due });
        }
        Ok(())
    }

    /// New `amount_paid` after removing a settlement.
    ///
    /// Never goes below zero.
    #[must_use]
    pub fn unapply(amount_paid: Decimal, amount: Decimal) -> Decimal {
        (amount_paid - amount).max(Decimal::ZERO)
    }

    /// Customer receipt: Debit Bank/Cash, Credit A/R.
    #[must_use]
    pub fn receipt_lines(
        cash: AccountId,
        receivable: AccountId,
        amount: Decimal,
        memo: &str,
    ) -> Vec<JournalLineInput> {
        vec![
            JournalLineInput::debit(cash, amount, memo),
            JournalLineInput::credit(receivable, amount, memo),
        ]
    }

    /// Supplier payment: Debit A/P, Credit Bank/Cash.
    #[must_use]
    pub fn disbursement_lines(
        payable: AccountId,
        cash: AccountId,
        amount: Decimal,
        memo: &str,
    ) -> Vec<JournalLineInput> {
        vec![
            JournalLineInput::debit(payable, amount, memo),
            JournalLineInput::credit(cash, amount, memo),
        ]
    }

    /// Credit memo: Debit Sales Income, Credit A/R.
    #[must_use]
    pub fn credit_memo_lines(
        income: AccountId,
        receivable: AccountId,
        amount: Decimal,
        memo: &str,
    ) -> Vec<JournalLineInput> {
        vec![
            JournalLineInput::debit(income, amount, memo),
            JournalLineInput::credit(receivable, amount, memo),
        ]
    }

    /// Validate that a credit memo can be voided.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyVoid` if it was voided before.
    pub fn validate_can_void(id: Uuid, status: CreditMemoStatus) -> Result<(), PaymentError> {
        if status == CreditMemoStatus::Void {
            return Err(PaymentError::AlreadyVoid(id));
        }
        Ok(())
    }

    /// Check that a replayed request matches the payment stored under its key.
    ///
    /// # Errors
    ///
    /// Returns `IdempotencyKeyReused` when document, amount or method differ.
    pub fn validate_replay(
        key: &str,
        stored: PaymentIntent,
        requested: PaymentIntent,
    ) -> Result<(), PaymentError> {
        if stored != requested {
            return Err(PaymentError::IdempotencyKeyReused(key.to_string()));
        }
        Ok(())
    }

    /// Auto-generated credit memo number.
    #[must_use]
    pub fn next_memo_number(sequence: i64) -> String {
        format!("CM-{sequence:06}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    use crate::invoicing::{InvoiceService, InvoiceStatus};
    use crate::ledger::validate_lines;
    use crate::payments::PaymentMethod;
    use crate::payables::BillStatus;
    use crate::settlement::amount_due;

    #[test]
    fn test_validate_application_ok() {
        assert!(
            PaymentService::validate_application(dec!(400), dec!(1000), InvoiceStatus::Sent).is_ok()
        );
        assert!(
            PaymentService::validate_application(dec!(600), dec!(600), InvoiceStatus::PartiallyPaid)
                .is_ok()
        );
    }

    #[test]
    fn test_validate_application_invalid_amount() {
        assert!(matches!(
            PaymentService::validate_application(dec!(0), dec!(10), InvoiceStatus::Sent),
            Err(PaymentError::InvalidAmount(_))
        ));
        assert!(matches!(
            PaymentService::validate_application(dec!(-1), dec!(10), InvoiceStatus::Sent),
            Err(PaymentError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_validate_application_not_open() {
        for status in [InvoiceStatus::Draft, InvoiceStatus::Cancelled, InvoiceStatus::Paid] {
            assert!(matches!(
                PaymentService::validate_application(dec!(1), dec!(10), status),
                Err(PaymentError::DocumentNotOpen { .. })
            ));
        }
        assert!(matches!(
            PaymentService::validate_application(dec!(1), dec!(10), BillStatus::Draft),
            Err(PaymentError::DocumentNotOpen { status: "DRAFT" })
        ));
    }

    #[test]
    fn test_validate_application_overpayment_by_one_cent() {
        assert!(matches!(
            PaymentService::validate_application(dec!(600.01), dec!(600.00), InvoiceStatus::Sent),
            Err(PaymentError::Overpayment { .. })
        ));
    }

    /// Payments against one invoice: 400 then 600 settles 1000, anything more fails.
    #[test]
    fn test_payment_sequence_scenario() {
        let total = dec!(1000.00);
        let mut paid = Decimal::ZERO;
        let mut status = InvoiceStatus::Sent;

        for amount in [dec!(400.00), dec!(600.00)] {
            PaymentService::validate_application(amount, amount_due(total, paid), status).unwrap();
            paid += amount;
            status = InvoiceService::recompute_status(status, total, paid);
            if paid == dec!(400.00) {
                assert_eq!(status, InvoiceStatus::PartiallyPaid);
                assert_eq!(amount_due(total, paid), dec!(600.00));
            }
        }

        assert_eq!(status, InvoiceStatus::Paid);
        assert_eq!(amount_due(total, paid), Decimal::ZERO);
        assert!(
            PaymentService::validate_application(dec!(0.01), amount_due(total, paid), status)
                .is_err()
        );
    }

    #[test]
    fn test_unapply_floors_at_zero() {
        assert_eq!(PaymentService::unapply(dec!(1000), dec!(600)), dec!(400));
        assert_eq!(PaymentService::unapply(dec!(10), dec!(20)), dec!(0));
    }

    #[test]
    fn test_posting_lines_balance() {
        let a = AccountId::new();
        let b = AccountId::new();
        for lines in [
            PaymentService::receipt_lines(a, b, dec!(12.34), "Payment"),
            PaymentService::disbursement_lines(a, b, dec!(12.34), "Bill payment"),
            PaymentService::credit_memo_lines(a, b, dec!(12.34), "Credit memo"),
        ] {
            assert!(validate_lines(&lines).is_ok());
            assert_eq!(lines[0].account_id, a);
            assert_eq!(lines[0].debit, dec!(12.34));
        }
    }

    #[test]
    fn test_validate_can_void() {
        let id = Uuid::new_v4();
        assert!(PaymentService::validate_can_void(id, CreditMemoStatus::Applied).is_ok());
        assert!(matches!(
            PaymentService::validate_can_void(id, CreditMemoStatus::Void),
            Err(PaymentError::AlreadyVoid(_))
        ));
    }

    #[test]
    fn test_replay_must_match_stored_payment() {
        let stored = PaymentIntent {
            document_id: Uuid::new_v4(),
            amount: dec!(250.00),
            method: PaymentMethod::Bank,
        };
        // Scale differences are the same amount.
        let same = PaymentIntent {
            amount: dec!(250),
            ..stored
        };
        assert!(PaymentService::validate_replay("k-1", stored, same).is_ok());

        for requested in [
            PaymentIntent {
                document_id: Uuid::new_v4(),
                ..stored
            },
            PaymentIntent {
                amount: dec!(25),
                ..stored
            },
            PaymentIntent {
                method: PaymentMethod::Cash,
                ..stored
            },
        ] {
            let err = PaymentService::validate_replay("k-1", stored, requested).unwrap_err();
            assert!(matches!(err, PaymentError::IdempotencyKeyReused(ref key) if key == "k-1"));
            assert_eq!(err.http_status_code(), 409);
        }
    }

    fn arb_amount() -> impl Strategy<Value = Decimal> {
        (1i64..200_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Whatever sequence of payments is attempted, accepted ones never
        /// push amount_paid past the total, and amount_due never goes negative.
        #[test]
        fn prop_amount_due_never_negative(
            total in arb_amount(),
            attempts in prop::collection::vec(arb_amount(), 1..20),
        ) {
            let mut paid = Decimal::ZERO;
            let mut status = InvoiceStatus::Sent;

            for amount in attempts {
                let before = paid;
                match PaymentService::validate_application(amount, amount_due(total, paid), status) {
                    Ok(()) => {
                        paid += amount;
                        status = InvoiceService::recompute_status(status, total, paid);
                    }
                    Err(_) => {
                        prop_assert_eq!(paid, before);
                    }
                }
                prop_assert!(amount_due(total, paid) >= Decimal::ZERO);
            }

            prop_assert_eq!(status == InvoiceStatus::Paid, paid == total);
        }
    }
}
