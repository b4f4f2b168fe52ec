//! Property-based tests for ReversalService.
//!
//! A reversal must net every account the original touched back to zero and
//! must itself pass posting validation.

use proptest::prelude::*;
use rust_decimal::Decimal;
use tally_shared::types::AccountId;
use uuid::Uuid;

use super::reversal::{OriginalLine, ReversalService};
use super::types::AccountType;
use super::validation::validate_lines;

/// Strategy for generating random account IDs.
fn arb_account_id() -> impl Strategy<Value = AccountId> {
    any::<u128>().prop_map(|n| AccountId::from_uuid(Uuid::from_u128(n)))
}

/// Strategy for generating random positive Decimal amounts.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

fn arb_account_type() -> impl Strategy<Value = AccountType> {
    (0usize..AccountType::ALL.len()).prop_map(|i| AccountType::ALL[i])
}

/// Strategy for a balanced entry: one debit split across up to three credits.
fn arb_balanced_lines() -> impl Strategy<Value = Vec<OriginalLine>> {
    (
        arb_account_id(),
        prop::collection::vec((arb_account_id(), arb_amount()), 1..=3),
        prop::option::of("[a-zA-Z ]{0,20}"),
    )
        .prop_map(|(debit_account, credits, memo)| {
            let total: Decimal = credits.iter().map(|(_, amount)| *amount).sum();
            let mut lines = vec![OriginalLine {
                account_id: debit_account,
                debit: total,
                credit: Decimal::ZERO,
                memo: memo.clone(),
            }];
            lines.extend(credits.into_iter().map(|(account_id, amount)| OriginalLine {
                account_id,
                debit: Decimal::ZERO,
                credit: amount,
                memo: memo.clone(),
            }));
            lines
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Reversing lines swap sides and keep account and amount.
    #[test]
    fn prop_reversing_lines_swap_sides(lines in arb_balanced_lines()) {
        let reversed = ReversalService::create_reversing_lines(&lines);

        prop_assert_eq!(reversed.len(), lines.len());
        for (original, reversing) in lines.iter().zip(reversed.iter()) {
            prop_assert_eq!(original.account_id, reversing.account_id);
            prop_assert_eq!(original.debit, reversing.credit);
            prop_assert_eq!(original.credit, reversing.debit);
        }
    }

    /// Balanced originals produce reversals that pass posting validation.
    #[test]
    fn prop_reversal_is_postable(lines in arb_balanced_lines()) {
        prop_assert!(ReversalService::validate_reversal(&lines));

        let reversed = ReversalService::create_reversing_lines(&lines);
        let totals = validate_lines(&reversed);
        prop_assert!(totals.is_ok());
    }

    /// Original plus reversal leaves every account where it started.
    #[test]
    fn prop_reversal_nets_balances_to_zero(
        lines in arb_balanced_lines(),
        account_type in arb_account_type(),
    ) {
        let normal = account_type.normal_balance();
        let reversed = ReversalService::create_reversing_lines(&lines);

        for (original, reversing) in lines.iter().zip(reversed.iter()) {
            let net = normal.calculate_balance_change(original.debit, original.credit)
                + normal.calculate_balance_change(reversing.debit, reversing.credit);
            prop_assert_eq!(net, Decimal::ZERO);
        }
    }

    /// Memo is prefixed with "Reversal: ".
    #[test]
    fn prop_memo_prefixed_with_reversal(lines in arb_balanced_lines()) {
        let reversed = ReversalService::create_reversing_lines(&lines);
        for line in &reversed {
            let memo = line.memo.as_deref().unwrap_or_default();
            prop_assert!(memo.starts_with("Reversal: "));
        }
    }
}
