//! Ledger service for entry validation and balance resolution.
//!
//! Pure business logic: the caller supplies account lookups as closures so the
//! same rules run against a database transaction or an in-memory fixture.

use rust_decimal::Decimal;
use tally_shared::types::AccountId;
use uuid::Uuid;

use super::error::LedgerError;
use super::types::{AccountType, EntryTotals, JournalLineInput, PostEntryInput};
use super::validation::validate_lines;

/// Information about an account needed for posting.
#[derive(Debug, Clone)]
pub struct AccountInfo {
    /// The account ID.
    pub id: AccountId,
    /// Detailed account type.
    pub account_type: AccountType,
    /// Whether the account is active.
    pub is_active: bool,
}

/// A validated line with its effect on the account balance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLine {
    /// The account to post to.
    pub account_id: AccountId,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Line memo.
    pub memo: Option<String>,
    /// Signed change to the account's stored balance.
    pub balance_change: Decimal,
}

/// What happens when an account is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountRemoval {
    /// No postings reference the account; remove the row.
    Delete,
    /// Postings exist; keep history and mark inactive.
    Deactivate,
}

/// Ledger service for entry validation.
pub struct LedgerService;

impl LedgerService {
    /// Validate an entry before posting and resolve each line's balance change.
    ///
    /// 1. Validates the memo
    /// 2. Validates line shape and balance (exact equality)
    /// 3. Validates every account exists, belongs to the tenant and is active
    /// 4. Resolves the signed balance change per line
    ///
    /// Imbalances in engine-generated entries are reported as consistency errors.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError` if validation fails.
    pub fn validate_entry<A>(
        input: &PostEntryInput,
        account_lookup: A,
    ) -> Result<(Vec<ResolvedLine>, EntryTotals), LedgerError>
    where
        A: Fn(AccountId) -> Result<AccountInfo, LedgerError>,
    {
        // 1. Memo
        if input.memo.trim().is_empty() {
            return Err(LedgerError::MissingMemo);
        }

        // 2. Shape and balance
        let totals =
            validate_lines(&input.lines).map_err(|err| err.for_source(input.source))?;

        // 3-4. Accounts and balance changes
        let mut resolved = Vec::with_capacity(input.lines.len());
        for line in &input.lines {
            let account = account_lookup(line.account_id)?;
            if !account.is_active {
                return Err(LedgerError::AccountInactive(line.account_id.into_inner()));
            }
            resolved.push(Self::resolve_line(line, account.account_type));
        }

        Ok((resolved, totals))
    }

    fn resolve_line(line: &JournalLineInput, account_type: AccountType) -> ResolvedLine {
        ResolvedLine {
            account_id: line.account_id,
            debit: line.debit,
            credit: line.credit,
            memo: line.memo.clone(),
            balance_change: account_type
                .normal_balance()
                .calculate_balance_change(line.debit, line.credit),
        }
    }

    /// Calculate entry totals from resolved lines.
    #[must_use]
    pub fn calculate_totals(lines: &[ResolvedLine]) -> EntryTotals {
        let debit: Decimal = lines.iter().map(|l| l.debit).sum();
        let credit: Decimal = lines.iter().map(|l| l.credit).sum();
        EntryTotals::new(debit, credit)
    }

    /// Sums balance changes per account, in ascending account order.
    ///
    /// Accounts are locked in this order so concurrent postings touching the
    /// same accounts cannot deadlock.
    #[must_use]
    pub fn balance_deltas(lines: &[ResolvedLine]) -> Vec<(AccountId, Decimal)> {
        let mut deltas: Vec<(AccountId, Decimal)> = Vec::new();
        for line in lines {
            match deltas.iter_mut().find(|(id, _)| *id == line.account_id) {
                Some((_, delta)) => *delta += line.balance_change,
                None => deltas.push((line.account_id, line.balance_change)),
            }
        }
        deltas.sort_by_key(|(id, _)| *id);
        deltas
    }

    /// Validate that `parent` may be the parent of an account of `child`'s type.
    ///
    /// # Errors
    ///
    /// Returns `ParentCategoryMismatch` if categories differ.
    pub fn validate_parent(
        child: AccountType,
        parent_id: Uuid,
        parent: AccountType,
    ) -> Result<(), LedgerError> {
        if child.category() != parent.category() {
            return Err(LedgerError::ParentCategoryMismatch { parent_id });
        }
        Ok(())
    }

    /// Decide how an account deletion is carried out.
    ///
    /// # Errors
    ///
    /// Returns `SystemAccountProtected` for system accounts.
    pub fn plan_removal(
        account_id: Uuid,
        is_system: bool,
        has_postings: bool,
    ) -> Result<AccountRemoval, LedgerError> {
        if is_system {
            return Err(LedgerError::SystemAccountProtected(account_id));
        }
        Ok(if has_postings {
            AccountRemoval::Deactivate
        } else {
            AccountRemoval::Delete
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use tally_shared::types::TenantId;

    use crate::ledger::types::EntrySource;

    fn chart(accounts: &[(AccountId, AccountType, bool)]) -> HashMap<AccountId, AccountInfo> {
        accounts
            .iter()
            .map(|(id, account_type, is_active)| {
                (
                    *id,
                    AccountInfo {
                        id: *id,
                        account_type: *account_type,
                        is_active: *is_active,
                    },
                )
            })
            .collect()
    }

    fn make_input(source: EntrySource, lines: Vec<JournalLineInput>) -> PostEntryInput {
        PostEntryInput {
            tenant_id: TenantId::new(),
            date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            memo: "Test entry".to_string(),
            is_adjusting: false,
            source,
            lines,
        }
    }

    #[test]
    fn test_validate_entry_resolves_balance_changes() {
        let cash = AccountId::new();
        let income = AccountId::new();
        let accounts = chart(&[
            (cash, AccountType::Bank, true),
            (income, AccountType::Income, true),
        ]);
        let input = make_input(
            EntrySource::Manual,
            vec![
                JournalLineInput::debit(cash, dec!(250.00), "cash sale"),
                JournalLineInput::credit(income, dec!(250.00), "cash sale"),
            ],
        );

        let (lines, totals) = LedgerService::validate_entry(&input, |id| {
            accounts.get(&id).cloned().ok_or(LedgerError::AccountNotFound(id.into_inner()))
        })
        .unwrap();

        assert!(totals.is_balanced);
        // Both accounts grow on their normal side
        assert_eq!(lines[0].balance_change, dec!(250.00));
        assert_eq!(lines[1].balance_change, dec!(250.00));
        assert_eq!(LedgerService::calculate_totals(&lines), totals);
    }

    #[test]
    fn test_validate_entry_missing_account() {
        let input = make_input(
            EntrySource::Manual,
            vec![
                JournalLineInput::debit(AccountId::new(), dec!(1), "a"),
                JournalLineInput::credit(AccountId::new(), dec!(1), "b"),
            ],
        );
        let result = LedgerService::validate_entry(&input, |id| {
            Err(LedgerError::AccountNotFound(id.into_inner()))
        });
        assert!(matches!(result, Err(LedgerError::AccountNotFound(_))));
    }

    #[test]
    fn test_validate_entry_inactive_account() {
        let cash = AccountId::new();
        let old = AccountId::new();
        let accounts = chart(&[(cash, AccountType::Bank, true), (old, AccountType::Income, false)]);
        let input = make_input(
            EntrySource::Manual,
            vec![
                JournalLineInput::debit(cash, dec!(1), "a"),
                JournalLineInput::credit(old, dec!(1), "b"),
            ],
        );
        let result = LedgerService::validate_entry(&input, |id| {
            accounts.get(&id).cloned().ok_or(LedgerError::AccountNotFound(id.into_inner()))
        });
        assert!(matches!(result, Err(LedgerError::AccountInactive(_))));
    }

    #[test]
    fn test_generated_imbalance_is_flagged() {
        let input = make_input(
            EntrySource::Invoice,
            vec![
                JournalLineInput::debit(AccountId::new(), dec!(100), "a"),
                JournalLineInput::credit(AccountId::new(), dec!(90), "b"),
            ],
        );
        let result = LedgerService::validate_entry(&input, |_| unreachable!());
        assert!(matches!(result, Err(LedgerError::GeneratedUnbalanced { .. })));
    }

    #[test]
    fn test_blank_memo_rejected() {
        let mut input = make_input(EntrySource::Manual, vec![]);
        input.memo = "   ".to_string();
        assert!(matches!(
            LedgerService::validate_entry(&input, |_| unreachable!()),
            Err(LedgerError::MissingMemo)
        ));
    }

    #[test]
    fn test_balance_deltas_merge_and_sort() {
        let a = AccountId::new();
        let b = AccountId::new();
        let line = |account_id, change| ResolvedLine {
            account_id,
            debit: Decimal::ZERO,
            credit: Decimal::ZERO,
            memo: None,
            balance_change: change,
        };
        let deltas =
            LedgerService::balance_deltas(&[line(b, dec!(5)), line(a, dec!(3)), line(b, dec!(-2))]);

        assert_eq!(deltas.len(), 2);
        assert!(deltas[0].0 < deltas[1].0);
        let b_delta = deltas.iter().find(|(id, _)| *id == b).unwrap().1;
        assert_eq!(b_delta, dec!(3));
    }

    #[test]
    fn test_validate_parent() {
        let parent = Uuid::new_v4();
        assert!(LedgerService::validate_parent(AccountType::Bank, parent, AccountType::OtherAsset).is_ok());
        assert!(matches!(
            LedgerService::validate_parent(AccountType::Bank, parent, AccountType::Expense),
            Err(LedgerError::ParentCategoryMismatch { .. })
        ));
    }

    #[test]
    fn test_plan_removal() {
        let id = Uuid::new_v4();
        assert!(matches!(
            LedgerService::plan_removal(id, true, false),
            Err(LedgerError::SystemAccountProtected(_))
        ));
        assert_eq!(
            LedgerService::plan_removal(id, false, true).unwrap(),
            AccountRemoval::Deactivate
        );
        assert_eq!(
            LedgerService::plan_removal(id, false, false).unwrap(),
            AccountRemoval::Delete
        );
    }
}
