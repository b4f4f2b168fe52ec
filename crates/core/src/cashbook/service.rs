//! Sales receipt and check rules.

use rust_decimal::Decimal;
use tally_shared::types::AccountId;
use uuid::Uuid;

use super::error::CashbookError;
use super::types::{CashDocumentStatus, CheckAccounts};
use crate::ledger::{AccountType, JournalLineInput};

/// Stateless cash transaction service.
pub struct CashbookService;

impl CashbookService {
    /// Validate a receipt or check amount.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount` if `amount <= 0`.
    pub fn validate_amount(amount: Decimal) -> Result<(), CashbookError> {
        if amount <= Decimal::ZERO {
            return Err(CashbookError::InvalidAmount(amount));
        }
        Ok(())
    }

    /// Name printed on a check: the explicit payee, else the supplier's name.
    ///
    /// # Errors
    ///
    /// Returns `MissingPayee` when neither gives a non-blank name.
    pub fn resolve_payee(
        payee_name: Option<&str>,
        supplier_name: Option<&str>,
    ) -> Result<String, CashbookError> {
        payee_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .or_else(|| supplier_name.map(str::trim).filter(|name| !name.is_empty()))
            .map(ToString::to_string)
            .ok_or(CashbookError::MissingPayee)
    }

    /// Validate the accounts a check moves money between.
    ///
    /// # Errors
    ///
    /// - `NotBankAccount` unless the drawn account is of type BANK
    /// - `NotExpenseAccount` unless the charged account is an expense,
    ///   other expense or cost-of-sales account
    pub fn validate_check_accounts(accounts: &CheckAccounts) -> Result<(), CashbookError> {
        if accounts.bank.account_type != AccountType::Bank {
            return Err(CashbookError::NotBankAccount(accounts.bank.id.into_inner()));
        }
        if !matches!(
            accounts.expense.account_type,
            AccountType::Expense | AccountType::OtherExpense | AccountType::CostOfGoodsSold
        ) {
            return Err(CashbookError::NotExpenseAccount(
                accounts.expense.id.into_inner(),
            ));
        }
        Ok(())
    }

    /// Cash sale: Debit Bank/Cash, Credit Sales Income.
    #[must_use]
    pub fn sales_receipt_lines(
        cash: AccountId,
        income: AccountId,
        amount: Decimal,
        memo: &str,
    ) -> Vec<JournalLineInput> {
        vec![
            JournalLineInput::debit(cash, amount, memo),
            JournalLineInput::credit(income, amount, memo),
        ]
    }

    /// Check: Debit the expense account, Credit the bank account.
    #[must_use]
    pub fn check_lines(accounts: &CheckAccounts, amount: Decimal, memo: &str) -> Vec<JournalLineInput> {
        vec![
            JournalLineInput::debit(accounts.expense.id, amount, memo),
            JournalLineInput::credit(accounts.bank.id, amount, memo),
        ]
    }

    /// Validate that a receipt or check can be voided.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyVoid` if it was voided before.
    pub fn validate_can_void(id: Uuid, status: CashDocumentStatus) -> Result<(), CashbookError> {
        if status == CashDocumentStatus::Void {
            return Err(CashbookError::AlreadyVoid(id));
        }
        Ok(())
    }

    /// Auto-generated sales receipt number.
    #[must_use]
    pub fn next_receipt_number(sequence: i64) -> String {
        format!("SR-{sequence:06}")
    }

    /// Auto-generated check number.
    #[must_use]
    pub fn next_check_number(sequence: i64) -> String {
        format!("CHK-{sequence:06}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    use crate::ledger::{AccountInfo, validate_lines};

    fn account(account_type: AccountType) -> AccountInfo {
        AccountInfo {
            id: AccountId::new(),
            account_type,
            is_active: true,
        }
    }

    fn accounts(bank: AccountType, expense: AccountType) -> CheckAccounts {
        CheckAccounts {
            bank: account(bank),
            expense: account(expense),
        }
    }

    #[test]
    fn test_amount_must_be_positive() {
        assert!(CashbookService::validate_amount(dec!(0.01)).is_ok());
        assert!(matches!(
            CashbookService::validate_amount(dec!(0)),
            Err(CashbookError::InvalidAmount(_))
        ));
        assert!(matches!(
            CashbookService::validate_amount(dec!(-5)),
            Err(CashbookError::InvalidAmount(_))
        ));
    }

    #[rstest]
    #[case(Some("Acme Landlord"), None, Some("Acme Landlord"))]
    #[case(Some("  Acme Landlord "), Some("Widget Wholesale"), Some("Acme Landlord"))]
    #[case(None, Some("Widget Wholesale"), Some("Widget Wholesale"))]
    #[case(Some("   "), Some("Widget Wholesale"), Some("Widget Wholesale"))]
    #[case(None, None, None)]
    #[case(Some(""), Some(" "), None)]
    fn test_resolve_payee(
        #[case] payee: Option<&str>,
        #[case] supplier: Option<&str>,
        #[case] expected: Option<&str>,
    ) {
        let resolved = CashbookService::resolve_payee(payee, supplier).ok();
        assert_eq!(resolved.as_deref(), expected);
    }

    #[rstest]
    #[case(AccountType::Bank, AccountType::Expense, true)]
    #[case(AccountType::Bank, AccountType::OtherExpense, true)]
    #[case(AccountType::Bank, AccountType::CostOfGoodsSold, true)]
    #[case(AccountType::OtherCurrentAsset, AccountType::Expense, false)]
    #[case(AccountType::CreditCard, AccountType::Expense, false)]
    #[case(AccountType::Bank, AccountType::Income, false)]
    #[case(AccountType::Bank, AccountType::Bank, false)]
    fn test_check_account_types(
        #[case] bank: AccountType,
        #[case] expense: AccountType,
        #[case] valid: bool,
    ) {
        let result = CashbookService::validate_check_accounts(&accounts(bank, expense));
        assert_eq!(result.is_ok(), valid);
    }

    #[test]
    fn test_check_drawn_on_non_bank_names_that_account() {
        let pair = accounts(AccountType::OtherCurrentAsset, AccountType::Income);
        let err = CashbookService::validate_check_accounts(&pair).unwrap_err();
        assert!(matches!(err, CashbookError::NotBankAccount(id) if id == pair.bank.id.into_inner()));
    }

    #[test]
    fn test_posting_directions() {
        let cash = AccountId::new();
        let income = AccountId::new();
        let receipt = CashbookService::sales_receipt_lines(cash, income, dec!(45.50), "Sale");
        assert_eq!(receipt[0].account_id, cash);
        assert_eq!(receipt[0].debit, dec!(45.50));
        assert_eq!(receipt[1].account_id, income);
        assert_eq!(receipt[1].credit, dec!(45.50));

        let pair = accounts(AccountType::Bank, AccountType::Expense);
        let check = CashbookService::check_lines(&pair, dec!(800), "Rent");
        assert_eq!(check[0].account_id, pair.expense.id);
        assert_eq!(check[0].debit, dec!(800));
        assert_eq!(check[1].account_id, pair.bank.id);
        assert_eq!(check[1].credit, dec!(800));
    }

    #[test]
    fn test_validate_can_void() {
        let id = Uuid::new_v4();
        assert!(CashbookService::validate_can_void(id, CashDocumentStatus::Posted).is_ok());
        assert!(matches!(
            CashbookService::validate_can_void(id, CashDocumentStatus::Void),
            Err(CashbookError::AlreadyVoid(_))
        ));
    }

    #[test]
    fn test_document_numbers() {
        assert_eq!(CashbookService::next_receipt_number(1), "SR-000001");
        assert_eq!(CashbookService::next_check_number(42), "CHK-000042");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Every positive amount yields a balanced two-line posting.
        #[test]
        fn prop_cash_postings_balance(cents in 1i64..10_000_000i64) {
            let amount = Decimal::new(cents, 2);
            let pair = accounts(AccountType::Bank, AccountType::Expense);
            prop_assert!(validate_lines(&CashbookService::check_lines(&pair, amount, "Check")).is_ok());
            let receipt = CashbookService::sales_receipt_lines(
                AccountId::new(),
                AccountId::new(),
                amount,
                "Sale",
            );
            prop_assert!(validate_lines(&receipt).is_ok());
        }
    }
}
