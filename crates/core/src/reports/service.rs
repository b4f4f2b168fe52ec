//! Report generation service.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use tally_shared::types::AccountId;

use super::error::ReportError;
use super::types::{
    AccountBalance, BalanceSheetReport, GeneralLedgerAccount, GeneralLedgerReport,
    GeneralLedgerRow, MonthlySales, PostedLine, ProfitLossReport, SalesInvoice,
    SalesSummaryReport, StatementLine, StatementSection, TrialBalanceReport, TrialBalanceRow,
};
use crate::ledger::{AccountCategory, RunningBalance};

/// Months shown in the sales summary breakdown.
const SALES_SUMMARY_MONTHS: usize = 12;

/// Service for generating financial reports.
pub struct ReportService;

impl ReportService {
    /// Validate a `from..=to` range before any query runs.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` if `from > to`.
    pub fn validate_date_range(from: NaiveDate, to: NaiveDate) -> Result<(), ReportError> {
        if from > to {
            return Err(ReportError::InvalidDateRange {
                start: from,
                end: to,
            });
        }
        Ok(())
    }

    /// Generates a trial balance from account balances as of a date.
    ///
    /// Each balance goes in its normal column; a negative balance goes, as its
    /// absolute value, in the opposite column. Zero balances are omitted.
    #[must_use]
    pub fn generate_trial_balance(
        as_of: NaiveDate,
        accounts: Vec<AccountBalance>,
    ) -> TrialBalanceReport {
        let rows: Vec<TrialBalanceRow> = accounts
            .into_iter()
            .filter(|a| a.balance != Decimal::ZERO)
            .map(|a| {
                let (debit, credit) = a.account_type.normal_balance().split_columns(a.balance);
                TrialBalanceRow {
                    account_id: a.account_id,
                    account_number: a.account_number,
                    name: a.name,
                    account_type: a.account_type,
                    debit,
                    credit,
                }
            })
            .collect();

        let total_debit: Decimal = rows.iter().map(|r| r.debit).sum();
        let total_credit: Decimal = rows.iter().map(|r| r.credit).sum();

        TrialBalanceReport {
            as_of,
            rows,
            total_debit,
            total_credit,
            is_balanced: total_debit == total_credit,
        }
    }

    /// Generates a profit and loss statement from period activity per account.
    ///
    /// `activity` holds each account's net change over the period, positive
    /// on its normal side. Balance sheet accounts are ignored.
    #[must_use]
    pub fn generate_profit_loss(
        from: NaiveDate,
        to: NaiveDate,
        activity: Vec<AccountBalance>,
    ) -> ProfitLossReport {
        let mut income = StatementSection::default();
        let mut cogs = StatementSection::default();
        let mut expenses = StatementSection::default();

        for account in activity {
            match account.account_type.category() {
                AccountCategory::Income => Self::add_to_section(&mut income, account),
                AccountCategory::CostOfGoodsSold => Self::add_to_section(&mut cogs, account),
                AccountCategory::Expense => Self::add_to_section(&mut expenses, account),
                AccountCategory::Asset | AccountCategory::Liability | AccountCategory::Equity => {}
            }
        }

        let gross_profit = income.total - cogs.total;
        let net_income = gross_profit - expenses.total;

        ProfitLossReport {
            from,
            to,
            income,
            cost_of_goods_sold: cogs,
            gross_profit,
            expenses,
            net_income,
        }
    }

    /// Generates a balance sheet from account balances as of a date.
    ///
    /// No closing entries exist, so income statement accounts are rolled into
    /// a computed "Current Earnings" equity line. That keeps
    /// `assets == liabilities + equity` for any balanced ledger.
    #[must_use]
    pub fn generate_balance_sheet(
        as_of: NaiveDate,
        accounts: Vec<AccountBalance>,
    ) -> BalanceSheetReport {
        let mut assets = StatementSection::default();
        let mut liabilities = StatementSection::default();
        let mut equity = StatementSection::default();
        let mut current_earnings = Decimal::ZERO;

        for account in accounts {
            match account.account_type.category() {
                AccountCategory::Asset => Self::add_to_section(&mut assets, account),
                AccountCategory::Liability => Self::add_to_section(&mut liabilities, account),
                AccountCategory::Equity => Self::add_to_section(&mut equity, account),
                AccountCategory::Income => current_earnings += account.balance,
                AccountCategory::CostOfGoodsSold | AccountCategory::Expense => {
                    current_earnings -= account.balance;
                }
            }
        }

        equity.lines.push(StatementLine {
            account_id: None,
            account_number: None,
            name: "Current Earnings".to_string(),
            amount: current_earnings,
        });
        equity.total += current_earnings;

        let total_assets = assets.total;
        let total_liabilities = liabilities.total;
        let total_equity = equity.total;
        let liabilities_and_equity = total_liabilities + total_equity;

        BalanceSheetReport {
            as_of,
            assets,
            liabilities,
            equity,
            current_earnings,
            total_assets,
            total_liabilities,
            total_equity,
            liabilities_and_equity,
            is_balanced: total_assets == liabilities_and_equity,
        }
    }

    /// Summarises invoiced revenue.
    ///
    /// The caller excludes DRAFT and CANCELLED invoices.
    #[must_use]
    pub fn generate_sales_summary(
        from: NaiveDate,
        to: NaiveDate,
        invoices: &[SalesInvoice],
    ) -> SalesSummaryReport {
        let total_invoiced: Decimal = invoices.iter().map(|i| i.total_amount).sum();
        let total_collected: Decimal = invoices.iter().map(|i| i.amount_paid).sum();
        let invoice_count = invoices.len() as u64;
        let average_invoice = if invoice_count == 0 {
            Decimal::ZERO
        } else {
            (total_invoiced / Decimal::from(invoice_count)).round_dp(2)
        };

        let mut by_month: BTreeMap<(i32, u32), (Decimal, u64)> = BTreeMap::new();
        for invoice in invoices {
            let slot = by_month
                .entry((invoice.date.year(), invoice.date.month()))
                .or_insert((Decimal::ZERO, 0));
            slot.0 += invoice.total_amount;
            slot.1 += 1;
        }
        let monthly = by_month
            .into_iter()
            .rev()
            .take(SALES_SUMMARY_MONTHS)
            .map(|((year, month), (revenue, count))| MonthlySales {
                month: format!("{year:04}-{month:02}"),
                revenue,
                count,
            })
            .collect();

        SalesSummaryReport {
            from,
            to,
            total_invoiced,
            total_collected,
            outstanding: total_invoiced - total_collected,
            invoice_count,
            average_invoice,
            monthly,
        }
    }

    /// Builds the general ledger with a running balance per account.
    ///
    /// `lines` must be in posting order (date, then entry number). `openings`
    /// holds each account's normal-side balance before `from`.
    #[must_use]
    pub fn generate_general_ledger(
        from: NaiveDate,
        to: NaiveDate,
        lines: Vec<PostedLine>,
        openings: &HashMap<AccountId, Decimal>,
    ) -> GeneralLedgerReport {
        let total_debit: Decimal = lines.iter().map(|l| l.debit).sum();
        let total_credit: Decimal = lines.iter().map(|l| l.credit).sum();

        let mut accounts: BTreeMap<(String, AccountId), GeneralLedgerAccount> = BTreeMap::new();
        for line in lines {
            let opening = openings.get(&line.account_id).copied().unwrap_or_default();
            let section = accounts
                .entry((line.account_number.clone(), line.account_id))
                .or_insert_with(|| GeneralLedgerAccount {
                    account_id: line.account_id,
                    account_number: line.account_number.clone(),
                    name: line.account_name.clone(),
                    opening_balance: opening,
                    rows: Vec::new(),
                    closing_balance: opening,
                });

            let change = line
                .account_type
                .normal_balance()
                .calculate_balance_change(line.debit, line.credit);
            let previous = RunningBalance {
                previous_balance: section.closing_balance,
                current_balance: section.closing_balance,
            };
            let running = RunningBalance::next_entry(&previous, change);
            section.closing_balance = running.current_balance;
            section.rows.push(GeneralLedgerRow {
                entry_id: line.entry_id,
                entry_number: line.entry_number,
                date: line.date,
                description: line.description,
                debit: line.debit,
                credit: line.credit,
                source: line.source,
                running_balance: running.current_balance,
            });
        }

        GeneralLedgerReport {
            from,
            to,
            accounts: accounts.into_values().collect(),
            total_debit,
            total_credit,
        }
    }

    /// Fails when a trial balance does not balance.
    ///
    /// # Errors
    ///
    /// Returns `OutOfBalance`.
    pub fn ensure_trial_balance(report: &TrialBalanceReport) -> Result<(), ReportError> {
        if report.is_balanced {
            return Ok(());
        }
        Err(ReportError::OutOfBalance {
            report: "Trial balance",
            left: report.total_debit,
            right: report.total_credit,
        })
    }

    /// Fails when the accounting equation does not hold.
    ///
    /// # Errors
    ///
    /// Returns `OutOfBalance`.
    pub fn ensure_balance_sheet(report: &BalanceSheetReport) -> Result<(), ReportError> {
        if report.is_balanced {
            return Ok(());
        }
        Err(ReportError::OutOfBalance {
            report: "Balance sheet",
            left: report.total_assets,
            right: report.liabilities_and_equity,
        })
    }

    fn add_to_section(section: &mut StatementSection, account: AccountBalance) {
        section.total += account.balance;
        section.lines.push(StatementLine {
            account_id: Some(account.account_id),
            account_number: Some(account.account_number),
            name: account.name,
            amount: account.balance,
        });
    }
}
