//! `SeaORM` active enums mirroring the Postgres enum types.
//!
//! Each enum converts to and from its domain counterpart in `tally-core`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use tally_core::{cashbook, fulfillment, invoicing, ledger, payables, payments};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_type")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    #[sea_orm(string_value = "BANK")]
    Bank,
    #[sea_orm(string_value = "ACCOUNTS_RECEIVABLE")]
    AccountsReceivable,
    #[sea_orm(string_value = "OTHER_CURRENT_ASSET")]
    OtherCurrentAsset,
    #[sea_orm(string_value = "FIXED_ASSET")]
    FixedAsset,
    #[sea_orm(string_value = "OTHER_ASSET")]
    OtherAsset,
    #[sea_orm(string_value = "ACCOUNTS_PAYABLE")]
    AccountsPayable,
    #[sea_orm(string_value = "CREDIT_CARD")]
    CreditCard,
    #[sea_orm(string_value = "OTHER_CURRENT_LIABILITY")]
    OtherCurrentLiability,
    #[sea_orm(string_value = "LONG_TERM_LIABILITY")]
    LongTermLiability,
    #[sea_orm(string_value = "EQUITY")]
    Equity,
    #[sea_orm(string_value = "INCOME")]
    Income,
    #[sea_orm(string_value = "OTHER_INCOME")]
    OtherIncome,
    #[sea_orm(string_value = "COST_OF_GOODS_SOLD")]
    CostOfGoodsSold,
    #[sea_orm(string_value = "EXPENSE")]
    Expense,
    #[sea_orm(string_value = "OTHER_EXPENSE")]
    OtherExpense,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "entry_source")]
#[serde(rename_all = "snake_case")]
pub enum EntrySource {
    #[sea_orm(string_value = "manual")]
    Manual,
    #[sea_orm(string_value = "invoice")]
    Invoice,
    #[sea_orm(string_value = "payment")]
    Payment,
    #[sea_orm(string_value = "credit_memo")]
    CreditMemo,
    #[sea_orm(string_value = "bill")]
    Bill,
    #[sea_orm(string_value = "bill_payment")]
    BillPayment,
    #[sea_orm(string_value = "sales_receipt")]
    SalesReceipt,
    #[sea_orm(string_value = "check")]
    Check,
    #[sea_orm(string_value = "reversal")]
    Reversal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "invoice_status")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    #[sea_orm(string_value = "DRAFT")]
    Draft,
    #[sea_orm(string_value = "SENT")]
    Sent,
    #[sea_orm(string_value = "PARTIALLY_PAID")]
    PartiallyPaid,
    #[sea_orm(string_value = "PAID")]
    Paid,
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "bill_status")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillStatus {
    #[sea_orm(string_value = "DRAFT")]
    Draft,
    #[sea_orm(string_value = "OPEN")]
    Open,
    #[sea_orm(string_value = "PARTIALLY_PAID")]
    PartiallyPaid,
    #[sea_orm(string_value = "PAID")]
    Paid,
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_method")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    #[sea_orm(string_value = "CASH")]
    Cash,
    #[sea_orm(string_value = "BANK")]
    Bank,
    #[sea_orm(string_value = "CREDIT_CARD")]
    CreditCard,
    #[sea_orm(string_value = "OTHER")]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "sales_order_status")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SalesOrderStatus {
    #[sea_orm(string_value = "DRAFT")]
    Draft,
    #[sea_orm(string_value = "CONFIRMED")]
    Confirmed,
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "cash_document_status")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CashDocumentStatus {
    #[sea_orm(string_value = "POSTED")]
    Posted,
    #[sea_orm(string_value = "VOID")]
    Void,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "credit_memo_status")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreditMemoStatus {
    #[sea_orm(string_value = "APPLIED")]
    Applied,
    #[sea_orm(string_value = "VOID")]
    Void,
}

// ============================================================
// Domain conversions
// ============================================================

/// Generates `From` impls in both directions for enums with matching variants.
macro_rules! mirror_enum {
    ($db:ident, $module:ident::$domain:ident, [$($variant:ident),+ $(,)?]) => {
        impl From<$db> for $module::$domain {
            fn from(value: $db) -> Self {
                match value {
                    $($db::$variant => Self::$variant,)+
                }
            }
        }

        impl From<$module::$domain> for $db {
            fn from(value: $module::$domain) -> Self {
                match value {
                    $($module::$domain::$variant => Self::$variant,)+
                }
            }
        }
    };
}

mirror_enum!(
    AccountType,
    ledger::AccountType,
    [
        Bank,
        AccountsReceivable,
        OtherCurrentAsset,
        FixedAsset,
        OtherAsset,
        AccountsPayable,
        CreditCard,
        OtherCurrentLiability,
        LongTermLiability,
        Equity,
        Income,
        OtherIncome,
        CostOfGoodsSold,
        Expense,
        OtherExpense,
    ]
);

mirror_enum!(
    EntrySource,
    ledger::EntrySource,
    [
        Manual,
        Invoice,
        Payment,
        CreditMemo,
        Bill,
        BillPayment,
        SalesReceipt,
        Check,
        Reversal,
    ]
);

mirror_enum!(
    InvoiceStatus,
    invoicing::InvoiceStatus,
    [Draft, Sent, PartiallyPaid, Paid, Cancelled]
);

mirror_enum!(
    BillStatus,
    payables::BillStatus,
    [Draft, Open, PartiallyPaid, Paid, Cancelled]
);

mirror_enum!(
    PaymentMethod,
    payments::PaymentMethod,
    [Cash, Bank, CreditCard, Other]
);

mirror_enum!(
    SalesOrderStatus,
    fulfillment::OrderStatus,
    [Draft, Confirmed, Cancelled]
);

mirror_enum!(
    CashDocumentStatus,
    cashbook::CashDocumentStatus,
    [Posted, Void]
);

mirror_enum!(
    CreditMemoStatus,
    payments::CreditMemoStatus,
    [Applied, Void]
);
