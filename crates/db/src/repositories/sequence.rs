//! Per-tenant document number sequences.
//!
//! Counters live on the tenant row. Incrementing with `UPDATE ... RETURNING`
//! takes the row lock, so numbers are gap-free per committed transaction and
//! never handed out twice.

use sea_orm::{ConnectionTrait, DbBackend, DbErr, Statement};
use uuid::Uuid;

/// A numbered document series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Sequence {
    Journal,
    Invoice,
    Bill,
    CreditMemo,
    SalesReceipt,
    Check,
}

impl Sequence {
    const fn column(self) -> &'static str {
        match self {
            Self::Journal => "journal_sequence",
            Self::Invoice => "invoice_sequence",
            Self::Bill => "bill_sequence",
            Self::CreditMemo => "credit_memo_sequence",
            Self::SalesReceipt => "sales_receipt_sequence",
            Self::Check => "check_sequence",
        }
    }
}

/// Allocates the next value of `sequence` for a tenant.
pub(crate) async fn next_value<C>(conn: &C, tenant_id: Uuid, sequence: Sequence) -> Result<i64, DbErr>
where
    C: ConnectionTrait,
{
    let column = sequence.column();
    let sql = format!(
        "UPDATE tenants SET {column} = {column} + 1 WHERE id = $1 RETURNING {column}"
    );
    let row = conn
        .query_one(Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [tenant_id.into()],
        ))
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("Tenant {tenant_id}")))?;

    row.try_get::<i64>("", column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_columns_are_distinct() {
        let columns = [
            Sequence::Journal.column(),
            Sequence::Invoice.column(),
            Sequence::Bill.column(),
            Sequence::CreditMemo.column(),
            Sequence::SalesReceipt.column(),
            Sequence::Check.column(),
        ];
        for (i, a) in columns.iter().enumerate() {
            for b in &columns[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
