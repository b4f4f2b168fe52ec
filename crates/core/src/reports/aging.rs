//! Aging buckets for open receivables and payables.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::{AgedDocument, AgingKind, AgingReport, AgingRow, BucketTotals, OpenDocument};
use crate::settlement::days_past_due;

/// Aging bucket by days past due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgingBucket {
    /// Not yet due (days <= 0).
    #[serde(rename = "current")]
    Current,
    /// 1-30 days.
    #[serde(rename = "1-30")]
    Days1To30,
    /// 31-60 days.
    #[serde(rename = "31-60")]
    Days31To60,
    /// 61-90 days.
    #[serde(rename = "61-90")]
    Days61To90,
    /// More than 90 days.
    #[serde(rename = "90+")]
    Over90,
}

impl AgingBucket {
    /// Bucket for a given number of days past due.
    #[must_use]
    pub const fn for_days(days: i64) -> Self {
        match days {
            i64::MIN..=0 => Self::Current,
            1..=30 => Self::Days1To30,
            31..=60 => Self::Days31To60,
            61..=90 => Self::Days61To90,
            _ => Self::Over90,
        }
    }
}

impl BucketTotals {
    /// Adds an amount to one bucket and to the total.
    pub fn add(&mut self, bucket: AgingBucket, amount: Decimal) {
        let slot = match bucket {
            AgingBucket::Current => &mut self.current,
            AgingBucket::Days1To30 => &mut self.days_1_30,
            AgingBucket::Days31To60 => &mut self.days_31_60,
            AgingBucket::Days61To90 => &mut self.days_61_90,
            AgingBucket::Over90 => &mut self.over_90,
        };
        *slot += amount;
        self.total += amount;
    }
}

/// Builds aging reports.
pub struct AgingService;

impl AgingService {
    /// Place every open document into exactly one bucket, grouped by party.
    ///
    /// The caller passes only open documents (posted, not paid, not
    /// cancelled). Documents with nothing due are skipped.
    #[must_use]
    pub fn build(kind: AgingKind, as_of: NaiveDate, documents: Vec<OpenDocument>) -> AgingReport {
        let mut rows: BTreeMap<String, AgingRow> = BTreeMap::new();
        let mut totals = BucketTotals::default();

        for doc in documents {
            if doc.amount_due <= Decimal::ZERO {
                continue;
            }
            let days = days_past_due(doc.due_date, as_of);
            let bucket = AgingBucket::for_days(days);

            totals.add(bucket, doc.amount_due);
            let row = rows.entry(doc.party_name.clone()).or_insert_with(|| AgingRow {
                party_name: doc.party_name.clone(),
                buckets: BucketTotals::default(),
                documents: Vec::new(),
            });
            row.buckets.add(bucket, doc.amount_due);
            row.documents.push(AgedDocument {
                id: doc.id,
                number: doc.number,
                due_date: doc.due_date,
                days_past_due: days,
                amount_due: doc.amount_due,
                bucket,
            });
        }

        AgingReport {
            kind,
            as_of,
            rows: rows.into_values().collect(),
            grand_total: totals.total,
            totals,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    #[rstest]
    #[case(-5, AgingBucket::Current)]
    #[case(0, AgingBucket::Current)]
    #[case(1, AgingBucket::Days1To30)]
    #[case(30, AgingBucket::Days1To30)]
    #[case(31, AgingBucket::Days31To60)]
    #[case(60, AgingBucket::Days31To60)]
    #[case(61, AgingBucket::Days61To90)]
    #[case(90, AgingBucket::Days61To90)]
    #[case(91, AgingBucket::Over90)]
    fn test_bucket_boundaries(#[case] days: i64, #[case] expected: AgingBucket) {
        assert_eq!(AgingBucket::for_days(days), expected);
    }

    fn doc(party: &str, due_date: NaiveDate, amount_due: Decimal) -> OpenDocument {
        OpenDocument {
            id: Uuid::new_v4(),
            number: "INV-1".to_string(),
            party_name: party.to_string(),
            due_date,
            amount_due,
        }
    }

    #[test]
    fn test_due_yesterday_and_today() {
        let today = NaiveDate::from_ymd_opt(2026, 6, 15).unwrap();
        let yesterday = NaiveDate::from_ymd_opt(2026, 6, 14).unwrap();
        let report = AgingService::build(
            AgingKind::Receivables,
            today,
            vec![doc("Acme", yesterday, dec!(100)), doc("Acme", today, dec!(40))],
        );

        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.totals.days_1_30, dec!(100));
        assert_eq!(report.totals.current, dec!(40));
        assert_eq!(report.grand_total, dec!(140));
        assert_eq!(report.rows[0].documents[0].bucket, AgingBucket::Days1To30);
    }

    #[test]
    fn test_rows_grouped_and_sorted_by_party() {
        let today = NaiveDate::from_ymd_opt(2026, 6, 15).unwrap();
        let report = AgingService::build(
            AgingKind::Payables,
            today,
            vec![
                doc("Zeta Supplies", today, dec!(1)),
                doc("Alpha Parts", today, dec!(2)),
                doc("Zeta Supplies", today, dec!(3)),
                doc("Nothing Owed", today, dec!(0)),
            ],
        );

        let names: Vec<_> = report.rows.iter().map(|r| r.party_name.as_str()).collect();
        assert_eq!(names, ["Alpha Parts", "Zeta Supplies"]);
        assert_eq!(report.rows[1].buckets.total, dec!(4));
        assert_eq!(report.grand_total, dec!(6));
    }

    #[test]
    fn test_bucket_serialization() {
        assert_eq!(serde_json::to_string(&AgingBucket::Over90).unwrap(), "\"90+\"");
        assert_eq!(serde_json::to_string(&AgingBucket::Days1To30).unwrap(), "\"1-30\"");
    }
}
