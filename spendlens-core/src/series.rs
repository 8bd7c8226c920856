//! Chart-ready series and the recent-transactions table.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Serialize, Serializer};

use crate::aggregate::{AggregationKey, AggregationRow};
use crate::time::{month_abbreviation, BucketKey, Granularity};
use crate::transaction::{Category, TransactionRecord};

/// Default cap on the recent-transactions table
pub const RECENT_TABLE_LIMIT: usize = 50;

/// Positionally aligned labels and amounts: `labels[i]` names `amounts[i]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    #[serde(serialize_with = "amounts_as_numbers")]
    pub amounts: Vec<Decimal>,
}

impl ChartSeries {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

fn amounts_as_numbers<S: Serializer>(amounts: &[Decimal], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(amounts.iter().map(|a| a.to_f64().unwrap_or_default()))
}

/// One line of the recent-transactions table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentRow {
    /// Calendar date, `YYYY-MM-DD`
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub category: Category,
}

pub fn bucket_label(key: &BucketKey) -> String {
    match key.granularity {
        Granularity::Weekly => format!("Week {}, {}", key.period_index, key.year),
        Granularity::Monthly => format!("{} {}", month_abbreviation(key.period_index), key.year),
    }
}

pub fn row_label(key: &AggregationKey) -> String {
    match key {
        AggregationKey::Category(category) => category.label(),
        AggregationKey::TimeBucket(bucket) => bucket_label(bucket),
    }
}

pub fn to_chart_series(rows: &[AggregationRow]) -> ChartSeries {
    let (labels, amounts) = rows.iter().map(|row| (row_label(&row.key), row.total)).unzip();
    ChartSeries { labels, amounts }
}

/// Newest-first listing, silently cut to `limit` rows. Callers that need the
/// full count take it from `records.len()` before calling.
pub fn to_recent_table(records: &[TransactionRecord], limit: usize) -> Vec<RecentRow> {
    let mut newest_first: Vec<&TransactionRecord> = records.iter().collect();
    newest_first.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));

    newest_first
        .into_iter()
        .take(limit)
        .map(|r| RecentRow {
            date: r.date().format("%Y-%m-%d").to_string(),
            description: r.description.clone(),
            amount: r.amount,
            category: r.category,
        })
        .collect()
}
