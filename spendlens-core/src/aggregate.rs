//! Aggregation engine: groups one owner's records by category or by time
//! bucket.
//!
//! Every entry point takes the owner explicitly and ignores records that
//! belong to anyone else. Output order is fully determined by the input
//! order:
//! - by category: total DESC, ties keep first-occurrence order
//! - by time: bucket key ASC

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::time::{bucket_of, BucketKey, Granularity};
use crate::transaction::{Category, OwnerId, TransactionRecord};

/// What a row was grouped by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AggregationKey {
    Category(Category),
    TimeBucket(BucketKey),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregationRow {
    pub key: AggregationKey,
    pub total: Decimal,
    pub count: u64,
}

impl AggregationRow {
    fn empty(key: AggregationKey) -> Self {
        Self {
            key,
            total: Decimal::ZERO,
            count: 0,
        }
    }

    fn add(&mut self, amount: Decimal) {
        self.total += amount;
        self.count += 1;
    }
}

pub fn aggregate_by_category(owner: &OwnerId, records: &[TransactionRecord]) -> Vec<AggregationRow> {
    let mut rows: Vec<AggregationRow> = Vec::new();
    let mut slots: HashMap<Category, usize> = HashMap::new();

    for record in records.iter().filter(|r| r.belongs_to(owner)) {
        let slot = *slots.entry(record.category).or_insert_with(|| {
            rows.push(AggregationRow::empty(AggregationKey::Category(record.category)));
            rows.len() - 1
        });
        rows[slot].add(record.amount);
    }

    // sort_by is stable: equal totals stay in first-seen order
    rows.sort_by(|a, b| b.total.cmp(&a.total));
    rows
}

/// Group by time bucket. Records before `window_start` (when given) are
/// dropped before grouping.
pub fn aggregate_by_time(
    owner: &OwnerId,
    records: &[TransactionRecord],
    granularity: Granularity,
    window_start: Option<DateTime<Utc>>,
) -> Vec<AggregationRow> {
    let mut buckets: BTreeMap<BucketKey, AggregationRow> = BTreeMap::new();

    let in_window = |r: &&TransactionRecord| window_start.is_none_or(|start| r.occurred_at >= start);

    for record in records.iter().filter(|r| r.belongs_to(owner)).filter(in_window) {
        let key = bucket_of(record.occurred_at, granularity);
        buckets
            .entry(key)
            .or_insert_with(|| AggregationRow::empty(AggregationKey::TimeBucket(key)))
            .add(record.amount);
    }

    buckets.into_values().collect()
}

/// Sum of every amount the owner has recorded; zero when there are none.
pub fn grand_total(owner: &OwnerId, records: &[TransactionRecord]) -> Decimal {
    records
        .iter()
        .filter(|r| r.belongs_to(owner))
        .map(|r| r.amount)
        .sum()
}
