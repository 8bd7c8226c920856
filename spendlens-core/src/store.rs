//! Query interface to wherever transaction records live.
//!
//! The engine never writes through this trait. Implementations own their
//! own persistence and error reporting; callers propagate `StoreError`
//! unchanged and do not retry.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::StoreError;
use crate::transaction::{OwnerId, TransactionRecord};

/// Inclusive bounds on `occurred_at`; `None` leaves a side open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn since(from: DateTime<Utc>) -> Self {
        Self {
            from: Some(from),
            to: None,
        }
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.from.is_none_or(|from| ts >= from) && self.to.is_none_or(|to| ts <= to)
    }
}

pub trait TransactionStore: Send + Sync {
    /// The owner's records inside `range`, in store order.
    fn find(
        &self,
        owner: &OwnerId,
        range: DateRange,
    ) -> impl Future<Output = Result<Vec<TransactionRecord>, StoreError>> + Send;

    fn sum(&self, owner: &OwnerId) -> impl Future<Output = Result<Decimal, StoreError>> + Send;
}

/// In-process store. Counts queries so callers can check whether a request
/// reached the store at all.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Vec<TransactionRecord>,
    queries: AtomicUsize,
}

impl MemoryStore {
    pub fn new(records: Vec<TransactionRecord>) -> Self {
        Self {
            records,
            queries: AtomicUsize::new(0),
        }
    }

    pub fn push(&mut self, record: TransactionRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of `find`/`sum` calls served so far
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

impl TransactionStore for MemoryStore {
    async fn find(&self, owner: &OwnerId, range: DateRange) -> Result<Vec<TransactionRecord>, StoreError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .records
            .iter()
            .filter(|r| r.belongs_to(owner) && range.contains(r.occurred_at))
            .cloned()
            .collect())
    }

    async fn sum(&self, owner: &OwnerId) -> Result<Decimal, StoreError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .records
            .iter()
            .filter(|r| r.belongs_to(owner))
            .map(|r| r.amount)
            .sum())
    }
}
