use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use spendlens_core::{Category, OwnerId, TransactionRecord};

/// Unvalidated transaction fields as typed by a user or read from a file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTransaction {
    pub amount: Option<String>,
    pub date: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
}

/// A transaction that passed boundary validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTransaction {
    /// > 0, at most two fractional digits
    pub amount: Decimal,
    pub occurred_at: DateTime<Utc>,
    pub category: Category,
    pub description: Option<String>,
}

impl NewTransaction {
    pub fn into_record(self, owner: OwnerId, id: impl Into<String>) -> TransactionRecord {
        TransactionRecord {
            id: id.into(),
            owner_id: owner,
            amount: self.amount,
            occurred_at: self.occurred_at,
            category: self.category,
            description: self.description,
        }
    }
}
