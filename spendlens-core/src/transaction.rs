//! Transaction records as handed to the engine by the store

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Opaque identifier of the owner a record belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fixed set of spending categories
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Food,
    Travel,
    Bills,
    Entertainment,
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Food,
        Category::Travel,
        Category::Bills,
        Category::Entertainment,
        Category::Other,
    ];

    /// Stored (lowercase) name
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "food",
            Category::Travel => "travel",
            Category::Bills => "bills",
            Category::Entertainment => "entertainment",
            Category::Other => "other",
        }
    }

    /// Human label: the stored name with its first character upper-cased.
    pub fn label(&self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ValidationError::InvalidCategory(s.to_string()))
    }
}

/// A single recorded expense. Read-only to the engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransactionRecord {
    pub id: String,
    pub owner_id: OwnerId,
    /// Always >= 0; the ingest boundary rejects anything else
    pub amount: Decimal,
    pub occurred_at: DateTime<Utc>,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TransactionRecord {
    pub fn new(
        id: impl Into<String>,
        owner_id: OwnerId,
        amount: Decimal,
        occurred_at: DateTime<Utc>,
        category: Category,
    ) -> Self {
        Self {
            id: id.into(),
            owner_id,
            amount,
            occurred_at,
            category,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn belongs_to(&self, owner: &OwnerId) -> bool {
        &self.owner_id == owner
    }

    /// Calendar date of the record, time of day dropped
    pub fn date(&self) -> NaiveDate {
        self.occurred_at.date_naive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_category_labels() {
        assert_eq!(Category::Food.label(), "Food");
        assert_eq!(Category::Entertainment.label(), "Entertainment");
    }

    #[test]
    fn test_category_parse() {
        assert_eq!("travel".parse::<Category>().unwrap(), Category::Travel);
        assert_eq!(" Bills ".parse::<Category>().unwrap(), Category::Bills);
        assert_eq!(
            "groceries".parse::<Category>(),
            Err(ValidationError::InvalidCategory("groceries".to_string()))
        );
    }

    #[test]
    fn test_record_serde_shape() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 9, 18, 30, 0).unwrap();
        let record = TransactionRecord::new(
            "tx-1",
            OwnerId::new("owner-a"),
            Decimal::new(1250, 2),
            ts,
            Category::Food,
        )
        .with_description("Lunch");

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["owner_id"], "owner-a");
        assert_eq!(json["category"], "food");
        assert_eq!(json["amount"], "12.50");

        let back: TransactionRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
        assert_eq!(back.date(), NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
    }

    #[test]
    fn test_missing_description_is_none() {
        let json = r#"{"id":"x","owner_id":"o","amount":"3","occurred_at":"2024-01-01T00:00:00Z","category":"other"}"#;
        let record: TransactionRecord = serde_json::from_str(json).unwrap();
        assert!(record.description.is_none());
    }
}
