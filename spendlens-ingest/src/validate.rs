//! Boundary validation for new transactions.
//!
//! Rules:
//! - amount: positive, at most two decimal places; `$` and thousands
//!   separators are tolerated
//! - date: see `timestamp::parse_occurred_at`
//! - category: one of the fixed set
//! - description: trimmed, blank becomes `None`

use regex::Regex;
use rust_decimal::Decimal;
use spendlens_core::{Category, ValidationError};
use std::str::FromStr;
use std::sync::LazyLock;

use crate::timestamp::parse_occurred_at;
use crate::types::{NewTransaction, RawTransaction};

static AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\$?\s*(?P<num>\d[\d,]*(?:\.\d+)?)$").expect("amount pattern compiles")
});

pub fn parse_amount(text: &str) -> Result<Decimal, ValidationError> {
    let text = text.trim();
    let invalid = |reason: &'static str| ValidationError::InvalidAmount {
        value: text.to_string(),
        reason,
    };

    if text.is_empty() {
        return Err(ValidationError::MissingField("amount"));
    }
    if text.starts_with('-') {
        return Err(invalid("must be greater than zero"));
    }

    let caps = AMOUNT_RE.captures(text).ok_or_else(|| invalid("not a number"))?;
    let amount = Decimal::from_str(&caps["num"].replace(',', ""))
        .map_err(|_| invalid("not a number"))?
        .normalize();

    if amount <= Decimal::ZERO {
        return Err(invalid("must be greater than zero"));
    }
    if amount.scale() > 2 {
        return Err(invalid("at most two decimal places"));
    }
    Ok(amount)
}

pub fn normalize_description(text: Option<&str>) -> Option<String> {
    text.map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
}

/// Check every field of `raw`, interpreting local times in `tz`.
pub fn validate_new(raw: &RawTransaction, tz: &str) -> Result<NewTransaction, ValidationError> {
    let amount = parse_amount(raw.amount.as_deref().unwrap_or_default())?;
    let occurred_at = parse_occurred_at(raw.date.as_deref().unwrap_or_default(), tz)?;
    let category = match raw.category.as_deref().map(str::trim) {
        None | Some("") => return Err(ValidationError::MissingField("category")),
        Some(c) => Category::from_str(c)?,
    };

    Ok(NewTransaction {
        amount,
        occurred_at,
        category,
        description: normalize_description(raw.description.as_deref()),
    })
}
