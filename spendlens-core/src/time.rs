//! Time bucketing for trend aggregation.
//!
//! Weekly buckets use Sunday-start week numbers (the `%U` convention):
//! week 1 begins on the first Sunday of the year and any days before it
//! fall into week 0, so values range over 0..=53. Aggregation and label
//! rendering both go through [`week_of_year`].
//!
//! Timestamps are bucketed by their UTC calendar fields as stored.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Length of the trailing trend window
pub const TREND_WINDOW_DAYS: i64 = 365;

pub const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Weekly,
    #[default]
    Monthly,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Weekly => "weekly",
            Granularity::Monthly => "monthly",
        }
    }

    /// Parse an optional request value; absent means monthly.
    pub fn parse_or_default(raw: Option<&str>) -> Result<Self, ValidationError> {
        match raw {
            None => Ok(Granularity::default()),
            Some(s) => s.parse(),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weekly" => Ok(Granularity::Weekly),
            "monthly" => Ok(Granularity::Monthly),
            other => Err(ValidationError::InvalidPeriod(other.to_string())),
        }
    }
}

/// A discrete trend period. Ordered by `(year, period_index)` within one
/// granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BucketKey {
    pub granularity: Granularity,
    pub year: i32,
    /// Month 1..=12, or Sunday-based week 0..=53
    pub period_index: u32,
}

impl BucketKey {
    pub fn monthly(year: i32, month: u32) -> Self {
        Self {
            granularity: Granularity::Monthly,
            year,
            period_index: month,
        }
    }

    pub fn weekly(year: i32, week: u32) -> Self {
        Self {
            granularity: Granularity::Weekly,
            year,
            period_index: week,
        }
    }
}

/// Sunday-start, zero-indexed week of the year.
pub fn week_of_year(date: NaiveDate) -> u32 {
    (date.ordinal0() + 7 - date.weekday().num_days_from_sunday()) / 7
}

pub fn bucket_of(timestamp: DateTime<Utc>, granularity: Granularity) -> BucketKey {
    let date = timestamp.date_naive();
    match granularity {
        Granularity::Monthly => BucketKey::monthly(date.year(), date.month()),
        Granularity::Weekly => BucketKey::weekly(date.year(), week_of_year(date)),
    }
}

/// Three-letter abbreviation for a 1-based month number.
pub fn month_abbreviation(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|i| MONTH_ABBREVIATIONS.get(i as usize))
        .copied()
        .unwrap_or("???")
}

/// Earliest timestamp still inside the trailing trend window ending at `now`.
pub fn trailing_window_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(TREND_WINDOW_DAYS)
}

/// Clock abstracts access to the current timestamp so report assembly stays
/// deterministic in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_week_zero_before_first_sunday() {
        // 2024-01-01 is a Monday; first Sunday is the 7th
        assert_eq!(week_of_year(day(2024, 1, 1)), 0);
        assert_eq!(week_of_year(day(2024, 1, 6)), 0);
        assert_eq!(week_of_year(day(2024, 1, 7)), 1);
        assert_eq!(week_of_year(day(2024, 12, 31)), 52);
    }

    #[test]
    fn test_year_starting_on_sunday_has_no_week_zero() {
        // 2023-01-01 is a Sunday
        assert_eq!(week_of_year(day(2023, 1, 1)), 1);
        assert_eq!(week_of_year(day(2023, 12, 31)), 53);
    }

    #[test]
    fn test_bucket_of_monthly_and_weekly() {
        let ts = Utc.with_ymd_and_hms(2024, 2, 14, 23, 59, 0).unwrap();
        assert_eq!(bucket_of(ts, Granularity::Monthly), BucketKey::monthly(2024, 2));
        assert_eq!(bucket_of(ts, Granularity::Weekly), BucketKey::weekly(2024, 6));
    }

    #[test]
    fn test_bucket_ordering_is_chronological() {
        let mut keys = vec![
            BucketKey::weekly(2024, 0),
            BucketKey::weekly(2023, 52),
            BucketKey::weekly(2024, 10),
        ];
        keys.sort();
        assert_eq!(
            keys,
            vec![
                BucketKey::weekly(2023, 52),
                BucketKey::weekly(2024, 0),
                BucketKey::weekly(2024, 10),
            ]
        );
    }

    #[test]
    fn test_granularity_parse() {
        assert_eq!(Granularity::parse_or_default(None).unwrap(), Granularity::Monthly);
        assert_eq!(
            Granularity::parse_or_default(Some("weekly")).unwrap(),
            Granularity::Weekly
        );
        assert_eq!(
            Granularity::parse_or_default(Some("daily")),
            Err(ValidationError::InvalidPeriod("daily".to_string()))
        );
    }

    #[test]
    fn test_month_abbreviation_bounds() {
        assert_eq!(month_abbreviation(1), "Jan");
        assert_eq!(month_abbreviation(12), "Dec");
        assert_eq!(month_abbreviation(0), "???");
        assert_eq!(month_abbreviation(13), "???");
    }

    #[test]
    fn test_trailing_window() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let start = trailing_window_start(now);
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());
        assert_eq!(FixedClock(now).today(), day(2025, 3, 1));
    }
}
