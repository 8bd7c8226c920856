//! Report model assembly.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::aggregate::{aggregate_by_category, aggregate_by_time, grand_total, AggregationRow};
use crate::time::{trailing_window_start, Granularity};
use crate::transaction::{OwnerId, TransactionRecord};

/// Renderer-ready summary for one owner and one granularity. Built per
/// request and handed to the renderer once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportModel {
    pub owner_label: String,
    pub generated_period: Granularity,
    pub grand_total: Decimal,
    /// total DESC
    pub category_breakdown: Vec<AggregationRow>,
    /// chronological ASC, trailing window only
    pub trend_breakdown: Vec<AggregationRow>,
}

impl ReportModel {
    pub fn has_categories(&self) -> bool {
        !self.category_breakdown.is_empty()
    }

    pub fn has_trends(&self) -> bool {
        !self.trend_breakdown.is_empty()
    }
}

/// Compose the grand total, category breakdown and trailing-window trend
/// breakdown from records the caller already fetched.
pub fn build_report(
    owner: &OwnerId,
    owner_label: &str,
    granularity: Granularity,
    records: &[TransactionRecord],
    now: DateTime<Utc>,
) -> ReportModel {
    ReportModel {
        owner_label: owner_label.to_string(),
        generated_period: granularity,
        grand_total: grand_total(owner, records),
        category_breakdown: aggregate_by_category(owner, records),
        trend_breakdown: aggregate_by_time(
            owner,
            records,
            granularity,
            Some(trailing_window_start(now)),
        ),
    }
}
