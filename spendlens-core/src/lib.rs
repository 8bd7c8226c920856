//! spendlens-core: transaction model and the aggregation & reporting engine

pub mod aggregate;
pub mod error;
pub mod report;
pub mod series;
pub mod store;
pub mod time;
pub mod transaction;

pub use aggregate::{aggregate_by_category, aggregate_by_time, grand_total, AggregationKey, AggregationRow};
pub use error::{StoreError, ValidationError};
pub use report::{build_report, ReportModel};
pub use series::{to_chart_series, to_recent_table, ChartSeries, RecentRow, RECENT_TABLE_LIMIT};
pub use store::{DateRange, MemoryStore, TransactionStore};
pub use time::{
    bucket_of, trailing_window_start, week_of_year, BucketKey, Clock, FixedClock, Granularity,
    SystemClock, TREND_WINDOW_DAYS,
};
pub use transaction::{Category, OwnerId, TransactionRecord};
