//! Request/response contracts consumed by the UI and download surfaces.
//!
//! Each handler validates its raw request first and only then touches the
//! store, so a rejected request never costs a query.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use spendlens_core::{
    aggregate_by_category, aggregate_by_time, build_report, to_chart_series, to_recent_table,
    trailing_window_start, ChartSeries, Clock, DateRange, Granularity, OwnerId, RecentRow,
    ReportModel, TransactionStore, ValidationError,
};
use std::io::Write;
use tracing::{debug, info};

use crate::cancel::CancelFlag;
use crate::error::{InsightsError, RenderError};
use crate::renderer::DocumentRenderer;

pub const REPORT_FILENAME: &str = "expense-report.pdf";
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChartRequest {
    pub period: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartResponse {
    pub chart_data: ChartSeries,
    pub table_data: Vec<RecentRow>,
    pub period: Granularity,
    /// Row count before the table was truncated
    pub total_expenses: usize,
}

/// Trend series over all of the owner's records plus the recent table.
pub async fn chart_data<S: TransactionStore>(
    store: &S,
    owner: &OwnerId,
    request: &ChartRequest,
    recent_limit: usize,
) -> Result<ChartResponse, InsightsError> {
    let period = Granularity::parse_or_default(request.period.as_deref())?;
    info!(owner = %owner, %period, "chart data requested");

    let records = store.find(owner, DateRange::all()).await?;
    let rows = aggregate_by_time(owner, &records, period, None);
    debug!(records = records.len(), buckets = rows.len(), "chart data aggregated");

    Ok(ChartResponse {
        chart_data: to_chart_series(&rows),
        table_data: to_recent_table(&records, recent_limit),
        period,
        total_expenses: records.len(),
    })
}

/// Trend series over the trailing year only, for the chosen period.
pub async fn trends<S: TransactionStore, C: Clock>(
    store: &S,
    owner: &OwnerId,
    request: &ChartRequest,
    clock: &C,
) -> Result<ChartSeries, InsightsError> {
    let period = Granularity::parse_or_default(request.period.as_deref())?;
    info!(owner = %owner, %period, "trends requested");

    let window_start = trailing_window_start(clock.now());
    let records = store.find(owner, DateRange::since(window_start)).await?;
    let rows = aggregate_by_time(owner, &records, period, Some(window_start));
    debug!(records = records.len(), buckets = rows.len(), "trends aggregated");
    Ok(to_chart_series(&rows))
}

/// Category totals as a label/amount series.
pub async fn category_summary<S: TransactionStore>(
    store: &S,
    owner: &OwnerId,
) -> Result<ChartSeries, InsightsError> {
    info!(owner = %owner, "category summary requested");
    let records = store.find(owner, DateRange::all()).await?;
    Ok(to_chart_series(&aggregate_by_category(owner, &records)))
}

/// Everything the owner has spent, straight from the store.
pub async fn total_spent<S: TransactionStore>(
    store: &S,
    owner: &OwnerId,
) -> Result<Decimal, InsightsError> {
    Ok(store.sum(owner).await?)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportType {
    Download,
}

impl ReportType {
    pub fn parse(raw: Option<&str>) -> Result<Self, ValidationError> {
        match raw {
            Some("download") => Ok(ReportType::Download),
            Some(other) => Err(ValidationError::UnsupportedReportType(other.to_string())),
            None => Err(ValidationError::MissingReportType),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReportRequest {
    #[serde(rename = "type")]
    pub report_type: Option<String>,
    pub period: Option<String>,
}

/// A finished PDF, ready to send as a single attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDownload {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ReportDownload {
    pub fn content_length(&self) -> usize {
        self.bytes.len()
    }

    pub fn content_disposition(&self) -> String {
        format!("attachment; filename={}", self.filename)
    }
}

/// Build and render the owner's report.
///
/// Rendering runs on the blocking pool. If this future is dropped before the
/// document is finalized, the renderer is cancelled at its next chunk and
/// its buffer discarded.
pub async fn report_download<S: TransactionStore, C: Clock>(
    store: &S,
    owner: &OwnerId,
    owner_label: &str,
    request: &ReportRequest,
    clock: &C,
) -> Result<ReportDownload, InsightsError> {
    ReportType::parse(request.report_type.as_deref())?;
    let period = Granularity::parse_or_default(request.period.as_deref())?;
    info!(owner = %owner, %period, "report download requested");

    let records = store.find(owner, DateRange::all()).await?;
    let now = clock.now();
    let report = build_report(owner, owner_label, period, &records, now);
    debug!(
        categories = report.category_breakdown.len(),
        trends = report.trend_breakdown.len(),
        "report model assembled"
    );

    let bytes = render_detached(Vec::new(), report, now.date_naive()).await?;

    info!(owner = %owner, bytes = bytes.len(), "report rendered");
    Ok(ReportDownload {
        filename: REPORT_FILENAME.to_string(),
        content_type: PDF_CONTENT_TYPE,
        bytes,
    })
}

/// Render `report` into `sink` on the blocking pool.
///
/// Dropping the returned future before it resolves cancels the render; the
/// renderer fails at its next chunk and drops the sink.
pub async fn render_detached<W>(sink: W, report: ReportModel, generated_on: NaiveDate) -> Result<W, RenderError>
where
    W: Write + Send + 'static,
{
    let cancel = CancelFlag::new();
    let guard = cancel.guard();
    let sink = tokio::task::spawn_blocking(move || {
        DocumentRenderer::new(sink, generated_on)
            .with_cancel_flag(cancel)
            .render(&report)
    })
    .await
    .map_err(|e| RenderError::Task(e.to_string()))??;
    guard.disarm();
    Ok(sink)
}
