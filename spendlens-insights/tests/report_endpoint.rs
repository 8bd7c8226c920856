use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use spendlens_core::{
    AggregationKey, AggregationRow, BucketKey, Category, DateRange, FixedClock, Granularity,
    MemoryStore, OwnerId, ReportModel, StoreError, TransactionRecord, TransactionStore,
    ValidationError,
};
use spendlens_insights::{
    category_summary, chart_data, render_detached, report_download, total_spent, trends,
    ChartRequest, InsightsError, ReportRequest, PDF_CONTENT_TYPE, REPORT_FILENAME,
};
use std::future::Future;
use std::io::{self, Write};
use std::sync::mpsc;
use std::task::Poll;

fn owner() -> OwnerId {
    OwnerId::new("owner-1")
}

fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
}

fn rec(id: &str, cents: i64, ts: DateTime<Utc>, category: Category) -> TransactionRecord {
    TransactionRecord::new(id, owner(), Decimal::new(cents, 2), ts, category)
}

fn clock() -> FixedClock {
    FixedClock(at(2024, 3, 15))
}

fn contains(haystack: &[u8], needle: &str) -> bool {
    haystack
        .windows(needle.len())
        .any(|w| w == needle.as_bytes())
}

fn download(period: Option<&str>) -> ReportRequest {
    ReportRequest {
        report_type: Some("download".to_string()),
        period: period.map(str::to_string),
    }
}

struct FailingStore;

impl TransactionStore for FailingStore {
    async fn find(&self, _owner: &OwnerId, _range: DateRange) -> Result<Vec<TransactionRecord>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn sum(&self, _owner: &OwnerId) -> Result<Decimal, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
}

#[tokio::test]
async fn test_category_summary_orders_by_total() {
    let store = MemoryStore::new(vec![
        rec("1", 1250, at(2024, 1, 3), Category::Food),
        rec("2", 700, at(2024, 1, 4), Category::Food),
        rec("3", 2000, at(2024, 1, 5), Category::Travel),
        TransactionRecord::new(
            "x",
            OwnerId::new("someone-else"),
            Decimal::from(999),
            at(2024, 1, 5),
            Category::Bills,
        ),
    ]);

    let series = category_summary(&store, &owner()).await.unwrap();
    assert_eq!(series.labels, ["Travel", "Food"]);
    assert_eq!(series.amounts, [Decimal::new(2000, 2), Decimal::new(1950, 2)]);

    assert_eq!(total_spent(&store, &owner()).await.unwrap(), Decimal::new(3950, 2));
}

#[tokio::test]
async fn test_chart_data_monthly_labels_and_json_shape() {
    let store = MemoryStore::new(vec![
        rec("jan", 1000, at(2024, 1, 10), Category::Food),
        rec("feb", 1500, at(2024, 2, 10), Category::Other).with_description("Books"),
    ]);

    let response = chart_data(&store, &owner(), &ChartRequest::default(), 50)
        .await
        .unwrap();
    assert_eq!(response.chart_data.labels, ["Jan 2024", "Feb 2024"]);
    assert_eq!(response.total_expenses, 2);

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["period"], "monthly");
    assert_eq!(json["totalExpenses"], 2);
    assert_eq!(json["chartData"]["amounts"], serde_json::json!([10.0, 15.0]));
    assert_eq!(json["tableData"][0]["date"], "2024-02-10");
    assert_eq!(json["tableData"][0]["description"], "Books");
    assert_eq!(json["tableData"][0]["category"], "other");
    assert!(json["tableData"][1].get("description").is_none());
}

#[tokio::test]
async fn test_chart_data_truncates_table_but_counts_everything() {
    let start = at(2024, 1, 1);
    let records = (0..60)
        .map(|i| rec(&format!("t{i}"), 100 + i, start + Duration::days(i), Category::Food))
        .collect();
    let store = MemoryStore::new(records);

    let request = ChartRequest {
        period: Some("weekly".into()),
    };
    let response = chart_data(&store, &owner(), &request, 50).await.unwrap();

    assert_eq!(response.table_data.len(), 50);
    assert_eq!(response.total_expenses, 60);
    assert_eq!(response.table_data[0].date, "2024-02-29");
    assert!(response
        .table_data
        .windows(2)
        .all(|w| w[0].date >= w[1].date));
    assert_eq!(response.chart_data.labels.first().map(String::as_str), Some("Week 0, 2024"));
}

#[tokio::test]
async fn test_invalid_period_never_reaches_store() {
    let store = MemoryStore::new(vec![rec("1", 100, at(2024, 1, 1), Category::Food)]);

    let request = ChartRequest {
        period: Some("daily".into()),
    };
    let err = chart_data(&store, &owner(), &request, 50).await.unwrap_err();
    assert!(err.is_client_error());
    assert!(matches!(
        err,
        InsightsError::Validation(ValidationError::InvalidPeriod(ref p)) if p == "daily"
    ));

    let err = report_download(&store, &owner(), "Ada", &download(Some("yearly")), &clock())
        .await
        .unwrap_err();
    assert!(err.is_client_error());
    assert_eq!(store.query_count(), 0);
}

#[tokio::test]
async fn test_report_type_is_checked_before_store() {
    let store = MemoryStore::new(vec![rec("1", 100, at(2024, 1, 1), Category::Food)]);

    let unsupported = ReportRequest {
        report_type: Some("email".into()),
        period: None,
    };
    let err = report_download(&store, &owner(), "Ada", &unsupported, &clock())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        InsightsError::Validation(ValidationError::UnsupportedReportType(_))
    ));

    let err = report_download(&store, &owner(), "Ada", &ReportRequest::default(), &clock())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        InsightsError::Validation(ValidationError::MissingReportType)
    ));

    assert_eq!(store.query_count(), 0);
}

#[tokio::test]
async fn test_report_download_for_owner_with_records() {
    let store = MemoryStore::new(vec![
        rec("1", 1250, at(2024, 1, 3), Category::Food),
        rec("2", 700, at(2024, 1, 4), Category::Food),
        rec("3", 2000, at(2024, 2, 5), Category::Travel),
        // outside the trailing year, still counted in totals
        rec("old", 500, at(2022, 6, 1), Category::Bills),
    ]);

    let report = report_download(&store, &owner(), "Ada", &download(None), &clock())
        .await
        .unwrap();

    assert_eq!(report.filename, REPORT_FILENAME);
    assert_eq!(report.content_type, PDF_CONTENT_TYPE);
    assert_eq!(report.content_length(), report.bytes.len());
    assert!(report.bytes.starts_with(b"%PDF-1.4"));

    assert!(contains(&report.bytes, "(User: Ada)"));
    assert!(contains(&report.bytes, "(Total Spent: $44.50)"));
    assert!(contains(&report.bytes, "(Report Period: monthly)"));
    assert!(contains(&report.bytes, "(Generated: 2024-03-15)"));
    assert!(contains(&report.bytes, "(Food: $19.50)"));
    assert!(contains(&report.bytes, "(Bills: $5.00)"));
    assert!(contains(&report.bytes, "(01/2024: $19.50)"));
    assert!(contains(&report.bytes, "(02/2024: $20.00)"));
    assert!(!contains(&report.bytes, "06/2022"));
}

#[tokio::test]
async fn test_report_download_for_empty_owner() {
    let store = MemoryStore::default();

    let report = report_download(&store, &owner(), "Ada", &download(Some("weekly")), &clock())
        .await
        .unwrap();

    assert!(contains(&report.bytes, "(Total Spent: $0.00)"));
    assert!(contains(&report.bytes, "(No categories found.)"));
    assert!(contains(&report.bytes, "(No trends found for the selected period.)"));
    assert!(contains(&report.bytes, "(Trends \\(weekly\\):)"));
}

#[tokio::test]
async fn test_store_failure_propagates() {
    let err = chart_data(&FailingStore, &owner(), &ChartRequest::default(), 50)
        .await
        .unwrap_err();
    assert!(!err.is_client_error());
    assert!(matches!(err, InsightsError::Store(StoreError::Unavailable(_))));

    let err = report_download(&FailingStore, &owner(), "Ada", &download(None), &clock())
        .await
        .unwrap_err();
    assert!(matches!(err, InsightsError::Store(_)));

    let err = total_spent(&FailingStore, &owner()).await.unwrap_err();
    assert_eq!(err.to_string(), "store unavailable: connection refused");
}

#[tokio::test]
async fn test_trends_cover_only_the_trailing_year() {
    let mut store = MemoryStore::default();
    assert!(store.is_empty());
    store.push(rec("recent", 1000, at(2024, 2, 10), Category::Food));
    store.push(rec("edge", 300, at(2023, 3, 20), Category::Bills));
    store.push(rec("old", 500, at(2023, 3, 1), Category::Travel));
    assert_eq!(store.len(), 3);

    let series = trends(&store, &owner(), &ChartRequest::default(), &clock())
        .await
        .unwrap();
    assert_eq!(series.labels, ["Mar 2023", "Feb 2024"]);
    assert_eq!(series.amounts, [Decimal::new(300, 2), Decimal::new(1000, 2)]);

    let weekly = ChartRequest {
        period: Some("weekly".into()),
    };
    let series = trends(&store, &owner(), &weekly, &clock()).await.unwrap();
    assert_eq!(series.labels, ["Week 12, 2023", "Week 5, 2024"]);

    let bad = ChartRequest {
        period: Some("daily".into()),
    };
    assert!(trends(&store, &owner(), &bad, &clock()).await.unwrap_err().is_client_error());
    assert_eq!(store.query_count(), 2);
}

/// Holds its first write until `gate` opens; reports on drop whether the
/// document was completed.
struct GatedSink {
    gate: mpsc::Receiver<()>,
    opened: bool,
    written: Vec<u8>,
    done: mpsc::Sender<bool>,
}

impl Write for GatedSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.opened {
            self.gate.recv().ok();
            self.opened = true;
        }
        self.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for GatedSink {
    fn drop(&mut self) {
        self.done.send(self.written.ends_with(b"%%EOF\n")).ok();
    }
}

#[tokio::test]
async fn test_dropping_the_request_cancels_the_render() {
    // enough rows that the document spans several chunks
    let report = ReportModel {
        owner_label: "Ada".into(),
        generated_period: Granularity::Weekly,
        grand_total: Decimal::from(300),
        category_breakdown: vec![],
        trend_breakdown: (0..300u32)
            .map(|i| AggregationRow {
                key: AggregationKey::TimeBucket(BucketKey::weekly(2000 + (i / 53) as i32, i % 53)),
                total: Decimal::ONE,
                count: 1,
            })
            .collect(),
    };

    let (gate_tx, gate_rx) = mpsc::channel();
    let (done_tx, done_rx) = mpsc::channel();
    let sink = GatedSink {
        gate: gate_rx,
        opened: false,
        written: Vec::new(),
        done: done_tx,
    };

    let mut pending = Box::pin(render_detached(sink, report, at(2024, 3, 15).date_naive()));
    std::future::poll_fn(|cx| {
        assert!(pending.as_mut().poll(cx).is_pending());
        Poll::Ready(())
    })
    .await;
    drop(pending);

    gate_tx.send(()).unwrap();
    let completed = done_rx
        .recv_timeout(std::time::Duration::from_secs(10))
        .unwrap();
    assert!(!completed);
}
