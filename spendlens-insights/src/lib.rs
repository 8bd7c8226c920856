//! spendlens-insights: chart/report endpoints and PDF rendering

pub mod cancel;
pub mod endpoints;
pub mod error;
pub mod pdf;
pub mod renderer;

pub use cancel::{CancelFlag, CancelOnDrop};
pub use endpoints::{
    category_summary, chart_data, render_detached, report_download, total_spent, trends,
    ChartRequest, ChartResponse, ReportDownload, ReportRequest, ReportType, PDF_CONTENT_TYPE,
    REPORT_FILENAME,
};
pub use error::{InsightsError, RenderError};
pub use renderer::{render, DocumentRenderer, RenderState};
