//! Expense report rendering.
//!
//! Page layout, top to bottom:
//! - title, centered
//! - owner / total / period / generation date
//! - "Category Breakdown:" with one line per category, or a placeholder
//! - "Trends (<period>):" with one line per bucket, or a placeholder
//!
//! Lines that do not fit on the current page start a new one.
//!
//! A `DocumentRenderer` runs exactly once:
//! Idle -> Writing -> Finalized, or Idle -> Writing -> Failed.
//! On failure the sink is dropped along with whatever it buffered.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use spendlens_core::series::bucket_label;
use spendlens_core::{AggregationKey, AggregationRow, Granularity, ReportModel};
use std::io::Write;
use tracing::{debug, warn};

use crate::cancel::CancelFlag;
use crate::error::RenderError;
use crate::pdf::{literal_string, text_width, Font, PdfWriter, PAGE_HEIGHT, PAGE_WIDTH};

pub const MARGIN: f32 = 50.0;
const LINE_GAP: f32 = 1.2;

const TITLE_SIZE: f32 = 25.0;
const SUMMARY_SIZE: f32 = 14.0;
const HEADING_SIZE: f32 = 16.0;
const BODY_SIZE: f32 = 12.0;

pub const REPORT_TITLE: &str = "Expense Report";
pub const NO_CATEGORIES: &str = "No categories found.";
pub const NO_TRENDS: &str = "No trends found for the selected period.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    Idle,
    Writing,
    Finalized,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Center,
}

#[derive(Debug, Clone, Copy)]
struct Style {
    font: Font,
    size: f32,
    align: Align,
    underline: bool,
}

impl Style {
    const TITLE: Style = Style::plain(TITLE_SIZE).centered();
    const SUMMARY: Style = Style::plain(SUMMARY_SIZE);
    const HEADING: Style = Style {
        font: Font::Bold,
        size: HEADING_SIZE,
        align: Align::Left,
        underline: true,
    };
    const BODY: Style = Style::plain(BODY_SIZE);

    const fn plain(size: f32) -> Self {
        Self {
            font: Font::Regular,
            size,
            align: Align::Left,
            underline: false,
        }
    }

    const fn centered(mut self) -> Self {
        self.align = Align::Center;
        self
    }
}

/// Flows lines down the current page and hands full pages to the writer.
struct Layout<'w, W: Write> {
    pdf: &'w mut PdfWriter<W>,
    content: Vec<u8>,
    y: f32,
}

impl<'w, W: Write> Layout<'w, W> {
    fn new(pdf: &'w mut PdfWriter<W>) -> Self {
        Self {
            pdf,
            content: Vec::new(),
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn line(&mut self, text: &str, style: Style) -> Result<(), RenderError> {
        let height = style.size * LINE_GAP;
        if self.y - height < MARGIN && !self.content.is_empty() {
            self.break_page()?;
        }

        let width = text_width(text, style.size);
        let x = match style.align {
            Align::Left => MARGIN,
            Align::Center => ((PAGE_WIDTH - width) / 2.0).max(MARGIN),
        };
        let baseline = self.y - style.size;

        write!(
            self.content,
            "BT /{} {:.2} Tf {:.2} {:.2} Td ",
            style.font.resource(),
            style.size,
            x,
            baseline
        )?;
        self.content.extend_from_slice(&literal_string(text));
        self.content.extend_from_slice(b" Tj ET\n");

        if style.underline {
            let rule = baseline - 2.0;
            writeln!(self.content, "0.75 w {x:.2} {rule:.2} m {:.2} {rule:.2} l S", x + width)?;
        }

        self.y -= height;
        Ok(())
    }

    fn move_down(&mut self, size: f32) {
        self.y -= size * LINE_GAP;
    }

    fn break_page(&mut self) -> Result<(), RenderError> {
        let content = std::mem::take(&mut self.content);
        self.pdf.add_page(&content)?;
        self.y = PAGE_HEIGHT - MARGIN;
        Ok(())
    }

    fn finish(mut self) -> Result<(), RenderError> {
        let content = std::mem::take(&mut self.content);
        self.pdf.add_page(&content)
    }
}

fn money(amount: Decimal) -> String {
    format!("${:.2}", amount)
}

/// Line label used in the report body. Monthly buckets read `MM/YYYY` here,
/// unlike the chart labels.
fn report_label(key: &AggregationKey) -> String {
    match key {
        AggregationKey::Category(category) => category.label(),
        AggregationKey::TimeBucket(bucket) => match bucket.granularity {
            Granularity::Weekly => bucket_label(bucket),
            Granularity::Monthly => format!("{:02}/{}", bucket.period_index, bucket.year),
        },
    }
}

fn write_rows<W: Write>(layout: &mut Layout<'_, W>, rows: &[AggregationRow]) -> Result<(), RenderError> {
    for row in rows {
        layout.line(&format!("{}: {}", report_label(&row.key), money(row.total)), Style::BODY)?;
    }
    Ok(())
}

fn write_document<W: Write>(
    sink: W,
    report: &ReportModel,
    generated_on: NaiveDate,
    cancel: CancelFlag,
) -> Result<W, RenderError> {
    let mut pdf = PdfWriter::new(sink, cancel);
    pdf.begin()?;

    let mut layout = Layout::new(&mut pdf);
    layout.line(REPORT_TITLE, Style::TITLE)?;
    layout.move_down(TITLE_SIZE);

    layout.line(&format!("User: {}", report.owner_label), Style::SUMMARY)?;
    layout.line(&format!("Total Spent: {}", money(report.grand_total)), Style::SUMMARY)?;
    layout.line(&format!("Report Period: {}", report.generated_period), Style::SUMMARY)?;
    layout.line(&format!("Generated: {}", generated_on.format("%Y-%m-%d")), Style::SUMMARY)?;
    layout.move_down(SUMMARY_SIZE);

    layout.line("Category Breakdown:", Style::HEADING)?;
    if report.has_categories() {
        write_rows(&mut layout, &report.category_breakdown)?;
    } else {
        layout.line(NO_CATEGORIES, Style::BODY)?;
    }
    layout.move_down(BODY_SIZE);

    layout.line(&format!("Trends ({}):", report.generated_period), Style::HEADING)?;
    if report.has_trends() {
        write_rows(&mut layout, &report.trend_breakdown)?;
    } else {
        layout.line(NO_TRENDS, Style::BODY)?;
    }
    layout.finish()?;

    let pages = pdf.page_count();
    let creation = format!("D:{}", generated_on.format("%Y%m%d"));
    let sink = pdf.finish(&[
        ("Title", REPORT_TITLE),
        ("Author", &report.owner_label),
        ("Producer", "spendlens"),
        ("CreationDate", &creation),
    ])?;
    debug!(pages, "report document finalized");
    Ok(sink)
}

/// Single-use report renderer writing into `W`.
pub struct DocumentRenderer<W: Write> {
    state: RenderState,
    sink: Option<W>,
    generated_on: NaiveDate,
    cancel: CancelFlag,
}

impl<W: Write> DocumentRenderer<W> {
    pub fn new(sink: W, generated_on: NaiveDate) -> Self {
        Self {
            state: RenderState::Idle,
            sink: Some(sink),
            generated_on,
            cancel: CancelFlag::new(),
        }
    }

    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn state(&self) -> RenderState {
        self.state
    }

    /// Write the whole document and return the sink once it is complete.
    pub fn render(&mut self, report: &ReportModel) -> Result<W, RenderError> {
        let sink = match (self.state, self.sink.take()) {
            (RenderState::Idle, Some(sink)) => sink,
            (state, _) => return Err(RenderError::AlreadyUsed(state)),
        };

        self.state = RenderState::Writing;
        match write_document(sink, report, self.generated_on, self.cancel.clone()) {
            Ok(sink) => {
                self.state = RenderState::Finalized;
                Ok(sink)
            }
            Err(e) => {
                self.state = RenderState::Failed;
                warn!(error = %e, "report rendering failed");
                Err(e)
            }
        }
    }
}

/// Render `report` into a fresh buffer.
pub fn render(report: &ReportModel, generated_on: NaiveDate) -> Result<Vec<u8>, RenderError> {
    DocumentRenderer::new(Vec::new(), generated_on).render(report)
}
