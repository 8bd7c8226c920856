//! Expense CSV import.
//!
//! Expected header (case-insensitive, any column order, extra columns ignored):
//!   date,amount,category,description
//!
//! `description` is optional. Rows that fail validation are collected as
//! `RowError`s and skipped; the rest are returned in file order.

use anyhow::{bail, Context, Result};
use std::io::Read;
use std::path::Path;

use crate::types::{NewTransaction, RawTransaction};
use crate::validate::validate_new;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    /// 1-based line number in the file, header included
    pub line: u64,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvImport {
    pub rows: Vec<NewTransaction>,
    pub rejected: Vec<RowError>,
}

struct Columns {
    date: usize,
    amount: usize,
    category: usize,
    description: Option<usize>,
}

impl Columns {
    fn from_header(header: &csv::StringRecord) -> Result<Self> {
        let find = |name: &str| {
            header
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let required = |name: &str| match find(name) {
            Some(i) => Ok(i),
            None => bail!("missing '{name}' column in header"),
        };

        Ok(Self {
            date: required("date")?,
            amount: required("amount")?,
            category: required("category")?,
            description: find("description"),
        })
    }

    fn raw(&self, record: &csv::StringRecord) -> RawTransaction {
        let field = |i: usize| record.get(i).map(str::to_string);
        RawTransaction {
            amount: field(self.amount),
            date: field(self.date),
            category: field(self.category),
            description: self.description.and_then(field),
        }
    }
}

/// Parse expense rows from any reader, interpreting local times in `tz`.
pub fn parse_expense_csv<R: Read>(reader: R, tz: &str) -> Result<CsvImport> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns = Columns::from_header(rdr.headers().context("reading CSV header")?)?;
    let mut import = CsvImport::default();

    for result in rdr.records() {
        let record = result.context("reading CSV row")?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();

        // skip fully blank rows
        if record.iter().all(|f| f.is_empty()) {
            continue;
        }

        match validate_new(&columns.raw(&record), tz) {
            Ok(new) => import.rows.push(new),
            Err(e) => import.rejected.push(RowError {
                line,
                reason: e.to_string(),
            }),
        }
    }

    Ok(import)
}

pub fn parse_expense_csv_path(path: impl AsRef<Path>, tz: &str) -> Result<CsvImport> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
    parse_expense_csv(file, tz).with_context(|| format!("parsing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use spendlens_core::Category;

    #[test]
    fn test_parses_rows_and_collects_rejects() {
        let text = "\
Category,Date,Amount,Description
food,2024-01-05,12.50,Lunch
travel,2024-01-06,\"$1,200.00\",Flights
bills,2024-01-07,-4,Refund?
,,,
entertainment,2024-01-08 20:15,15,
";
        let import = parse_expense_csv(text.as_bytes(), "America/Chicago").unwrap();

        assert_eq!(import.rows.len(), 3);
        assert_eq!(import.rows[0].category, Category::Food);
        assert_eq!(import.rows[1].amount, Decimal::from(1200));
        assert_eq!(import.rows[1].description.as_deref(), Some("Flights"));
        assert!(import.rows[2].description.is_none());
        assert_eq!(import.rows[2].occurred_at.to_rfc3339(), "2024-01-09T02:15:00+00:00");

        assert_eq!(import.rejected.len(), 1);
        assert_eq!(import.rejected[0].line, 4);
        assert!(import.rejected[0].reason.contains("greater than zero"));
    }

    #[test]
    fn test_description_column_is_optional() {
        let text = "date,amount,category\n2024-02-01,3,other\n";
        let import = parse_expense_csv(text.as_bytes(), "UTC").unwrap();
        assert_eq!(import.rows.len(), 1);
        assert!(import.rejected.is_empty());
    }

    #[test]
    fn test_missing_required_column() {
        let text = "date,category\n2024-02-01,other\n";
        let err = parse_expense_csv(text.as_bytes(), "UTC").unwrap_err();
        assert!(err.to_string().contains("amount"));
    }
}
