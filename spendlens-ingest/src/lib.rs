//! spendlens-ingest: input boundary for new transactions (validation, local
//! time parsing, CSV import).

pub mod parsers;
pub mod timestamp;
pub mod types;
pub mod validate;

pub use parsers::{parse_expense_csv, parse_expense_csv_path, CsvImport, RowError};
pub use timestamp::{parse_occurred_at, parse_timezone};
pub use types::{NewTransaction, RawTransaction};
pub use validate::{parse_amount, validate_new};
