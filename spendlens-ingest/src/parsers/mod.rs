pub mod expense_csv;

pub use expense_csv::{parse_expense_csv, parse_expense_csv_path, CsvImport, RowError};
