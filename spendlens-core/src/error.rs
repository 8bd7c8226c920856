use thiserror::Error;

/// Rejections raised at the request/input boundary. The engine itself never
/// produces these; it only ever sees already-validated values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid period '{0}': must be \"weekly\" or \"monthly\"")]
    InvalidPeriod(String),
    #[error("report type is required: only \"download\" is supported")]
    MissingReportType,
    #[error("unsupported report type '{0}': only \"download\" is supported")]
    UnsupportedReportType(String),
    #[error("invalid category '{0}'")]
    InvalidCategory(String),
    #[error("invalid amount '{value}': {reason}")]
    InvalidAmount { value: String, reason: &'static str },
    #[error("invalid date '{value}': {reason}")]
    InvalidDate { value: String, reason: String },
    #[error("invalid timezone '{0}'")]
    InvalidTimezone(String),
    #[error("missing field '{0}'")]
    MissingField(&'static str),
}

/// Failures reported by a transaction store. Passed through untouched.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed record at line {line}: {reason}")]
    Malformed { line: usize, reason: String },
    #[error("transaction not found: {0}")]
    NotFound(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
