use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, RosterError>;

/// Error type covering the failures that can occur while the tool validates
/// input, edits the roster tables, or moves a workbook to and from disk.
#[derive(Debug, Error)]
pub enum RosterError {
    /// Raised when a record identifier has a length outside the accepted range.
    #[error("invalid identifier '{value}': expected 17 to 22 characters, got {length}")]
    InvalidIdentifier { value: String, length: usize },

    /// Raised when the identifier does not appear in the primary table.
    #[error("record '{0}' not found in the schedule table")]
    RecordNotFound(String),

    /// Raised when the operation context is wrong (sheet, column, range) or
    /// the tables taking part in an operation do not line up.
    #[error("precondition violated: {0}")]
    PreconditionViolation(String),

    /// Raised when an A1 cell or range reference cannot be parsed.
    #[error("invalid cell reference '{0}'")]
    InvalidReference(String),

    /// Raised when a layout configuration is internally inconsistent.
    #[error("invalid layout: {0}")]
    InvalidLayout(String),

    /// Raised when a sheet referenced by the layout is absent from the workbook.
    #[error("missing sheet '{0}'")]
    MissingSheet(String),

    /// Raised when a sheet does not follow the expected conventions.
    #[error("invalid workbook structure: {0}")]
    InvalidWorkbook(String),

    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON parsing or serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
