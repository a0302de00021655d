//! I/O error types for cairn-io.

use std::path::PathBuf;

/// Errors from opening, parsing, and validating a sample file.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when the input file does not exist or is unreadable.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the CSV parser encounters a malformed record.
    #[error("CSV parse error in {path} at byte offset {offset}")]
    CsvParse {
        /// Path to the CSV file.
        path: PathBuf,
        /// Byte offset where the error occurred.
        offset: u64,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Returned when the file contains no data rows.
    #[error("empty dataset (no data rows) in {path}")]
    EmptyDataset {
        /// Path to the CSV file.
        path: PathBuf,
    },

    /// Returned when the first data row has a label but no feature columns.
    #[error("no feature columns in {path}: rows need a label followed by at least one value")]
    NoFeatureColumns {
        /// Path to the CSV file.
        path: PathBuf,
    },

    /// Returned when a data row has a different number of columns than the first one.
    #[error(
        "inconsistent row length in {path}: row {row_index} has {got} columns, expected {expected}"
    )]
    InconsistentRowLength {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based data row index (excluding header and blank lines).
        row_index: usize,
        /// Column count of the first data row.
        expected: usize,
        /// Actual number of columns in this row.
        got: usize,
    },

    /// Returned when the label column is not an integer.
    #[error("invalid label in {path}: row {row_index}, raw value \"{raw}\"")]
    InvalidLabel {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based data row index.
        row_index: usize,
        /// The raw string value that failed to parse.
        raw: String,
    },

    /// Returned when a feature value is NaN, Inf, or otherwise not a finite float.
    #[error("non-finite value in {path}: row {row_index}, column {col_index}, raw value \"{raw}\"")]
    NonFiniteValue {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based data row index.
        row_index: usize,
        /// Zero-based feature index (excluding the label column).
        col_index: usize,
        /// The raw string value that failed to parse.
        raw: String,
    },
}
