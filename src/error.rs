// Error taxonomy for plot configuration and data access

use thiserror::Error;

/// Errors in how plots were described on the command line.
/// Raised before any chart is built; nothing is rendered after one of these.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no fields given for {flag}")]
    EmptyFieldGroup { flag: &'static str },

    #[error("{flag} was given {found} time(s), expected {expected} to match -x")]
    GroupCountMismatch {
        flag: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("{flag} group {group} has {found} field(s), expected {expected}")]
    GroupLengthMismatch {
        flag: &'static str,
        group: usize,
        expected: usize,
        found: usize,
    },

    #[error("--scatter requires both -x and -y fields")]
    MissingScatterFields,
}

/// Errors loading the table or reading columns out of it.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("column '{column}' not found")]
    ColumnNotFound { column: String },

    #[error("CSV has no header row")]
    MissingHeader,

    #[error("row {row} has {found} field(s), expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
