//! Error types for bulksql

use thiserror::Error;

/// Result type alias for statement building.
pub type BuildResult<T> = Result<T, ValidationError>;

/// Structural problems found while building a statement.
///
/// These are raised synchronously from [`Transaction::build`](crate::Transaction::build)
/// before any SQL reaches a database. They describe a caller defect and are never
/// worth retrying.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The row batch is empty
    #[error("Validation error: requires non-empty rows")]
    EmptyRows,

    /// The first row has no columns
    #[error("Validation error: first row must be a non-empty mapping")]
    InvalidFirstRow,

    /// A row lacks a column that the batch requires
    #[error("Validation error: row {row} is missing column '{column}'")]
    MissingColumn { row: usize, column: String },

    /// A row carries a column the first row does not have
    #[error("Validation error: row {row} has unexpected column '{column}'")]
    UnexpectedColumn { row: usize, column: String },

    /// No identifiers were given to a by-identifier statement
    #[error("Validation error: requires non-empty identifiers")]
    EmptyIdentifiers,

    /// Row cap must be positive
    #[error("Validation error: limit must be greater than 0, got {0}")]
    InvalidLimit(i64),

    /// Upsert or bulk update without columns to update
    #[error("Validation error: requires non-empty update columns")]
    EmptyUpdateColumns,

    /// Upsert update columns that are not part of the inserted rows
    #[error("Validation error: update columns not present in rows: {}", .0.join(", "))]
    UnknownUpdateColumns(Vec<String>),

    /// Plain update without any SET values
    #[error("Validation error: requires non-empty column values")]
    EmptyColumnValues,

    /// A single row binds more parameters than one statement allows
    #[error("Validation error: {columns} columns exceed the limit of {max} parameters per statement")]
    TooManyColumns { columns: usize, max: usize },
}

impl ValidationError {
    pub(crate) fn missing_column(row: usize, column: impl Into<String>) -> Self {
        Self::MissingColumn {
            row,
            column: column.into(),
        }
    }

    pub(crate) fn unexpected_column(row: usize, column: impl Into<String>) -> Self {
        Self::UnexpectedColumn {
            row,
            column: column.into(),
        }
    }

    /// Index of the offending row, when the error concerns a single row.
    pub fn row(&self) -> Option<usize> {
        match self {
            Self::MissingColumn { row, .. } | Self::UnexpectedColumn { row, .. } => Some(*row),
            _ => None,
        }
    }

    /// Name of the offending column, when the error concerns a single column.
    pub fn column(&self) -> Option<&str> {
        match self {
            Self::MissingColumn { column, .. } | Self::UnexpectedColumn { column, .. } => {
                Some(column)
            }
            _ => None,
        }
    }

    /// Check if this error is about a row missing a required column
    pub fn is_missing_column(&self) -> bool {
        matches!(self, Self::MissingColumn { .. })
    }
}
