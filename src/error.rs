//! Error taxonomy for order table operations

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or transforming an [`OrderTable`](crate::OrderTable)
#[derive(Error, Debug)]
pub enum TableError {
    #[error("orders file not found: {}", .0.display())]
    ResourceNotFound(PathBuf),

    #[error("malformed orders file: {0}")]
    Format(String),

    #[error("column `{0}` is not present in the table")]
    MissingColumn(String),

    #[error("invalid column name {0:?}")]
    InvalidColumnName(String),

    #[error("column `{0}` already exists")]
    DuplicateColumn(String),

    #[error("expected {expected} values (one per row), got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("cannot coerce value {value} in column `{column}` at row {row}")]
    TypeCoercion {
        column: String,
        row: usize,
        value: String,
    },

    #[error("sum of `{0}` values overflows a 64-bit integer")]
    AmountOverflow(String),

    #[error(transparent)]
    Polars(#[from] polars::error::PolarsError),
}

impl TableError {
    pub(crate) fn coercion(column: &str, row: usize, value: impl ToString) -> Self {
        TableError::TypeCoercion {
            column: column.to_string(),
            row,
            value: value.to_string(),
        }
    }
}
