use thiserror::Error;

/// Errors from the schema/datum model.
///
/// Mirrors `core::error::DBError`'s shape: a handful of named variants, each
/// carrying enough context to build a useful message without the caller
/// needing to pattern-match further.
#[derive(Debug, Error)]
pub enum Error {
    #[error("schema is not a JSON object")]
    NotAnObject,

    #[error("schema is missing required field {0:?}")]
    MissingField(&'static str),

    #[error("table {table:?} is missing required field {field:?}")]
    MissingTableField { table: String, field: &'static str },

    #[error("table {table:?} column {column:?} is missing required field {field:?}")]
    MissingColumnField {
        table: String,
        column: String,
        field: &'static str,
    },

    #[error("unknown column type {0:?}")]
    UnknownColumnType(String),

    #[error("expected a value of type {expected:?}, found {found}")]
    TypeMismatch { expected: crate::ColumnType, found: String },

    #[error("invalid base64 for bytes column: {0}")]
    InvalidBytes(#[from] base64::DecodeError),
}

pub type Result<T> = std::result::Result<T, Error>;
