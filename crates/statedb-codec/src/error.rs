use thiserror::Error;

/// Errors decoding a transaction delta. Every variant here aborts the whole
/// transaction -- a partial delta never reaches the engine.
#[derive(Debug, Error)]
pub enum Error {
    #[error("delta is not a JSON object")]
    NotAnObject,

    #[error("table {0:?} does not exist in the current schema")]
    UnknownTable(String),

    #[error("column {column:?} does not exist on table {table:?}")]
    UnknownColumn { table: String, column: String },

    #[error("table {table:?} row {uuid:?} value is neither null nor an object")]
    InvalidRowValue { table: String, uuid: String },

    #[error("row key {0:?} is not a valid UUID")]
    InvalidUuid(String),

    #[error(transparent)]
    Datum(#[from] statedb_model::Error),

    #[error(transparent)]
    Engine(#[from] statedb_engine::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
