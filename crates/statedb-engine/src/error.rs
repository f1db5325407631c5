use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown table {0:?}")]
    UnknownTable(String),

    #[error("unknown column index {index} in table {table:?}")]
    UnknownColumn { table: String, index: usize },

    #[error("row {uuid} does not exist in table {table:?}")]
    RowNotFound { table: String, uuid: Uuid },

    #[error("row {uuid} already exists in table {table:?}")]
    RowAlreadyExists { table: String, uuid: Uuid },
}

pub type Result<T> = std::result::Result<T, Error>;
