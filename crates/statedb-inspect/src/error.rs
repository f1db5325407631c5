use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0} is neither a standalone nor a clustered statedb log")]
    UnrecognizedMagic(String),

    #[error(transparent)]
    Log(#[from] statedb_log::Error),

    #[error(transparent)]
    Schema(#[from] statedb_model::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
