use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("log has no schema record")]
    MissingSchemaRecord,

    #[error("database file is open read-only")]
    ReadOnly,

    #[error(transparent)]
    Log(#[from] statedb_log::Error),

    #[error(transparent)]
    Schema(#[from] statedb_model::Error),

    #[error(transparent)]
    Codec(#[from] statedb_codec::Error),

    #[error(transparent)]
    Engine(#[from] statedb_engine::Error),

    #[error("failed to encode snapshot record as JSON: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
