use std::io;

use thiserror::Error;

/// Errors returned by [`crate::Log`] operations.
///
/// Mirrors the shape of `commitlog::error::Traversal`: a small set of named
/// failure modes, each of which can carry the byte offset at which it was
/// detected, plus a catch-all [`Error::Io`] for everything the OS hands us.
#[derive(Debug, Error)]
pub enum Error {
    #[error("record at offset {offset}: header is malformed: {reason}")]
    BadHeader { offset: u64, reason: String },

    #[error("record at offset {offset}: expected magic {expected:?}, found {found:?}")]
    MagicMismatch {
        offset: u64,
        expected: &'static str,
        found: String,
    },

    #[error("record at offset {offset}: truncated (expected {expected} more bytes)")]
    Truncated { offset: u64, expected: u64 },

    #[error("record at offset {offset}: checksum mismatch")]
    ChecksumMismatch { offset: u64 },

    #[error("record at offset {offset}: payload is not valid JSON: {source}")]
    InvalidJson {
        offset: u64,
        #[source]
        source: serde_json::Error,
    },

    #[error("path already exists: {0}")]
    AlreadyExists(std::path::PathBuf),

    #[error("log is open read-only")]
    ReadOnly,

    #[error("failed to encode record as JSON: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
