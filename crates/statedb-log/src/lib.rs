//! An append-only, length-prefixed, checksummed log of JSON records.
//!
//! A record is framed as an ASCII header line `<MAGIC> <LEN> <SHA1>\n`
//! followed by exactly `LEN` bytes of UTF-8 JSON payload and a trailing
//! `\n`. Records are read back strictly sequentially; there is no index.
//!
//! This mirrors the session/repo split of `commitlog::repo::Fs`, simplified
//! to a single un-segmented file per log, with a text header and a SHA-1
//! checksum in place of binary framing and CRC32C.

mod error;
mod log;

pub use error::{Error, Result};
pub use log::{peek_magic, Locking, Log, Mode};

/// The two magic tokens a log's header line may carry.
pub mod magic {
    /// A standalone (single-node) database log.
    pub const STANDALONE: &str = "SDB1";
    /// A clustered, consensus-replicated database log. Recognized by
    /// `statedb-inspect` for rendering only; never opened for replay here.
    pub const CLUSTERED: &str = "SDBC";
}
