//! Binds a [`statedb_log::Log`] to a live [`statedb_engine::Database`]:
//! replay on open, encode-and-append on commit, and the compaction gate
//! that periodically rewrites the log down to schema + one snapshot.

mod error;
mod file;
mod policy;
mod snapshot;

pub use error::{Error, Result};
pub use file::{peek_schema, read_schema_file, schema_needs_conversion, DatabaseFile, OpenOptions};
pub use policy::CompactionPolicy;
pub use snapshot::write_snapshot;

use std::time::{SystemTime, UNIX_EPOCH};

pub(crate) fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
