//! Schema, column type and datum model.
//!
//! This is the "external collaborator" named by the persistence core's
//! consumed-interface list, given a concrete, minimal implementation: no
//! indexes, no query planning, just enough structure for `statedb-engine`
//! and `statedb-codec` to build on.

mod column;
mod datum;
mod error;
mod schema;

pub use column::{ColumnSchema, ColumnType};
pub use datum::Datum;
pub use error::{Error, Result};
pub use schema::{schema_equal, Schema, TableSchema};
