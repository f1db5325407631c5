//! Renders a statedb log's records as a human-readable report.
//!
//! Recognizes both the standalone log format (the persistence core this
//! workspace implements) and the clustered, consensus-replicated format
//! (recognized only -- this crate never opens a clustered log for replay,
//! it just prints the fields a reader would recognize by name).
//!
//! The render loop (timestamp, then a tag, then a body) follows
//! `cli::subcommands::logs::exec`, adapted from streaming server log lines
//! as they arrive to replaying on-disk records after the fact.

mod error;
mod render;

pub use error::{Error, Result};
pub use render::{inspect, Verbosity};
