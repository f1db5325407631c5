pub mod compact;
pub mod convert;
pub mod create;
pub mod db_info;
pub mod needs_conversion;
pub mod query;
pub mod schema_info;
pub mod show_log;
pub mod transact;

use std::path::{Path, PathBuf};

use clap::{Arg, ArgMatches};

/// Shared `[db]` positional, falling back to the configured default path.
pub(crate) fn arg_db() -> Arg {
    Arg::new("db").help("Path to the database log file").required(false)
}

pub(crate) fn db_path(args: &ArgMatches, default: &Path) -> PathBuf {
    args.get_one::<String>("db").map(PathBuf::from).unwrap_or_else(|| default.to_path_buf())
}

pub(crate) fn schema_path(args: &ArgMatches, default: &Path) -> PathBuf {
    args.get_one::<String>("schema").map(PathBuf::from).unwrap_or_else(|| default.to_path_buf())
}

/// Resolves a `[db] required` pair collected into a single variadic `args`
/// positional, the way `db_arg_resolution::resolve_optional_database_parts`
/// tells an optional leading database argument apart from a trailing
/// required one: one value present means it's the required argument alone
/// (db falls back to `default`); two values means the first is the db path.
pub(crate) fn resolve_db_and_required(args: &ArgMatches, default: &Path, required_name: &str) -> anyhow::Result<(PathBuf, PathBuf)> {
    let parts: Vec<&String> = args.get_many::<String>("args").into_iter().flatten().collect();
    match parts.as_slice() {
        [only] => Ok((default.to_path_buf(), PathBuf::from(*only))),
        [db, required] => Ok((PathBuf::from(*db), PathBuf::from(*required))),
        _ => Err(anyhow::anyhow!("expected `[db] {required_name}`, got {} argument(s)", parts.len())),
    }
}

/// Read a transaction delta file: the same JSON shape a log record carries,
/// applied directly against the open database rather than replayed from a
/// log. Stands in for a query/RPC execution engine, which is out of scope
/// here -- `query`/`transact` only need the right argv shape and exit code.
pub(crate) fn read_txn_file(path: &Path) -> anyhow::Result<serde_json::Value> {
    let text = std::fs::read_to_string(path).map_err(|e| anyhow::anyhow!("{}: {e}", path.display()))?;
    Ok(serde_json::from_str(&text)?)
}
