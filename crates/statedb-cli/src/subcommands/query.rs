use clap::{Arg, ArgMatches, Command};
use statedb_file::{DatabaseFile, OpenOptions};

use crate::config::Config;
use crate::subcommands::{read_txn_file, resolve_db_and_required};

pub fn cli() -> Command {
    Command::new("query")
        .about("Read-only execute a transaction delta file against a database")
        .arg(
            Arg::new("args")
                .help("[db] txn -- db defaults to the configured path if only txn is given")
                .num_args(1..=2)
                .required(true),
        )
}

/// Decodes and applies the transaction against the in-memory database only
/// -- the file is opened read-only, so nothing is appended to the log.
pub fn exec(config: &Config, args: &ArgMatches) -> anyhow::Result<()> {
    let (db, txn_path) = resolve_db_and_required(args, &config.default_db_path, "txn")?;

    let mut file = DatabaseFile::open(&db, OpenOptions { read_only: true, ..OpenOptions::default() })?;
    let delta = read_txn_file(&txn_path)?;
    let txn = statedb_codec::decode(&delta, file.database(), file.is_converting())?;
    let changes = txn.commit(file.database_mut())?;
    println!("{} change(s) applied (not persisted)", changes.len());
    Ok(())
}
