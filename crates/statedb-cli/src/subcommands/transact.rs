use clap::{Arg, ArgAction, ArgMatches, Command};
use statedb_file::{DatabaseFile, OpenOptions};

use crate::config::Config;
use crate::subcommands::{read_txn_file, resolve_db_and_required};

pub fn cli() -> Command {
    Command::new("transact")
        .about("Read-write execute a transaction delta file, appending to the log")
        .arg(
            Arg::new("args")
                .help("[db] txn -- db defaults to the configured path if only txn is given")
                .num_args(1..=2)
                .required(true),
        )
        .arg(
            Arg::new("no_durable")
                .long("no-durable")
                .action(ArgAction::SetTrue)
                .help("Skip fsync of the appended record"),
        )
}

pub fn exec(config: &Config, args: &ArgMatches) -> anyhow::Result<()> {
    let (db, txn_path) = resolve_db_and_required(args, &config.default_db_path, "txn")?;
    let durable = !args.get_flag("no_durable");

    let mut file = DatabaseFile::open(&db, OpenOptions::default())?;
    let delta = read_txn_file(&txn_path)?;
    let txn = statedb_codec::decode(&delta, file.database(), file.is_converting())?;
    file.commit(txn, durable)?;
    Ok(())
}
