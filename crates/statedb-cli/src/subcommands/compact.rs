use clap::{Arg, ArgMatches, Command};
use statedb_file::{DatabaseFile, OpenOptions};

use crate::config::Config;
use crate::subcommands::{arg_db, db_path};

pub fn cli() -> Command {
    Command::new("compact")
        .about("Rewrite the log down to schema + one snapshot, in place or to a copy")
        .arg(arg_db())
        .arg(Arg::new("dst").help("Write a snapshot copy here instead of compacting in place").required(false))
}

pub fn exec(config: &Config, args: &ArgMatches) -> anyhow::Result<()> {
    let db = db_path(args, &config.default_db_path);
    let dst = args.get_one::<String>("dst");

    let mut file = DatabaseFile::open(
        &db,
        OpenOptions {
            read_only: dst.is_some(),
            ..OpenOptions::default()
        },
    )?;

    match dst {
        Some(dst) => file.snapshot_to(dst)?,
        None => file.compact()?,
    }
    Ok(())
}
