use clap::{Arg, ArgMatches, Command};
use statedb_file::{DatabaseFile, OpenOptions};

use crate::config::Config;
use crate::subcommands::{arg_db, db_path, schema_path};

pub fn cli() -> Command {
    Command::new("convert")
        .about("Reopen a log under an alternate schema (converting mode) and write it out")
        .arg(arg_db())
        .arg(Arg::new("schema").help("Path to the alternate JSON schema document").required(false))
        .arg(Arg::new("dst").help("Write the converted snapshot here instead of in place").required(false))
}

pub fn exec(config: &Config, args: &ArgMatches) -> anyhow::Result<()> {
    let db = db_path(args, &config.default_db_path);
    let schema = schema_path(args, &config.default_schema_path);
    let dst = args.get_one::<String>("dst");

    let alt_schema = statedb_file::read_schema_file(&schema)?;
    let mut file = DatabaseFile::open(
        &db,
        OpenOptions {
            alt_schema: Some(alt_schema),
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
