use clap::{Arg, ArgMatches, Command};

use crate::config::Config;
use crate::subcommands::{arg_db, db_path, schema_path};

pub fn cli() -> Command {
    Command::new("create")
        .about("Write a fresh log containing only a schema record")
        .arg(arg_db())
        .arg(Arg::new("schema").help("Path to a JSON schema document").required(false))
}

pub fn exec(config: &Config, args: &ArgMatches) -> anyhow::Result<()> {
    let db = db_path(args, &config.default_db_path);
    let schema = schema_path(args, &config.default_schema_path);

    let schema = statedb_file::read_schema_file(&schema)?;
    statedb_file::DatabaseFile::create(&db, schema)?;
    log::info!("created {}", db.display());
    Ok(())
}
