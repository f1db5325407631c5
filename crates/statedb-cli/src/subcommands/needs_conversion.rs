use clap::{Arg, ArgMatches, Command};

use crate::config::Config;
use crate::subcommands::{arg_db, db_path, schema_path};

pub fn cli() -> Command {
    Command::new("needs-conversion")
        .about("Print yes/no: would opening db under schema require converting mode?")
        .arg(arg_db())
        .arg(Arg::new("schema").help("Path to the candidate JSON schema document").required(false))
}

pub fn exec(config: &Config, args: &ArgMatches) -> anyhow::Result<()> {
    let db = db_path(args, &config.default_db_path);
    let schema = schema_path(args, &config.default_schema_path);

    let current = statedb_file::peek_schema(&db)?;
    let candidate = statedb_file::read_schema_file(&schema)?;

    println!("{}", if statedb_file::schema_needs_conversion(&current, &candidate) { "yes" } else { "no" });
    Ok(())
}
