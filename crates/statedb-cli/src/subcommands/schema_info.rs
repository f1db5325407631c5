use clap::{Arg, ArgMatches, Command};

use crate::config::Config;
use crate::subcommands::{db_info::Field, schema_path};

pub fn cli(name: &'static str, about: &'static str) -> Command {
    Command::new(name)
        .about(about)
        .arg(Arg::new("schema").help("Path to a JSON schema document").required(false))
}

pub fn exec(config: &Config, args: &ArgMatches, field: Field) -> anyhow::Result<()> {
    let schema_file = schema_path(args, &config.default_schema_path);
    let schema = statedb_file::read_schema_file(&schema_file)?;
    match field {
        Field::Name => println!("{}", schema.name),
        Field::Version => println!("{}", schema.version),
        Field::Checksum => println!("{}", schema.checksum),
    }
    Ok(())
}
