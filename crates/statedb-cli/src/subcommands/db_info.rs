use clap::{ArgMatches, Command};

use crate::config::Config;
use crate::subcommands::{arg_db, db_path};

/// Which schema field a `db-name`/`db-version`/`db-cksum` invocation reads.
#[derive(Clone, Copy)]
pub enum Field {
    Name,
    Version,
    Checksum,
}

pub fn cli(name: &'static str, about: &'static str) -> Command {
    Command::new(name).about(about).arg(arg_db())
}

pub fn exec(config: &Config, args: &ArgMatches, field: Field) -> anyhow::Result<()> {
    let db = db_path(args, &config.default_db_path);
    let schema = statedb_file::peek_schema(&db)?;
    match field {
        Field::Name => println!("{}", schema.name),
        Field::Version => println!("{}", schema.version),
        Field::Checksum => println!("{}", schema.checksum),
    }
    Ok(())
}
