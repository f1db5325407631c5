//! Thin command-line frontend over the statedb persistence core.
//!
//! Option parsing and help text are deliberately unambitious here; the
//! dispatch shape (a `Vec<Command>` built by each subcommand's `cli()`,
//! matched by name in `exec_subcommand`) mirrors `cli::{get_subcommands,
//! exec_subcommand}`.

mod config;
mod subcommands;

use clap::{ArgMatches, Command};

pub use config::Config;
use subcommands::db_info::Field;

pub fn get_subcommands() -> Vec<Command> {
    vec![
        subcommands::create::cli(),
        subcommands::compact::cli(),
        subcommands::convert::cli(),
        subcommands::needs_conversion::cli(),
        subcommands::db_info::cli("db-name", "Print the schema name recorded in a database log"),
        subcommands::db_info::cli("db-version", "Print the schema version recorded in a database log"),
        subcommands::db_info::cli("db-cksum", "Print the schema checksum recorded in a database log"),
        subcommands::schema_info::cli("schema-name", "Print the name field of a standalone schema file"),
        subcommands::schema_info::cli("schema-version", "Print the version field of a standalone schema file"),
        subcommands::schema_info::cli("schema-cksum", "Print the checksum field of a standalone schema file"),
        subcommands::query::cli(),
        subcommands::transact::cli(),
        subcommands::show_log::cli(),
    ]
}

pub fn exec_subcommand(config: &Config, cmd: &str, args: &ArgMatches) -> anyhow::Result<()> {
    match cmd {
        "create" => subcommands::create::exec(config, args),
        "compact" => subcommands::compact::exec(config, args),
        "convert" => subcommands::convert::exec(config, args),
        "needs-conversion" => subcommands::needs_conversion::exec(config, args),
        "db-name" => subcommands::db_info::exec(config, args, Field::Name),
        "db-version" => subcommands::db_info::exec(config, args, Field::Version),
        "db-cksum" => subcommands::db_info::exec(config, args, Field::Checksum),
        "schema-name" => subcommands::schema_info::exec(config, args, Field::Name),
        "schema-version" => subcommands::schema_info::exec(config, args, Field::Version),
        "schema-cksum" => subcommands::schema_info::exec(config, args, Field::Checksum),
        "query" => subcommands::query::exec(config, args),
        "transact" => subcommands::transact::exec(config, args),
        "show-log" => subcommands::show_log::exec(config, args),
        unknown => Err(anyhow::anyhow!("unknown subcommand: {unknown}")),
    }
}
