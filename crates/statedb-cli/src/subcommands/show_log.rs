use clap::{Arg, ArgAction, ArgMatches, Command};
use statedb_inspect::Verbosity;

use crate::config::Config;
use crate::subcommands::{arg_db, db_path};

pub fn cli() -> Command {
    Command::new("show-log")
        .about("Print a human-readable rendering of a log's records")
        .arg(arg_db())
        .arg(
            Arg::new("verbose")
                .short('m')
                .action(ArgAction::Count)
                .help("Increase verbosity; repeatable"),
        )
}

pub fn exec(config: &Config, args: &ArgMatches) -> anyhow::Result<()> {
    let db = db_path(args, &config.default_db_path);
    let verbosity = Verbosity(args.get_count("verbose"));
    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    statedb_inspect::inspect(&db, verbosity, &mut lock)?;
    Ok(())
}
