use clap::Command;
use statedb_cli::{exec_subcommand, get_subcommands, Config};

fn main() {
    env_logger::init();
    let config = Config::load();

    let matches = get_command().get_matches();
    let (cmd, args) = matches.subcommand().expect("subcommand_required");

    if let Err(err) = exec_subcommand(&config, cmd, args) {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn get_command() -> Command {
    Command::new("statedb")
        .about("Durable, append-only JSON-record log persistence core")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommands(get_subcommands())
}
