//! Reportpull CLI - pull reporting API queries into local files

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::Cli;
use commands::common::ExitCode;
use commands::{ls, run, urls, validate};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    if let Err(err) = dispatch(&cli) {
        if let Some(code) = err.downcast_ref::<ExitCode>() {
            std::process::exit(code.0);
        }
        eprintln!("Error: {:#}", err);
        std::process::exit(commands::common::exit_code_for(&err));
    }
}

fn dispatch(cli: &Cli) -> Result<()> {
    match &cli.command {
        cli::Commands::Run(args) => run::execute(args, &cli.global),
        cli::Commands::Ls(args) => ls::execute(args, &cli.global),
        cli::Commands::Urls(args) => urls::execute(args, &cli.global),
        cli::Commands::Validate(args) => validate::execute(args, &cli.global),
    }
}

/// Log to stderr at `info` (`debug` with `-v`); `RUST_LOG` still wins.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_secs()
        .format_target(false)
        .init();
}
