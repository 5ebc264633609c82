use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;
use std::process::ExitCode;

mod cli_bin;

use cli_bin::args::{Cli, Commands};
use cli_bin::commands::{error_message, locate_command, LocateOptions};

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.debug)?;

    let result = match &cli.command {
        Commands::Locate(args) => {
            let options = LocateOptions {
                silent: cli.silent,
                format: args.format.into(),
                pretty: args.pretty,
            };
            let stdout = std::io::stdout();
            locate_command(args, &options, &mut stdout.lock())
        }
    };

    match result {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            eprintln!("{}", error_message(&err));
            Ok(ExitCode::from(err.exit_code()))
        }
    }
}

/// Warnings by default, debug output with `--debug`; `RUST_LOG` overrides both
fn init_logging(debug: bool) -> Result<()> {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_target(false)
        .try_init()
        .context("failed to initialise logging")
}
