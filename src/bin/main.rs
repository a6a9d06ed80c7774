//! CLI entry point: parses arguments, initializes logging, and dispatches to
//! the `compress`/`decompress`/`search` subcommand

use std::process::ExitCode;

use clap::Parser;
use schema_archive::cli::Cli;

fn main() -> ExitCode {
	tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).init();

	match Cli::parse().run() {
		Ok(()) => ExitCode::SUCCESS,
		Err(err) => {
			eprintln!("error: {err}");
			ExitCode::FAILURE
		}
	}
}
