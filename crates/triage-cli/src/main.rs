//! CLI entry point for triage.

mod cli;
mod report;

use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() {
    // Missing .env is fine; variables may come from the real environment
    let _ = dotenvy::dotenv();

    let args = cli::Cli::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = cli::run(args) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
