//! mdns-scout - command-line front-end for per-interface mDNS discovery.
//!
//! Lists network interfaces, searches one of them for a service type, or scans
//! every interface in turn and reports what each one found.

mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use error::{exit_codes, CliError};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = run(cli).await;

    match result {
        Ok(()) => std::process::exit(exit_codes::SUCCESS),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(e.exit_code());
        }
    }
}

/// Log to stderr; `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let overrides = cli.overrides();
    let backend = cli.backend();
    let executor = cli.executor_config();

    match cli.command {
        Commands::Interfaces => commands::run_interfaces(backend, executor, cli.json).await,
        Commands::Search(args) => {
            commands::run_search(args, backend, overrides, executor, cli.json).await
        }
        Commands::Auto(args) => {
            commands::run_auto(args, backend, overrides, executor, cli.json).await
        }
        Commands::Config(args) => commands::run_config(args, cli.json).await,
    }
}
