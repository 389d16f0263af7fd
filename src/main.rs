use clap::Parser;
use colored::*;
use std::process;
use taxbridge::cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins, then TAXBRIDGE_LOG, then -v
    let log_level = std::env::var("TAXBRIDGE_LOG").unwrap_or_else(|_| {
        match cli.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
        .to_string()
    });

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        process::exit(exit_code(&e));
    }
}

fn exit_code(e: &anyhow::Error) -> i32 {
    use taxbridge::TaxbridgeError;

    match e.downcast_ref::<TaxbridgeError>() {
        Some(TaxbridgeError::Configuration(_)) => 2,
        Some(TaxbridgeError::Io(_)) => 3,
        Some(TaxbridgeError::Parse(_)) | Some(TaxbridgeError::Csv(_)) => 4,
        Some(TaxbridgeError::Persistence { .. }) | Some(TaxbridgeError::Sqlite(_)) => 5,
        Some(TaxbridgeError::Cancelled) => 130,
        _ => 1,
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Map(mut args) => {
            args.quiet = cli.quiet;
            taxbridge::cli::commands::map::run(args)
        }
        Commands::CommonNames(mut args) => {
            args.quiet = cli.quiet;
            taxbridge::cli::commands::common_names::run(args)
        }
        Commands::Config(args) => taxbridge::cli::commands::config::run(args),
    }
}
