//! chunkcache - digest location cache for chunked layers
//!
//! CLI entry point that dispatches to subcommands.

use chunkcache::cli::{commands, Cli, Commands};
use chunkcache::config::ConfigManager;
use chunkcache::error::ChunkedResult;
use clap::Parser;
use console::style;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

fn run() -> ChunkedResult<()> {
    let cli = Cli::parse();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let config = config_manager.load()?;

    // 0 = warn, 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("chunkcache=warn"),
        1 => EnvFilter::new("chunkcache=info"),
        _ => EnvFilter::new("chunkcache=debug"),
    };

    if config.general.json_logs() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .without_time()
            .init();
    }

    match cli.command {
        Commands::Build(args) => commands::build(args, &config),
        Commands::Lookup(args) => commands::lookup(args, &config),
        Commands::Holes(args) => commands::holes(args, &config),
        Commands::Config(args) => commands::config(args, &config, &config_manager),
    }
}
