//! modmap - dynamic module resolution with a compile cache
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use modmap::cli::{Cli, Commands};
use modmap::config::ConfigManager;
use modmap::error::{LoaderError, LoaderResult};
use std::process::ExitCode;
use tracing::debug;
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

fn run() -> LoaderResult<()> {
    let cli = Cli::parse();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };

    // Find local config unless --no-local is set
    let local_config_path = if cli.no_local {
        None
    } else {
        let cwd = std::env::current_dir()
            .map_err(|e| LoaderError::io("getting current directory", e))?;
        ConfigManager::find_local_config(&cwd)
    };

    let config = config_manager.load_merged(local_config_path.as_deref())?;
    init_logging(cli.verbose, &config.general.log_format);
    if let Some(ref path) = local_config_path {
        debug!("Using local config: {}", path.display());
    }

    match cli.command {
        Commands::Load(args) => modmap::cli::commands::load(args, &config),
        Commands::Prime => modmap::cli::commands::prime(&config),
        Commands::Hints(args) => modmap::cli::commands::hints(args, &config),
        Commands::Purge(args) => modmap::cli::commands::purge(args, &config),
        Commands::Clear(args) => modmap::cli::commands::clear(args, &config),
        Commands::Show(args) => modmap::cli::commands::show(args, &config),
        Commands::Read(args) => modmap::cli::commands::read(args),
        Commands::Config(args) => modmap::cli::commands::config(args, &config, &config_manager),
    }
}

/// 0 = warn, 1 = info, 2+ = debug
fn init_logging(verbose: u8, format: &str) {
    let filter = match verbose {
        0 => EnvFilter::new("modmap=warn"),
        1 => EnvFilter::new("modmap=info"),
        _ => EnvFilter::new("modmap=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if format == "json" {
        builder.json().init();
    } else {
        builder.without_time().init();
    }
}
