//! pluginctl
//!
//! Command-line front end of the plugin manager.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Commands::Validate { file } = &cli.command {
        return commands::run_validate(file);
    }

    let manager = commands::load_manager(cli.config.as_deref())?;
    match cli.command {
        Commands::List {
            installed: true,
            standalone,
            json,
        } => commands::run_list_installed(&manager, standalone, json),
        Commands::List {
            standalone, json, ..
        } => commands::run_list(&manager, standalone, json),
        Commands::Describe { name, json } => commands::run_describe(&manager, &name, json),
        Commands::Install { name, version } => commands::run_install(&manager, &name, &version),
        Commands::Upgrade { name, version } => commands::run_upgrade(&manager, &name, &version),
        Commands::Delete { name } => commands::run_delete(&manager, &name),
        Commands::Sync => commands::run_sync(&manager),
        Commands::Clean => commands::run_clean(&manager),
        Commands::FetchTest { name, version } => {
            commands::run_fetch_test(&manager, &name, &version)
        }
        Commands::Validate { file } => commands::run_validate(&file),
    }
}

/// Logs go to stderr. `RUST_LOG` overrides the default level.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .try_init();
}
