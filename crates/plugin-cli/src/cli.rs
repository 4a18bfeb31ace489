//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// pluginctl - Discover, install and manage CLI plugins
#[derive(Parser, Debug)]
#[command(name = "pluginctl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(short, long, global = true, env = "PLUGINCTL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// List discovered plugins and their install state
    ///
    /// Examples:
    ///   pluginctl list                # Every source, current context first
    ///   pluginctl list --installed    # Catalog entries only
    ///   pluginctl list --json         # Machine-readable
    List {
        /// Show installed plugins instead of discovered ones
        #[arg(long)]
        installed: bool,

        /// Ignore the current context's sources
        #[arg(long)]
        standalone: bool,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Show an installed plugin's own description
    Describe {
        /// Plugin name
        name: String,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Install a plugin
    Install {
        /// Plugin name
        name: String,

        /// Version to install (defaults to the recommended version)
        #[arg(long, default_value = "")]
        version: String,
    },

    /// Install another version of an installed plugin
    Upgrade {
        /// Plugin name
        name: String,

        /// Version to install (defaults to the recommended version)
        #[arg(long, default_value = "")]
        version: String,
    },

    /// Delete an installed plugin
    Delete {
        /// Plugin name
        name: String,
    },

    /// Install every required plugin that is missing or outdated
    Sync,

    /// Remove every installed plugin and the catalog
    Clean,

    /// Download a plugin's self-test binary
    FetchTest {
        /// Plugin name
        name: String,

        /// Version (defaults to the recommended version)
        #[arg(long, default_value = "")]
        version: String,
    },

    /// Validate a plugin descriptor (`info` output) read from a file
    Validate {
        /// JSON descriptor file
        file: PathBuf,
    },
}
