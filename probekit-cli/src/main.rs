// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Probekit CLI
//!
//! Command-line front end for querying the component registry and
//! exercising runtime-selected bundles.

use clap::{Parser, Subcommand};

mod commands;

/// Probekit - composable instrumentation bundles
#[derive(Parser)]
#[command(name = "probe")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List registered components
    List {
        /// Include unavailable and internal components
        #[arg(short, long)]
        all: bool,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show enabled backends and available-set sizes
    Features,

    /// Validate a configuration file and its selections
    Validate {
        /// Path to the configuration file
        file: String,
    },

    /// Measure start/stop overhead of a selected bundle
    Overhead {
        /// Configuration file path (defaults to $PROBEKIT_CONFIG, if set)
        #[arg(long)]
        config: Option<String>,

        /// Components to select, e.g. "wall_clock,peak_rss"
        #[arg(short, long)]
        components: Option<String>,

        /// Number of start/stop laps
        #[arg(short = 'n', long, default_value_t = 10_000)]
        iterations: u64,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(log_level).init();

    // Dispatch to command handlers
    match cli.command {
        Commands::List { all, json } => commands::list::execute(all, json),
        Commands::Features => commands::features::execute(),
        Commands::Validate { file } => commands::validate::execute(&file),
        Commands::Overhead {
            config,
            components,
            iterations,
            json,
        } => commands::overhead::execute(
            config.as_deref(),
            components.as_deref(),
            iterations,
            json,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_config_belongs_to_overhead() {
        let cli =
            Cli::try_parse_from(["probekit", "overhead", "--config", "settings.yaml"]).unwrap();
        match cli.command {
            Commands::Overhead { config, .. } => {
                assert_eq!(config.as_deref(), Some("settings.yaml"))
            }
            _ => panic!("expected overhead"),
        }

        assert!(Cli::try_parse_from(["probekit", "list", "--config", "settings.yaml"]).is_err());
        assert!(
            Cli::try_parse_from(["probekit", "--config", "settings.yaml", "features"]).is_err()
        );
    }
}
