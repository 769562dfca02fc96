// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Pipetrace CLI - upstream edges and lengths for every pipe in a network

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use pipetrace::commands;
use pipetrace::commands::run::RunArgs;
use pipetrace::error::{exit_code_for, CYCLE_EXIT_CODE};
use pipetrace::types::Accumulation;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pipetrace")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Configuration file path
    #[arg(short, long, env = "PIPETRACE_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Trace every edge and write the result tables
    Run {
        /// Network CSV (overrides files.network_csv)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Directory for the result tables (overrides files.output_dir)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Depth at which the network is treated as looped
        #[arg(long)]
        max_depth: Option<usize>,

        /// Length accumulation mode
        #[arg(long, value_enum)]
        accumulation: Option<Accumulation>,
    },

    /// Show the upstream edges and length of one edge
    Upstream {
        /// Edge id
        edge: String,

        /// Network CSV (overrides files.network_csv)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// List edges with no downstream edge
    Outlets {
        /// Network CSV (overrides files.network_csv)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Generate shell completions
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish)
        shell: clap_complete::Shell,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins when set
    let log_level = match cli.verbose {
        0 if cli.quiet => tracing::Level::ERROR,
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.as_str().to_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = execute(cli) {
        let code = exit_code_for(&err);
        if code == CYCLE_EXIT_CODE {
            tracing::error!("Network has a loop, no output written");
        }
        eprintln!("Error: {err:#}");
        std::process::exit(code);
    }
}

fn execute(cli: Cli) -> Result<()> {
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Run { input, output_dir, max_depth, accumulation } => {
            let args = RunArgs { input, output_dir, max_depth, accumulation };
            commands::run::run(config, args, cli.json)
        }
        Commands::Upstream { edge, input } => {
            commands::upstream::run(config, input, &edge, cli.json)
        }
        Commands::Outlets { input } => {
            commands::outlets::run(config, input, cli.json)
        }
        Commands::Completions { shell } => {
            commands::completions::run(shell, &mut Cli::command())
        }
    }
}
