// SPDX-FileCopyrightText: 2026 Slidesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Slidesmith - a chat-driven Marp slide deck generator.
//!
//! This binary exposes the maintenance surface of the pipeline: session
//! inspection and cleanup, reply checking, and config introspection. The
//! generation loop itself runs embedded in the chat host.

mod check;
mod sessions;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use slidesmith_config::model::SlidesmithConfig;
use slidesmith_core::SlidesmithError;

/// Slidesmith - a chat-driven Marp slide deck generator.
#[derive(Parser, Debug)]
#[command(name = "slidesmith", version, about, long_about = None)]
struct Cli {
    /// Path to a config file. Defaults to the environment-layered config.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Inspect and maintain stored sessions.
    Sessions {
        #[command(subcommand)]
        command: sessions::SessionCommands,
    },
    /// Validate a captured model reply against the deck structure rules.
    Check {
        /// File holding the raw model reply.
        file: PathBuf,
    },
    /// Print the effective configuration.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("slidesmith: {e}");
            std::process::exit(1);
        }
    };
    init_tracing(&config.agent.log_level);

    let result = match cli.command {
        Commands::Sessions { command } => sessions::run(&config, command).await,
        Commands::Check { file } => check::run(&file).await,
        Commands::Config => print_config(&config),
    };
    if let Err(e) = result {
        eprintln!("slidesmith: {e}");
        std::process::exit(1);
    }
}

fn load(path: Option<&std::path::Path>) -> Result<SlidesmithConfig, SlidesmithError> {
    let loaded = match path {
        Some(p) => slidesmith_config::load_config_from_path(p),
        None => slidesmith_config::load_config(),
    };
    loaded.map_err(|e| SlidesmithError::Config(e.to_string()))
}

fn print_config(config: &SlidesmithConfig) -> Result<(), SlidesmithError> {
    let rendered = toml::to_string_pretty(config)
        .map_err(|e| SlidesmithError::Config(format!("failed to render config: {e}")))?;
    print!("{rendered}");
    println!("# session db: {}", config.session.resolved_db_path().display());
    Ok(())
}

/// Initializes the tracing subscriber with the configured log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("slidesmith={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
