//! CLI module for the unified LLM client
//!
//! Subcommands:
//! - `list`: show configured provider profiles
//! - `ask`: send one prompt to a profile and print the answer

pub mod ask;
pub mod list;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Unified client for chat and search LLM endpoints
#[derive(Parser, Debug)]
#[command(name = "unified-llm")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Profile configuration file (defaults to config/default + config/local + APP__* env)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List configured provider profiles
    List,

    /// Send a prompt and print the answer
    Ask(ask::AskArgs),
}

/// Dispatch a parsed command line
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::List => {
            logging::init_logging(&config.logging);
            list::run(&config)
        }
        Command::Ask(args) => {
            if args.verbose {
                config.request_log.verbose = true;
            }
            logging::init_logging(&config.logging);
            ask::run(args, &config).await
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    match path {
        Some(path) => Ok(AppConfig::from_file(path)?),
        None => AppConfig::load().context("Failed to load configuration"),
    }
}
