//! Iris CLI - send image folders to vision completion APIs without tripping
//! rate limits.
//!
//! Every image in a directory becomes one chat-completion request, and every
//! response is stored as `{stem}.json` in the output directory.
//!
//! # Usage
//!
//! ```bash
//! # Ask about a single image and print the raw reply
//! iris run photo.jpg --prompt "How many people are in this image?"
//!
//! # Process a directory into ./output
//! iris run ./frames/ --output ./output --provider azure --model gpt-4o
//!
//! # Guided mode
//! iris interactive
//!
//! # View configuration
//! iris config show
//! ```

use clap::{Parser, Subcommand};
use std::io::IsTerminal;

mod cli;
mod logging;

/// Iris - rate-limited batch processing for vision completion APIs.
#[derive(Parser, Debug)]
#[command(name = "iris")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Send one image or a directory of images to the provider
    Run(cli::run::RunArgs),

    /// Guided prompts for mode, provider, credentials and paths
    Interactive,

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match iris_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `iris config path`."
            );
            iris_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Iris v{}", iris_core::VERSION);

    match cli.command {
        Some(Commands::Run(args)) => cli::run::execute(args, config).await,
        Some(Commands::Interactive) => cli::interactive::run(config).await,
        Some(Commands::Config(args)) => cli::config::execute(args).await,
        None if std::io::stdin().is_terminal() && std::io::stderr().is_terminal() => {
            cli::interactive::run(config).await
        }
        None => {
            anyhow::bail!("No command given. Run `iris --help` for usage.");
        }
    }
}
