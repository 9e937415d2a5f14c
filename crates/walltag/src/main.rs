//! Walltag CLI - Zero-shot image folder tagging with CLIP.
//!
//! Walltag scores every image in a folder against a fixed set of category
//! labels, renames each file so its tags are part of the filename, and can
//! write a CSV manifest of the results.
//!
//! # Usage
//!
//! ```bash
//! # Tag every image in a folder
//! walltag ./wallpapers/
//!
//! # Keep the two best tags and write a manifest
//! walltag ./wallpapers/ --top-k 2 --tag tags.csv
//!
//! # View configuration
//! walltag config show
//!
//! # Manage models
//! walltag models download
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Walltag - Zero-shot image folder tagging with CLIP.
#[derive(Parser, Debug)]
#[command(name = "walltag")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Commands>,

    /// Bare invocation (`walltag <folder>`) behaves like `walltag tag <folder>`
    #[command(flatten)]
    tag: cli::tag::TagArgs,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Tag and rename every supported image in a folder
    Tag(cli::tag::TagArgs),

    /// Manage CLIP models (download, list, etc.)
    Models(cli::models::ModelsArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging from config, with CLI verbose override.
    // Note: logging isn't initialized yet, so use eprintln for config warnings.
    let config = match walltag_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `walltag config path`."
            );
            walltag_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Walltag v{}", walltag_core::VERSION);

    // Dispatch to the appropriate command handler
    match cli.command {
        Some(Commands::Tag(args)) => cli::tag::execute(args).await,
        Some(Commands::Models(args)) => cli::models::execute(args).await,
        Some(Commands::Config(args)) => cli::config::execute(args).await,
        None => cli::tag::execute(cli.tag).await,
    }
}
