//! CLI parser and dispatch.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Settings;

#[derive(Parser)]
#[command(name = "marktsync")]
#[command(about = "Publish catalog products to the Marktplaats.nl marketplace")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// List marketplace categories
    Categories {
        /// Bypass the cache and scrape the live site
        #[arg(long)]
        refresh: bool,
    },

    /// List subcategories of one marketplace category
    Subcategories {
        /// Parent category id
        category_id: String,
    },

    /// Refresh the cached taxonomy and report the category count
    Refresh {
        /// Only refresh when the configured interval has elapsed
        #[arg(long)]
        check: bool,
    },

    /// Show the effective configuration
    Config,
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Categories { refresh } => commands::categories(&settings, refresh).await,
        Commands::Subcategories { category_id } => {
            commands::subcategories(&settings, &category_id).await
        }
        Commands::Refresh { check } => commands::refresh(&settings, check).await,
        Commands::Config => commands::show_config(&settings),
    }
}
