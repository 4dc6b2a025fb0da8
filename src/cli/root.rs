use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use flux_ui::{Config, Page};

use super::replay::ReplayCommand;
use super::scan::ScanCommand;

/// Flux UI - modal dialog wiring for Flux CI pages
#[derive(Parser)]
#[command(
    name = "flux-ui",
    version,
    about = "Inspect and exercise the dialog wiring of Flux CI pages",
    long_about = r#"flux-ui loads a Flux page, binds its confirmation and input triggers,
and lets you inspect or replay user gestures against it without a browser.

Examples:
  flux-ui scan page.html                # List triggers and widgets
  flux-ui scan page.html --json         # Same, as JSON
  flux-ui replay page.html steps.txt    # Replay a gesture script
  flux-ui replay page.html < steps.txt  # Read the script from stdin"#
)]
pub struct Cli {
    /// Current working directory
    #[arg(short = 'c', long = "cwd", global = true)]
    pub cwd: Option<PathBuf>,

    /// Configuration file (defaults to the first one found on the search path)
    #[arg(long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short = 'd', long = "debug", global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the triggers and widgets bound on a page
    Scan(ScanCommand),
    /// Replay a script of gestures against a page
    Replay(ReplayCommand),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        if self.debug {
            debug!("Debug logging enabled");
        }

        if let Some(cwd) = &self.cwd {
            std::env::set_current_dir(cwd)
                .with_context(|| format!("Failed to change directory to {}", cwd.display()))?;
            info!("Changed working directory to: {}", cwd.display());
        }

        let config = Config::init(self.config.as_deref()).await?;
        debug!("Configuration initialized");

        match self.command {
            Commands::Scan(cmd) => cmd.execute(config).await,
            Commands::Replay(cmd) => cmd.execute(config).await,
        }
    }
}

/// Read and parse a page from disk
pub(super) async fn load_page(path: &Path) -> Result<Page> {
    let markup = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    debug!("Loaded {} bytes from {}", markup.len(), path.display());
    Ok(Page::parse(&markup))
}
