//! colsync: keep generated test collections in step with the collection
//! service.
//!
//! # Usage
//!
//! ```text
//! colsync push <collection.json> [--uid <uid>] [--name <name>] [--json]
//! colsync plan <collection.json> [--uid <uid>] [--name <name>]
//! colsync cache show [--json]
//! colsync cache forget <name>
//! colsync cache clear
//! ```
//!
//! Global options: `--config <path>` (default `./colsync.yaml`) and
//! `--cache <path>` (default `./.colsync/collection-ids.json`). The API key is
//! read from `$COLSYNC_API_KEY` unless the config names another variable.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{cache::CacheCommand, plan::PlanArgs, push::PushArgs, GlobalArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "colsync",
    version,
    about = "Push generated test collections to the collection service",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create or update the remote copy of a collection.
    Push(PushArgs),

    /// Show what `push` would do without changing anything.
    Plan(PlanArgs),

    /// Inspect or edit the local identity cache.
    Cache {
        #[command(subcommand)]
        command: CacheCommand,
    },
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let workspace = cli.global.workspace()?;
    match cli.command {
        Commands::Push(args) => args.run(&workspace),
        Commands::Plan(args) => args.run(&workspace),
        Commands::Cache { command } => commands::cache::run(command, &workspace),
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
