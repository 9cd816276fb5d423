//! `colsync cache show|forget|clear`

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use colsync_core::ArtifactName;
use colsync_sync::IdentityCache;

use super::Workspace;

/// Inspect or edit the identity cache.
#[derive(Subcommand, Debug)]
pub enum CacheCommand {
    /// List cached name → uid entries.
    Show(ShowArgs),

    /// Drop the entry for one artifact name.
    Forget {
        /// Artifact name, matched exactly.
        name: String,
    },

    /// Drop every entry.
    Clear,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn run(cmd: CacheCommand, workspace: &Workspace) -> Result<()> {
    match cmd {
        CacheCommand::Show(args) => show(workspace, args.json),
        CacheCommand::Forget { name } => forget(workspace, name),
        CacheCommand::Clear => clear(workspace),
    }
}

#[derive(Serialize, Tabled)]
struct CacheRow {
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "uid")]
    uid: String,
}

fn show(workspace: &Workspace, json: bool) -> Result<()> {
    let path = &workspace.cache_path;
    let cache = IdentityCache::try_load(path)
        .with_context(|| format!("identity cache at {} is unreadable", path.display()))?;
    let rows: Vec<CacheRow> = cache
        .entries()
        .map(|entry| CacheRow {
            name: entry.name.to_string(),
            uid: entry.uid.to_string(),
        })
        .collect();

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&rows).context("failed to serialize cache")?
        );
        return Ok(());
    }

    if rows.is_empty() {
        println!("No cached collections ({}).", cache.path().display());
        return Ok(());
    }

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    Ok(())
}

fn forget(workspace: &Workspace, name: String) -> Result<()> {
    let mut cache = IdentityCache::load(&workspace.cache_path);
    let name = ArtifactName::from(name);
    match cache.remove(&name) {
        Some(entry) => {
            cache.save().context("failed to save identity cache")?;
            println!("✓ Forgot '{}' ({})", entry.name, entry.uid);
        }
        None => println!("'{name}' is not cached."),
    }
    Ok(())
}

fn clear(workspace: &Workspace) -> Result<()> {
    let mut cache = IdentityCache::load(&workspace.cache_path);
    let count = cache.len();
    cache.clear();
    cache.save().context("failed to save identity cache")?;
    println!("✓ Cleared {count} cached collection(s)");
    Ok(())
}
