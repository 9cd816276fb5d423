//! `colsync push`: create or update the remote copy of a collection.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use colsync_sync::{ResolvedBy, SyncEngine, SyncOutcome, SyncReport};

use super::{TargetArgs, Workspace};

/// Arguments for `colsync push`.
#[derive(Args, Debug)]
pub struct PushArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Emit the sync report as JSON.
    #[arg(long)]
    pub json: bool,
}

impl PushArgs {
    pub fn run(self, workspace: &Workspace) -> Result<()> {
        let artifact = self.target.artifact()?;
        let client = workspace.client()?;
        let engine = SyncEngine::new(client, &workspace.cache_path);

        let report = engine
            .sync(&artifact, &self.target.resolution())
            .with_context(|| format!("cannot sync '{}'", artifact.name))?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed to serialize report")?
            );
        } else {
            print_report(&report);
        }

        if report.outcome.is_failed() {
            anyhow::bail!("sync failed for '{}'", report.name);
        }
        Ok(())
    }
}

fn print_report(report: &SyncReport) {
    match &report.outcome {
        SyncOutcome::Created { uid } => println!(
            "{} created '{}' ({uid})",
            "✓".green().bold(),
            report.name
        ),
        SyncOutcome::Updated { uid } => println!(
            "{} updated '{}' ({uid})",
            "✓".green().bold(),
            report.name
        ),
        SyncOutcome::Failed { failure } => {
            println!("{} failed '{}': {failure}", "✗".red().bold(), report.name);
            if !failure.payload().is_null() {
                println!("  payload: {}", failure.payload());
            }
        }
    }

    if let Some(resolved_by) = report.resolved_by {
        println!("  resolved via {}", resolved_by_label(resolved_by));
    }
    if report.ambiguous_candidates > 1 {
        println!(
            "  {} {} remote collections share this name; used the most recently updated",
            "!".yellow().bold(),
            report.ambiguous_candidates
        );
    }
    if report.retried {
        println!("  cached uid was stale; re-resolved by name");
    }
}

pub(crate) fn resolved_by_label(resolved_by: ResolvedBy) -> &'static str {
    match resolved_by {
        ResolvedBy::Pinned => "pinned uid",
        ResolvedBy::Cache => "identity cache",
        ResolvedBy::Listing => "remote listing",
        ResolvedBy::NewResource => "new collection",
    }
}
