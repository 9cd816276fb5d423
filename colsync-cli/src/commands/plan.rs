//! `colsync plan`: dry-run of `push`.

use anyhow::{Context, Result};
use clap::Args;

use colsync_sync::{PlannedAction, SyncEngine};

use super::push::resolved_by_label;
use super::{TargetArgs, Workspace};

/// Arguments for `colsync plan`.
#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

impl PlanArgs {
    pub fn run(self, workspace: &Workspace) -> Result<()> {
        let artifact = self.target.artifact()?;
        let client = workspace.client()?;
        let engine = SyncEngine::new(client, &workspace.cache_path);

        let plan = engine
            .plan(&artifact, &self.target.resolution())
            .with_context(|| format!("cannot plan sync of '{}'", artifact.name))?;

        match plan {
            PlannedAction::Create => {
                println!("[dry-run] would create '{}'", artifact.name);
            }
            PlannedAction::Update {
                uid,
                resolved_by,
                ambiguous_candidates,
            } => {
                println!(
                    "[dry-run] would update '{}' ({uid}) via {}",
                    artifact.name,
                    resolved_by_label(resolved_by)
                );
                if ambiguous_candidates > 1 {
                    println!("  {ambiguous_candidates} remote collections share this name");
                }
            }
        }
        Ok(())
    }
}
