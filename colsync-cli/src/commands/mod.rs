//! Subcommands and the settings they share.

pub mod cache;
pub mod plan;
pub mod push;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use colsync_core::{Artifact, Config, RemoteId};
use colsync_remote::{ClientConfig, HttpCollectionClient};
use colsync_sync::Resolution;

/// Options accepted before or after any subcommand.
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Config file (default: ./colsync.yaml, optional).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Identity cache file (overrides `cache_path` from the config).
    #[arg(long, global = true, value_name = "PATH")]
    pub cache: Option<PathBuf>,
}

impl GlobalArgs {
    /// Resolve config and cache locations against the working directory.
    pub fn workspace(&self) -> Result<Workspace> {
        let root = std::env::current_dir().context("could not determine working directory")?;
        let config = match &self.config {
            Some(path) => Config::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => Config::load_at(&root).context("failed to load colsync.yaml")?,
        };
        let cache_path = match &self.cache {
            Some(path) => root.join(path),
            None => config.cache_path_at(&root),
        };
        Ok(Workspace { config, cache_path })
    }
}

/// Settings for one invocation.
#[derive(Debug)]
pub struct Workspace {
    pub config: Config,
    pub cache_path: PathBuf,
}

impl Workspace {
    /// Build the HTTP client, reading the API key from the environment.
    pub fn client(&self) -> Result<HttpCollectionClient> {
        let api_key = self.config.api_key_from_env()?;
        Ok(HttpCollectionClient::new(ClientConfig::from_config(
            &self.config,
            api_key,
        )))
    }
}

/// What to push: shared by `push` and `plan`.
#[derive(Args, Debug)]
pub struct TargetArgs {
    /// Collection JSON file produced by the generator.
    pub collection: PathBuf,

    /// Update this collection uid directly, bypassing cache and lookup.
    #[arg(long, value_name = "UID")]
    pub uid: Option<String>,

    /// Sync under this name instead of the collection's `info.name`.
    #[arg(long)]
    pub name: Option<String>,
}

impl TargetArgs {
    pub fn artifact(&self) -> Result<Artifact> {
        let artifact = Artifact::read_collection(&self.collection)
            .with_context(|| format!("failed to read {}", self.collection.display()))?;
        match &self.name {
            Some(name) => Ok(Artifact::new(name.as_str(), artifact.body)?),
            None => Ok(artifact),
        }
    }

    pub fn resolution(&self) -> Resolution {
        Resolution::from_override(self.uid.clone().map(RemoteId::from))
    }
}
