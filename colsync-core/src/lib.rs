//! colsync core library: domain types, configuration, errors.
//!
//! - [`types`]: newtypes and domain structs
//! - [`config`]: `colsync.yaml` loading and the API key
//! - [`error`]: [`ArtifactError`], [`ConfigError`]

pub mod config;
pub mod error;
pub mod types;

pub use config::{ApiKey, Config};
pub use error::{ArtifactError, ConfigError};
pub use types::{normalize_name, Artifact, ArtifactName, CacheEntry, RemoteId, RemoteSummary};
