//! Error types for colsync-sync.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use colsync_core::{ArtifactError, RemoteId};
use colsync_remote::RemoteError;

/// Errors from reading or writing the identity cache file.
///
/// The engine never propagates these: a load error degrades to an empty
/// cache and a save error is logged.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("identity cache JSON error at {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors a sync call is allowed to raise.
///
/// Remote failures are not among them; they are reported through
/// [`SyncOutcome::Failed`](crate::SyncOutcome::Failed).
#[derive(Debug, Error)]
pub enum SyncError {
    /// The artifact violates the input contract (e.g. it has no name).
    #[error("invalid artifact: {0}")]
    Artifact(#[from] ArtifactError),

    /// Dry-run planning could not list remote collections.
    #[error("could not list remote collections: {0}")]
    Listing(#[source] RemoteError),
}

/// Why a sync ended in [`SyncOutcome::Failed`](crate::SyncOutcome::Failed).
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SyncFailure {
    /// Auth, validation or network failure. Terminal for the attempt.
    #[error("{error}")]
    Remote { error: RemoteError },

    /// The operator-pinned uid does not denote a collection.
    #[error("pinned collection {uid} was rejected: {error}")]
    OverrideTargetInvalid { uid: RemoteId, error: RemoteError },

    /// The identifier was still unknown after the one self-heal retry.
    #[error("collection still missing after self-heal: {error}")]
    StillStale { error: RemoteError },
}

impl SyncFailure {
    /// The remote error underlying this failure.
    pub fn remote_error(&self) -> &RemoteError {
        match self {
            SyncFailure::Remote { error }
            | SyncFailure::OverrideTargetInvalid { error, .. }
            | SyncFailure::StillStale { error } => error,
        }
    }

    /// The service's error payload.
    pub fn payload(&self) -> &serde_json::Value {
        &self.remote_error().payload
    }
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> CacheError {
    CacheError::Io {
        path: path.into(),
        source,
    }
}
