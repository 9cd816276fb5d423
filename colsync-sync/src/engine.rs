//! Sync engine: reconcile one artifact with the collection service.
//!
//! ## Lookup path
//!
//! 1. Load the identity cache.
//! 2. Resolve identity: cache hit, else list remote collections and match by
//!    normalized name (newest wins when several match).
//! 3. `create` when nothing matched, `update` otherwise.
//! 4. On success refresh the cache entry.
//! 5. If `update` reports the uid gone, drop the entry and go back to step 2
//!    once. A second miss is final.
//! 6. Save the cache, whatever the outcome.
//!
//! ## Pinned path
//!
//! A single `update` against the operator-supplied uid. The cache is neither
//! read nor written.

use std::path::{Path, PathBuf};

use serde::Serialize;

use colsync_core::{Artifact, ArtifactError, ArtifactName, RemoteId};
use colsync_remote::{CollectionClient, RemoteError};

use crate::error::{SyncError, SyncFailure};
use crate::identity_cache::IdentityCache;
use crate::resolve::most_recent;

// ---------------------------------------------------------------------------
// Inputs and results
// ---------------------------------------------------------------------------

/// How the target collection is chosen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Resolution {
    /// Cache first, then the remote listing.
    #[default]
    Lookup,
    /// Update exactly this collection; skip resolution and the cache.
    Pinned(RemoteId),
}

impl Resolution {
    pub fn from_override(uid: Option<RemoteId>) -> Self {
        uid.map_or(Resolution::Lookup, Resolution::Pinned)
    }
}

/// Where the target identity came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolvedBy {
    Pinned,
    Cache,
    Listing,
    /// Nothing matched; a new collection is created.
    NewResource,
}

/// What a sync would do, without doing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PlannedAction {
    Create,
    Update {
        uid: RemoteId,
        resolved_by: ResolvedBy,
        /// Number of same-named remote collections, when more than one.
        ambiguous_candidates: usize,
    },
}

impl PlannedAction {
    pub fn resolved_by(&self) -> ResolvedBy {
        match self {
            PlannedAction::Create => ResolvedBy::NewResource,
            PlannedAction::Update { resolved_by, .. } => *resolved_by,
        }
    }

    fn ambiguous_candidates(&self) -> usize {
        match self {
            PlannedAction::Create => 0,
            PlannedAction::Update {
                ambiguous_candidates,
                ..
            } => *ambiguous_candidates,
        }
    }
}

/// Terminal state of one sync.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SyncOutcome {
    Created { uid: RemoteId },
    Updated { uid: RemoteId },
    Failed { failure: SyncFailure },
}

impl SyncOutcome {
    pub fn uid(&self) -> Option<&RemoteId> {
        match self {
            SyncOutcome::Created { uid } | SyncOutcome::Updated { uid } => Some(uid),
            SyncOutcome::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, SyncOutcome::Failed { .. })
    }
}

/// Outcome plus how it was reached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncReport {
    pub name: ArtifactName,
    pub outcome: SyncOutcome,
    /// `None` when identity resolution itself failed.
    pub resolved_by: Option<ResolvedBy>,
    pub ambiguous_candidates: usize,
    /// Whether a stale uid triggered the one re-resolution.
    pub retried: bool,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

pub struct SyncEngine<C> {
    client: C,
    cache_path: PathBuf,
}

impl<C: CollectionClient> SyncEngine<C> {
    pub fn new(client: C, cache_path: impl Into<PathBuf>) -> Self {
        Self {
            client,
            cache_path: cache_path.into(),
        }
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    /// Synchronize `artifact` with the collection service.
    ///
    /// Remote failures are reported as [`SyncOutcome::Failed`]; the only
    /// error returned is an invalid artifact.
    pub fn sync(
        &self,
        artifact: &Artifact,
        resolution: &Resolution,
    ) -> Result<SyncReport, SyncError> {
        validate(artifact)?;
        let report = match resolution {
            Resolution::Pinned(uid) => self.sync_pinned(artifact, uid),
            Resolution::Lookup => self.sync_lookup(artifact),
        };
        log_report(&report);
        Ok(report)
    }

    /// Resolve the target for `artifact` without creating or updating
    /// anything. The cache is read but never written.
    pub fn plan(
        &self,
        artifact: &Artifact,
        resolution: &Resolution,
    ) -> Result<PlannedAction, SyncError> {
        validate(artifact)?;
        match resolution {
            Resolution::Pinned(uid) => Ok(PlannedAction::Update {
                uid: uid.clone(),
                resolved_by: ResolvedBy::Pinned,
                ambiguous_candidates: 0,
            }),
            Resolution::Lookup => {
                let cache = IdentityCache::load(&self.cache_path);
                self.resolve(&artifact.name, &cache).map_err(SyncError::Listing)
            }
        }
    }

    fn sync_pinned(&self, artifact: &Artifact, uid: &RemoteId) -> SyncReport {
        tracing::debug!(name = %artifact.name, %uid, "updating pinned collection");
        let outcome = match self.client.update(artifact, uid) {
            Ok(uid) => SyncOutcome::Updated { uid },
            Err(error) if error.is_not_found() => SyncOutcome::Failed {
                failure: SyncFailure::OverrideTargetInvalid {
                    uid: uid.clone(),
                    error,
                },
            },
            Err(error) => failed(error),
        };
        SyncReport {
            name: artifact.name.clone(),
            outcome,
            resolved_by: Some(ResolvedBy::Pinned),
            ambiguous_candidates: 0,
            retried: false,
        }
    }

    fn sync_lookup(&self, artifact: &Artifact) -> SyncReport {
        let mut cache = IdentityCache::load(&self.cache_path);
        let report = self.reconcile(artifact, &mut cache);
        if let Err(err) = cache.save() {
            tracing::warn!(error = %err, "failed to save identity cache");
        }
        report
    }

    fn reconcile(&self, artifact: &Artifact, cache: &mut IdentityCache) -> SyncReport {
        let name = &artifact.name;
        let mut retried = false;

        loop {
            let plan = match self.resolve(name, cache) {
                Ok(plan) => plan,
                Err(error) => {
                    return SyncReport {
                        name: name.clone(),
                        outcome: failed(error),
                        resolved_by: None,
                        ambiguous_candidates: 0,
                        retried,
                    };
                }
            };

            let outcome = match &plan {
                PlannedAction::Create => match self.client.create(artifact) {
                    Ok(uid) => {
                        cache.put(name.clone(), uid.clone());
                        SyncOutcome::Created { uid }
                    }
                    Err(error) => failed(error),
                },
                PlannedAction::Update { uid, .. } => match self.client.update(artifact, uid) {
                    Ok(uid) => {
                        cache.put(name.clone(), uid.clone());
                        SyncOutcome::Updated { uid }
                    }
                    Err(error) if error.is_not_found() && !retried => {
                        tracing::warn!(
                            %name,
                            %uid,
                            "collection no longer exists; resolving again by name"
                        );
                        cache.remove(name);
                        retried = true;
                        continue;
                    }
                    Err(error) if error.is_not_found() => SyncOutcome::Failed {
                        failure: SyncFailure::StillStale { error },
                    },
                    Err(error) => failed(error),
                },
            };

            return SyncReport {
                name: name.clone(),
                outcome,
                resolved_by: Some(plan.resolved_by()),
                ambiguous_candidates: plan.ambiguous_candidates(),
                retried,
            };
        }
    }

    fn resolve(
        &self,
        name: &ArtifactName,
        cache: &IdentityCache,
    ) -> Result<PlannedAction, RemoteError> {
        if let Some(entry) = cache.lookup(name) {
            tracing::debug!(%name, uid = %entry.uid, "identity cache hit");
            return Ok(PlannedAction::Update {
                uid: entry.uid.clone(),
                resolved_by: ResolvedBy::Cache,
                ambiguous_candidates: 0,
            });
        }

        tracing::debug!(%name, "identity cache miss; listing remote collections");
        let matches = self.client.find_by_name(name)?;
        let Some(chosen) = most_recent(&matches) else {
            return Ok(PlannedAction::Create);
        };

        let ambiguous_candidates = if matches.len() > 1 {
            tracing::warn!(
                %name,
                candidates = matches.len(),
                chosen = %chosen.uid,
                "several remote collections share this name; using the most recently updated"
            );
            matches.len()
        } else {
            0
        };

        Ok(PlannedAction::Update {
            uid: chosen.uid.clone(),
            resolved_by: ResolvedBy::Listing,
            ambiguous_candidates,
        })
    }
}

fn validate(artifact: &Artifact) -> Result<(), SyncError> {
    if artifact.name.as_str().trim().is_empty() {
        return Err(ArtifactError::MissingName.into());
    }
    Ok(())
}

fn failed(error: RemoteError) -> SyncOutcome {
    SyncOutcome::Failed {
        failure: SyncFailure::Remote { error },
    }
}

fn log_report(report: &SyncReport) {
    match &report.outcome {
        SyncOutcome::Created { uid } => {
            tracing::info!(name = %report.name, %uid, "created collection")
        }
        SyncOutcome::Updated { uid } => {
            tracing::info!(name = %report.name, %uid, "updated collection")
        }
        SyncOutcome::Failed { failure } => {
            tracing::warn!(name = %report.name, error = %failure, "collection sync failed")
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
