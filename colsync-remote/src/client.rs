//! The collection-hosting service, as the sync engine sees it.

use colsync_core::{Artifact, ArtifactName, RemoteId, RemoteSummary};

use crate::error::RemoteError;

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Create, update and list collections owned by one credential.
///
/// Calls are blocking and issued one at a time. Implementations must turn
/// every failure (including transport faults) into a [`RemoteError`].
pub trait CollectionClient {
    /// Store `artifact` as a new collection and return its uid.
    fn create(&self, artifact: &Artifact) -> RemoteResult<RemoteId>;

    /// Overwrite the collection at `uid` with `artifact`.
    ///
    /// Fails with [`RemoteErrorKind::NotFound`](crate::RemoteErrorKind::NotFound)
    /// when `uid` no longer exists.
    fn update(&self, artifact: &Artifact, uid: &RemoteId) -> RemoteResult<RemoteId>;

    /// Every collection visible to the credential.
    fn list(&self) -> RemoteResult<Vec<RemoteSummary>>;

    /// Collections whose normalized name equals `name`'s.
    ///
    /// The service has no name filter, so this is always a full listing
    /// filtered locally.
    fn find_by_name(&self, name: &ArtifactName) -> RemoteResult<Vec<RemoteSummary>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|summary| summary.matches(name))
            .collect())
    }
}

impl<C: CollectionClient + ?Sized> CollectionClient for &C {
    fn create(&self, artifact: &Artifact) -> RemoteResult<RemoteId> {
        (**self).create(artifact)
    }

    fn update(&self, artifact: &Artifact, uid: &RemoteId) -> RemoteResult<RemoteId> {
        (**self).update(artifact, uid)
    }

    fn list(&self) -> RemoteResult<Vec<RemoteSummary>> {
        (**self).list()
    }

    fn find_by_name(&self, name: &ArtifactName) -> RemoteResult<Vec<RemoteSummary>> {
        (**self).find_by_name(name)
    }
}
