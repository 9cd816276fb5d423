//! In-memory [`CollectionClient`] for tests.
//!
//! Records every call in order and replays scripted results per operation.
//! When an operation's script is empty it succeeds: `create` mints
//! `mock-uid-<n>`, `update` echoes the uid it was given, `list` returns
//! nothing.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use colsync_core::{Artifact, RemoteId, RemoteSummary};

use crate::client::{CollectionClient, RemoteResult};

/// One recorded call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create,
    Update(RemoteId),
    List,
}

#[derive(Debug, Default)]
struct Script {
    calls: Vec<Call>,
    creates: VecDeque<RemoteResult<RemoteId>>,
    updates: VecDeque<RemoteResult<RemoteId>>,
    listings: VecDeque<RemoteResult<Vec<RemoteSummary>>>,
    minted: usize,
}

#[derive(Debug, Default)]
pub struct MockCollectionClient {
    script: Mutex<Script>,
}

impl MockCollectionClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue the result of the next `create`.
    pub fn push_create(&self, result: RemoteResult<RemoteId>) -> &Self {
        self.script().creates.push_back(result);
        self
    }

    /// Queue the result of the next `update`.
    pub fn push_update(&self, result: RemoteResult<RemoteId>) -> &Self {
        self.script().updates.push_back(result);
        self
    }

    /// Queue the result of the next `list`.
    pub fn push_listing(&self, result: RemoteResult<Vec<RemoteSummary>>) -> &Self {
        self.script().listings.push_back(result);
        self
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.script().calls.clone()
    }

    pub fn list_calls(&self) -> usize {
        self.calls().iter().filter(|c| matches!(c, Call::List)).count()
    }

    pub fn create_calls(&self) -> usize {
        self.calls().iter().filter(|c| matches!(c, Call::Create)).count()
    }

    /// Uids passed to `update`, in order.
    pub fn updated_uids(&self) -> Vec<RemoteId> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Update(uid) => Some(uid),
                _ => None,
            })
            .collect()
    }
}

impl CollectionClient for MockCollectionClient {
    fn create(&self, _artifact: &Artifact) -> RemoteResult<RemoteId> {
        let mut script = self.script();
        script.calls.push(Call::Create);
        match script.creates.pop_front() {
            Some(result) => result,
            None => {
                script.minted += 1;
                Ok(RemoteId::from(format!("mock-uid-{}", script.minted)))
            }
        }
    }

    fn update(&self, _artifact: &Artifact, uid: &RemoteId) -> RemoteResult<RemoteId> {
        let mut script = self.script();
        script.calls.push(Call::Update(uid.clone()));
        script
            .updates
            .pop_front()
            .unwrap_or_else(|| Ok(uid.clone()))
    }

    fn list(&self) -> RemoteResult<Vec<RemoteSummary>> {
        let mut script = self.script();
        script.calls.push(Call::List);
        script.listings.pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }
}
