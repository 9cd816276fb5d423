//! # colsync-sync
//!
//! Identity cache and sync engine.
//!
//! Build a [`SyncEngine`] over any [`CollectionClient`](colsync_remote::CollectionClient)
//! and call [`SyncEngine::sync`] with a [`Resolution`]; the result is a
//! [`SyncReport`] whose [`SyncOutcome`] is created, updated or failed.

pub mod engine;
pub mod error;
pub mod identity_cache;
pub mod resolve;

pub use engine::{PlannedAction, Resolution, ResolvedBy, SyncEngine, SyncOutcome, SyncReport};
pub use error::{CacheError, SyncError, SyncFailure};
pub use identity_cache::IdentityCache;
