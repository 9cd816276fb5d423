//! # colsync-remote
//!
//! Client side of the collection-hosting service.
//!
//! [`CollectionClient`] is the seam the sync engine talks through;
//! [`HttpCollectionClient`] is the production implementation. Failures are
//! always returned as a classified [`RemoteError`], never raised.

pub mod client;
pub mod error;
pub mod http;
#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use client::{CollectionClient, RemoteResult};
pub use error::{RemoteError, RemoteErrorKind};
pub use http::{ClientConfig, HttpCollectionClient};
