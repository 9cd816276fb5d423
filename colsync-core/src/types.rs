//! Domain types shared by the cache, the remote client and the sync engine.
//!
//! Names are compared two ways: the identity cache keys on the exact
//! [`ArtifactName`], while remote listings are matched through
//! [`normalize_name`] (whitespace stripped, lower-cased).

use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{io_err, ArtifactError};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// The name an artifact is synchronized under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactName(pub String);

impl ArtifactName {
    /// The form used to match against remote listings.
    pub fn normalized(&self) -> String {
        normalize_name(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ArtifactName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ArtifactName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Opaque, service-assigned handle for a stored collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteId(pub String);

impl RemoteId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for RemoteId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RemoteId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Strip every whitespace character and lower-case the rest.
///
/// `"Billing API"`, `"billing api"` and `" BillingAPI "` all normalize to
/// `"billingapi"`.
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// A named collection document ready to be pushed.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub name: ArtifactName,
    pub body: Value,
}

impl Artifact {
    /// Build an artifact from an explicit name and body.
    ///
    /// A blank name is rejected: it cannot be cached or matched.
    pub fn new(name: impl Into<ArtifactName>, body: Value) -> Result<Self, ArtifactError> {
        let name = name.into();
        if name.0.trim().is_empty() {
            return Err(ArtifactError::MissingName);
        }
        Ok(Self { name, body })
    }

    /// Build an artifact from a collection document, naming it after
    /// `info.name`.
    pub fn from_collection(body: Value) -> Result<Self, ArtifactError> {
        let name = body
            .pointer("/info/name")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or(ArtifactError::MissingName)?;
        Self::new(name, body)
    }

    /// Read a collection document from disk.
    ///
    /// Some exporters wrap the document in a top-level `"collection"` key;
    /// that wrapper is removed so the body is always the bare collection.
    pub fn read_collection(path: &Path) -> Result<Self, ArtifactError> {
        let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
        let mut body: Value =
            serde_json::from_str(&contents).map_err(|source| ArtifactError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        if body.get("info").is_none() {
            let inner = body.get_mut("collection").map(Value::take);
            if let Some(inner) = inner {
                body = inner;
            }
        }
        Self::from_collection(body)
    }
}

/// One persisted identity: artifact name to remote uid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub name: ArtifactName,
    pub uid: RemoteId,
}

/// A collection as reported by the remote listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteSummary {
    pub uid: RemoteId,
    pub name: String,
    pub updated_at: DateTime<Utc>,
}

impl RemoteSummary {
    /// Whether this summary names the same collection as `name`.
    pub fn matches(&self, name: &ArtifactName) -> bool {
        normalize_name(&self.name) == name.normalized()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
