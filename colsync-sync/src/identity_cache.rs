//! Identity cache: persisted artifact name to remote uid mapping.
//!
//! Stored as one JSON object at `<root>/.colsync/collection-ids.json`:
//!
//! ```json
//! { "Billing API": { "name": "Billing API", "uid": "12345-abcd" } }
//! ```
//!
//! The cache is an optimization, never a source of truth. A missing or
//! unreadable file loads as an empty cache, and writes use the `.tmp` +
//! rename pattern so an interrupted save never leaves a half-written file.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use colsync_core::{config::DEFAULT_CACHE_PATH, ArtifactName, CacheEntry, RemoteId};

use crate::error::{io_err, CacheError};

/// Older files may omit `name` or store the bare uid string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredEntry {
    Full {
        #[serde(default)]
        name: Option<ArtifactName>,
        uid: RemoteId,
    },
    Bare(RemoteId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityCache {
    path: PathBuf,
    entries: BTreeMap<ArtifactName, CacheEntry>,
}

impl IdentityCache {
    /// Default cache location under `root`: pure, no I/O.
    pub fn path_at(root: &Path) -> PathBuf {
        root.join(DEFAULT_CACHE_PATH)
    }

    /// An empty cache that will be saved to `path`.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Load the cache at `path`.
    ///
    /// Never fails: a missing file or malformed content yields an empty
    /// cache (malformed content is logged).
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match Self::try_load(&path) {
            Ok(cache) => cache,
            Err(err) => {
                tracing::warn!(error = %err, "identity cache unreadable; starting empty");
                Self::empty(path)
            }
        }
    }

    /// Load the cache at `path`, surfacing read and parse errors.
    ///
    /// A missing file is not an error.
    pub fn try_load(path: &Path) -> Result<Self, CacheError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no identity cache yet");
            return Ok(Self::empty(path));
        }
        let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
        let stored: BTreeMap<ArtifactName, StoredEntry> =
            serde_json::from_str(&contents).map_err(|source| CacheError::Json {
                path: path.to_path_buf(),
                source,
            })?;

        let entries = stored
            .into_iter()
            .map(|(key, entry)| {
                let uid = match entry {
                    StoredEntry::Full { name, uid } => {
                        if name.as_ref().is_some_and(|n| *n != key) {
                            tracing::debug!(%key, "cache entry name differs from key; keeping key");
                        }
                        uid
                    }
                    StoredEntry::Bare(uid) => uid,
                };
                let entry = CacheEntry {
                    name: key.clone(),
                    uid,
                };
                (key, entry)
            })
            .collect();

        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Exact-match lookup; no normalization.
    pub fn lookup(&self, name: &ArtifactName) -> Option<&CacheEntry> {
        self.entries.get(name)
    }

    /// Insert or refresh the entry for `name`.
    pub fn put(&mut self, name: ArtifactName, uid: RemoteId) {
        let entry = CacheEntry {
            name: name.clone(),
            uid,
        };
        self.entries.insert(name, entry);
    }

    /// Delete the entry for `name`, returning it if present.
    pub fn remove(&mut self, name: &ArtifactName) -> Option<CacheEntry> {
        self.entries.remove(name)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries sorted by name.
    pub fn entries(&self) -> impl Iterator<Item = &CacheEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rewrite the whole file atomically.
    ///
    /// Writes to `<path>.tmp` then renames over `<path>`.
    pub fn save(&self) -> Result<(), CacheError> {
        let path = &self.path;
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
        }

        let json = serde_json::to_string_pretty(&self.entries).map_err(|source| {
            CacheError::Json {
                path: path.clone(),
                source,
            }
        })?;
        let tmp = tmp_path(path);
        std::fs::write(&tmp, json).map_err(|e| io_err(&tmp, e))?;
        if let Err(e) = std::fs::rename(&tmp, path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(io_err(path, e));
        }
        tracing::debug!(
            path = %path.display(),
            entries = self.entries.len(),
            "identity cache saved"
        );
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = OsString::from(path.as_os_str());
    tmp.push(".tmp");
    PathBuf::from(tmp)
}
