//! Choosing one remote collection among several with the same name.

use colsync_core::RemoteSummary;

/// The most recently updated summary, or `None` for an empty slice.
///
/// Candidates are stably sorted by `updated_at`, newest first, and the
/// first one wins; with equal timestamps the earlier listing entry wins.
pub fn most_recent(candidates: &[RemoteSummary]) -> Option<&RemoteSummary> {
    let mut sorted: Vec<&RemoteSummary> = candidates.iter().collect();
    sorted.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    sorted.into_iter().next()
}
