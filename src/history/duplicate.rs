//! Duplicate save detection

use tracing::debug;

use super::store::RevisionStore;
use crate::types::EntityKey;

/// Decides whether a candidate payload repeats the latest stored revision.
///
/// Content is compared byte for byte; two XML documents that differ only in
/// formatting are not duplicates.
#[derive(Debug, Default, Clone, Copy)]
pub struct DuplicateDetector;

impl DuplicateDetector {
    pub fn new() -> Self {
        Self
    }

    /// True only if a previous revision exists, still has its payload and
    /// that payload equals `candidate`
    pub fn is_duplicate(&self, store: &dyn RevisionStore, key: &EntityKey, candidate: &[u8]) -> bool {
        let Ok(ids) = store.list_revision_summaries(key) else {
            return false;
        };
        let Some(latest) = ids.last() else {
            return false;
        };
        match store.read_revision(key, latest) {
            Ok(previous) if previous == candidate => {
                debug!(entity = %key, revision = %latest, "duplicate of latest revision");
                true
            }
            _ => false,
        }
    }
}
