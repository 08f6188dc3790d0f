//! Revision Store - reading and writing revisions on disk
//!
//! Each revision is a `<timestampId>/` directory holding `history.xml` and,
//! for every operation except `Deleted`, a verbatim copy of the payload.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use super::allocator::RevisionAllocator;
use super::error::{HistoryError, HistoryResult};
use super::metadata::{read_metadata, write_metadata};
use super::paths::{deleted_lineage_name, PathResolver, HISTORY_FILE};
use super::retention::{revision_dirs, RetentionPolicy};
use crate::types::{ChangeRecord, EntityKey, Revision, TimestampId};
use crate::utils::atomic_write;

/// A configuration payload to be copied into a revision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    /// File name inside the revision directory (`config.xml`)
    pub file_name: String,
    pub content: Vec<u8>,
}

impl Payload {
    pub fn new(file_name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
        }
    }

    /// Read a live config file
    pub fn from_file(path: &Path) -> HistoryResult<Self> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| HistoryError::InvalidName(path.display().to_string()))?;
        Ok(Self::new(file_name, fs::read(path)?))
    }
}

/// Storage capability for entity histories
pub trait RevisionStore: Send + Sync {
    /// Record a new revision and return its id
    fn write_revision(
        &self,
        key: &EntityKey,
        payload: Option<&Payload>,
        record: ChangeRecord,
    ) -> HistoryResult<TimestampId>;

    /// All revisions with their metadata, ascending by id.
    ///
    /// Unreadable revision directories are skipped.
    fn list_revisions(&self, key: &EntityKey) -> HistoryResult<BTreeMap<TimestampId, Revision>>;

    /// Revision ids only, ascending, without reading any metadata
    fn list_revision_summaries(&self, key: &EntityKey) -> HistoryResult<Vec<TimestampId>>;

    /// Metadata of one revision
    fn load_revision_metadata(&self, key: &EntityKey, id: &TimestampId) -> HistoryResult<Revision>;

    /// Payload of one revision
    fn read_revision(&self, key: &EntityKey, id: &TimestampId) -> HistoryResult<Vec<u8>>;

    /// Remove one revision directory
    fn delete_revision(&self, key: &EntityKey, id: &TimestampId) -> HistoryResult<()>;

    /// Whether the revision exists and carries a payload
    fn has_revision(&self, key: &EntityKey, id: &TimestampId) -> bool;

    /// Whether a stored payload equals `current` byte for byte
    fn revision_equals_current(
        &self,
        key: &EntityKey,
        id: &TimestampId,
        current: &[u8],
    ) -> HistoryResult<bool> {
        Ok(self.read_revision(key, id)? == current)
    }

    /// Move a whole lineage; returns false when there was nothing to move
    fn relocate_lineage(&self, from: &EntityKey, to: &EntityKey) -> HistoryResult<bool>;

    /// Rename a lineage to its soft-deleted name; returns the new directory
    fn soft_delete_lineage(&self, key: &EntityKey, now: NaiveDateTime) -> HistoryResult<Option<PathBuf>>;
}

/// File-system backed revision store
pub struct FileRevisionStore {
    resolver: PathResolver,
    allocator: RevisionAllocator,
    pre_write: Option<Box<dyn RetentionPolicy>>,
}

impl FileRevisionStore {
    pub fn new(resolver: PathResolver, allocator: RevisionAllocator) -> Self {
        Self {
            resolver,
            allocator,
            pre_write: None,
        }
    }

    /// Run `policy` on a lineage right before each new revision is allocated
    pub fn with_pre_write_policy(mut self, policy: Box<dyn RetentionPolicy>) -> Self {
        self.pre_write = Some(policy);
        self
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Existing lineage directory, or `NoHistory`
    fn lineage_dir(&self, key: &EntityKey) -> HistoryResult<PathBuf> {
        let dir = self.resolver.resolve(key)?;
        if !dir.is_dir() {
            return Err(HistoryError::NoHistory(key.to_string()));
        }
        self.resolver.ensure_contained(&dir, self.resolver.history_root())?;
        Ok(dir)
    }

    fn revision_dir(&self, key: &EntityKey, id: &TimestampId) -> HistoryResult<PathBuf> {
        let dir = self.lineage_dir(key)?.join(id.as_str());
        if !dir.join(HISTORY_FILE).is_file() {
            return Err(not_found(key, id));
        }
        Ok(dir)
    }
}

impl RevisionStore for FileRevisionStore {
    fn write_revision(
        &self,
        key: &EntityKey,
        payload: Option<&Payload>,
        record: ChangeRecord,
    ) -> HistoryResult<TimestampId> {
        if let Some(payload) = payload {
            if payload.file_name == HISTORY_FILE || payload.file_name.contains(['/', '\\']) {
                return Err(HistoryError::InvalidName(payload.file_name.clone()));
            }
        }
        let history_dir = self.resolver.resolve(key)?;
        if let Some(policy) = &self.pre_write {
            let report = policy.purge(&history_dir);
            if !report.removed.is_empty() {
                debug!(entity = %key, removed = report.removed.len(), "purged before write");
            }
        }

        let (id, revision_dir) = self.allocator.allocate(&history_dir)?;
        let operation = record.operation;
        if operation.has_payload() {
            if let Some(payload) = payload {
                atomic_write(revision_dir.join(&payload.file_name), &payload.content)?;
            }
        }
        write_metadata(&revision_dir, &record.into_revision(id.clone()))?;

        info!(entity = %key, revision = %id, %operation, "recorded revision");
        Ok(id)
    }

    fn list_revisions(&self, key: &EntityKey) -> HistoryResult<BTreeMap<TimestampId, Revision>> {
        let history_dir = self.resolver.resolve(key)?;
        Ok(read_lineage(&history_dir))
    }

    fn list_revision_summaries(&self, key: &EntityKey) -> HistoryResult<Vec<TimestampId>> {
        let history_dir = self.resolver.resolve(key)?;
        Ok(revision_dirs(&history_dir)
            .into_iter()
            .filter_map(|(name, _)| TimestampId::parse(&name))
            .collect())
    }

    fn load_revision_metadata(&self, key: &EntityKey, id: &TimestampId) -> HistoryResult<Revision> {
        let dir = self.revision_dir(key, id)?;
        read_metadata(&dir, id)
    }

    fn read_revision(&self, key: &EntityKey, id: &TimestampId) -> HistoryResult<Vec<u8>> {
        let dir = self.revision_dir(key, id)?;
        let payload = payload_file(&dir).ok_or_else(|| not_found(key, id))?;
        Ok(fs::read(payload)?)
    }

    fn delete_revision(&self, key: &EntityKey, id: &TimestampId) -> HistoryResult<()> {
        let dir = self.revision_dir(key, id)?;
        if let Err(e) = fs::remove_dir_all(&dir) {
            warn!(entity = %key, revision = %id, error = %e, "unable to delete revision");
            return Err(e.into());
        }
        debug!(entity = %key, revision = %id, "revision deleted");
        Ok(())
    }

    fn has_revision(&self, key: &EntityKey, id: &TimestampId) -> bool {
        self.revision_dir(key, id)
            .map(|dir| payload_file(&dir).is_some())
            .unwrap_or(false)
    }

    fn relocate_lineage(&self, from: &EntityKey, to: &EntityKey) -> HistoryResult<bool> {
        let source = self.resolver.resolve(from)?;
        let target = self.resolver.resolve(to)?;
        if !source.is_dir() || source == target {
            return Ok(false);
        }
        if target.starts_with(&source) {
            return Err(HistoryError::Relocate(format!(
                "{} lies inside {}",
                target.display(),
                source.display()
            )));
        }
        move_tree(&source, &target)?;
        info!(from = %from, to = %to, "moved history lineage");
        Ok(true)
    }

    fn soft_delete_lineage(&self, key: &EntityKey, now: NaiveDateTime) -> HistoryResult<Option<PathBuf>> {
        let dir = self.resolver.resolve(key)?;
        if !dir.is_dir() {
            return Ok(None);
        }
        let (Some(parent), Some(name)) = (dir.parent(), dir.file_name().and_then(|n| n.to_str())) else {
            return Err(HistoryError::InvalidName(key.name()));
        };
        let deleted = parent.join(deleted_lineage_name(name, now));
        fs::rename(&dir, &deleted)?;
        info!(entity = %key, to = %deleted.display(), "history marked deleted");
        Ok(Some(deleted))
    }
}

fn not_found(key: &EntityKey, id: &TimestampId) -> HistoryError {
    HistoryError::RevisionNotFound {
        entity: key.to_string(),
        timestamp: id.to_string(),
    }
}

/// Read every parsable revision of a lineage directory
pub(crate) fn read_lineage(history_dir: &Path) -> BTreeMap<TimestampId, Revision> {
    let mut revisions = BTreeMap::new();
    for (name, dir) in revision_dirs(history_dir) {
        let Some(id) = TimestampId::parse(&name) else {
            debug!(dir = %dir.display(), "skipping directory with foreign name");
            continue;
        };
        match read_metadata(&dir, &id) {
            Ok(revision) => {
                revisions.insert(id, revision);
            }
            Err(e) => warn!(dir = %dir.display(), error = %e, "skipping unreadable revision"),
        }
    }
    revisions
}

/// The payload copy inside a revision directory: any file except `history.xml`,
/// preferring `.xml` files
pub fn payload_file(revision_dir: &Path) -> Option<PathBuf> {
    let mut candidates: Vec<PathBuf> = fs::read_dir(revision_dir)
        .ok()?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| path.file_name().is_some_and(|n| n != HISTORY_FILE))
        .filter(|path| !path.extension().is_some_and(|e| e == "tmp"))
        .collect();
    candidates.sort();
    let xml = candidates
        .iter()
        .position(|path| path.extension().is_some_and(|e| e == "xml"));
    match xml {
        Some(i) => Some(candidates.swap_remove(i)),
        None => candidates.into_iter().next(),
    }
}

/// Move `source` to `target`, merging into an existing target
fn move_tree(source: &Path, target: &Path) -> HistoryResult<()> {
    if !target.exists() {
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        if fs::rename(source, target).is_ok() {
            return Ok(());
        }
    }

    fs::create_dir_all(target)?;
    for entry in fs::read_dir(source)? {
        let entry = entry?;
        let from = entry.path();
        let to = target.join(entry.file_name());
        if from.is_dir() {
            move_tree(&from, &to)?;
        } else {
            // Same-named files are overwritten, never dropped.
            fs::rename(&from, &to).or_else(|_| fs::copy(&from, &to).map(|_| ()))?;
        }
    }
    fs::remove_dir_all(source)?;
    Ok(())
}
