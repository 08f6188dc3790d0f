//! Config History - entry point tying the history components together
//!
//! Write hooks never fail their caller: every outcome, including storage
//! errors, is reported as a [`WriteOutcome`] and logged.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info};

use super::allocator::RevisionAllocator;
use super::config::HistoryConfig;
use super::duplicate::DuplicateDetector;
use super::index::HistoryIndex;
use super::paths::{PathResolver, CONFIG_FILE};
use super::retention::QuantityRetention;
use super::store::{FileRevisionStore, Payload, RevisionStore};
use crate::types::{Actor, ChangeRecord, EntityKey, Operation, TimestampId};
use crate::utils::{current_actor, Clock, SystemClock};

/// What a write hook did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum WriteOutcome {
    Recorded { timestamp: TimestampId },
    /// Payload equal to the latest revision; nothing written
    Duplicate,
    /// File or actor excluded by configuration
    Excluded,
    /// Lineage moved, no revision written
    Relocated,
    /// Nothing to act on
    Skipped,
    Failed { reason: String },
}

impl WriteOutcome {
    pub fn timestamp(&self) -> Option<&TimestampId> {
        match self {
            WriteOutcome::Recorded { timestamp } => Some(timestamp),
            _ => None,
        }
    }

    fn failed(reason: impl ToString) -> Self {
        WriteOutcome::Failed {
            reason: reason.to_string(),
        }
    }
}

/// Versioned history of configuration files
pub struct ConfigHistory {
    pub(crate) config: HistoryConfig,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) store: FileRevisionStore,
    pub(crate) duplicates: DuplicateDetector,
    pub(crate) index: HistoryIndex,
    pub(crate) actor: Actor,
}

impl ConfigHistory {
    /// Create a history on the wall clock, acting as the current OS/git user
    pub fn new(config: HistoryConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock)).with_actor(current_actor())
    }

    pub fn with_clock(config: HistoryConfig, clock: Arc<dyn Clock>) -> Self {
        let resolver = PathResolver::new(&config);
        let allocator = RevisionAllocator::new(clock.clone(), config.clash_sleep);
        let mut store = FileRevisionStore::new(resolver.clone(), allocator);
        if let Some(max) = config.max_entries() {
            store = store.with_pre_write_policy(Box::new(QuantityRetention::new(max)));
        }
        Self {
            index: HistoryIndex::new(resolver),
            store,
            duplicates: DuplicateDetector::new(),
            clock,
            config,
            actor: Actor::unknown(),
        }
    }

    /// Actor recorded when a hook is not given one
    pub fn with_actor(mut self, actor: Actor) -> Self {
        self.actor = actor;
        self
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn store(&self) -> &dyn RevisionStore {
        &self.store
    }

    pub fn index(&self) -> &HistoryIndex {
        &self.index
    }

    pub fn resolver(&self) -> &PathResolver {
        self.store.resolver()
    }

    // ---- write hooks ----

    /// First revision of a new entity
    pub fn record_created(&self, key: &EntityKey, content: &[u8], actor: Option<Actor>) -> WriteOutcome {
        let record = ChangeRecord::new(Operation::Created, self.actor_or_default(actor));
        self.record(key, Some(self.payload_for(key, content)), record)
    }

    /// A saved configuration; suppressed when equal to the latest revision
    /// and duplicate skipping is enabled
    pub fn record_changed(
        &self,
        key: &EntityKey,
        content: &[u8],
        actor: Option<Actor>,
        comment: Option<String>,
    ) -> WriteOutcome {
        let record = ChangeRecord::new(Operation::Changed, self.actor_or_default(actor)).with_comment(comment);
        self.record(key, Some(self.payload_for(key, content)), record)
    }

    /// A live config file saved under the base directory
    pub fn record_config_file(&self, path: &Path, actor: Option<Actor>, comment: Option<String>) -> WriteOutcome {
        if !self.config.is_saveable(path) {
            debug!(path = %path.display(), "config file excluded from history");
            return WriteOutcome::Excluded;
        }
        let payload = match Payload::from_file(path) {
            Ok(payload) => payload,
            Err(e) => {
                error!(path = %path.display(), error = %e, "unable to read config file");
                return WriteOutcome::failed(e);
            }
        };
        let key = EntityKey::ConfigFile(path.to_path_buf());
        let record = ChangeRecord::new(Operation::Changed, self.actor_or_default(actor)).with_comment(comment);
        self.record(&key, Some(payload), record)
    }

    /// Entity renamed: its lineage moves to the new name, then a `Renamed`
    /// revision carrying both names is recorded
    pub fn record_renamed(
        &self,
        old_key: &EntityKey,
        new_key: &EntityKey,
        content: &[u8],
        actor: Option<Actor>,
    ) -> WriteOutcome {
        let actor = self.actor_or_default(actor);
        if self.config.is_user_excluded(&actor.id) {
            return WriteOutcome::Excluded;
        }
        if let Err(e) = self.store.relocate_lineage(old_key, new_key) {
            error!(from = %old_key, to = %new_key, error = %e, "unable to move history");
            return WriteOutcome::failed(e);
        }
        let record = ChangeRecord::renamed(actor, &old_key.name(), &new_key.name());
        self.record(new_key, Some(self.payload_for(new_key, content)), record)
    }

    /// Entity moved between folders: the lineage follows, nothing is recorded
    pub fn record_relocated(&self, old_key: &EntityKey, new_key: &EntityKey) -> WriteOutcome {
        match self.store.relocate_lineage(old_key, new_key) {
            Ok(true) => WriteOutcome::Relocated,
            Ok(false) => WriteOutcome::Skipped,
            Err(e) => {
                error!(from = %old_key, to = %new_key, error = %e, "unable to move history");
                WriteOutcome::failed(e)
            }
        }
    }

    /// Entity removed: a metadata-only `Deleted` revision is recorded, then
    /// the lineage is renamed to its soft-deleted name
    pub fn record_deleted(&self, key: &EntityKey, actor: Option<Actor>) -> WriteOutcome {
        if matches!(key, EntityKey::DeletedJob(_)) {
            return WriteOutcome::failed(format!("{} is already deleted", key));
        }
        let record = ChangeRecord::new(Operation::Deleted, self.actor_or_default(actor));
        let outcome = self.record(key, None, record);
        if !matches!(outcome, WriteOutcome::Recorded { .. }) {
            return outcome;
        }
        match self.store.soft_delete_lineage(key, self.clock.now()) {
            Ok(_) => outcome,
            Err(e) => {
                error!(entity = %key, error = %e, "unable to mark history deleted");
                WriteOutcome::failed(e)
            }
        }
    }

    fn record(&self, key: &EntityKey, payload: Option<Payload>, record: ChangeRecord) -> WriteOutcome {
        if self.config.is_user_excluded(&record.actor.id) {
            debug!(entity = %key, user = %record.actor.id, "user excluded from history");
            return WriteOutcome::Excluded;
        }
        if record.operation == Operation::Changed && self.config.skip_duplicates {
            if let Some(payload) = &payload {
                if self.duplicates.is_duplicate(&self.store, key, &payload.content) {
                    info!(entity = %key, "duplicate history entry suppressed");
                    return WriteOutcome::Duplicate;
                }
            }
        }
        match self.store.write_revision(key, payload.as_ref(), record) {
            Ok(timestamp) => WriteOutcome::Recorded { timestamp },
            Err(e) => {
                error!(entity = %key, error = %e, "unable to record history");
                WriteOutcome::failed(e)
            }
        }
    }

    fn actor_or_default(&self, actor: Option<Actor>) -> Actor {
        actor.unwrap_or_else(|| self.actor.clone())
    }

    /// Payload file name used for an entity's revisions
    fn payload_for(&self, key: &EntityKey, content: &[u8]) -> Payload {
        let file_name = match key {
            EntityKey::ConfigFile(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| CONFIG_FILE.to_string()),
            EntityKey::System(name) => format!("{}.xml", name),
            EntityKey::Job(_) | EntityKey::Agent(_) | EntityKey::DeletedJob(_) => CONFIG_FILE.to_string(),
        };
        Payload::new(file_name, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::ManualClock;
    use chrono::{Duration, NaiveDate};
    use std::fs;
    use tempfile::TempDir;

    fn setup(config: impl FnOnce(HistoryConfig) -> HistoryConfig) -> (TempDir, Arc<ManualClock>, ConfigHistory) {
        let temp_dir = TempDir::new().unwrap();
        let start = NaiveDate::from_ymd_opt(2012, 11, 21)
            .unwrap()
            .and_hms_opt(11, 28, 12)
            .unwrap();
        let clock = Arc::new(ManualClock::new(start));
        let config = config(HistoryConfig::new(temp_dir.path()));
        let history = ConfigHistory::with_clock(config, clock.clone()).with_actor(Actor::new("Jane", "jane"));
        (temp_dir, clock, history)
    }

    fn job(name: &str) -> EntityKey {
        EntityKey::Job(name.to_string())
    }

    #[test]
    fn test_created_then_changed() {
        let (_dir, clock, history) = setup(|c| c);
        let created = history.record_created(&job("Test1"), b"<project/>", None);
        clock.advance(Duration::seconds(1));
        let changed = history.record_changed(&job("Test1"), b"<project>1</project>", None, None);

        assert!(created.timestamp().is_some());
        assert!(changed.timestamp().is_some());
        let revisions = history.store().list_revisions(&job("Test1")).unwrap();
        assert_eq!(revisions.len(), 2);
        assert!(revisions.values().all(|r| r.user_id == "jane"));
    }

    #[test]
    fn test_duplicate_suppressed_when_enabled() {
        let (_dir, clock, history) = setup(|c| c.with_skip_duplicates(true));
        history.record_changed(&job("a"), b"same", None, None);
        clock.advance(Duration::seconds(1));
        let second = history.record_changed(&job("a"), b"same", None, None);

        assert_eq!(second, WriteOutcome::Duplicate);
        assert_eq!(history.store().list_revision_summaries(&job("a")).unwrap().len(), 1);
    }

    #[test]
    fn test_duplicate_kept_when_disabled() {
        let (_dir, clock, history) = setup(|c| c.with_skip_duplicates(false));
        history.record_changed(&job("a"), b"same", None, None);
        clock.advance(Duration::seconds(1));
        history.record_changed(&job("a"), b"same", None, None);

        assert_eq!(history.store().list_revision_summaries(&job("a")).unwrap().len(), 2);
    }

    #[test]
    fn test_excluded_user() {
        let (_dir, _clock, history) = setup(|c| c.with_excluded_users(["robot"]));
        let outcome = history.record_changed(&job("a"), b"x", Some(Actor::new("Robot", "robot")), None);
        assert_eq!(outcome, WriteOutcome::Excluded);
        assert!(history.store().list_revisions(&job("a")).unwrap().is_empty());
    }

    #[test]
    fn test_config_file_hook() {
        let (dir, _clock, history) = setup(|c| c);
        let config = dir.path().join("config.xml");
        fs::write(&config, "<hudson/>").unwrap();
        let queue = dir.path().join("queue.xml");
        fs::write(&queue, "<queue/>").unwrap();

        assert!(history.record_config_file(&config, None, None).timestamp().is_some());
        assert_eq!(history.record_config_file(&queue, None, None), WriteOutcome::Excluded);

        let system = EntityKey::System("config".to_string());
        let ids = history.store().list_revision_summaries(&system).unwrap();
        assert_eq!(history.store().read_revision(&system, &ids[0]).unwrap(), b"<hudson/>");
    }

    #[test]
    fn test_config_file_outside_base_fails() {
        let (_dir, _clock, history) = setup(|c| c);
        let other = TempDir::new().unwrap();
        let file = other.path().join("config.xml");
        fs::write(&file, "<x/>").unwrap();

        assert!(matches!(
            history.record_config_file(&file, None, None),
            WriteOutcome::Failed { .. }
        ));
    }

    #[test]
    fn test_renamed_moves_lineage() {
        let (_dir, clock, history) = setup(|c| c);
        history.record_created(&job("Foo"), b"<project/>", None);
        clock.advance(Duration::seconds(1));
        let outcome = history.record_renamed(&job("Foo"), &job("Bar"), b"<project/>", None);

        assert!(outcome.timestamp().is_some());
        assert!(history.store().list_revisions(&job("Foo")).unwrap().is_empty());
        let revisions = history.store().list_revisions(&job("Bar")).unwrap();
        let last = revisions.values().next_back().unwrap();
        assert_eq!(last.operation, Operation::Renamed);
        assert_eq!(last.old_name.as_deref(), Some("Foo"));
        assert_eq!(last.current_name.as_deref(), Some("Bar"));
    }

    #[test]
    fn test_deleted_soft_deletes_lineage() {
        let (dir, clock, history) = setup(|c| c);
        history.record_created(&job("Test1"), b"<project/>", None);
        clock.advance(Duration::seconds(1));
        let outcome = history.record_deleted(&job("Test1"), None);

        let id = outcome.timestamp().unwrap().clone();
        let jobs = dir.path().join("config-history").join("jobs");
        assert!(!jobs.join("Test1").exists());
        let deleted = EntityKey::DeletedJob("Test1_deleted_20121121_112813_000".to_string());
        let revision = history.store().load_revision_metadata(&deleted, &id).unwrap();
        assert_eq!(revision.operation, Operation::Deleted);
        assert!(!history.store().has_revision(&deleted, &id));
    }

    #[test]
    fn test_relocated_writes_nothing() {
        let (_dir, _clock, history) = setup(|c| c);
        history.record_created(&job("job"), b"<project/>", None);

        assert_eq!(history.record_relocated(&job("job"), &job("folder/job")), WriteOutcome::Relocated);
        assert_eq!(history.record_relocated(&job("job"), &job("folder/job")), WriteOutcome::Skipped);
        assert_eq!(history.store().list_revisions(&job("folder/job")).unwrap().len(), 1);
    }

    #[test]
    fn test_quantity_limit_applied_on_write() {
        let (_dir, clock, history) = setup(|c| c.with_max_entries(Some(3)).with_skip_duplicates(false));
        for i in 0..5 {
            history.record_changed(&job("a"), format!("v{}", i).as_bytes(), None, None);
            clock.advance(Duration::seconds(1));
        }
        assert_eq!(history.store().list_revision_summaries(&job("a")).unwrap().len(), 3);
    }

    #[test]
    fn test_agent_payload_is_config_xml() {
        let (dir, _clock, history) = setup(|c| c);
        history.record_created(&EntityKey::Agent("agent1".to_string()), b"<slave/>", None);

        let lineage = dir.path().join("config-history").join("nodes").join("agent1");
        let revision = fs::read_dir(&lineage).unwrap().next().unwrap().unwrap().path();
        assert!(revision.join("config.xml").is_file());
    }

    #[test]
    fn test_outcome_serializes_with_tag() {
        let json = serde_json::to_value(WriteOutcome::Duplicate).unwrap();
        assert_eq!(json["outcome"], "duplicate");
    }
}
