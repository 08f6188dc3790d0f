//! Read, compare and maintenance operations on [`ConfigHistory`]
//!
//! Every caller-supplied timestamp is validated before any lookup, and "no
//! history" is reported separately from "no such revision".

use tracing::{info, warn};

use super::error::{HistoryError, HistoryResult};
use super::index::{OverviewFilter, RevisionCounts};
use super::retention::{AgeRetention, PurgeReport, RetentionPolicy};
use super::service::ConfigHistory;
use super::store::RevisionStore;
use crate::diff::{compare_texts, Comparison, Context};
use crate::types::{ConfigInfo, EntityKey, Revision, TimestampId};
use crate::validation::check_timestamp;

impl ConfigHistory {
    /// All revisions of an entity, oldest first
    pub fn list_revisions(&self, key: &EntityKey) -> HistoryResult<Vec<Revision>> {
        Ok(self.store.list_revisions(key)?.into_values().collect())
    }

    pub fn revision_metadata(&self, key: &EntityKey, timestamp: &str) -> HistoryResult<Revision> {
        let id = check_timestamp(timestamp)?;
        self.store.load_revision_metadata(key, &id)
    }

    /// Stored payload of one revision
    pub fn read_revision(&self, key: &EntityKey, timestamp: &str) -> HistoryResult<Vec<u8>> {
        let id = check_timestamp(timestamp)?;
        self.store.read_revision(key, &id)
    }

    /// Diff two revisions of one entity, older text on the left
    pub fn compare(
        &self,
        key: &EntityKey,
        timestamp1: &str,
        timestamp2: &str,
        context: Context,
    ) -> HistoryResult<Comparison> {
        let first = check_timestamp(timestamp1)?;
        let second = check_timestamp(timestamp2)?;
        let (old, new) = if first <= second {
            (first, second)
        } else {
            (second, first)
        };
        let old_text = self.store.read_revision(key, &old)?;
        let new_text = self.store.read_revision(key, &new)?;
        Ok(compare_texts(
            old.as_str(),
            new.as_str(),
            &String::from_utf8_lossy(&old_text),
            &String::from_utf8_lossy(&new_text),
            context,
        )?)
    }

    pub fn has_revision(&self, key: &EntityKey, timestamp: &str) -> HistoryResult<bool> {
        let id = check_timestamp(timestamp)?;
        Ok(self.store.has_revision(key, &id))
    }

    /// Whether a revision's payload equals the live configuration
    pub fn revision_equals_current(&self, key: &EntityKey, timestamp: &str, current: &[u8]) -> HistoryResult<bool> {
        let id = check_timestamp(timestamp)?;
        self.store.revision_equals_current(key, &id, current)
    }

    pub fn delete_revision(&self, key: &EntityKey, timestamp: &str) -> HistoryResult<TimestampId> {
        let id = check_timestamp(timestamp)?;
        self.store.delete_revision(key, &id)?;
        info!(entity = %key, revision = %id, "revision removed on request");
        Ok(id)
    }

    /// Age sweep over every live lineage. Does nothing when no age limit is set.
    pub fn purge_by_age(&self) -> PurgeReport {
        let mut report = PurgeReport::default();
        let Some(days) = self.config.max_age_days() else {
            return report;
        };
        let policy = AgeRetention::new(days, self.clock.clone());
        for lineage in self.index.live_lineages() {
            report.merge(policy.purge(&lineage));
        }
        if !report.failed.is_empty() {
            warn!(failed = report.failed.len(), "some revisions could not be removed");
        }
        info!(removed = report.removed.len(), max_age_days = days, "age purge finished");
        report
    }

    pub fn overview(&self, filter: OverviewFilter) -> Vec<ConfigInfo> {
        self.index.overview(filter)
    }

    pub fn revision_counts(&self) -> RevisionCounts {
        self.index.revision_counts()
    }

    /// Revision id of the newest revision, if any
    pub fn latest_revision(&self, key: &EntityKey) -> HistoryResult<Option<TimestampId>> {
        Ok(self.store.list_revision_summaries(key)?.pop())
    }

    /// Fail with `NoHistory` when the entity has never been recorded
    pub fn require_history(&self, key: &EntityKey) -> HistoryResult<()> {
        if self.store.list_revision_summaries(key)?.is_empty() {
            return Err(HistoryError::NoHistory(key.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, NaiveDate};
    use tempfile::TempDir;

    use crate::diff::Tag;
    use crate::history::config::HistoryConfig;
    use crate::history::service::ConfigHistory;
    use crate::types::{Actor, EntityKey, Operation};
    use crate::utils::ManualClock;

    use super::*;

    fn setup(config: impl FnOnce(HistoryConfig) -> HistoryConfig) -> (TempDir, Arc<ManualClock>, ConfigHistory) {
        let temp_dir = TempDir::new().unwrap();
        let start = NaiveDate::from_ymd_opt(2012, 11, 21)
            .unwrap()
            .and_hms_opt(11, 28, 12)
            .unwrap();
        let clock = Arc::new(ManualClock::new(start));
        let config = config(HistoryConfig::new(temp_dir.path()));
        let history = ConfigHistory::with_clock(config, clock.clone()).with_actor(Actor::unknown());
        (temp_dir, clock, history)
    }

    fn job(name: &str) -> EntityKey {
        EntityKey::Job(name.to_string())
    }

    #[test]
    fn test_compare_two_revisions() {
        let (_dir, clock, history) = setup(|c| c);
        history.record_created(&job("a"), b"a", None);
        clock.advance(Duration::seconds(1));
        history.record_changed(&job("a"), b"b", None, None);

        let comparison = history
            .compare(&job("a"), "2012-11-21_11-28-13", "2012-11-21_11-28-12", Context::default())
            .unwrap();

        assert!(comparison.unified.ends_with("@@ -1,1 +1,1 @@\n-a\n+b\n"));
        assert_eq!(comparison.rows[0].tag(), Some(Tag::Change));
    }

    #[test]
    fn test_compare_rejects_bad_timestamp() {
        let (_dir, _clock, history) = setup(|c| c);
        history.record_created(&job("a"), b"a", None);

        let result = history.compare(&job("a"), "2012-11-21_11-28-12", "yesterday", Context::default());
        assert!(matches!(result, Err(HistoryError::InvalidTimestamp(_))));
    }

    #[test]
    fn test_missing_history_vs_missing_revision() {
        let (_dir, _clock, history) = setup(|c| c);
        assert!(matches!(
            history.read_revision(&job("nothing"), "2012-11-21_11-28-12"),
            Err(HistoryError::NoHistory(_))
        ));

        history.record_created(&job("a"), b"a", None);
        assert!(matches!(
            history.read_revision(&job("a"), "2000-01-01_00-00-00"),
            Err(HistoryError::RevisionNotFound { .. })
        ));
        assert!(matches!(history.require_history(&job("nothing")), Err(HistoryError::NoHistory(_))));
    }

    #[test]
    fn test_path_escape_rejected() {
        let (_dir, _clock, history) = setup(|c| c);
        let result = history.read_revision(&job("../secrets"), "2012-11-21_11-28-12");
        assert!(matches!(result, Err(HistoryError::InvalidName(_))));
    }

    #[test]
    fn test_age_purge_keeps_created() {
        let (_dir, clock, history) = setup(|c| c.with_max_age_days(Some(1)).with_skip_duplicates(false));
        history.record_created(&job("a"), b"v0", None);
        clock.advance(Duration::seconds(1));
        history.record_changed(&job("a"), b"v1", None, None);
        clock.advance(Duration::days(3));
        history.record_changed(&job("a"), b"v2", None, None);

        let report = history.purge_by_age();

        assert_eq!(report.removed.len(), 1);
        let operations: Vec<Operation> = history
            .list_revisions(&job("a"))
            .unwrap()
            .into_iter()
            .map(|r| r.operation)
            .collect();
        assert_eq!(operations, vec![Operation::Created, Operation::Changed]);
    }

    #[test]
    fn test_age_purge_disabled() {
        let (_dir, clock, history) = setup(|c| c);
        history.record_changed(&job("a"), b"v0", None, None);
        clock.advance(Duration::days(400));
        assert!(history.purge_by_age().removed.is_empty());
    }

    #[test]
    fn test_delete_and_equals_current() {
        let (_dir, _clock, history) = setup(|c| c);
        let ts = "2012-11-21_11-28-12";
        history.record_created(&job("a"), b"<x/>", None);

        assert!(history.has_revision(&job("a"), ts).unwrap());
        assert!(history.revision_equals_current(&job("a"), ts, b"<x/>").unwrap());
        assert!(!history.revision_equals_current(&job("a"), ts, b"<y/>").unwrap());

        history.delete_revision(&job("a"), ts).unwrap();
        assert!(!history.has_revision(&job("a"), ts).unwrap());
        assert_eq!(history.latest_revision(&job("a")).unwrap(), None);
    }
}
