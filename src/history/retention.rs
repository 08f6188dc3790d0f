//! Retention policies
//!
//! Two independent strategies prune a single lineage:
//! - `QuantityRetention`: keep the newest `max_entries - 1` revisions, leaving
//!   room for the write about to happen
//! - `AgeRetention`: drop revisions older than `max_age_days`
//!
//! Neither ever deletes a `Created` revision. Failures on individual files are
//! logged and the sweep continues.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Duration;
use serde::Serialize;
use tracing::{debug, warn};

use super::metadata::read_operation;
use super::paths::HISTORY_FILE;
use crate::types::{Operation, TimestampId};
use crate::utils::Clock;

/// What a purge did to one lineage
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct PurgeReport {
    /// Revision directories removed
    pub removed: Vec<String>,
    /// Revision directories that could not be fully removed
    pub failed: Vec<String>,
}

impl PurgeReport {
    pub fn merge(&mut self, other: PurgeReport) {
        self.removed.extend(other.removed);
        self.failed.extend(other.failed);
    }
}

/// A pruning strategy for one lineage directory
pub trait RetentionPolicy: Send + Sync {
    fn purge(&self, history_dir: &Path) -> PurgeReport;
}

/// Keep at most `max_entries` revisions once the next write lands
#[derive(Debug, Clone, Copy)]
pub struct QuantityRetention {
    max_entries: usize,
}

impl QuantityRetention {
    /// `0` disables the policy
    pub fn new(max_entries: usize) -> Self {
        Self { max_entries }
    }
}

impl RetentionPolicy for QuantityRetention {
    fn purge(&self, history_dir: &Path) -> PurgeReport {
        let mut report = PurgeReport::default();
        if self.max_entries == 0 {
            return report;
        }
        debug!(max = self.max_entries, dir = %history_dir.display(), "checking for revisions to purge");

        let entries_to_leave = self.max_entries - 1;
        let mut dirs = revision_dirs(history_dir);
        if dirs.len() < entries_to_leave {
            return report;
        }
        dirs.reverse();
        for (name, dir) in dirs.into_iter().skip(entries_to_leave) {
            if is_created_entry(&dir) {
                continue;
            }
            debug!(dir = %dir.display(), "purging revision");
            record(&mut report, name, delete_revision_dir(&dir));
        }
        report
    }
}

/// Drop revisions older than `max_age_days` relative to the clock
pub struct AgeRetention {
    max_age_days: u32,
    clock: Arc<dyn Clock>,
}

impl AgeRetention {
    /// `0` disables the policy
    pub fn new(max_age_days: u32, clock: Arc<dyn Clock>) -> Self {
        Self { max_age_days, clock }
    }

    fn is_too_old(&self, name: &str) -> bool {
        let Some(id) = TimestampId::parse(name) else {
            warn!(name, "unable to parse revision date");
            return false;
        };
        let cutoff = self.clock.now() - Duration::days(i64::from(self.max_age_days));
        id.datetime() < cutoff
    }
}

impl RetentionPolicy for AgeRetention {
    fn purge(&self, history_dir: &Path) -> PurgeReport {
        let mut report = PurgeReport::default();
        if self.max_age_days == 0 {
            return report;
        }

        // Ascending order: the first young entry ends the scan.
        for (name, dir) in revision_dirs(history_dir) {
            if !self.is_too_old(&name) {
                break;
            }
            if is_created_entry(&dir) {
                continue;
            }
            debug!(dir = %dir.display(), "purging revision past max age");
            record(&mut report, name, delete_revision_dir(&dir));
        }
        report
    }
}

fn record(report: &mut PurgeReport, name: String, deleted: bool) {
    if deleted {
        report.removed.push(name);
    } else {
        report.failed.push(name);
    }
}

/// Sub-directories holding a `history.xml`, ascending by name
pub(crate) fn revision_dirs(history_dir: &Path) -> Vec<(String, PathBuf)> {
    let Ok(entries) = fs::read_dir(history_dir) else {
        return Vec::new();
    };
    let mut dirs: Vec<(String, PathBuf)> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_dir() && path.join(HISTORY_FILE).is_file())
        .filter_map(|path| {
            let name = path.file_name()?.to_str()?.to_string();
            Some((name, path))
        })
        .collect();
    dirs.sort();
    dirs
}

fn is_created_entry(revision_dir: &Path) -> bool {
    read_operation(revision_dir) == Some(Operation::Created)
}

/// Remove a revision directory file by file.
///
/// Returns false and leaves the directory in place if anything inside could
/// not be removed.
pub fn delete_revision_dir(dir: &Path) -> bool {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "directory already deleted or unreadable");
            return false;
        }
    };

    let mut emptied = true;
    for entry in entries.filter_map(Result::ok) {
        let path = entry.path();
        let result = if path.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        if let Err(e) = result {
            warn!(file = %path.display(), error = %e, "problem deleting history file");
            emptied = false;
        }
    }
    if !emptied {
        return false;
    }

    match fs::remove_dir(dir) {
        Ok(()) => true,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "problem deleting history directory");
            false
        }
    }
}
