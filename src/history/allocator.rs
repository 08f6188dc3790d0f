//! Collision-free revision directory allocation

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error};

use super::error::{HistoryError, HistoryResult};
use crate::types::TimestampId;
use crate::utils::Clock;

/// Creates fresh `<timestampId>` directories under a lineage.
///
/// When the current second is already taken the allocator sleeps and tries
/// again with a new timestamp. There is no retry limit; a clash only lasts
/// until the clock moves past the taken second.
pub struct RevisionAllocator {
    clock: Arc<dyn Clock>,
    clash_sleep: Duration,
}

impl RevisionAllocator {
    pub fn new(clock: Arc<dyn Clock>, clash_sleep: Duration) -> Self {
        Self { clock, clash_sleep }
    }

    /// Allocate a new revision directory under `history_dir`
    pub fn allocate(&self, history_dir: &Path) -> HistoryResult<(TimestampId, PathBuf)> {
        let (id, dir) = loop {
            let id = TimestampId::from_datetime(self.clock.now());
            let dir = history_dir.join(id.as_str());
            if dir.is_dir() {
                debug!(dir = %dir.display(), "revision directory taken, retrying");
                self.clock.sleep(self.clash_sleep);
                continue;
            }
            break (id, dir);
        };

        // Another writer may have created the same directory since the check.
        if let Err(e) = fs::create_dir_all(&dir) {
            if !dir.is_dir() {
                error!(dir = %dir.display(), error = %e, "could not create revision directory");
                return Err(HistoryError::RevisionDirUnavailable(dir));
            }
        }
        debug!(revision = %id, dir = %history_dir.display(), "allocated revision");
        Ok((id, dir))
    }
}
