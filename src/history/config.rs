//! Configuration for the history store

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::warn;

/// Default history root, relative to the base directory
pub const DEFAULT_HISTORY_DIR: &str = "config-history";

/// Files under the base directory that change constantly and carry no user configuration
pub const DEFAULT_EXCLUDED_FILES: [&str; 6] = [
    "queue.xml",
    "nodeMonitors.xml",
    "UpdateCenter.xml",
    "global-build-stats",
    "LockableResourcesManager.xml",
    "MilestoneStep.xml",
];

/// Delay before retrying when a revision directory name is already taken
pub const DEFAULT_CLASH_SLEEP: Duration = Duration::from_millis(500);

/// Configuration for the history store
#[derive(Debug, Clone)]
pub struct HistoryConfig {
    /// Root of all stored revisions
    pub history_root: PathBuf,
    /// Base directory of the managed instance; system configs live directly in it
    pub base_dir: PathBuf,
    /// Per-entity revision cap; `None` or `Some(0)` disables quantity purging
    pub max_entries: Option<usize>,
    /// Maximum revision age in days; `None` or `Some(0)` disables age purging
    pub max_age_days: Option<u32>,
    /// Suppress a save whose payload equals the latest revision
    pub skip_duplicates: bool,
    /// Path fragments of config files that are never recorded
    pub excluded_files: Vec<String>,
    /// Actor ids whose changes are never recorded
    pub excluded_users: Vec<String>,
    /// Allocator retry delay
    pub clash_sleep: Duration,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self::new(".")
    }
}

impl HistoryConfig {
    /// Create config for a base directory, with history under `<base>/config-history`
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        Self {
            history_root: base_dir.join(DEFAULT_HISTORY_DIR),
            base_dir,
            max_entries: None,
            max_age_days: None,
            skip_duplicates: true,
            excluded_files: DEFAULT_EXCLUDED_FILES.iter().map(|s| s.to_string()).collect(),
            excluded_users: Vec::new(),
            clash_sleep: DEFAULT_CLASH_SLEEP,
        }
    }

    /// Place the history root; a relative path is taken relative to the base directory
    pub fn with_history_root<P: AsRef<Path>>(mut self, root: P) -> Self {
        let root = root.as_ref();
        self.history_root = if root.is_absolute() {
            root.to_path_buf()
        } else {
            self.base_dir.join(root)
        };
        self
    }

    pub fn with_max_entries(mut self, max_entries: Option<usize>) -> Self {
        self.max_entries = max_entries;
        self
    }

    pub fn with_max_age_days(mut self, max_age_days: Option<u32>) -> Self {
        self.max_age_days = max_age_days;
        self
    }

    pub fn with_skip_duplicates(mut self, skip: bool) -> Self {
        self.skip_duplicates = skip;
        self
    }

    pub fn with_excluded_users<I, S>(mut self, users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_users = users.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_excluded_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_files = files.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_clash_sleep(mut self, sleep: Duration) -> Self {
        self.clash_sleep = sleep;
        self
    }

    /// Build config from `CONFIG_HISTORY_*` environment variables
    pub fn from_env() -> Self {
        let base_dir = env::var("CONFIG_HISTORY_BASE_DIR").unwrap_or_else(|_| ".".to_string());
        let mut config = Self::new(base_dir);

        if let Ok(root) = env::var("CONFIG_HISTORY_ROOT") {
            if !root.trim().is_empty() {
                config = config.with_history_root(root.trim());
            }
        }
        config.max_entries = parse_limit("CONFIG_HISTORY_MAX_ENTRIES");
        config.max_age_days = parse_limit("CONFIG_HISTORY_MAX_DAYS");
        if let Ok(value) = env::var("CONFIG_HISTORY_SKIP_DUPLICATES") {
            config.skip_duplicates = !matches!(value.trim(), "false" | "0" | "no");
        }
        if let Ok(users) = env::var("CONFIG_HISTORY_EXCLUDED_USERS") {
            config.excluded_users = users
                .split(',')
                .map(str::trim)
                .filter(|u| !u.is_empty())
                .map(String::from)
                .collect();
        }
        config
    }

    /// Jobs subtree of the history root
    pub fn jobs_history_dir(&self) -> PathBuf {
        self.history_root.join(super::paths::JOBS_DIR)
    }

    /// Agents subtree of the history root
    pub fn nodes_history_dir(&self) -> PathBuf {
        self.history_root.join(super::paths::NODES_DIR)
    }

    /// Live jobs directory of the managed instance
    pub fn jobs_dir(&self) -> PathBuf {
        self.base_dir.join(super::paths::JOBS_DIR)
    }

    /// Effective quantity cap
    pub fn max_entries(&self) -> Option<usize> {
        self.max_entries.filter(|n| *n > 0)
    }

    /// Effective age limit
    pub fn max_age_days(&self) -> Option<u32> {
        self.max_age_days.filter(|d| *d > 0)
    }

    /// Whether a config file is eligible for history
    pub fn is_saveable(&self, config_file: &Path) -> bool {
        let path = config_file.to_string_lossy();
        !self
            .excluded_files
            .iter()
            .any(|fragment| !fragment.is_empty() && path.contains(fragment.as_str()))
    }

    /// Whether changes made by this actor id are ignored
    pub fn is_user_excluded(&self, user_id: &str) -> bool {
        self.excluded_users.iter().any(|u| u == user_id)
    }
}

fn parse_limit<T: std::str::FromStr>(var: &str) -> Option<T> {
    let value = env::var(var).ok()?;
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    match value.parse() {
        Ok(n) => Some(n),
        Err(_) => {
            warn!(variable = var, value, "ignoring invalid limit, purging disabled");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        let config = HistoryConfig::new("/srv/jenkins");
        assert_eq!(config.history_root, PathBuf::from("/srv/jenkins/config-history"));
        assert_eq!(config.jobs_history_dir(), PathBuf::from("/srv/jenkins/config-history/jobs"));
        assert_eq!(config.nodes_history_dir(), PathBuf::from("/srv/jenkins/config-history/nodes"));
        assert!(config.skip_duplicates);
        assert_eq!(config.clash_sleep, Duration::from_millis(500));
    }

    #[test]
    fn test_relative_history_root() {
        let config = HistoryConfig::new("/srv/jenkins").with_history_root("history");
        assert_eq!(config.history_root, PathBuf::from("/srv/jenkins/history"));

        let config = HistoryConfig::new("/srv/jenkins").with_history_root("/var/history");
        assert_eq!(config.history_root, PathBuf::from("/var/history"));
    }

    #[test]
    fn test_zero_limits_disable_purging() {
        let config = HistoryConfig::new("/tmp")
            .with_max_entries(Some(0))
            .with_max_age_days(Some(0));
        assert_eq!(config.max_entries(), None);
        assert_eq!(config.max_age_days(), None);

        let config = HistoryConfig::new("/tmp").with_max_entries(Some(5));
        assert_eq!(config.max_entries(), Some(5));
    }

    #[test]
    fn test_default_exclusions() {
        let config = HistoryConfig::new("/srv/jenkins");
        assert!(!config.is_saveable(Path::new("/srv/jenkins/queue.xml")));
        assert!(!config.is_saveable(Path::new("/srv/jenkins/nodeMonitors.xml")));
        assert!(config.is_saveable(Path::new("/srv/jenkins/config.xml")));
        assert!(config.is_saveable(Path::new("/srv/jenkins/jobs/Test1/config.xml")));
    }

    #[test]
    fn test_excluded_users() {
        let config = HistoryConfig::new("/tmp").with_excluded_users(["SYSTEM", "user1"]);
        assert!(config.is_user_excluded("SYSTEM"));
        assert!(!config.is_user_excluded("user2"));
    }
}
