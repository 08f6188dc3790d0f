//! Mapping of entities onto history directories
//!
//! Layout under the history root:
//!
//! ```text
//! <root>/<systemName>/<timestampId>/           system configs (config.xml -> config)
//! <root>/jobs/<job>/<timestampId>/             top-level jobs
//! <root>/jobs/<folder>/jobs/<job>/<timestampId>/
//! <root>/jobs/<job>_deleted_<stamp>/...        soft-deleted job lineage
//! <root>/nodes/<agent>/<timestampId>/          agents
//! ```

use std::fs;
use std::path::{Component, Path, PathBuf};

use chrono::NaiveDateTime;

use super::config::HistoryConfig;
use super::error::{HistoryError, HistoryResult};
use crate::types::EntityKey;
use crate::validation::check_entity_name;

/// Metadata file inside every revision directory
pub const HISTORY_FILE: &str = "history.xml";
/// Subtree holding job lineages, both in the history root and the base directory
pub const JOBS_DIR: &str = "jobs";
/// Subtree holding agent lineages
pub const NODES_DIR: &str = "nodes";
/// Reserved infix of soft-deleted lineage names
pub const DELETED_MARKER: &str = "_deleted_";
/// Payload file name for jobs and agents
pub const CONFIG_FILE: &str = "config.xml";

const DELETED_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S_%3f";

/// Resolves entity identities to history directories
#[derive(Debug, Clone)]
pub struct PathResolver {
    history_root: PathBuf,
    base_dir: PathBuf,
}

impl PathResolver {
    pub fn new(config: &HistoryConfig) -> Self {
        Self {
            history_root: config.history_root.clone(),
            base_dir: config.base_dir.clone(),
        }
    }

    pub fn history_root(&self) -> &Path {
        &self.history_root
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn jobs_root(&self) -> PathBuf {
        self.history_root.join(JOBS_DIR)
    }

    pub fn nodes_root(&self) -> PathBuf {
        self.history_root.join(NODES_DIR)
    }

    /// History directory for any entity key, validating names first
    pub fn resolve(&self, key: &EntityKey) -> HistoryResult<PathBuf> {
        match key {
            EntityKey::ConfigFile(path) => self.history_dir_for_config(path),
            EntityKey::Job(name) => {
                check_entity_name(name)?;
                Ok(self.job_history_dir(name))
            }
            EntityKey::System(name) => {
                check_entity_name(name)?;
                if name.contains('/') || name == JOBS_DIR || name == NODES_DIR {
                    return Err(HistoryError::InvalidName(name.clone()));
                }
                Ok(self.history_root.join(name))
            }
            EntityKey::Agent(name) => {
                check_entity_name(name)?;
                if name.contains('/') {
                    return Err(HistoryError::InvalidName(name.clone()));
                }
                Ok(self.nodes_root().join(name))
            }
            EntityKey::DeletedJob(name) => {
                check_entity_name(name)?;
                let last = name.rsplit('/').next().unwrap_or(name);
                if !is_deleted_name(last) {
                    return Err(HistoryError::InvalidName(name.clone()));
                }
                Ok(self.job_history_dir(name))
            }
        }
    }

    /// History directory for a live config file.
    ///
    /// A file directly in the base directory is a system config named after
    /// its base name; a file below `<base>/jobs/` maps onto the same relative
    /// directory below `<root>/jobs/`.
    pub fn history_dir_for_config(&self, config_file: &Path) -> HistoryResult<PathBuf> {
        let outside = || HistoryError::OutsideManagedTree {
            path: config_file.to_path_buf(),
            base: self.base_dir.clone(),
        };
        let parent = config_file.parent().ok_or_else(outside)?;
        let relative = parent.strip_prefix(&self.base_dir).map_err(|_| outside())?;
        if relative.components().any(|c| !matches!(c, Component::Normal(_))) {
            return Err(outside());
        }

        if relative.as_os_str().is_empty() {
            let stem = config_file
                .file_stem()
                .and_then(|s| s.to_str())
                .filter(|s| !s.is_empty())
                .ok_or_else(outside)?;
            return Ok(self.history_root.join(stem));
        }

        let mut components = relative.components();
        match components.next() {
            Some(Component::Normal(first)) if first == JOBS_DIR => {
                let rest = components.as_path();
                if rest.as_os_str().is_empty() {
                    return Err(outside());
                }
                Ok(self.jobs_root().join(rest))
            }
            _ => Err(outside()),
        }
    }

    /// History directory of a job by folder-qualified name (`a/b/job` -> `jobs/a/jobs/b/jobs/job`)
    pub fn job_history_dir(&self, full_name: &str) -> PathBuf {
        let mut dir = self.jobs_root();
        for (i, segment) in full_name.split('/').enumerate() {
            if i > 0 {
                dir.push(JOBS_DIR);
            }
            dir.push(segment);
        }
        dir
    }

    /// Live config file of a job in the managed base directory
    pub fn job_config_file(&self, full_name: &str) -> PathBuf {
        let mut dir = self.base_dir.join(JOBS_DIR);
        for (i, segment) in full_name.split('/').enumerate() {
            if i > 0 {
                dir.push(JOBS_DIR);
            }
            dir.push(segment);
        }
        dir.join(CONFIG_FILE)
    }

    /// Live file of a system config (`config` -> `<base>/config.xml`)
    pub fn system_config_file(&self, name: &str) -> PathBuf {
        self.base_dir.join(format!("{}.xml", name))
    }

    /// Folder-qualified name of a job lineage directory, walking up to the jobs root.
    ///
    /// Returns `None` when the directory is not inside the jobs root.
    pub fn folder_qualified_name(&self, history_dir: &Path) -> Option<String> {
        let relative = history_dir.strip_prefix(self.jobs_root()).ok()?;
        let mut names = Vec::new();
        for (i, component) in relative.components().enumerate() {
            let segment = match component {
                Component::Normal(s) => s.to_str()?,
                _ => return None,
            };
            if i % 2 == 1 {
                if segment != JOBS_DIR {
                    return None;
                }
            } else {
                names.push(segment);
            }
        }
        if names.is_empty() || relative.components().count() % 2 == 0 {
            return None;
        }
        Some(names.join("/"))
    }

    /// Fail if `dir` escapes `root` once symlinks are resolved.
    ///
    /// Directories that do not exist yet are accepted; their names have been
    /// validated already.
    pub fn ensure_contained(&self, dir: &Path, root: &Path) -> HistoryResult<()> {
        let (Ok(dir_real), Ok(root_real)) = (fs::canonicalize(dir), fs::canonicalize(root)) else {
            return Ok(());
        };
        if dir_real.starts_with(&root_real) {
            Ok(())
        } else {
            Err(HistoryError::OutsideManagedTree {
                path: dir.to_path_buf(),
                base: root.to_path_buf(),
            })
        }
    }
}

/// Name of the soft-deleted lineage for `name`, stamped with `now`
pub fn deleted_lineage_name(name: &str, now: NaiveDateTime) -> String {
    format!("{}{}{}", name, DELETED_MARKER, now.format(DELETED_STAMP_FORMAT))
}

/// Whether a lineage directory name marks a soft-deleted entity
pub fn is_deleted_name(name: &str) -> bool {
    name.contains(DELETED_MARKER)
}

/// Original entity name of a soft-deleted lineage (`Test1_deleted_2013...` -> `Test1`)
pub fn undeleted_name(name: &str) -> &str {
    name.split(DELETED_MARKER).next().unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn resolver() -> PathResolver {
        PathResolver::new(&HistoryConfig::new("/srv/jenkins"))
    }

    #[test]
    fn test_system_config_dir() {
        let dir = resolver()
            .history_dir_for_config(Path::new("/srv/jenkins/config.xml"))
            .unwrap();
        assert_eq!(dir, PathBuf::from("/srv/jenkins/config-history/config"));

        let dir = resolver()
            .history_dir_for_config(Path::new("/srv/jenkins/hudson.tasks.Ant.xml"))
            .unwrap();
        assert_eq!(dir, PathBuf::from("/srv/jenkins/config-history/hudson.tasks.Ant"));
    }

    #[test]
    fn test_job_config_dir_keeps_folders() {
        let dir = resolver()
            .history_dir_for_config(Path::new("/srv/jenkins/jobs/Test1/config.xml"))
            .unwrap();
        assert_eq!(dir, PathBuf::from("/srv/jenkins/config-history/jobs/Test1"));

        let dir = resolver()
            .history_dir_for_config(Path::new("/srv/jenkins/jobs/f1/jobs/f2/jobs/job/config.xml"))
            .unwrap();
        assert_eq!(
            dir,
            PathBuf::from("/srv/jenkins/config-history/jobs/f1/jobs/f2/jobs/job")
        );
    }

    #[test]
    fn test_outside_base_dir_fails() {
        let result = resolver().history_dir_for_config(Path::new("/tmp/config.xml"));
        assert!(matches!(result, Err(HistoryError::OutsideManagedTree { .. })));

        let result = resolver().history_dir_for_config(Path::new("/srv/jenkins/../etc/config.xml"));
        assert!(matches!(result, Err(HistoryError::OutsideManagedTree { .. })));
    }

    #[test]
    fn test_job_key_matches_config_path() {
        let r = resolver();
        let by_name = r.resolve(&EntityKey::Job("f1/f2/job".to_string())).unwrap();
        let by_file = r
            .history_dir_for_config(&r.job_config_file("f1/f2/job"))
            .unwrap();
        assert_eq!(by_name, by_file);
    }

    #[test]
    fn test_folder_qualified_name() {
        let r = resolver();
        let dir = r.job_history_dir("f1/f2/job");
        assert_eq!(r.folder_qualified_name(&dir).as_deref(), Some("f1/f2/job"));
        assert_eq!(
            r.folder_qualified_name(&r.jobs_root().join("Test1")).as_deref(),
            Some("Test1")
        );
        assert_eq!(r.folder_qualified_name(&r.jobs_root().join("f1/jobs")), None);
        assert_eq!(r.folder_qualified_name(Path::new("/elsewhere/x")), None);
    }

    #[test]
    fn test_resolve_rejects_bad_names() {
        let r = resolver();
        assert!(r.resolve(&EntityKey::Job("../x".to_string())).is_err());
        assert!(r.resolve(&EntityKey::System("a/b".to_string())).is_err());
        assert!(r.resolve(&EntityKey::Agent("".to_string())).is_err());
        assert!(r.resolve(&EntityKey::DeletedJob("Test1".to_string())).is_err());
        assert!(r
            .resolve(&EntityKey::DeletedJob("f/Test1_deleted_20130830_223932_071".to_string()))
            .is_ok());
    }

    #[test]
    fn test_deleted_lineage_name() {
        let now = NaiveDate::from_ymd_opt(2013, 8, 30)
            .unwrap()
            .and_hms_milli_opt(22, 39, 32, 71)
            .unwrap();
        let name = deleted_lineage_name("Test1", now);
        assert_eq!(name, "Test1_deleted_20130830_223932_071");
        assert!(is_deleted_name(&name));
        assert_eq!(undeleted_name(&name), "Test1");
    }
}
