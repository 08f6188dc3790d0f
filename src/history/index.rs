//! History index - whole-tree scans for overview listings
//!
//! Nothing is cached; each call walks the history root again.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::paths::{is_deleted_name, PathResolver, JOBS_DIR, NODES_DIR};
use super::retention::revision_dirs;
use super::store::read_lineage;
use crate::types::{sort_newest_first, ConfigInfo, Operation};

/// Which revisions of each job lineage to report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobView {
    /// Earliest `Created` revision of each live job
    Created,
    /// Latest revision of each soft-deleted job, if it is a `Deleted` record
    Deleted,
    /// Every revision of every job
    All,
}

/// Overview listing selector, as accepted on the tool surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverviewFilter {
    #[default]
    System,
    Jobs,
    Created,
    Deleted,
    Agents,
    All,
}

impl OverviewFilter {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "system" => Some(OverviewFilter::System),
            "jobs" => Some(OverviewFilter::Jobs),
            "created" => Some(OverviewFilter::Created),
            "deleted" => Some(OverviewFilter::Deleted),
            "agents" | "nodes" => Some(OverviewFilter::Agents),
            "all" => Some(OverviewFilter::All),
            _ => None,
        }
    }
}

/// Revision totals across the history root
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionCounts {
    pub system: usize,
    /// Revisions of live jobs plus one per deleted job
    pub jobs: usize,
    pub deleted_jobs: usize,
    pub agents: usize,
    /// `system + jobs`
    pub total: usize,
}

/// One job lineage found while walking the jobs tree
#[derive(Debug, Clone)]
struct JobLineage {
    name: String,
    dir: PathBuf,
    deleted: bool,
}

/// Scans the history root
#[derive(Debug, Clone)]
pub struct HistoryIndex {
    resolver: PathResolver,
}

impl HistoryIndex {
    pub fn new(resolver: PathResolver) -> Self {
        Self { resolver }
    }

    /// Every revision of every system config
    pub fn collect_system(&self) -> Vec<ConfigInfo> {
        let mut configs = Vec::new();
        for (name, dir) in self.system_lineages() {
            for revision in read_lineage(&dir).into_values() {
                configs.push(ConfigInfo::from_revision(&name, revision, true, false));
            }
        }
        configs
    }

    /// Every revision of every agent; soft-deleted agents are reported as not existing
    pub fn collect_agents(&self) -> Vec<ConfigInfo> {
        let mut configs = Vec::new();
        for (name, dir) in child_dirs(&self.resolver.nodes_root()) {
            let exists = !is_deleted_name(&name);
            for revision in read_lineage(&dir).into_values() {
                configs.push(ConfigInfo::from_revision(&name, revision, exists, false));
            }
        }
        configs
    }

    /// Job revisions selected by `view`, nested folders included
    pub fn collect_jobs(&self, view: JobView) -> Vec<ConfigInfo> {
        let mut configs = Vec::new();
        for lineage in self.job_lineages() {
            let revisions = read_lineage(&lineage.dir);
            match view {
                JobView::Created => {
                    if lineage.deleted {
                        continue;
                    }
                    // A Changed record can land just before the Created one.
                    if let Some(revision) = revisions.into_values().find(|r| r.is_created()) {
                        configs.push(ConfigInfo::from_revision(&lineage.name, revision, true, true));
                    }
                }
                JobView::Deleted => {
                    if !lineage.deleted {
                        continue;
                    }
                    if let Some((_, revision)) = revisions.into_iter().next_back() {
                        if revision.operation == Operation::Deleted {
                            configs.push(ConfigInfo::from_revision(&lineage.name, revision, false, true));
                        }
                    }
                }
                JobView::All => {
                    for revision in revisions.into_values() {
                        configs.push(ConfigInfo::from_revision(
                            &lineage.name,
                            revision,
                            !lineage.deleted,
                            true,
                        ));
                    }
                }
            }
        }
        configs
    }

    /// Overview listing, newest first
    pub fn overview(&self, filter: OverviewFilter) -> Vec<ConfigInfo> {
        let mut configs = match filter {
            OverviewFilter::System => self.collect_system(),
            OverviewFilter::Jobs => self.collect_jobs(JobView::All),
            OverviewFilter::Created => self.collect_jobs(JobView::Created),
            OverviewFilter::Deleted => self.collect_jobs(JobView::Deleted),
            OverviewFilter::Agents => self.collect_agents(),
            OverviewFilter::All => {
                let mut all = self.collect_jobs(JobView::All);
                all.extend(self.collect_system());
                all.extend(self.collect_agents());
                all
            }
        };
        sort_newest_first(&mut configs);
        configs
    }

    /// Revision totals; reads directory names only
    pub fn revision_counts(&self) -> RevisionCounts {
        let system = self
            .system_lineages()
            .iter()
            .map(|(_, dir)| revision_dirs(dir).len())
            .sum();
        let mut live_jobs = 0;
        let mut deleted_jobs = 0;
        for lineage in self.job_lineages() {
            if lineage.deleted {
                deleted_jobs += 1;
            } else {
                live_jobs += revision_dirs(&lineage.dir).len();
            }
        }
        let agents = child_dirs(&self.resolver.nodes_root())
            .iter()
            .map(|(_, dir)| revision_dirs(dir).len())
            .sum();
        let jobs = live_jobs + deleted_jobs;
        RevisionCounts {
            system,
            jobs,
            deleted_jobs,
            agents,
            total: system + jobs,
        }
    }

    /// Live system, job and agent lineage directories, for age sweeps
    pub fn live_lineages(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = self.system_lineages().into_iter().map(|(_, d)| d).collect();
        dirs.extend(
            self.job_lineages()
                .into_iter()
                .filter(|l| !l.deleted)
                .map(|l| l.dir),
        );
        dirs.extend(
            child_dirs(&self.resolver.nodes_root())
                .into_iter()
                .filter(|(name, _)| !is_deleted_name(name))
                .map(|(_, d)| d),
        );
        dirs
    }

    /// Names of live jobs, folder-qualified
    pub fn job_names(&self) -> Vec<String> {
        self.job_lineages()
            .into_iter()
            .filter(|l| !l.deleted)
            .map(|l| l.name)
            .collect()
    }

    fn system_lineages(&self) -> Vec<(String, PathBuf)> {
        child_dirs(self.resolver.history_root())
            .into_iter()
            .filter(|(name, _)| name != JOBS_DIR && name != NODES_DIR)
            .collect()
    }

    fn job_lineages(&self) -> Vec<JobLineage> {
        let mut lineages = Vec::new();
        collect_job_lineages(&self.resolver.jobs_root(), "", false, &mut lineages);
        lineages
    }
}

/// Everything below a soft-deleted folder counts as deleted too.
fn collect_job_lineages(jobs_dir: &Path, prefix: &str, parent_deleted: bool, out: &mut Vec<JobLineage>) {
    for (name, dir) in child_dirs(jobs_dir) {
        let qualified = format!("{}{}", prefix, name);
        let nested = dir.join(JOBS_DIR);
        let deleted = parent_deleted || is_deleted_name(&name);
        // Folders without a recorded config of their own are only containers.
        if !revision_dirs(&dir).is_empty() {
            out.push(JobLineage {
                deleted,
                name: qualified.clone(),
                dir,
            });
        }
        if nested.is_dir() {
            collect_job_lineages(&nested, &format!("{}/", qualified), deleted, out);
        }
    }
}

/// Sub-directories of `dir`, sorted by name
fn child_dirs(dir: &Path) -> Vec<(String, PathBuf)> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut dirs: Vec<(String, PathBuf)> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .filter_map(|path| Some((path.file_name()?.to_str()?.to_string(), path)))
        .collect();
    dirs.sort();
    dirs
}
