//! Identities of historized entities

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Which history lineage an operation targets
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityKey {
    /// A live configuration file under the instance base directory
    ConfigFile(PathBuf),
    /// A job by its folder-qualified name (`folder/sub/job`)
    Job(String),
    /// A system configuration by base name (`config`, `hudson.tasks.Ant`)
    System(String),
    /// An agent (node) by name
    Agent(String),
    /// A soft-deleted job lineage by directory name, optionally folder-qualified
    DeletedJob(String),
}

impl EntityKey {
    /// The caller-supplied name, used for validation and messages
    pub fn name(&self) -> String {
        match self {
            EntityKey::ConfigFile(path) => path.display().to_string(),
            EntityKey::Job(name)
            | EntityKey::System(name)
            | EntityKey::Agent(name)
            | EntityKey::DeletedJob(name) => name.clone(),
        }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKey::ConfigFile(path) => write!(f, "config file {}", path.display()),
            EntityKey::Job(name) => write!(f, "job '{}'", name),
            EntityKey::System(name) => write!(f, "system config '{}'", name),
            EntityKey::Agent(name) => write!(f, "agent '{}'", name),
            EntityKey::DeletedJob(name) => write!(f, "deleted job '{}'", name),
        }
    }
}

/// Entity kind as accepted on the tool surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Job,
    System,
    Agent,
    Deleted,
}

impl EntityKind {
    pub fn key(self, name: impl Into<String>) -> EntityKey {
        let name = name.into();
        match self {
            EntityKind::Job => EntityKey::Job(name),
            EntityKind::System => EntityKey::System(name),
            EntityKind::Agent => EntityKey::Agent(name),
            EntityKind::Deleted => EntityKey::DeletedJob(name),
        }
    }
}
