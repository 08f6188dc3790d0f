//! Errors raised by the history store

use std::path::PathBuf;

use thiserror::Error;

/// Result type for history operations
pub type HistoryResult<T> = Result<T, HistoryError>;

/// Errors that can occur while resolving, writing or reading history
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("{} is not under the managed base directory {}", .path.display(), .base.display())]
    OutsideManagedTree { path: PathBuf, base: PathBuf },

    #[error("invalid timestamp '{0}'")]
    InvalidTimestamp(String),

    #[error("invalid entity name '{0}'")]
    InvalidName(String),

    #[error("no history exists for {0}")]
    NoHistory(String),

    #[error("revision {timestamp} not found for {entity}")]
    RevisionNotFound { entity: String, timestamp: String },

    #[error("could not create revision directory {}", .0.display())]
    RevisionDirUnavailable(PathBuf),

    #[error("cannot relocate history: {0}")]
    Relocate(String),

    #[error("diff error: {0}")]
    Diff(#[from] crate::diff::DiffError),
}

impl From<quick_xml::Error> for HistoryError {
    fn from(e: quick_xml::Error) -> Self {
        HistoryError::Xml(e.to_string())
    }
}

impl From<quick_xml::DeError> for HistoryError {
    fn from(e: quick_xml::DeError) -> Self {
        HistoryError::Xml(e.to_string())
    }
}

impl HistoryError {
    /// Stable machine-readable name of the failure class
    pub fn kind(&self) -> &'static str {
        match self {
            HistoryError::Io(_) => "io",
            HistoryError::Xml(_) => "xml",
            HistoryError::OutsideManagedTree { .. } => "outside_managed_tree",
            HistoryError::InvalidTimestamp(_) => "invalid_timestamp",
            HistoryError::InvalidName(_) => "invalid_name",
            HistoryError::NoHistory(_) => "no_history",
            HistoryError::RevisionNotFound { .. } => "revision_not_found",
            HistoryError::RevisionDirUnavailable(_) => "revision_dir_unavailable",
            HistoryError::Relocate(_) => "relocate",
            HistoryError::Diff(_) => "diff",
        }
    }
}
