//! Data types for the Config History server
//!
//! This module contains the core data structures shared by the revision store,
//! the history index and the tool layer.

mod config_info;
mod entity;
mod operation;
mod revision;
mod timestamp;

pub use config_info::{sort_newest_first, ConfigInfo};
pub use entity::{EntityKey, EntityKind};
pub use operation::Operation;
pub use revision::{Actor, ChangeRecord, Revision, UNKNOWN_USER};
pub use timestamp::{TimestampId, TIMESTAMP_FORMAT};

/// Result type for MCP operations
pub type McpResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;
