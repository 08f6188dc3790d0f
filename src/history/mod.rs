//! History Module - versioned storage of configuration files
//!
//! This module provides the revision store and everything around it:
//! - `PathResolver`: Maps entities onto history directories
//! - `RevisionAllocator`: Creates collision-free timestamped revision directories
//! - `FileRevisionStore`: Writes and reads revisions (payload copy + `history.xml`)
//! - `DuplicateDetector`: Vetoes saves identical to the latest revision
//! - `QuantityRetention` / `AgeRetention`: Purge old revisions
//! - `HistoryIndex`: Scans the whole root for overview listings and counts
//! - `ConfigHistory`: Entry point wiring the above together
//!
//! # Architecture
//!
//! ```text
//! Write Path:
//! ┌─────────┐   ┌──────────────┐   ┌───────────────┐   ┌────────────┐   ┌──────────────┐
//! │ hook    │──►│ resolve dir  │──►│ duplicate?    │──►│ purge by   │──►│ allocate dir │
//! │ (save)  │   │ PathResolver │   │ (Changed only)│   │ quantity   │   │ write files  │
//! └─────────┘   └──────────────┘   └───────────────┘   └────────────┘   └──────────────┘
//!
//! Read Path:
//! ┌─────────────┐   ┌─────────────────┐   ┌────────────────────┐
//! │ validate ts │──►│ load 2 payloads │──►│ unified diff + rows│
//! └─────────────┘   └─────────────────┘   └────────────────────┘
//! ```

mod allocator;
mod config;
mod duplicate;
mod error;
mod index;
mod metadata;
mod paths;
mod queries;
mod retention;
mod service;
mod store;

pub use allocator::RevisionAllocator;
pub use config::{HistoryConfig, DEFAULT_CLASH_SLEEP, DEFAULT_EXCLUDED_FILES, DEFAULT_HISTORY_DIR};
pub use duplicate::DuplicateDetector;
pub use error::{HistoryError, HistoryResult};
pub use index::{HistoryIndex, JobView, OverviewFilter, RevisionCounts};
pub use metadata::{from_xml, read_metadata, to_xml, write_metadata};
pub use paths::{
    deleted_lineage_name, is_deleted_name, undeleted_name, PathResolver, CONFIG_FILE, DELETED_MARKER,
    HISTORY_FILE, JOBS_DIR, NODES_DIR,
};
pub use retention::{delete_revision_dir, AgeRetention, PurgeReport, QuantityRetention, RetentionPolicy};
pub use service::{ConfigHistory, WriteOutcome};
pub use store::{payload_file, FileRevisionStore, Payload, RevisionStore};
