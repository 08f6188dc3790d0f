//! Config History
//!
//! Versioned, timestamped history of configuration files, served as tools
//! over line-delimited JSON-RPC.
//!
//! # Features
//!
//! - **Revision store**: one `<yyyy-MM-dd_HH-mm-ss>/` directory per save, holding
//!   a copy of the config and a `history.xml` record
//! - **Lifecycle**: renames move the history, deletions keep it under a `_deleted_` name
//! - **Retention**: per-entity revision cap and maximum age; `Created` revisions survive
//! - **Duplicate suppression**: byte-identical saves are not recorded twice
//! - **Diffs**: unified diff plus side-by-side rows with line numbers and gap markers
//!
//! # Modules
//!
//! - `history`: Path mapping, allocation, storage, retention, overview index
//! - `diff`: Unified diff generation/parsing and side-by-side rendering
//! - `types`: Revision, operation, timestamp and entity types
//! - `protocol`: JSON-RPC and tool protocol types
//! - `tools`: 11 tool implementations
//! - `validation`: Timestamp, name and XML checks
//! - `utils`: Clock, actor lookup, atomic writes
//! - `server`: Request loop
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use config_history::{ConfigHistory, HistoryConfig, McpServer};
//! use config_history::tools::register_all_tools;
//!
//! fn main() {
//!     let history = Arc::new(ConfigHistory::new(HistoryConfig::new("/var/lib/jenkins")));
//!     let mut server = McpServer::new();
//!     register_all_tools(&mut server, history);
//!     server.run().unwrap();
//! }
//! ```

pub mod diff;
pub mod history;
pub mod protocol;
pub mod server;
pub mod tools;
pub mod types;
pub mod utils;
pub mod validation;

// Re-export commonly used items at crate root
pub use diff::{compare_texts, Comparison, Context, Row, Tag};
pub use history::{
    ConfigHistory, HistoryConfig, HistoryError, HistoryResult, OverviewFilter, RevisionStore, WriteOutcome,
};
pub use protocol::{McpTool, ServerInfo, Tool};
pub use server::McpServer;
pub use types::{Actor, ConfigInfo, EntityKey, McpResult, Operation, Revision, TimestampId};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
