//! Tools exposed by the server
//!
//! This module contains 11 tools organized by category:
//! - Revision tools (5): record, list, read, diff and delete revisions
//! - Lifecycle tools (2): rename/move and delete entities
//! - Overview tools (2): listings and counts across the history root
//! - Maintenance tools (2): age purge and XML checks

pub mod lifecycle;
pub mod maintenance;
pub mod overview;
pub mod revisions;

use std::sync::Arc;

use crate::history::ConfigHistory;
use crate::server::McpServer;

pub use lifecycle::{DeleteEntityTool, RenameEntityTool};
pub use maintenance::{CheckXmlTool, PurgeHistoryTool};
pub use overview::{ListConfigsTool, RevisionCountsTool};
pub use revisions::{
    DeleteRevisionTool, DiffRevisionsTool, ListRevisionsTool, ReadRevisionTool, RecordChangeTool,
};

/// Register all tools with the server
pub fn register_all_tools(server: &mut McpServer, history: Arc<ConfigHistory>) {
    // Revision tools (5)
    server.register_tool(Box::new(RecordChangeTool::new(history.clone())));
    server.register_tool(Box::new(ListRevisionsTool::new(history.clone())));
    server.register_tool(Box::new(ReadRevisionTool::new(history.clone())));
    server.register_tool(Box::new(DiffRevisionsTool::new(history.clone())));
    server.register_tool(Box::new(DeleteRevisionTool::new(history.clone())));

    // Lifecycle tools (2)
    server.register_tool(Box::new(RenameEntityTool::new(history.clone())));
    server.register_tool(Box::new(DeleteEntityTool::new(history.clone())));

    // Overview tools (2)
    server.register_tool(Box::new(ListConfigsTool::new(history.clone())));
    server.register_tool(Box::new(RevisionCountsTool::new(history.clone())));

    // Maintenance tools (2)
    server.register_tool(Box::new(PurgeHistoryTool::new(history.clone())));
    server.register_tool(Box::new(CheckXmlTool::new(history)));
}
