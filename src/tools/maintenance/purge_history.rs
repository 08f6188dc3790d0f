//! Purge history tool

use std::sync::Arc;

use serde_json::{json, Value};

use crate::history::ConfigHistory;
use crate::protocol::{McpTool, Tool};
use crate::server::json_response;
use crate::types::McpResult;

/// Tool for running the age-based retention sweep
pub struct PurgeHistoryTool {
    history: Arc<ConfigHistory>,
}

impl PurgeHistoryTool {
    pub fn new(history: Arc<ConfigHistory>) -> Self {
        Self { history }
    }
}

impl Tool for PurgeHistoryTool {
    fn definition(&self) -> McpTool {
        McpTool::new(
            "purge_history",
            "Delete revisions older than the configured maximum age. Created revisions are kept",
            json!({ "type": "object", "properties": {} }),
        )
    }

    fn execute(&self, _params: Value) -> McpResult<Value> {
        json_response(&self.history.purge_by_age())
    }
}
