//! Revision counts tool

use std::sync::Arc;

use serde_json::{json, Value};

use crate::history::ConfigHistory;
use crate::protocol::{McpTool, Tool};
use crate::server::json_response;
use crate::types::McpResult;

/// Tool for revision totals per area
pub struct RevisionCountsTool {
    history: Arc<ConfigHistory>,
}

impl RevisionCountsTool {
    pub fn new(history: Arc<ConfigHistory>) -> Self {
        Self { history }
    }
}

impl Tool for RevisionCountsTool {
    fn definition(&self) -> McpTool {
        McpTool::new(
            "revision_counts",
            "Count revisions: system, jobs (one extra per deleted job), deleted jobs, agents and total",
            json!({ "type": "object", "properties": {} }),
        )
    }

    fn execute(&self, _params: Value) -> McpResult<Value> {
        json_response(&self.history.revision_counts())
    }
}
