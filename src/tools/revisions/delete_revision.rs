//! Delete revision tool

use std::sync::Arc;

use serde_json::{json, Value};

use crate::history::ConfigHistory;
use crate::protocol::{McpTool, Tool};
use crate::server::{entity_key, required_str, text_response};
use crate::types::McpResult;

/// Tool for removing one revision from an entity's history
pub struct DeleteRevisionTool {
    history: Arc<ConfigHistory>,
}

impl DeleteRevisionTool {
    pub fn new(history: Arc<ConfigHistory>) -> Self {
        Self { history }
    }
}

impl Tool for DeleteRevisionTool {
    fn definition(&self) -> McpTool {
        McpTool::new(
            "delete_revision",
            "Delete a single revision of an entity",
            json!({
                "type": "object",
                "properties": {
                    "kind": { "type": "string", "enum": ["job", "system", "agent", "deleted"], "default": "job" },
                    "name": { "type": "string", "description": "Entity name" },
                    "timestamp": { "type": "string", "description": "Revision id to delete" }
                },
                "required": ["name", "timestamp"]
            }),
        )
    }

    fn execute(&self, params: Value) -> McpResult<Value> {
        let key = entity_key(&params, "name")?;
        let timestamp = required_str(&params, "timestamp")?;
        let id = self.history.delete_revision(&key, timestamp)?;
        Ok(text_response(format!("Deleted revision {} of {}", id, key)))
    }
}
