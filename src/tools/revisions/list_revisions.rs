//! List revisions tool

use std::sync::Arc;

use serde_json::{json, Value};

use crate::history::ConfigHistory;
use crate::protocol::{McpTool, Tool};
use crate::server::{entity_key, json_response};
use crate::types::McpResult;

/// Tool for listing the revisions of one entity
pub struct ListRevisionsTool {
    history: Arc<ConfigHistory>,
}

impl ListRevisionsTool {
    pub fn new(history: Arc<ConfigHistory>) -> Self {
        Self { history }
    }
}

impl Tool for ListRevisionsTool {
    fn definition(&self) -> McpTool {
        McpTool::new(
            "list_revisions",
            "List all revisions of an entity with their metadata, oldest first",
            json!({
                "type": "object",
                "properties": {
                    "kind": { "type": "string", "enum": ["job", "system", "agent", "deleted"], "default": "job" },
                    "name": { "type": "string", "description": "Entity name" },
                    "idsOnly": { "type": "boolean", "default": false, "description": "Return revision ids without reading metadata" }
                },
                "required": ["name"]
            }),
        )
    }

    fn execute(&self, params: Value) -> McpResult<Value> {
        let key = entity_key(&params, "name")?;
        let ids_only = params.get("idsOnly").and_then(|v| v.as_bool()).unwrap_or(false);
        if ids_only {
            return json_response(&self.history.store().list_revision_summaries(&key)?);
        }
        json_response(&self.history.list_revisions(&key)?)
    }
}
