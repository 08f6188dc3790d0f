//! Delete entity tool

use std::sync::Arc;

use serde_json::{json, Value};

use crate::history::ConfigHistory;
use crate::protocol::{McpTool, Tool};
use crate::server::{actor_from, entity_key, json_response};
use crate::types::McpResult;

/// Tool for recording an entity's deletion; its history is kept under a
/// `_deleted_` name
pub struct DeleteEntityTool {
    history: Arc<ConfigHistory>,
}

impl DeleteEntityTool {
    pub fn new(history: Arc<ConfigHistory>) -> Self {
        Self { history }
    }
}

impl Tool for DeleteEntityTool {
    fn definition(&self) -> McpTool {
        McpTool::new(
            "delete_entity",
            "Record that an entity was deleted and mark its history as deleted",
            json!({
                "type": "object",
                "properties": {
                    "kind": { "type": "string", "enum": ["job", "agent"], "default": "job" },
                    "name": { "type": "string", "description": "Entity name" },
                    "user": { "type": "string" },
                    "userId": { "type": "string" }
                },
                "required": ["name"]
            }),
        )
    }

    fn execute(&self, params: Value) -> McpResult<Value> {
        let key = entity_key(&params, "name")?;
        json_response(&self.history.record_deleted(&key, actor_from(&params)))
    }
}
