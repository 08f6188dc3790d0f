//! Rename entity tool

use std::sync::Arc;

use serde_json::{json, Value};

use crate::history::ConfigHistory;
use crate::protocol::{McpTool, Tool};
use crate::server::{actor_from, entity_key, json_response, optional_str};
use crate::types::McpResult;

/// Tool for renaming or moving an entity together with its history
pub struct RenameEntityTool {
    history: Arc<ConfigHistory>,
}

impl RenameEntityTool {
    pub fn new(history: Arc<ConfigHistory>) -> Self {
        Self { history }
    }
}

impl Tool for RenameEntityTool {
    fn definition(&self) -> McpTool {
        McpTool::new(
            "rename_entity",
            "Move an entity's history to a new name. With content, a Renamed revision is recorded; \
             without it the history is only moved (e.g. a job moved into a folder)",
            json!({
                "type": "object",
                "properties": {
                    "kind": { "type": "string", "enum": ["job", "agent"], "default": "job" },
                    "oldName": { "type": "string", "description": "Current entity name" },
                    "newName": { "type": "string", "description": "New entity name" },
                    "content": { "type": "string", "description": "Configuration under the new name" },
                    "user": { "type": "string" },
                    "userId": { "type": "string" }
                },
                "required": ["oldName", "newName"]
            }),
        )
    }

    fn execute(&self, params: Value) -> McpResult<Value> {
        let old_key = entity_key(&params, "oldName")?;
        let new_key = entity_key(&params, "newName")?;
        let outcome = match optional_str(&params, "content") {
            Some(content) => {
                self.history
                    .record_renamed(&old_key, &new_key, content.as_bytes(), actor_from(&params))
            }
            None => self.history.record_relocated(&old_key, &new_key),
        };
        json_response(&outcome)
    }
}
