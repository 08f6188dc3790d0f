//! Record change tool

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::{json, Value};

use crate::history::ConfigHistory;
use crate::protocol::{McpTool, Tool};
use crate::server::{actor_from, entity_key, json_response, optional_str};
use crate::types::{McpResult, Operation};

/// Tool for recording a created or changed configuration
pub struct RecordChangeTool {
    history: Arc<ConfigHistory>,
}

impl RecordChangeTool {
    pub fn new(history: Arc<ConfigHistory>) -> Self {
        Self { history }
    }
}

impl Tool for RecordChangeTool {
    fn definition(&self) -> McpTool {
        McpTool::new(
            "record_change",
            "Record a new revision of a configuration. Either pass kind/name with the content, \
             or the path of a config file under the managed base directory",
            json!({
                "type": "object",
                "properties": {
                    "kind": { "type": "string", "enum": ["job", "system", "agent"], "default": "job" },
                    "name": { "type": "string", "description": "Entity name; folder-qualified for jobs (folder/job)" },
                    "path": { "type": "string", "description": "Config file to record instead of kind/name/content" },
                    "content": { "type": "string", "description": "Configuration text" },
                    "operation": { "type": "string", "enum": ["created", "changed"], "default": "changed" },
                    "user": { "type": "string", "description": "Display name of the actor (auto-filled from git/env if not provided)" },
                    "userId": { "type": "string", "description": "Id of the actor" },
                    "comment": { "type": "string", "description": "Reason for the change" }
                }
            }),
        )
    }

    fn execute(&self, params: Value) -> McpResult<Value> {
        let actor = actor_from(&params);
        let comment = optional_str(&params, "comment").map(String::from);

        if let Some(path) = optional_str(&params, "path") {
            let outcome = self.history.record_config_file(&PathBuf::from(path), actor, comment);
            return json_response(&outcome);
        }

        let key = entity_key(&params, "name")?;
        let content = optional_str(&params, "content").ok_or("Missing content")?;
        let operation = match optional_str(&params, "operation") {
            Some(op) => Operation::parse(op).ok_or_else(|| format!("Unknown operation '{}'", op))?,
            None => Operation::Changed,
        };
        let outcome = match operation {
            Operation::Created => self.history.record_created(&key, content.as_bytes(), actor),
            Operation::Changed => self.history.record_changed(&key, content.as_bytes(), actor, comment),
            other => {
                return Err(format!("Use rename_entity or delete_entity to record {}", other).into());
            }
        };
        json_response(&outcome)
    }
}
