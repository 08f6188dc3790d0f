//! Read revision tool

use std::sync::Arc;

use serde_json::{json, Value};

use crate::history::ConfigHistory;
use crate::protocol::{McpTool, Tool};
use crate::server::{entity_key, required_str, text_response};
use crate::types::McpResult;

/// Tool for reading the stored configuration of one revision
pub struct ReadRevisionTool {
    history: Arc<ConfigHistory>,
}

impl ReadRevisionTool {
    pub fn new(history: Arc<ConfigHistory>) -> Self {
        Self { history }
    }
}

impl Tool for ReadRevisionTool {
    fn definition(&self) -> McpTool {
        McpTool::new(
            "read_revision",
            "Read the stored configuration and metadata of one revision",
            json!({
                "type": "object",
                "properties": {
                    "kind": { "type": "string", "enum": ["job", "system", "agent", "deleted"], "default": "job" },
                    "name": { "type": "string", "description": "Entity name" },
                    "timestamp": { "type": "string", "description": "Revision id (yyyy-MM-dd_HH-mm-ss)" }
                },
                "required": ["name", "timestamp"]
            }),
        )
    }

    fn execute(&self, params: Value) -> McpResult<Value> {
        let key = entity_key(&params, "name")?;
        let timestamp = required_str(&params, "timestamp")?;
        let revision = self.history.revision_metadata(&key, timestamp)?;
        let content = self.history.read_revision(&key, timestamp)?;
        let body = json!({
            "revision": revision,
            "content": String::from_utf8_lossy(&content),
        });
        Ok(text_response(serde_json::to_string_pretty(&body)?))
    }
}
