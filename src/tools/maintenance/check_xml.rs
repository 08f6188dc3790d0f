//! Check XML tool

use std::sync::Arc;

use serde_json::{json, Value};

use crate::history::ConfigHistory;
use crate::protocol::{McpTool, Tool};
use crate::server::{entity_key, json_response, optional_str};
use crate::types::McpResult;
use crate::validation::check_xml;

/// Tool for checking whether a configuration is well-formed XML
pub struct CheckXmlTool {
    history: Arc<ConfigHistory>,
}

impl CheckXmlTool {
    pub fn new(history: Arc<ConfigHistory>) -> Self {
        Self { history }
    }
}

impl Tool for CheckXmlTool {
    fn definition(&self) -> McpTool {
        McpTool::new(
            "check_xml",
            "Check that a configuration parses as XML. Pass content, or name/timestamp of a stored revision",
            json!({
                "type": "object",
                "properties": {
                    "content": { "type": "string", "description": "XML text to check" },
                    "kind": { "type": "string", "enum": ["job", "system", "agent", "deleted"], "default": "job" },
                    "name": { "type": "string", "description": "Entity name" },
                    "timestamp": { "type": "string", "description": "Revision id" }
                }
            }),
        )
    }

    fn execute(&self, params: Value) -> McpResult<Value> {
        let result = match params.get("content").and_then(|v| v.as_str()) {
            Some(content) => check_xml(content.as_bytes()),
            None => {
                let key = entity_key(&params, "name")?;
                let timestamp = optional_str(&params, "timestamp").ok_or("Missing content or timestamp")?;
                check_xml(&self.history.read_revision(&key, timestamp)?)
            }
        };
        json_response(&result)
    }
}
