//! Diff revisions tool

use std::sync::Arc;

use serde_json::{json, Value};

use crate::diff::{Context, DEFAULT_CONTEXT};
use crate::history::ConfigHistory;
use crate::protocol::{McpTool, Tool};
use crate::server::{entity_key, json_response, optional_str, required_str, text_response};
use crate::types::McpResult;

/// Tool for comparing two revisions of an entity
pub struct DiffRevisionsTool {
    history: Arc<ConfigHistory>,
}

impl DiffRevisionsTool {
    pub fn new(history: Arc<ConfigHistory>) -> Self {
        Self { history }
    }
}

impl Tool for DiffRevisionsTool {
    fn definition(&self) -> McpTool {
        McpTool::new(
            "diff_revisions",
            "Compare two revisions as a unified diff and/or side-by-side rows",
            json!({
                "type": "object",
                "properties": {
                    "kind": { "type": "string", "enum": ["job", "system", "agent", "deleted"], "default": "job" },
                    "name": { "type": "string", "description": "Entity name" },
                    "timestamp1": { "type": "string", "description": "First revision id" },
                    "timestamp2": { "type": "string", "description": "Second revision id" },
                    "context": { "type": "integer", "default": DEFAULT_CONTEXT, "description": "Context lines around each change" },
                    "full": { "type": "boolean", "default": false, "description": "Show the whole file" },
                    "format": { "type": "string", "enum": ["unified", "rows", "both"], "default": "both" }
                },
                "required": ["name", "timestamp1", "timestamp2"]
            }),
        )
    }

    fn execute(&self, params: Value) -> McpResult<Value> {
        let key = entity_key(&params, "name")?;
        let timestamp1 = required_str(&params, "timestamp1")?;
        let timestamp2 = required_str(&params, "timestamp2")?;
        let context = if params.get("full").and_then(|v| v.as_bool()).unwrap_or(false) {
            Context::Full
        } else {
            let lines = params
                .get("context")
                .and_then(|v| v.as_u64())
                .map(|n| usize::try_from(n).unwrap_or(usize::MAX))
                .unwrap_or(DEFAULT_CONTEXT);
            Context::Lines(lines)
        };

        let comparison = self.history.compare(&key, timestamp1, timestamp2, context)?;
        match optional_str(&params, "format").unwrap_or("both") {
            "unified" => Ok(text_response(comparison.unified)),
            "rows" => json_response(&comparison.rows),
            "both" => json_response(&comparison),
            other => Err(format!("Unknown format '{}'", other).into()),
        }
    }
}
