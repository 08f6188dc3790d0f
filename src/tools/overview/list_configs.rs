//! List configs tool

use std::sync::Arc;

use serde_json::{json, Value};

use crate::history::{undeleted_name, ConfigHistory, OverviewFilter};
use crate::protocol::{McpTool, Tool};
use crate::server::{optional_str, text_response};
use crate::types::McpResult;

/// Tool for the history overview, newest first
pub struct ListConfigsTool {
    history: Arc<ConfigHistory>,
}

impl ListConfigsTool {
    pub fn new(history: Arc<ConfigHistory>) -> Self {
        Self { history }
    }
}

impl Tool for ListConfigsTool {
    fn definition(&self) -> McpTool {
        McpTool::new(
            "list_configs",
            "List recorded configurations across the whole history, newest first",
            json!({
                "type": "object",
                "properties": {
                    "filter": {
                        "type": "string",
                        "enum": ["system", "jobs", "created", "deleted", "agents", "all"],
                        "default": "system"
                    },
                    "limit": { "type": "integer", "description": "Maximum number of entries" }
                }
            }),
        )
    }

    fn execute(&self, params: Value) -> McpResult<Value> {
        let filter_name = optional_str(&params, "filter").unwrap_or_default();
        let filter =
            OverviewFilter::parse(filter_name).ok_or_else(|| format!("Unknown filter '{}'", filter_name))?;
        let limit = params
            .get("limit")
            .and_then(|v| v.as_u64())
            .map(|n| n as usize)
            .unwrap_or(usize::MAX);

        let mut entries = Vec::new();
        for info in self.history.overview(filter).into_iter().take(limit) {
            let display_name = undeleted_name(&info.name).to_string();
            let mut entry = serde_json::to_value(&info)?;
            entry["displayName"] = json!(display_name);
            entries.push(entry);
        }
        Ok(text_response(serde_json::to_string_pretty(&entries)?))
    }
}
