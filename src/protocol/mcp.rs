//! Tool protocol types

use serde::Serialize;
use serde_json::Value;

use crate::types::McpResult;

/// Protocol revision answered on `initialize`
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Tool definition as listed by `tools/list`
#[derive(Serialize, Debug, Clone)]
pub struct McpTool {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

impl McpTool {
    pub fn new(name: &str, description: &str, input_schema: Value) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            input_schema,
        }
    }
}

/// Server information for the `initialize` handshake
#[derive(Clone, Debug)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

impl ServerInfo {
    pub fn new(name: String, version: String) -> Self {
        Self { name, version }
    }
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            name: "config-history".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// A callable tool.
///
/// `execute` receives the `arguments` object of a `tools/call` request and
/// returns the `result` payload.
pub trait Tool: Send + Sync {
    fn definition(&self) -> McpTool;

    fn execute(&self, params: Value) -> McpResult<Value>;

    fn name(&self) -> String {
        self.definition().name
    }
}
