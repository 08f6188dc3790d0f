//! Tool server speaking line-delimited JSON-RPC over stdio

mod handlers;

use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::history::HistoryError;
use crate::protocol::{
    JsonRpcError, JsonRpcRequest, JsonRpcResponse, McpTool, ServerInfo, Tool, PROTOCOL_VERSION,
};
use crate::types::McpResult;

pub use handlers::*;

/// Request loop dispatching `tools/call` to registered tools
pub struct McpServer {
    server_info: ServerInfo,
    tools: BTreeMap<String, Box<dyn Tool>>,
}

impl McpServer {
    pub fn new() -> Self {
        Self::with_info(ServerInfo::default())
    }

    pub fn with_info(info: ServerInfo) -> Self {
        Self {
            server_info: info,
            tools: BTreeMap::new(),
        }
    }

    pub fn register_tool(&mut self, tool: Box<dyn Tool>) -> &mut Self {
        let name = tool.name();
        self.tools.insert(name, tool);
        self
    }

    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }

    /// Serve stdin/stdout until stdin closes (blocking)
    pub fn run(&self) -> McpResult<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.serve(stdin.lock(), stdout.lock())
    }

    /// Serve one request per line from `reader`, one response per line to `writer`
    pub fn serve<R: BufRead, W: Write>(&self, mut reader: R, mut writer: W) -> McpResult<()> {
        let mut line = String::new();
        while reader.read_line(&mut line)? > 0 {
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                if let Some(response) = self.handle_line(trimmed)? {
                    writeln!(writer, "{}", response)?;
                    writer.flush()?;
                }
            }
            line.clear();
        }
        Ok(())
    }

    /// Handle one request line; `None` for notifications
    pub fn handle_line(&self, request_str: &str) -> McpResult<Option<String>> {
        let request: JsonRpcRequest = match serde_json::from_str(request_str) {
            Ok(req) => req,
            Err(e) => return encode(&JsonRpcError::parse_error(e.to_string())).map(Some),
        };

        if !request.is_valid() {
            let id = request.id.unwrap_or(Value::Null);
            return encode(&JsonRpcError::invalid_request(id, "jsonrpc must be '2.0'")).map(Some);
        }
        if request.is_notification() {
            debug!(method = %request.method, "notification");
            return Ok(None);
        }

        let id = request.id.clone().unwrap_or(Value::Null);
        debug!(method = %request.method, "request");
        let response = match request.method.as_str() {
            "initialize" => self.success(id, self.initialize_result()),
            "tools/list" => self.success(id, self.tools_list_result()),
            "tools/call" => self.handle_tool_call(id, request.params),
            "ping" => self.success(id, json!({})),
            _ => encode(&JsonRpcError::method_not_found(id, &request.method)),
        }?;
        Ok(Some(response))
    }

    fn initialize_result(&self) -> Value {
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": {}
            },
            "serverInfo": {
                "name": self.server_info.name,
                "version": self.server_info.version
            }
        })
    }

    fn tools_list_result(&self) -> Value {
        let tools: Vec<McpTool> = self.tools.values().map(|t| t.definition()).collect();
        json!({ "tools": tools })
    }

    fn handle_tool_call(&self, id: Value, params: Option<Value>) -> McpResult<String> {
        let Some(params) = params else {
            return encode(&JsonRpcError::invalid_params(id, "Missing parameters"));
        };
        let Some(tool_name) = extract_tool_name(&params) else {
            return encode(&JsonRpcError::invalid_params(id, "Missing tool name"));
        };
        let Some(tool) = self.tools.get(tool_name) else {
            return encode(&JsonRpcError::unknown_tool(id, tool_name));
        };

        match tool.execute(extract_arguments(&params)) {
            Ok(result) => self.success(id, result),
            Err(e) => {
                let kind = e.downcast_ref::<HistoryError>().map(HistoryError::kind);
                warn!(tool = tool_name, error = %e, "tool failed");
                encode(&JsonRpcError::tool_failed(id, e.to_string(), kind))
            }
        }
    }

    fn success(&self, id: Value, result: Value) -> McpResult<String> {
        encode(&JsonRpcResponse::new(id, result))
    }
}

impl Default for McpServer {
    fn default() -> Self {
        Self::new()
    }
}

fn encode<T: Serialize>(message: &T) -> McpResult<String> {
    Ok(serde_json::to_string(message)?)
}
