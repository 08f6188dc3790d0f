//! Config History Server - Binary Entry Point
//!
//! Serves the history tools over stdin/stdout. Logs go to stderr, filtered
//! by `RUST_LOG` (default `info`).

use std::io;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use config_history::history::{ConfigHistory, HistoryConfig};
use config_history::protocol::ServerInfo;
use config_history::server::McpServer;
use config_history::tools::register_all_tools;
use config_history::types::McpResult;
use config_history::{NAME, VERSION};

fn main() -> McpResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let config = HistoryConfig::from_env();
    info!(
        root = %config.history_root.display(),
        base = %config.base_dir.display(),
        max_entries = ?config.max_entries(),
        max_age_days = ?config.max_age_days(),
        "starting history server"
    );
    let history = Arc::new(ConfigHistory::new(config));

    let mut server = McpServer::with_info(ServerInfo::new("config-history".to_string(), VERSION.to_string()));
    register_all_tools(&mut server, history);
    info!(tools = server.tool_count(), name = NAME, "ready");

    server.run()
}
