//! End-to-end tests: JSON-RPC requests through the server into the history

use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::{json, Value};
use tempfile::TempDir;

use config_history::history::{ConfigHistory, HistoryConfig};
use config_history::server::McpServer;
use config_history::tools::register_all_tools;
use config_history::types::Actor;
use config_history::utils::ManualClock;

fn setup_server() -> (TempDir, Arc<ManualClock>, McpServer) {
    let temp_dir = TempDir::new().unwrap();
    let start = NaiveDate::from_ymd_opt(2012, 11, 21)
        .unwrap()
        .and_hms_opt(11, 28, 12)
        .unwrap();
    let clock = Arc::new(ManualClock::new(start));
    let config = HistoryConfig::new(temp_dir.path()).with_max_age_days(Some(30));
    let history = ConfigHistory::with_clock(config, clock.clone()).with_actor(Actor::new("ci", "ci"));
    let mut server = McpServer::new();
    register_all_tools(&mut server, Arc::new(history));
    (temp_dir, clock, server)
}

fn call_tool(server: &McpServer, name: &str, arguments: Value) -> Value {
    let request = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "tools/call",
        "params": { "name": name, "arguments": arguments }
    });
    let response = server.handle_line(&request.to_string()).unwrap().unwrap();
    serde_json::from_str(&response).unwrap()
}

/// Parse the JSON carried in a text content response
fn content_json(response: &Value) -> Value {
    let text = response["result"]["content"][0]["text"].as_str().unwrap();
    serde_json::from_str(text).unwrap()
}

#[test]
fn test_all_tools_registered() {
    let (_dir, _clock, server) = setup_server();
    assert_eq!(server.tool_count(), 11);
}

#[test]
fn test_record_list_and_diff() {
    let (_dir, clock, server) = setup_server();
    let first = call_tool(
        &server,
        "record_change",
        json!({ "name": "Test1", "operation": "created", "content": "a\n" }),
    );
    assert_eq!(content_json(&first)["outcome"], "recorded");

    clock.advance(chrono::Duration::seconds(1));
    call_tool(&server, "record_change", json!({ "name": "Test1", "content": "b\n", "user": "Jane" }));

    let listed = content_json(&call_tool(&server, "list_revisions", json!({ "name": "Test1" })));
    assert_eq!(listed.as_array().unwrap().len(), 2);
    assert_eq!(listed[1]["userId"], "Jane");

    let diff = call_tool(
        &server,
        "diff_revisions",
        json!({
            "name": "Test1",
            "timestamp1": "2012-11-21_11-28-12",
            "timestamp2": "2012-11-21_11-28-13",
            "format": "unified"
        }),
    );
    let text = diff["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.ends_with("@@ -1,1 +1,1 @@\n-a\n+b\n"));

    let wide = call_tool(
        &server,
        "diff_revisions",
        json!({
            "name": "Test1",
            "timestamp1": "2012-11-21_11-28-12",
            "timestamp2": "2012-11-21_11-28-13",
            "context": u64::MAX,
            "format": "unified"
        }),
    );
    assert_eq!(wide["result"]["content"][0]["text"].as_str(), Some(text));
}

#[test]
fn test_bad_timestamp_reports_kind() {
    let (_dir, _clock, server) = setup_server();
    call_tool(&server, "record_change", json!({ "name": "Test1", "content": "<x/>" }));

    let response = call_tool(
        &server,
        "read_revision",
        json!({ "name": "Test1", "timestamp": "../../etc/passwd" }),
    );
    assert_eq!(response["error"]["data"]["kind"], "invalid_timestamp");

    let response = call_tool(
        &server,
        "read_revision",
        json!({ "name": "Missing", "timestamp": "2012-11-21_11-28-12" }),
    );
    assert_eq!(response["error"]["data"]["kind"], "no_history");
}

#[test]
fn test_delete_entity_and_overview() {
    let (_dir, clock, server) = setup_server();
    call_tool(&server, "record_change", json!({ "name": "Test1", "operation": "created", "content": "<x/>" }));
    clock.advance(chrono::Duration::seconds(1));
    let deleted = call_tool(&server, "delete_entity", json!({ "name": "Test1" }));
    assert_eq!(content_json(&deleted)["outcome"], "recorded");

    let overview = content_json(&call_tool(&server, "list_configs", json!({ "filter": "deleted" })));
    assert_eq!(overview.as_array().unwrap().len(), 1);
    assert_eq!(overview[0]["displayName"], "Test1");
    assert_eq!(overview[0]["operation"], "Deleted");

    let counts = content_json(&call_tool(&server, "revision_counts", json!({})));
    assert_eq!(counts["deletedJobs"], 1);
}

#[test]
fn test_rename_entity_tool() {
    let (_dir, clock, server) = setup_server();
    call_tool(&server, "record_change", json!({ "name": "Foo", "operation": "created", "content": "<x/>" }));
    clock.advance(chrono::Duration::seconds(1));

    let renamed = call_tool(
        &server,
        "rename_entity",
        json!({ "oldName": "Foo", "newName": "Bar", "content": "<x/>" }),
    );
    assert_eq!(content_json(&renamed)["outcome"], "recorded");

    let moved = call_tool(&server, "rename_entity", json!({ "oldName": "Bar", "newName": "folder/Bar" }));
    assert_eq!(content_json(&moved)["outcome"], "relocated");

    let listed = content_json(&call_tool(&server, "list_revisions", json!({ "name": "folder/Bar", "idsOnly": true })));
    assert_eq!(listed.as_array().unwrap().len(), 2);
}

#[test]
fn test_check_xml_and_purge() {
    let (_dir, clock, server) = setup_server();
    let check = content_json(&call_tool(&server, "check_xml", json!({ "content": "<a><b></a>" })));
    assert_eq!(check["wellFormed"], false);

    call_tool(&server, "record_change", json!({ "name": "Old", "content": "<x/>" }));
    clock.advance(chrono::Duration::days(60));
    let check = content_json(&call_tool(
        &server,
        "check_xml",
        json!({ "name": "Old", "timestamp": "2012-11-21_11-28-12" }),
    ));
    assert_eq!(check["wellFormed"], true);

    let report = content_json(&call_tool(&server, "purge_history", json!({})));
    assert_eq!(report["removed"], json!(["2012-11-21_11-28-12"]));
}
