//! Helpers shared by the request loop and the tools

use serde::Serialize;
use serde_json::{json, Value};

use crate::types::{Actor, EntityKey, EntityKind, McpResult};

/// Extract tool arguments from `tools/call` params
pub fn extract_arguments(params: &Value) -> Value {
    params.get("arguments").cloned().unwrap_or_else(|| json!({}))
}

/// Extract tool name from `tools/call` params
pub fn extract_tool_name(params: &Value) -> Option<&str> {
    params.get("name").and_then(|v| v.as_str())
}

/// Build a text content response
pub fn text_response(text: String) -> Value {
    json!({
        "content": [{
            "type": "text",
            "text": text
        }]
    })
}

/// Text content holding pretty-printed JSON
pub fn json_response<T: Serialize>(value: &T) -> McpResult<Value> {
    Ok(text_response(serde_json::to_string_pretty(value)?))
}

pub fn required_str<'a>(params: &'a Value, field: &str) -> McpResult<&'a str> {
    params
        .get(field)
        .and_then(|v| v.as_str())
        .ok_or_else(|| format!("Missing {}", field).into())
}

pub fn optional_str<'a>(params: &'a Value, field: &str) -> Option<&'a str> {
    params.get(field).and_then(|v| v.as_str()).filter(|s| !s.is_empty())
}

/// Entity named by `kind` (job, system, agent, deleted; default job) and `field`
pub fn entity_key(params: &Value, field: &str) -> McpResult<EntityKey> {
    let kind: EntityKind = match params.get("kind") {
        Some(kind) => serde_json::from_value(kind.clone())?,
        None => EntityKind::Job,
    };
    Ok(kind.key(required_str(params, field)?))
}

/// Actor from `user`/`userId`; `None` lets the history use its own
pub fn actor_from(params: &Value) -> Option<Actor> {
    let user = optional_str(params, "user");
    let id = optional_str(params, "userId");
    match (user, id) {
        (None, None) => None,
        (user, id) => {
            let name = user.or(id).unwrap_or_default();
            Some(Actor::new(name, id.unwrap_or(name)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_key_defaults_to_job() {
        let key = entity_key(&json!({ "name": "folder/job" }), "name").unwrap();
        assert_eq!(key, EntityKey::Job("folder/job".to_string()));

        let key = entity_key(&json!({ "kind": "agent", "name": "n1" }), "name").unwrap();
        assert_eq!(key, EntityKey::Agent("n1".to_string()));

        assert!(entity_key(&json!({ "kind": "plugin", "name": "x" }), "name").is_err());
        assert!(entity_key(&json!({}), "name").is_err());
    }

    #[test]
    fn test_actor_from() {
        assert_eq!(actor_from(&json!({})), None);
        assert_eq!(actor_from(&json!({ "user": "Jane" })), Some(Actor::new("Jane", "Jane")));
        assert_eq!(
            actor_from(&json!({ "user": "Jane", "userId": "jdoe" })),
            Some(Actor::new("Jane", "jdoe"))
        );
    }
}
