//! Revision metadata

use serde::{Deserialize, Serialize};

use super::{Operation, TimestampId};

/// Display name and id recorded when the actor is not known
pub const UNKNOWN_USER: &str = "unknown";

/// Who made a change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub name: String,
    pub id: String,
}

impl Actor {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }

    /// The `unknown` sentinel actor
    pub fn unknown() -> Self {
        Self::new(UNKNOWN_USER, UNKNOWN_USER)
    }
}

impl Default for Actor {
    fn default() -> Self {
        Self::unknown()
    }
}

/// One historized change, as stored in a revision's `history.xml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Revision {
    pub timestamp: TimestampId,
    pub operation: Operation,
    pub user: String,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_reason_comment: Option<String>,
}

impl Revision {
    pub fn is_created(&self) -> bool {
        self.operation == Operation::Created
    }
}

/// What the caller knows about a change before it is recorded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    pub operation: Operation,
    pub actor: Actor,
    pub current_name: Option<String>,
    pub old_name: Option<String>,
    pub change_reason_comment: Option<String>,
}

impl ChangeRecord {
    pub fn new(operation: Operation, actor: Actor) -> Self {
        Self {
            operation,
            actor,
            current_name: None,
            old_name: None,
            change_reason_comment: None,
        }
    }

    /// A rename from `old_name` to `new_name`. The old name is dropped when
    /// both are equal.
    pub fn renamed(actor: Actor, old_name: &str, new_name: &str) -> Self {
        let old = (old_name != new_name).then(|| old_name.to_string());
        Self {
            operation: Operation::Renamed,
            actor,
            current_name: Some(new_name.to_string()),
            old_name: old,
            change_reason_comment: None,
        }
    }

    pub fn with_comment(mut self, comment: Option<String>) -> Self {
        self.change_reason_comment = comment.filter(|c| !c.trim().is_empty());
        self
    }

    /// Stamp the record with the allocated revision id
    pub fn into_revision(self, timestamp: TimestampId) -> Revision {
        Revision {
            timestamp,
            operation: self.operation,
            user: self.actor.name,
            user_id: self.actor.id,
            current_name: self.current_name,
            old_name: self.old_name,
            change_reason_comment: self.change_reason_comment,
        }
    }
}
