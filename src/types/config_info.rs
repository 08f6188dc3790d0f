//! Overview projection of a revision

use serde::{Deserialize, Serialize};

use super::{Operation, Revision, TimestampId};

/// One row of an overview listing: a revision plus its owning entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInfo {
    /// Folder-qualified entity name (`folder/job`), or the system/agent name
    pub name: String,
    pub timestamp: TimestampId,
    pub operation: Operation,
    pub user: String,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_name: Option<String>,
    /// Whether the live configuration is still considered to exist
    pub config_exists: bool,
    pub is_job: bool,
}

impl ConfigInfo {
    pub fn from_revision(name: &str, revision: Revision, config_exists: bool, is_job: bool) -> Self {
        Self {
            name: name.to_string(),
            timestamp: revision.timestamp,
            operation: revision.operation,
            user: revision.user,
            user_id: revision.user_id,
            current_name: revision.current_name,
            old_name: revision.old_name,
            config_exists,
            is_job,
        }
    }
}

impl std::fmt::Display for ConfigInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} on {} @{}", self.operation, self.name, self.timestamp)
    }
}

/// Sort newest first; ties keep name order so listings are stable
pub fn sort_newest_first(configs: &mut [ConfigInfo]) {
    configs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| a.name.cmp(&b.name)));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(name: &str, ts: &str) -> ConfigInfo {
        ConfigInfo {
            name: name.to_string(),
            timestamp: TimestampId::parse(ts).unwrap(),
            operation: Operation::Changed,
            user: "unknown".to_string(),
            user_id: "unknown".to_string(),
            current_name: None,
            old_name: None,
            config_exists: true,
            is_job: true,
        }
    }

    #[test]
    fn test_sort_newest_first() {
        let mut configs = vec![
            info("b", "2012-11-21_11-28-12"),
            info("a", "2013-01-01_00-00-00"),
            info("a", "2012-11-21_11-28-12"),
        ];
        sort_newest_first(&mut configs);
        assert_eq!(configs[0].timestamp.as_str(), "2013-01-01_00-00-00");
        assert_eq!(configs[1].name, "a");
        assert_eq!(configs[2].name, "b");
    }

    #[test]
    fn test_display() {
        assert_eq!(
            info("Test1", "2012-11-21_11-28-12").to_string(),
            "Changed on Test1 @2012-11-21_11-28-12"
        );
    }
}
