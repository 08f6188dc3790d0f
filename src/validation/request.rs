//! Checks on caller-supplied revision ids and entity names

use crate::history::{HistoryError, HistoryResult};
use crate::types::TimestampId;

/// Parse a revision id strictly, rejecting anything that is not `yyyy-MM-dd_HH-mm-ss`
pub fn check_timestamp(value: &str) -> HistoryResult<TimestampId> {
    TimestampId::parse(value).ok_or_else(|| HistoryError::InvalidTimestamp(value.to_string()))
}

/// Reject entity names that could resolve outside the history tree
pub fn check_entity_name(name: &str) -> HistoryResult<()> {
    let trimmed = name.trim();
    let invalid = trimmed.is_empty()
        || trimmed == "null"
        || trimmed.contains("..")
        || trimmed.starts_with('/')
        || trimmed.starts_with('\\')
        || trimmed.contains('\\')
        || trimmed.contains('\0')
        || trimmed.split('/').any(|segment| segment.is_empty() || segment == ".");
    if invalid || has_drive_prefix(trimmed) {
        return Err(HistoryError::InvalidName(name.to_string()));
    }
    Ok(())
}

fn has_drive_prefix(name: &str) -> bool {
    let bytes = name.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_timestamp() {
        assert!(check_timestamp("2012-11-21_11-28-12").is_ok());
        assert!(matches!(
            check_timestamp("2012-11-21"),
            Err(HistoryError::InvalidTimestamp(_))
        ));
        assert!(matches!(
            check_timestamp("2012-11-21_11-28-12/../x"),
            Err(HistoryError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn test_accepts_folder_qualified_names() {
        assert!(check_entity_name("Test1").is_ok());
        assert!(check_entity_name("folder/sub/job").is_ok());
        assert!(check_entity_name("hudson.tasks.Ant").is_ok());
        assert!(check_entity_name("Test1_deleted_20130830_223932_071").is_ok());
    }

    #[test]
    fn test_rejects_path_escapes() {
        for name in ["", "null", "..", "../secrets", "jobs/../../etc", "/etc/passwd", "a\\b", "a//b", "./a", "C:x"] {
            assert!(
                matches!(check_entity_name(name), Err(HistoryError::InvalidName(_))),
                "accepted {:?}",
                name
            );
        }
    }
}
