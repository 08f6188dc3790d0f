//! Kinds of recorded configuration changes

use serde::{Deserialize, Serialize};

/// The change a revision records.
///
/// Serialized as the capitalized word stored in `history.xml`
/// (`Created`, `Changed`, `Renamed`, `Deleted`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    /// First revision of a new entity
    Created,
    /// Configuration saved
    Changed,
    /// Entity renamed; payload is the config under its new name
    Renamed,
    /// Entity removed; metadata only, no payload
    Deleted,
}

impl Operation {
    /// The word written into `history.xml`
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Created => "Created",
            Operation::Changed => "Changed",
            Operation::Renamed => "Renamed",
            Operation::Deleted => "Deleted",
        }
    }

    /// Parse the stored word. Older records use lower case, so matching is
    /// case-insensitive.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        [
            Operation::Created,
            Operation::Changed,
            Operation::Renamed,
            Operation::Deleted,
        ]
        .into_iter()
        .find(|op| op.as_str().eq_ignore_ascii_case(value))
    }

    /// Whether a payload copy accompanies the metadata
    pub fn has_payload(&self) -> bool {
        !matches!(self, Operation::Deleted)
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(Operation::parse("Created"), Some(Operation::Created));
        assert_eq!(Operation::parse("created"), Some(Operation::Created));
        assert_eq!(Operation::parse(" DELETED "), Some(Operation::Deleted));
        assert_eq!(Operation::parse("Moved"), None);
    }

    #[test]
    fn test_deleted_has_no_payload() {
        assert!(Operation::Changed.has_payload());
        assert!(Operation::Renamed.has_payload());
        assert!(!Operation::Deleted.has_payload());
    }
}
