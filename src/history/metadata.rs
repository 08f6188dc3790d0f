//! `history.xml` codec
//!
//! The metadata record is kept byte-compatible with existing history trees:
//!
//! ```text
//! <?xml version='1.1' encoding='UTF-8'?>
//! <hudson.plugins.jobConfigHistory.HistoryDescr>
//!   <user>unknown</user>
//!   <userId>unknown</userId>
//!   <operation>Changed</operation>
//!   <timestamp>2012-11-21_11-28-12</timestamp>
//!   <currentName></currentName>
//!   <oldName></oldName>
//! </hudson.plugins.jobConfigHistory.HistoryDescr>
//! ```

use std::fs;
use std::path::Path;

use quick_xml::events::BytesText;
use quick_xml::Writer;
use serde::Deserialize;

use super::error::{HistoryError, HistoryResult};
use crate::types::{Operation, Revision, TimestampId, UNKNOWN_USER};
use crate::utils::atomic_write;

const XML_DECLARATION: &str = "<?xml version='1.1' encoding='UTF-8'?>";
const ROOT_ELEMENT: &str = "hudson.plugins.jobConfigHistory.HistoryDescr";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryDescr {
    #[serde(default)]
    user: Option<String>,
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    operation: Option<String>,
    #[serde(default)]
    current_name: Option<String>,
    #[serde(default)]
    old_name: Option<String>,
    #[serde(default)]
    change_reason_comment: Option<String>,
}

/// Render a revision as `history.xml` text
pub fn to_xml(revision: &Revision) -> HistoryResult<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer
        .create_element(ROOT_ELEMENT)
        .write_inner_content(|w| {
            w.create_element("user")
                .write_text_content(BytesText::new(&revision.user))?;
            w.create_element("userId")
                .write_text_content(BytesText::new(&revision.user_id))?;
            w.create_element("operation")
                .write_text_content(BytesText::new(revision.operation.as_str()))?;
            w.create_element("timestamp")
                .write_text_content(BytesText::new(revision.timestamp.as_str()))?;
            w.create_element("currentName")
                .write_text_content(BytesText::new(revision.current_name.as_deref().unwrap_or("")))?;
            w.create_element("oldName")
                .write_text_content(BytesText::new(revision.old_name.as_deref().unwrap_or("")))?;
            if let Some(comment) = &revision.change_reason_comment {
                w.create_element("changeReasonComment")
                    .write_text_content(BytesText::new(comment))?;
            }
            Ok::<(), quick_xml::Error>(())
        })?;

    let body = String::from_utf8(writer.into_inner())
        .map_err(|e| HistoryError::Xml(e.to_string()))?;
    Ok(format!("{}\n{}\n", XML_DECLARATION, body))
}

/// Parse `history.xml` text. The directory name is the authoritative id.
pub fn from_xml(xml: &str, timestamp: &TimestampId) -> HistoryResult<Revision> {
    let descr: HistoryDescr = quick_xml::de::from_str(xml)?;
    let operation = descr
        .operation
        .as_deref()
        .and_then(Operation::parse)
        .ok_or_else(|| {
            HistoryError::Xml(format!(
                "unknown operation {:?} in revision {}",
                descr.operation, timestamp
            ))
        })?;

    Ok(Revision {
        timestamp: timestamp.clone(),
        operation,
        user: non_empty(descr.user).unwrap_or_else(|| UNKNOWN_USER.to_string()),
        user_id: non_empty(descr.user_id).unwrap_or_else(|| UNKNOWN_USER.to_string()),
        current_name: non_empty(descr.current_name),
        old_name: non_empty(descr.old_name),
        change_reason_comment: non_empty(descr.change_reason_comment),
    })
}

/// Write the metadata record into a revision directory
pub fn write_metadata(revision_dir: &Path, revision: &Revision) -> HistoryResult<()> {
    let xml = to_xml(revision)?;
    atomic_write(revision_dir.join(super::paths::HISTORY_FILE), xml.as_bytes())?;
    Ok(())
}

/// Read the metadata record of a revision directory
pub fn read_metadata(revision_dir: &Path, timestamp: &TimestampId) -> HistoryResult<Revision> {
    let xml = fs::read_to_string(revision_dir.join(super::paths::HISTORY_FILE))?;
    from_xml(&xml, timestamp)
}

/// Operation recorded in a revision directory, if its metadata is readable
pub fn read_operation(revision_dir: &Path) -> Option<Operation> {
    let xml = fs::read_to_string(revision_dir.join(super::paths::HISTORY_FILE)).ok()?;
    let descr: HistoryDescr = quick_xml::de::from_str(&xml).ok()?;
    descr.operation.as_deref().and_then(Operation::parse)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
