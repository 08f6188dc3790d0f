//! Revision tools: record, list, read, compare and delete single revisions

mod delete_revision;
mod diff_revisions;
mod list_revisions;
mod read_revision;
mod record_change;

pub use delete_revision::DeleteRevisionTool;
pub use diff_revisions::DiffRevisionsTool;
pub use list_revisions::ListRevisionsTool;
pub use read_revision::ReadRevisionTool;
pub use record_change::RecordChangeTool;
