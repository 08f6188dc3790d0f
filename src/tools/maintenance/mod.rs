//! Maintenance tools

mod check_xml;
mod purge_history;

pub use check_xml::CheckXmlTool;
pub use purge_history::PurgeHistoryTool;
