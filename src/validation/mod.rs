//! Validation of caller input and stored payloads
//!
//! Revision ids and entity names arriving from the tool surface are checked
//! here before any path is built from them.

mod request;
mod xml;

pub use request::{check_entity_name, check_timestamp};
pub use xml::{check_xml, XmlCheck};
