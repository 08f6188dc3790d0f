//! Overview tools spanning the whole history root

mod list_configs;
mod revision_counts;

pub use list_configs::ListConfigsTool;
pub use revision_counts::RevisionCountsTool;
