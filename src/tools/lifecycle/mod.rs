//! Lifecycle tools: renames, moves and deletions of whole entities

mod delete_entity;
mod rename_entity;

pub use delete_entity::DeleteEntityTool;
pub use rename_entity::RenameEntityTool;
