//! Errors raised while parsing unified diffs

use thiserror::Error;

/// Result type for diff operations
pub type DiffResult<T> = Result<T, DiffError>;

#[derive(Debug, Error)]
pub enum DiffError {
    #[error("malformed hunk header at line {line}: {header}")]
    MalformedHunkHeader { line: usize, header: String },
}
