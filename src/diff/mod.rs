//! Text comparison of two revisions
//!
//! Comparing is a two step pipeline:
//!
//! ```text
//! old text ─┐
//!           ├─► unified diff (lines) ─► parsed deltas ─► side-by-side rows
//! new text ─┘
//! ```
//!
//! The unified diff is the interchange format; the side-by-side view is
//! always rendered from it, never from the texts directly.

mod error;
mod side_by_side;
mod unified;

pub use error::{DiffError, DiffResult};
pub use side_by_side::{render_side_by_side, Cell, Row, SideBySideView, Tag};
pub use unified::{
    parse_unified_diff, unified_diff, unified_diff_lines, Chunk, Context, Delta, DEFAULT_CONTEXT,
};

use serde::Serialize;

/// Result of comparing two texts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comparison {
    /// Unified diff text, empty when the inputs are equal
    pub unified: String,
    pub rows: Vec<Row>,
}

impl Comparison {
    pub fn is_identical(&self) -> bool {
        self.rows
            .iter()
            .all(|row| matches!(row.tag(), Some(Tag::Equal) | None))
    }
}

/// Diff `old` against `new` and render both representations
pub fn compare_texts(
    old_name: &str,
    new_name: &str,
    old: &str,
    new: &str,
    context: Context,
) -> DiffResult<Comparison> {
    let old_lines: Vec<&str> = old.lines().collect();
    let new_lines: Vec<&str> = new.lines().collect();
    let lines = unified_diff_lines(old_name, new_name, &old_lines, &new_lines, context);
    let rows = render_side_by_side(&lines)?;
    let unified = if lines.is_empty() {
        String::new()
    } else {
        let mut text = lines.join("\n");
        text.push('\n');
        text
    };
    Ok(Comparison { unified, rows })
}
