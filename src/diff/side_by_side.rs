//! Side-by-side rendering of parsed unified diffs

use std::collections::HashSet;

use serde::Serialize;
use similar::{capture_diff_slices, Algorithm, DiffTag};

use super::error::DiffResult;
use super::unified::{parse_unified_diff, Delta};

/// How a row relates its two sides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tag {
    Equal,
    Insert,
    Delete,
    Change,
}

/// One side of a row. Both fields are absent on the empty side of an
/// insertion or deletion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    pub line_number: Option<usize>,
    pub text: Option<String>,
}

impl Cell {
    fn line(number: usize, text: &str) -> Self {
        Self {
            line_number: Some(number),
            text: Some(text.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Row {
    /// Unchanged lines between two hunks that were not rendered
    Skipped,
    Line { tag: Tag, left: Cell, right: Cell },
}

impl Row {
    pub fn tag(&self) -> Option<Tag> {
        match self {
            Row::Skipped => None,
            Row::Line { tag, .. } => Some(*tag),
        }
    }

    pub fn left_line_number(&self) -> Option<usize> {
        match self {
            Row::Skipped => None,
            Row::Line { left, .. } => left.line_number,
        }
    }

    pub fn right_line_number(&self) -> Option<usize> {
        match self {
            Row::Skipped => None,
            Row::Line { right, .. } => right.line_number,
        }
    }
}

/// Rows of one comparison, built fresh per request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SideBySideView {
    rows: Vec<Row>,
}

impl SideBySideView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lay out `deltas` in order, inserting a skip marker wherever a hunk
    /// starts more than one line past where the previous one ended.
    pub fn from_deltas(deltas: &[Delta]) -> Self {
        let mut view = Self::new();
        let mut previous_left = 0;
        for delta in deltas {
            previous_left = view.push_delta(delta, previous_left);
        }
        view
    }

    fn push_delta(&mut self, delta: &Delta, previous_left: usize) -> usize {
        let mut left_pos = delta.source.position + 1;
        let mut right_pos = delta.target.position + 1;
        if previous_left > 0 && left_pos > previous_left + 1 {
            self.rows.push(Row::Skipped);
        }

        let source = &delta.source.lines;
        let target = &delta.target.lines;
        let mut end_left = previous_left;

        let mut emit = |rows: &mut Vec<Row>, tag: Tag, old: Option<&String>, new: Option<&String>| {
            let left = match old {
                Some(text) => {
                    left_pos += 1;
                    Cell::line(left_pos - 1, text)
                }
                None => Cell::default(),
            };
            let right = match new {
                Some(text) => {
                    right_pos += 1;
                    Cell::line(right_pos - 1, text)
                }
                None => Cell::default(),
            };
            rows.push(Row::Line { tag, left, right });
            end_left = left_pos;
        };

        for op in capture_diff_slices(Algorithm::Myers, source, target) {
            let (tag, old, new) = op.as_tag_tuple();
            let old = &source[old];
            let new = &target[new];
            match tag {
                DiffTag::Equal => {
                    for (left, right) in old.iter().zip(new) {
                        emit(&mut self.rows, Tag::Equal, Some(left), Some(right));
                    }
                }
                DiffTag::Insert => {
                    for text in new {
                        emit(&mut self.rows, Tag::Insert, None, Some(text));
                    }
                }
                DiffTag::Delete => {
                    for text in old {
                        emit(&mut self.rows, Tag::Delete, Some(text), None);
                    }
                }
                DiffTag::Replace => {
                    for k in 0..old.len().max(new.len()) {
                        emit(&mut self.rows, Tag::Change, old.get(k), new.get(k));
                    }
                }
            }
        }
        end_left
    }

    /// Drop rows that repeat an already seen left line number with an
    /// `Equal` tag. Repeats carrying a change are kept.
    pub fn clear_duplicate_lines(&mut self) {
        let mut seen = HashSet::new();
        self.rows.retain(|row| match row.left_line_number() {
            Some(number) => seen.insert(number) || row.tag() != Some(Tag::Equal),
            None => true,
        });
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }
}

/// Parse unified diff lines and render them as deduplicated rows
pub fn render_side_by_side<S: AsRef<str>>(diff_lines: &[S]) -> DiffResult<Vec<Row>> {
    let deltas = parse_unified_diff(diff_lines)?;
    let mut view = SideBySideView::from_deltas(&deltas);
    view.clear_duplicate_lines();
    Ok(view.into_rows())
}
