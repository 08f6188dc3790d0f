//! Unified diff generation and parsing

use similar::{DiffOp, DiffTag, TextDiff};

use super::error::{DiffError, DiffResult};

/// Default number of context lines around each change
pub const DEFAULT_CONTEXT: usize = 3;

/// How much unchanged text a unified diff carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Context {
    /// `n` lines around each change
    Lines(usize),
    /// The whole file; identical inputs still yield one hunk
    Full,
}

impl Default for Context {
    fn default() -> Self {
        Context::Lines(DEFAULT_CONTEXT)
    }
}

/// One side of a parsed hunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// 0-based line offset of the first line
    pub position: usize,
    pub lines: Vec<String>,
}

/// One hunk of a parsed unified diff
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delta {
    pub source: Chunk,
    pub target: Chunk,
}

/// Unified diff of two texts, as lines (no trailing newlines)
pub fn unified_diff_lines(
    source_name: &str,
    target_name: &str,
    source: &[&str],
    target: &[&str],
    context: Context,
) -> Vec<String> {
    // More context than the longer side never changes the grouping.
    let longest = source.len().max(target.len());
    let radius = match context {
        Context::Lines(n) => n.min(longest),
        Context::Full => longest,
    };

    let diff = TextDiff::from_slices(source, target);
    let groups = diff.grouped_ops(radius);

    let mut out = Vec::new();
    if groups.is_empty() {
        if context == Context::Full && !source.is_empty() {
            out.push(format!("--- {}", source_name));
            out.push(format!("+++ {}", target_name));
            out.push(format!("@@ -1,{} +1,{} @@", source.len(), target.len()));
            out.extend(source.iter().map(|line| format!(" {}", line)));
        }
        return out;
    }

    out.push(format!("--- {}", source_name));
    out.push(format!("+++ {}", target_name));
    for group in &groups {
        out.extend(hunk(source, target, group));
    }
    out
}

/// Unified diff of two texts joined into one string with a trailing newline
pub fn unified_diff(
    source_name: &str,
    target_name: &str,
    source: &str,
    target: &str,
    context: Context,
) -> String {
    let source: Vec<&str> = source.lines().collect();
    let target: Vec<&str> = target.lines().collect();
    let lines = unified_diff_lines(source_name, target_name, &source, &target, context);
    if lines.is_empty() {
        return String::new();
    }
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

fn hunk(source: &[&str], target: &[&str], group: &[DiffOp]) -> Vec<String> {
    let (Some(first), Some(last)) = (group.first(), group.last()) else {
        return Vec::new();
    };
    let old_start = first.old_range().start;
    let new_start = first.new_range().start;
    let old_len = last.old_range().end - old_start;
    let new_len = last.new_range().end - new_start;

    let mut lines = vec![format!(
        "@@ -{},{} +{},{} @@",
        old_start + 1,
        old_len,
        new_start + 1,
        new_len
    )];
    for op in group {
        let (tag, old, new) = op.as_tag_tuple();
        match tag {
            DiffTag::Equal => lines.extend(source[old].iter().map(|line| format!(" {}", line))),
            DiffTag::Delete => lines.extend(source[old].iter().map(|line| format!("-{}", line))),
            DiffTag::Insert => lines.extend(target[new].iter().map(|line| format!("+{}", line))),
            DiffTag::Replace => {
                lines.extend(source[old].iter().map(|line| format!("-{}", line)));
                lines.extend(target[new].iter().map(|line| format!("+{}", line)));
            }
        }
    }
    lines
}

/// Parse unified diff lines into deltas, one per hunk.
///
/// Lines before the first hunk header (`---`/`+++` and anything else) are
/// skipped, as are `\ No newline at end of file` markers. A hunk's source
/// chunk holds its context and `-` lines; its target chunk holds context and
/// `+` lines.
pub fn parse_unified_diff<S: AsRef<str>>(lines: &[S]) -> DiffResult<Vec<Delta>> {
    let mut deltas = Vec::new();
    let mut in_prelude = true;
    let mut raw: Vec<(char, String)> = Vec::new();
    let (mut old_ln, mut new_ln) = (1usize, 1usize);

    for (index, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        if line.starts_with("@@") {
            flush_chunk(&mut raw, &mut deltas, old_ln, new_ln);
            let (old, new) = parse_header(line).ok_or_else(|| DiffError::MalformedHunkHeader {
                line: index + 1,
                header: line.to_string(),
            })?;
            old_ln = old.max(1);
            new_ln = new.max(1);
            in_prelude = false;
            continue;
        }
        if in_prelude {
            continue;
        }
        match line.chars().next() {
            None => raw.push((' ', String::new())),
            Some(tag @ (' ' | '+' | '-')) => raw.push((tag, line[1..].to_string())),
            Some(_) => {}
        }
    }
    flush_chunk(&mut raw, &mut deltas, old_ln, new_ln);
    Ok(deltas)
}

fn flush_chunk(raw: &mut Vec<(char, String)>, deltas: &mut Vec<Delta>, old_ln: usize, new_ln: usize) {
    if raw.is_empty() {
        return;
    }
    let mut source = Vec::new();
    let mut target = Vec::new();
    for (tag, text) in raw.drain(..) {
        if tag == ' ' || tag == '-' {
            source.push(text.clone());
        }
        if tag == ' ' || tag == '+' {
            target.push(text);
        }
    }
    deltas.push(Delta {
        source: Chunk {
            position: old_ln - 1,
            lines: source,
        },
        target: Chunk {
            position: new_ln - 1,
            lines: target,
        },
    });
}

/// `@@ -a[,b] +c[,d] @@` -> `(a, c)`
fn parse_header(line: &str) -> Option<(usize, usize)> {
    let inner = line.strip_prefix("@@")?.trim_end().strip_suffix("@@")?;
    let mut parts = inner.split_whitespace();
    let old = parts.next()?.strip_prefix('-')?;
    let new = parts.next()?.strip_prefix('+')?;
    if parts.next().is_some() {
        return None;
    }
    Some((range_start(old)?, range_start(new)?))
}

fn range_start(range: &str) -> Option<usize> {
    let mut fields = range.splitn(2, ',');
    let start = fields.next()?.parse().ok()?;
    if let Some(len) = fields.next() {
        len.parse::<usize>().ok()?;
    }
    Some(start)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line_change() {
        let diff = unified_diff("a", "b", "a", "b", Context::default());
        assert_eq!(diff, "--- a\n+++ b\n@@ -1,1 +1,1 @@\n-a\n+b\n");
        assert!(diff.ends_with("@@ -1,1 +1,1 @@\n-a\n+b\n"));
    }

    #[test]
    fn test_identical_inputs() {
        assert_eq!(unified_diff("a", "b", "x\ny", "x\ny", Context::default()), "");
        assert_eq!(
            unified_diff("a", "b", "x\ny", "x\ny", Context::Full),
            "--- a\n+++ b\n@@ -1,2 +1,2 @@\n x\n y\n"
        );
    }

    #[test]
    fn test_context_is_trimmed_and_hunks_split() {
        let source: String = (1..=20).map(|i| format!("line{}\n", i)).collect();
        let target = source.replace("line2\n", "LINE2\n").replace("line18\n", "LINE18\n");

        let diff = unified_diff("a", "b", &source, &target, Context::default());
        let headers: Vec<&str> = diff.lines().filter(|l| l.starts_with("@@")).collect();

        assert_eq!(headers, vec!["@@ -1,5 +1,5 @@", "@@ -15,6 +15,6 @@"]);
    }

    #[test]
    fn test_nearby_changes_share_a_hunk() {
        let source: String = (1..=12).map(|i| format!("line{}\n", i)).collect();
        let target = source.replace("line3\n", "").replace("line8\n", "line8\nextra\n");

        let diff = unified_diff("a", "b", &source, &target, Context::default());
        let headers: Vec<&str> = diff.lines().filter(|l| l.starts_with("@@")).collect();

        assert_eq!(headers, vec!["@@ -1,11 +1,11 @@"]);
    }

    #[test]
    fn test_oversized_context_is_clamped() {
        let huge = unified_diff("a", "b", "a\n", "b\n", Context::Lines(usize::MAX));
        assert_eq!(huge, unified_diff("a", "b", "a\n", "b\n", Context::default()));

        let source = "one\ntwo\nthree\n";
        let target = "one\nTWO\nthree\n";
        assert_eq!(
            unified_diff("a", "b", source, target, Context::Lines(usize::MAX)),
            unified_diff("a", "b", source, target, Context::Full)
        );
    }

    #[test]
    fn test_insert_into_empty_source() {
        let diff = unified_diff("a", "b", "", "x\ny\n", Context::default());
        assert_eq!(diff, "--- a\n+++ b\n@@ -1,0 +1,2 @@\n+x\n+y\n");
    }

    #[test]
    fn test_parse_hunks() {
        let lines = [
            "--- a",
            "+++ b",
            "@@ -1,3 +1,3 @@",
            " one",
            "-two",
            "+TWO",
            " three",
            "@@ -10 +10,2 @@",
            " ten",
            "+eleven",
            "\\ No newline at end of file",
        ];

        let deltas = parse_unified_diff(&lines).unwrap();

        assert_eq!(deltas.len(), 2);
        assert_eq!(deltas[0].source.position, 0);
        assert_eq!(deltas[0].source.lines, vec!["one", "two", "three"]);
        assert_eq!(deltas[0].target.lines, vec!["one", "TWO", "three"]);
        assert_eq!(deltas[1].source.position, 9);
        assert_eq!(deltas[1].target.lines, vec!["ten", "eleven"]);
    }

    #[test]
    fn test_parse_zero_start_and_blank_context() {
        let deltas = parse_unified_diff(&["@@ -0,0 +1,2 @@", "+x", ""]).unwrap();
        assert_eq!(deltas[0].source.position, 0);
        assert_eq!(deltas[0].source.lines, vec![""]);
        assert_eq!(deltas[0].target.lines, vec!["x", ""]);
    }

    #[test]
    fn test_parse_rejects_malformed_header() {
        let result = parse_unified_diff(&["--- a", "+++ b", "@@ -x +1 @@"]);
        assert!(matches!(
            result,
            Err(DiffError::MalformedHunkHeader { line: 3, .. })
        ));
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(parse_unified_diff::<&str>(&[]).unwrap().is_empty());
    }
}
