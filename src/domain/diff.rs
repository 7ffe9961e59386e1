#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DiffLineKind {
    Added,
    Removed,
    Unchanged,
}

/// One line of a two-way line-level comparison. Line numbers are 1-based;
/// `old_line_no` is present unless the line was added, `new_line_no` unless
/// it was removed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DiffLine {
    pub kind: DiffLineKind,
    pub content: String,
    pub old_line_no: Option<u64>,
    pub new_line_no: Option<u64>,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DiffStats {
    pub added: usize,
    pub removed: usize,
}

/// Minimal-edit line alignment between `old_text` and `new_text`.
///
/// Filtering the result to non-added lines reconstructs `old_text` line for
/// line; filtering to non-removed reconstructs `new_text`. Within a replaced
/// run, removed lines come before added lines.
pub fn diff_lines(old_text: &str, new_text: &str) -> Vec<DiffLine> {
    let old_lines = split_lines(old_text);
    let new_lines = split_lines(new_text);

    // lcs[i][j] = length of the longest common subsequence of
    // old_lines[i..] and new_lines[j..].
    let mut lcs = vec![vec![0usize; new_lines.len() + 1]; old_lines.len() + 1];
    for i in (0..old_lines.len()).rev() {
        for j in (0..new_lines.len()).rev() {
            lcs[i][j] = if old_lines[i] == new_lines[j] {
                lcs[i + 1][j + 1] + 1
            } else {
                lcs[i + 1][j].max(lcs[i][j + 1])
            };
        }
    }

    let mut lines = Vec::with_capacity(old_lines.len().max(new_lines.len()));
    let mut old_no: u64 = 1;
    let mut new_no: u64 = 1;
    let mut i = 0;
    let mut j = 0;
    while i < old_lines.len() && j < new_lines.len() {
        if old_lines[i] == new_lines[j] {
            lines.push(DiffLine {
                kind: DiffLineKind::Unchanged,
                content: old_lines[i].to_string(),
                old_line_no: Some(old_no),
                new_line_no: Some(new_no),
            });
            old_no += 1;
            new_no += 1;
            i += 1;
            j += 1;
        } else if lcs[i + 1][j] >= lcs[i][j + 1] {
            lines.push(removed(old_lines[i], &mut old_no));
            i += 1;
        } else {
            lines.push(added(new_lines[j], &mut new_no));
            j += 1;
        }
    }
    while i < old_lines.len() {
        lines.push(removed(old_lines[i], &mut old_no));
        i += 1;
    }
    while j < new_lines.len() {
        lines.push(added(new_lines[j], &mut new_no));
        j += 1;
    }

    lines
}

pub fn diff_stats(lines: &[DiffLine]) -> DiffStats {
    let added = lines
        .iter()
        .filter(|line| line.kind == DiffLineKind::Added)
        .count();
    let removed = lines
        .iter()
        .filter(|line| line.kind == DiffLineKind::Removed)
        .count();
    DiffStats { added, removed }
}

fn removed(content: &str, old_no: &mut u64) -> DiffLine {
    let line = DiffLine {
        kind: DiffLineKind::Removed,
        content: content.to_string(),
        old_line_no: Some(*old_no),
        new_line_no: None,
    };
    *old_no += 1;
    line
}

fn added(content: &str, new_no: &mut u64) -> DiffLine {
    let line = DiffLine {
        kind: DiffLineKind::Added,
        content: content.to_string(),
        old_line_no: None,
        new_line_no: Some(*new_no),
    };
    *new_no += 1;
    line
}

// A terminal newline would otherwise produce a spurious trailing empty line.
fn split_lines(text: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = text.split('\n').collect();
    if lines.last() == Some(&"") {
        lines.pop();
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reconstruct(lines: &[DiffLine], skip: DiffLineKind) -> Vec<String> {
        lines
            .iter()
            .filter(|line| line.kind != skip)
            .map(|line| line.content.clone())
            .collect()
    }

    #[test]
    fn round_trips_both_sides() {
        let old_text = "a\nb\nc\nd\n";
        let new_text = "a\nx\nc\ny\nd\n";
        let lines = diff_lines(old_text, new_text);
        assert_eq!(
            reconstruct(&lines, DiffLineKind::Added),
            vec!["a", "b", "c", "d"]
        );
        assert_eq!(
            reconstruct(&lines, DiffLineKind::Removed),
            vec!["a", "x", "c", "y", "d"]
        );
    }

    #[test]
    fn identical_inputs_yield_only_unchanged() {
        let text = "one\ntwo\nthree\n";
        let lines = diff_lines(text, text);
        assert_eq!(lines.len(), 3);
        assert!(lines
            .iter()
            .all(|line| line.kind == DiffLineKind::Unchanged));
        assert_eq!(diff_stats(&lines), DiffStats::default());
    }

    #[test]
    fn replaced_line_is_removed_then_added() {
        let lines = diff_lines("foo\nbar\n", "foo\nbaz\n");
        assert_eq!(
            lines,
            vec![
                DiffLine {
                    kind: DiffLineKind::Unchanged,
                    content: "foo".to_string(),
                    old_line_no: Some(1),
                    new_line_no: Some(1),
                },
                DiffLine {
                    kind: DiffLineKind::Removed,
                    content: "bar".to_string(),
                    old_line_no: Some(2),
                    new_line_no: None,
                },
                DiffLine {
                    kind: DiffLineKind::Added,
                    content: "baz".to_string(),
                    old_line_no: None,
                    new_line_no: Some(2),
                },
            ]
        );
        assert_eq!(diff_stats(&lines), DiffStats { added: 1, removed: 1 });
    }

    #[test]
    fn empty_inputs_produce_no_lines() {
        assert!(diff_lines("", "").is_empty());
        let lines = diff_lines("", "a\n");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].kind, DiffLineKind::Added);
        assert_eq!(lines[0].new_line_no, Some(1));
    }

    #[test]
    fn missing_terminal_newline_still_counts_the_last_line() {
        let lines = diff_lines("a\nb", "a\nb\nc");
        assert_eq!(diff_stats(&lines), DiffStats { added: 1, removed: 0 });
        assert_eq!(lines.last().map(|line| line.content.as_str()), Some("c"));
    }

    #[test]
    fn line_numbers_strictly_increase_per_side() {
        let lines = diff_lines("a\nb\nc\n", "b\nc\nd\n");
        let old_nos: Vec<u64> = lines.iter().filter_map(|line| line.old_line_no).collect();
        let new_nos: Vec<u64> = lines.iter().filter_map(|line| line.new_line_no).collect();
        assert_eq!(old_nos, vec![1, 2, 3]);
        assert_eq!(new_nos, vec![1, 2, 3]);
    }
}
