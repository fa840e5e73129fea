use core::ops::Range;

use unicode_segmentation::UnicodeSegmentation;

use crate::line_breaker::{LineBreakKind, compute_line_breaks};

/// One visual line produced by [`wrap_text`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrappedLine {
    /// Byte range into the wrapped text, including trailing whitespace.
    pub range: Range<usize>,
    /// Line text with trailing whitespace removed.
    pub text: String,
}

/// Collapse runs of whitespace into single spaces and trim both ends, the
/// way a browser renders normal-flow text.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Width of `text` in grapheme clusters.
pub fn display_width(text: &str) -> usize {
    text.graphemes(true).count()
}

/// Greedily wrap `text` into lines no wider than `max_columns`.
///
/// Lines only break at UAX-14 opportunities; a single unbreakable run wider
/// than the limit gets a line of its own. Trailing whitespace does not count
/// towards the width. Empty input yields no lines.
pub fn wrap_text(text: &str, max_columns: usize) -> Vec<WrappedLine> {
    let max_columns = max_columns.max(1);
    let mut lines = Vec::new();
    let mut line_start = 0;
    let mut last_fit: Option<usize> = None;

    for brk in compute_line_breaks(text) {
        let width = display_width(text[line_start..brk.offset].trim_end());
        if width > max_columns {
            if let Some(fit) = last_fit {
                push_line(text, line_start..fit, &mut lines);
                line_start = fit;
            }
        }
        last_fit = Some(brk.offset);
        if brk.kind == LineBreakKind::Mandatory {
            push_line(text, line_start..brk.offset, &mut lines);
            line_start = brk.offset;
            last_fit = None;
        }
    }
    lines
}

fn push_line(text: &str, range: Range<usize>, lines: &mut Vec<WrappedLine>) {
    let line = text[range.clone()].trim_end();
    if line.is_empty() {
        return;
    }
    lines.push(WrappedLine {
        range,
        text: line.to_string(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(lines: &[WrappedLine]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn wraps_at_word_boundaries() {
        let lines = wrap_text("the quick brown fox jumps", 10);
        assert_eq!(texts(&lines), vec!["the quick", "brown fox", "jumps"]);
    }

    #[test]
    fn short_text_is_one_line() {
        let lines = wrap_text("hello", 40);
        assert_eq!(texts(&lines), vec!["hello"]);
        assert_eq!(lines[0].range, 0..5);
    }

    #[test]
    fn overlong_word_gets_its_own_line() {
        let lines = wrap_text("a supercalifragilistic b", 5);
        assert_eq!(texts(&lines), vec!["a", "supercalifragilistic", "b"]);
    }

    #[test]
    fn newline_forces_a_break() {
        let lines = wrap_text("one\ntwo", 40);
        assert_eq!(texts(&lines), vec!["one", "two"]);
    }

    #[test]
    fn empty_text_has_no_lines() {
        assert!(wrap_text("", 10).is_empty());
        assert!(wrap_text("   ", 10).is_empty());
    }

    #[test]
    fn width_counts_graphemes() {
        assert_eq!(display_width("e\u{301}te\u{301}"), 3);
        assert_eq!(collapse_whitespace("  a \n\t b  "), "a b");
    }
}
