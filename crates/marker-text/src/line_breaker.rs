use unicode_linebreak::{BreakOpportunity, linebreaks};

/// Kind of line break at a given position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineBreakKind {
    /// Required line break (e.g., explicit newline, end of text).
    Mandatory,
    /// Optional line break opportunity.
    Opportunity,
}

/// A line break opportunity in the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineBreak {
    /// Byte offset *after* the break.
    pub offset: usize,
    pub kind: LineBreakKind,
}

/// Compute all line break opportunities in the given text using UAX-14.
///
/// End-of-text is reported as a mandatory break.
pub fn compute_line_breaks(text: &str) -> Vec<LineBreak> {
    linebreaks(text)
        .map(|(offset, opp)| LineBreak {
            offset,
            kind: match opp {
                BreakOpportunity::Mandatory => LineBreakKind::Mandatory,
                BreakOpportunity::Allowed => LineBreakKind::Opportunity,
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_breaks_basic_with_newline() {
        let text = "a b \nc";
        let breaks = compute_line_breaks(text);
        assert!(breaks.iter().any(|b| b.kind == LineBreakKind::Mandatory));
        assert_eq!(breaks.last().map(|b| b.offset), Some(text.len()));
    }

    #[test]
    fn breaks_after_spaces() {
        let breaks = compute_line_breaks("one two");
        assert_eq!(breaks[0], LineBreak { offset: 4, kind: LineBreakKind::Opportunity });
    }
}
