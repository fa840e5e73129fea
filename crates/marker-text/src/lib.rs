//! marker-text: line segmentation for the highlight marker reveal.
//!
//! - UAX-14 break opportunities via `unicode-linebreak`
//! - grapheme-aware width measurement via `unicode-segmentation`
//! - greedy wrapping of collapsed text at a fixed column width

pub mod line_breaker;
pub mod wrap;

pub use line_breaker::{LineBreak, LineBreakKind, compute_line_breaks};
pub use wrap::{WrappedLine, collapse_whitespace, display_width, wrap_text};
