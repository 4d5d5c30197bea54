use serde::Serialize;

use crate::Span;

/// ATX heading: `## Title`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Heading {
    pub level: u8,
    pub opening_marker: Span,
    /// The inline content after the marker.
    pub text: Span,
}

/// A fenced code block with its info string and content lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FencedCode {
    pub opening_fence: Span,
    /// The info string, trailing attribute tag excluded when info-string
    /// attributes are enabled.
    pub info: Span,
    pub closing_fence: Option<Span>,
    /// Content lines, indentation stripped, newline excluded.
    pub lines: Vec<Span>,
}

impl FencedCode {
    /// The first word of the info string.
    #[must_use]
    pub fn language<'a>(&self, source: &'a str) -> Option<&'a str> {
        self.info.text(source).split_whitespace().next()
    }
}
