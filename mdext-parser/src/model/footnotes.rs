use serde::Serialize;

use crate::{NodeId, Span};

/// Reference site of a footnote: `[^id]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Footnote {
    pub opening_marker: Span,
    pub text: Span,
    pub closing_marker: Span,
    /// The definition this reference is bound to, `None` while tentative.
    pub block: Option<NodeId>,
    /// 0-based index among all references bound to the same definition.
    pub reference_ordinal: usize,
}

impl Footnote {
    #[must_use]
    pub fn new(opening_marker: Span, text: Span, closing_marker: Span) -> Self {
        Self {
            opening_marker,
            text,
            closing_marker,
            block: None,
            reference_ordinal: 0,
        }
    }

    /// Unresolved references render as their literal text.
    #[must_use]
    pub fn is_tentative(&self) -> bool {
        self.block.is_none()
    }
}

/// Definition site of a footnote: `[^id]: content`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FootnoteBlock {
    pub opening_marker: Span,
    pub text: Span,
    pub closing_marker: Span,
    /// Normalized repository key.
    pub key: String,
    /// 1-based display number, 0 while unreferenced.
    pub ordinal: usize,
    /// Smallest source offset among bound references.
    pub first_reference_offset: Option<usize>,
    /// Number of references bound so far.
    pub reference_count: usize,
}

impl FootnoteBlock {
    #[must_use]
    pub fn new(opening_marker: Span, text: Span, closing_marker: Span) -> Self {
        Self {
            opening_marker,
            text,
            closing_marker,
            key: String::new(),
            ordinal: 0,
            first_reference_offset: None,
            reference_count: 0,
        }
    }

    #[must_use]
    pub fn is_referenced(&self) -> bool {
        self.first_reference_offset.is_some()
    }
}
