use serde::Serialize;

use crate::Span;

/// `==highlighted text==`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Highlight {
    pub opening_marker: Span,
    pub text: Span,
    pub closing_marker: Span,
}
