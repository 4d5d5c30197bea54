use crate::{
    Error, Highlight, NodeKind, Span,
    parser::{InlineParser, InlineParserExtension},
};

const MARKER: &str = "==";

/// Recognizes `==text==`; both runs must be exactly two `=`.
pub(crate) struct HighlightInlineParserExtension;

impl InlineParserExtension for HighlightInlineParserExtension {
    fn characters(&self) -> &'static str {
        "="
    }

    fn parse(&self, parser: &mut InlineParser<'_, '_>) -> Result<bool, Error> {
        if parser.previous_char() == Some('=') {
            return Ok(false);
        }
        let Some(content) = parser.rest().strip_prefix(MARKER) else {
            return Ok(false);
        };
        if content.is_empty() || content.starts_with(|ch: char| ch == '=' || ch.is_whitespace()) {
            return Ok(false);
        }
        let Some(close) = find_closer(content) else {
            return Ok(false);
        };

        let start = parser.index();
        let opening_marker = Span::new(start, start + MARKER.len());
        let text = Span::new(opening_marker.end, opening_marker.end + close);
        let closing_marker = Span::new(text.end, text.end + MARKER.len());
        parser.flush_text()?;
        let id = parser.append(
            NodeKind::Highlight(Highlight {
                opening_marker,
                text,
                closing_marker,
            }),
            opening_marker.union(closing_marker),
        )?;
        parser.parse_nested(id, text)?;
        parser.advance_to(closing_marker.end);
        Ok(true)
    }
}

/// Byte offset of the closing run in `content`: exactly two `=` right after a
/// character that is neither whitespace nor `=`.
fn find_closer(content: &str) -> Option<usize> {
    let mut previous: Option<char> = None;
    for (at, ch) in content.char_indices() {
        if ch == '='
            && previous.is_some_and(|p| p != '=' && !p.is_whitespace())
            && content.get(at..).is_some_and(|rest| rest.starts_with(MARKER))
            && !content
                .get(at + MARKER.len()..)
                .is_some_and(|after| after.starts_with('='))
        {
            return Some(at);
        }
        previous = Some(ch);
    }
    None
}
