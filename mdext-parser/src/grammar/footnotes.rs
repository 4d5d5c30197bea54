use crate::Span;

/// Marker and id spans of a footnote reference or definition opener, shifted
/// to document offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FootnoteMarkers {
    pub(crate) opening_marker: Span,
    /// The id, trimmed.
    pub(crate) text: Span,
    pub(crate) closing_marker: Span,
}

impl FootnoteMarkers {
    pub(crate) fn span(&self) -> Span {
        self.opening_marker.union(self.closing_marker)
    }
}

peg::parser! {
    grammar footnote_markers() for str {
        /// `[^id]`, id possibly empty.
        pub(crate) rule reference() -> RawMarkers
            = "[^" id:id() close:position!() "]" [_]* { (2, id, close) }

        /// `[^id]:` opening a definition, id not blank.
        pub(crate) rule definition() -> RawMarkers
            = "[^" id:id() close:position!() "]:" [_]* {? if id.0 == id.1 { Err("blank footnote id") } else { Ok((2, id, close)) } }

        /// Trimmed bounds of the text up to the closing bracket.
        rule id() -> (usize, usize)
            = ws()* s:position!() (!(ws()* "]") [^']' | '[' | '\n'])* e:position!() ws()* { (s, e) }

        rule ws() = [' ' | '\t']
    }
}

type RawMarkers = (usize, (usize, usize), usize);

fn markers(offset: usize, (open_end, (start, end), close): RawMarkers, close_len: usize) -> FootnoteMarkers {
    FootnoteMarkers {
        opening_marker: Span::new(offset, offset + open_end),
        text: Span::new(offset + start, offset + end),
        closing_marker: Span::new(offset + close, offset + close + close_len),
    }
}

/// Matches a `[^id]` reference at the start of `input` (document offset
/// `offset`).
pub(crate) fn parse_reference(input: &str, offset: usize) -> Option<FootnoteMarkers> {
    footnote_markers::reference(input)
        .ok()
        .map(|parts| markers(offset, parts, 1))
}

/// Matches a `[^id]:` definition opener at the start of `input`.
pub(crate) fn parse_definition(input: &str, offset: usize) -> Option<FootnoteMarkers> {
    footnote_markers::definition(input)
        .ok()
        .map(|parts| markers(offset, parts, 2))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::plain("[^note] after", Some("note"))]
    #[case::padded("[^  my note ]", Some("my note"))]
    #[case::empty("[^]", Some(""))]
    #[case::not_footnote("[note]", None)]
    #[case::unterminated("[^note", None)]
    #[case::nested("[^a[b]c]", None)]
    fn test_reference(#[case] input: &str, #[case] id: Option<&str>) {
        let parsed = parse_reference(input, 0);
        assert_eq!(parsed.map(|m| m.text.text(input)), id);
    }

    #[test]
    fn test_reference_markers() {
        let input = "see [^1] here";
        let parsed = parse_reference(input.get(4..).unwrap_or_default(), 4);
        assert_eq!(parsed.map(|m| FootnoteMarkers::span(&m)), Some(Span::new(4, 8)));
        assert_eq!(parsed.map(|m| m.opening_marker.text(input)), Some("[^"));
        assert_eq!(parsed.map(|m| m.closing_marker.text(input)), Some("]"));
    }

    #[rstest]
    #[case::plain("[^note]: content", Some("note"))]
    #[case::no_content("[^x]:", Some("x"))]
    #[case::blank_id("[^ ]: content", None)]
    #[case::reference_only("[^note] content", None)]
    fn test_definition(#[case] input: &str, #[case] id: Option<&str>) {
        let parsed = parse_definition(input, 0);
        assert_eq!(parsed.map(|m| m.text.text(input)), id);
        if id.is_some() {
            assert_eq!(parsed.map(|m| m.closing_marker.text(input)), Some("]:"));
        }
    }
}
