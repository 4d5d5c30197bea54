use crate::{AttributeNode, Span};

/// A matched `{...}` tag, spans already shifted to document offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParsedTag {
    pub(crate) opening_marker: Span,
    pub(crate) text: Span,
    pub(crate) closing_marker: Span,
    /// `None` for a bare `{.}` / `{#}` delimiter.
    pub(crate) attributes: Option<Vec<AttributeNode>>,
}

impl ParsedTag {
    pub(crate) fn span(&self) -> Span {
        self.opening_marker.union(self.closing_marker)
    }
}

/// Name, separator and raw value (quotes included) of one attribute, relative
/// to the grammar input.
pub(crate) struct RawAttribute {
    name: Span,
    separator: Option<Span>,
    value: Option<(Span, bool)>,
}

impl RawAttribute {
    /// Splits quotes off the value and the marker off the implicit `.x` / `#x`
    /// shorthand.
    fn into_node(self, input: &str, offset: usize) -> AttributeNode {
        let Self {
            name,
            separator,
            value,
        } = self;

        if separator.is_none()
            && value.is_none()
            && AttributeNode::is_implicit_name_text(name.text(input))
        {
            return AttributeNode {
                name: Span::new(name.start, name.start + 1).shifted(offset),
                separator: None,
                opening_quote: None,
                value: Some(Span::new(name.start + 1, name.end).shifted(offset)),
                closing_quote: None,
            };
        }

        let (opening_quote, value, closing_quote) = match value {
            Some((value, true)) => (
                Some(Span::new(value.start, value.start + 1).shifted(offset)),
                Some(Span::new(value.start + 1, value.end - 1).shifted(offset)),
                Some(Span::new(value.end - 1, value.end).shifted(offset)),
            ),
            Some((value, false)) => (None, Some(value.shifted(offset)), None),
            None => (None, None, None),
        };
        AttributeNode {
            name: name.shifted(offset),
            separator: separator.map(|separator| separator.shifted(offset)),
            opening_quote,
            value,
            closing_quote,
        }
    }
}

pub(crate) enum TagBody {
    Delimiter,
    Attributes(Vec<RawAttribute>),
}

peg::parser! {
    grammar attribute_tag(delimiters: bool) for str {
        /// `{` interior `}`; anything after the closing brace is left alone.
        pub(crate) rule tag() -> (Span, TagBody)
            = "{" !"{" start:position!() body:(delimiter() / attribute_list()) end:position!() "}" [_]* {
                (Span::new(start, end), body)
            }

        rule delimiter() -> TagBody
            = delimiters_enabled() ['#' | '.'] &"}" { TagBody::Delimiter }

        rule delimiters_enabled()
            = {? if delimiters { Ok(()) } else { Err("span delimiters disabled") } }

        rule attribute_list() -> TagBody
            = ws()* first:attribute() rest:(ws()+ attribute:attribute() { attribute })* ws()* {
                let mut attributes = Vec::with_capacity(rest.len() + 1);
                attributes.push(first);
                attributes.extend(rest);
                TagBody::Attributes(attributes)
            }

        rule attribute() -> RawAttribute
            = name:attribute_name()
              assignment:(ws()* s:position!() "=" e:position!() ws()* value:value()? { (Span::new(s, e), value) })? {
                let (separator, value) = assignment.map_or((None, None), |(separator, value)| (Some(separator), value));
                RawAttribute { name, separator, value }
            }

        rule attribute_name() -> Span
            = s:position!() (['#' | '.'] unquoted_char()+ / name_start() name_char()*) e:position!() {
                Span::new(s, e)
            }

        rule value() -> (Span, bool)
            = s:position!() "\"" [^'"']* "\"" e:position!() { (Span::new(s, e), true) }
            / s:position!() "'" [^'\'']* "'" e:position!() { (Span::new(s, e), true) }
            / s:position!() unquoted_char()+ e:position!() { (Span::new(s, e), false) }

        rule name_start() = ['a'..='z' | 'A'..='Z' | '_' | ':']

        rule name_char() = ['a'..='z' | 'A'..='Z' | '0'..='9' | ':' | '.' | '_' | '-']

        rule unquoted_char() = [^'"' | '\'' | '=' | '<' | '>' | '{' | '}' | '`' | '\0'..=' ']

        rule ws() = [' ' | '\t']
    }
}

/// Matches an attribute tag at the start of `input`.
///
/// `offset` is the document offset of `input`. Returns `None` without consuming
/// anything when `input` does not start with a well-formed tag.
pub(crate) fn parse_tag(input: &str, offset: usize, delimiters: bool) -> Option<ParsedTag> {
    let (text, body) = attribute_tag::tag(input, delimiters).ok()?;
    let attributes = match body {
        TagBody::Delimiter => None,
        TagBody::Attributes(raw) => Some(
            raw.into_iter()
                .map(|attribute| attribute.into_node(input, offset))
                .collect(),
        ),
    };
    Some(ParsedTag {
        opening_marker: Span::new(offset, offset + 1),
        text: text.shifted(offset),
        closing_marker: Span::new(offset + text.end, offset + text.end + 1),
        attributes,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    /// `(name, separator, opening quote, value, closing quote)` as text.
    fn parts(input: &str, node: &AttributeNode) -> (String, String, String, String, String) {
        let text = |span: Option<Span>| span.map_or(String::new(), |s| s.text(input).to_string());
        (
            node.name(input).to_string(),
            text(node.separator),
            text(node.opening_quote),
            text(node.value),
            text(node.closing_quote),
        )
    }

    fn attributes(input: &str) -> Vec<(String, String, String, String, String)> {
        parse_tag(input, 0, false)
            .and_then(|tag| tag.attributes)
            .unwrap_or_default()
            .iter()
            .map(|node| parts(input, node))
            .collect()
    }

    fn owned(parts: (&str, &str, &str, &str, &str)) -> (String, String, String, String, String) {
        (
            parts.0.to_string(),
            parts.1.to_string(),
            parts.2.to_string(),
            parts.3.to_string(),
            parts.4.to_string(),
        )
    }

    #[test]
    fn test_implicit_shorthand() {
        assert_eq!(
            attributes("{.warning #intro}"),
            vec![owned((".", "", "", "warning", "")), owned(("#", "", "", "intro", ""))]
        );
    }

    #[test]
    fn test_explicit_forms() {
        assert_eq!(
            attributes("{a=1 b = 'two words' c=\"x\" flag}"),
            vec![
                owned(("a", "=", "", "1", "")),
                owned(("b", "=", "'", "two words", "'")),
                owned(("c", "=", "\"", "x", "\"")),
                owned(("flag", "", "", "", "")),
            ]
        );
    }

    #[test]
    fn test_separator_without_value() {
        assert_eq!(attributes("{name=}"), vec![owned(("name", "=", "", "", ""))]);
    }

    #[test]
    fn test_spans_are_shifted() {
        let input = "text{style=color:red} tail";
        let tag = parse_tag(input.get(4..).unwrap_or_default(), 4, false);
        assert_eq!(tag.as_ref().map(ParsedTag::span), Some(Span::new(4, 21)));
        assert_eq!(tag.as_ref().map(|t| t.text.text(input)), Some("style=color:red"));
        let value = tag
            .and_then(|t| t.attributes)
            .and_then(|a| a.first().copied())
            .map(|a| a.value(input).to_string());
        assert_eq!(value.as_deref(), Some("color:red"));
    }

    #[rstest]
    #[case::empty("{}")]
    #[case::blank("{  }")]
    #[case::double_brace("{{.x}}")]
    #[case::unterminated("{.x")]
    #[case::unterminated_quote("{a=\"x}")]
    #[case::bad_name("{1a}")]
    #[case::bare_marker("{.}")]
    fn test_no_match(#[case] input: &str) {
        assert_eq!(parse_tag(input, 0, false), None);
    }

    #[test]
    fn test_markers_inside_implicit_value() {
        // `.` and `#` are ordinary unquoted characters after the marker.
        assert_eq!(attributes("{.a.b#c}x"), vec![owned((".", "", "", "a.b#c", ""))]);
    }

    #[rstest]
    #[case::class("{.}")]
    #[case::id("{#}")]
    fn test_delimiter(#[case] input: &str) {
        let tag = parse_tag(input, 0, true);
        assert_eq!(tag.as_ref().map(|t| t.attributes.is_none()), Some(true));
        assert_eq!(
            tag.map(|t| t.text.text(input).to_string()),
            input.get(1..2).map(str::to_string)
        );
        assert_eq!(parse_tag(input, 0, false), None);
    }

    #[test]
    fn test_interior_whitespace_is_kept_in_text() {
        let input = "{ .a  #b }";
        let tag = parse_tag(input, 0, false);
        assert_eq!(tag.map(|t| t.text.text(input).to_string()), Some(" .a  #b ".to_string()));
    }
}
