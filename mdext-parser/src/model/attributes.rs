use serde::Serialize;

use crate::Span;

/// One `name[sep][open]value[close]` unit inside an attribute tag.
///
/// All parts are spans into the document source. The implicit shorthand forms
/// `.foo` and `#bar` store the marker (`.` or `#`) as the name and the rest as
/// the value, with no separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AttributeNode {
    pub name: Span,
    pub separator: Option<Span>,
    pub opening_quote: Option<Span>,
    pub value: Option<Span>,
    pub closing_quote: Option<Span>,
}

impl AttributeNode {
    /// Whether `text` is written in the implicit shorthand form (starts with `.`
    /// or `#`).
    #[must_use]
    pub fn is_implicit_name_text(text: &str) -> bool {
        text.starts_with('.') || text.starts_with('#')
    }

    /// Value present, separator absent, name present.
    #[must_use]
    pub fn is_implicit_name(&self) -> bool {
        self.value.is_some() && self.separator.is_none() && !self.name.is_empty()
    }

    #[must_use]
    pub fn name<'a>(&self, source: &'a str) -> &'a str {
        self.name.text(source)
    }

    #[must_use]
    pub fn value<'a>(&self, source: &'a str) -> &'a str {
        self.value.map_or("", |value| value.text(source))
    }

    #[must_use]
    pub fn opening_quote<'a>(&self, source: &'a str) -> &'a str {
        self.opening_quote.map_or("", |quote| quote.text(source))
    }

    #[must_use]
    pub fn is_class(&self, source: &str) -> bool {
        if self.is_implicit_name() {
            self.name(source) == "."
        } else {
            self.name(source) == "class"
        }
    }

    #[must_use]
    pub fn is_id(&self, source: &str) -> bool {
        if self.is_implicit_name() {
            self.name(source) == "#"
        } else {
            self.name(source) == "id"
        }
    }

    /// The span covering the whole attribute, from name to closing quote.
    #[must_use]
    pub fn span(&self) -> Span {
        [
            self.separator,
            self.opening_quote,
            self.value,
            self.closing_quote,
        ]
        .into_iter()
        .flatten()
        .fold(self.name, Span::union)
    }
}

/// An attribute tag: `{` + interior + `}`.
///
/// The same shape is used for [`NodeKind::Attributes`](crate::NodeKind::Attributes),
/// whose children are [`AttributeNode`]s, and for the bare `{.}` / `{#}`
/// [`NodeKind::AttributesDelimiter`](crate::NodeKind::AttributesDelimiter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AttributesNode {
    pub opening_marker: Span,
    pub text: Span,
    pub closing_marker: Span,
}

impl AttributesNode {
    /// Whether the interior starts with a space right after `{`.
    #[must_use]
    pub fn has_leading_space(&self, source: &str) -> bool {
        self.text.text(source).starts_with([' ', '\t'])
    }

    /// Whether the interior ends with a space right before `}`.
    #[must_use]
    pub fn has_trailing_space(&self, source: &str) -> bool {
        self.text.text(source).ends_with([' ', '\t'])
    }
}
