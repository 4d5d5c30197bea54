//! Re-serialization of `{...}` attribute tags.
//!
//! Tags are rebuilt from their attribute nodes, so rewritten values (merge
//! uniquification, combined classes) show up in the output. With default
//! options every tag comes out exactly as it was written.

use std::borrow::Cow;

use mdext_parser::{AttributeNode, AttributesNode, Document, NodeId, NodeKind, NodeRef, Span};

use crate::{
    AttributeImplicitName, AttributeValueQuotes, DiscretionaryText, FormatOptions,
    options::needs_quotes,
};

/// One attribute detached from the source so its value can be rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Attr<'s> {
    /// `.` / `#` for the shorthand forms.
    name: &'s str,
    /// Whitespace before and after `=`, when there is a separator.
    separator: Option<(&'s str, &'s str)>,
    quote: &'s str,
    value: Cow<'s, str>,
    implicit: bool,
    /// The attribute as written.
    written: &'s str,
}

impl<'s> Attr<'s> {
    pub(crate) fn new(source: &'s str, node: &AttributeNode) -> Self {
        let separator = node.separator.map(|separator| {
            let value_start = node
                .opening_quote
                .or(node.value)
                .map_or(separator.end, |span| span.start);
            (
                Span::new(node.name.end, separator.start).text(source),
                Span::new(separator.end, value_start).text(source),
            )
        });
        Self {
            name: node.name(source),
            separator,
            quote: node.opening_quote(source),
            value: Cow::Borrowed(node.value(source)),
            implicit: node.is_implicit_name(),
            written: node.span().text(source),
        }
    }

    pub(crate) fn is_id(&self) -> bool {
        if self.implicit {
            self.name == "#"
        } else {
            self.name == "id"
        }
    }

    pub(crate) fn is_class(&self) -> bool {
        if self.implicit {
            self.name == "."
        } else {
            self.name == "class"
        }
    }

    pub(crate) fn value(&self) -> &str {
        &self.value
    }

    pub(crate) fn written(&self) -> &'s str {
        self.written
    }

    pub(crate) fn set_value(&mut self, value: String) {
        self.value = Cow::Owned(value);
    }

    /// Key under which the combine reducer merges attributes.
    fn combine_key(&self) -> &str {
        if self.is_id() {
            "id"
        } else if self.is_class() {
            "class"
        } else {
            self.name
        }
    }

    /// Sort rank: id, class, everything else.
    fn rank(&self) -> u8 {
        if self.is_id() {
            0
        } else if self.is_class() {
            1
        } else {
            2
        }
    }

    pub(crate) fn write(&self, options: &FormatOptions, out: &mut String) {
        let quotes = options.attribute_value_quotes();
        let value = self.value();
        let mut name = self.name;
        let mut separator = self.separator;
        let mut quote = if self.implicit {
            ""
        } else {
            quotes.quotes_for(value, self.quote)
        };
        let need_quote = AttributeValueQuotes::NoQuotesDoublePreferred.quotes_for(value, "");

        if self.is_id() || self.is_class() {
            let preferred = if !need_quote.is_empty() {
                AttributeImplicitName::ExplicitPreferred
            } else if self.is_id() {
                options.attribute_id()
            } else {
                options.attribute_class()
            };
            match preferred {
                AttributeImplicitName::AsIs => {}
                AttributeImplicitName::ImplicitPreferred => {
                    if !self.implicit && !value.is_empty() {
                        name = if self.is_id() { "#" } else { "." };
                        separator = None;
                        quote = "";
                    }
                }
                AttributeImplicitName::ExplicitPreferred => {
                    if self.implicit {
                        name = if self.is_id() { "id" } else { "class" };
                        separator = Some(("", ""));
                        if quote.is_empty() {
                            quote = quotes.quotes_for(value, self.quote);
                            if quote.is_empty() {
                                quote = need_quote;
                            }
                        }
                    }
                }
            }
        }
        // An unquoted value must still read back as one value.
        if quote.is_empty() && !self.implicit && needs_quotes(value) {
            quote = need_quote;
        }

        out.push_str(name);
        if let Some((before, after)) = separator {
            match options.attribute_equal_space() {
                DiscretionaryText::AsIs => {
                    out.push_str(before);
                    out.push('=');
                    out.push_str(after);
                }
                DiscretionaryText::Add => out.push_str(" = "),
                DiscretionaryText::Remove => out.push('='),
            }
        }
        if quote.is_empty() {
            out.push_str(value);
        } else {
            let entity = if quote == "'" { "&apos;" } else { "&quot;" };
            out.push_str(quote);
            out.push_str(&value.replace(quote, entity));
            out.push_str(quote);
        }
    }
}

/// The attributes of one tag, in order.
pub(crate) fn tag_attributes(node: NodeRef<'_>) -> Vec<(NodeId, AttributeNode)> {
    node.children()
        .filter_map(|child| child.kind().as_attribute().map(|attr| (child.id(), *attr)))
        .collect()
}

/// Folds `attr` into `attrs`: ids and other names replace the earlier value,
/// `class` values join with a space and `style` values with `;`. A merged
/// attribute keeps the place and spelling of its first occurrence.
pub(crate) fn combine<'s>(attrs: &mut Vec<Attr<'s>>, attr: Attr<'s>) {
    let Some(existing) = attrs
        .iter_mut()
        .find(|existing| existing.combine_key() == attr.combine_key())
    else {
        attrs.push(attr);
        return;
    };
    let separator = if attr.is_class() {
        Some(' ')
    } else if attr.name == "style" && !attr.implicit {
        Some(';')
    } else {
        None
    };
    match separator {
        Some(separator) if existing.value() != attr.value() => {
            let merged = if existing.value().is_empty() {
                attr.value().to_string()
            } else {
                format!("{}{separator}{}", existing.value(), attr.value())
            };
            existing.set_value(merged);
        }
        Some(_) => {}
        None => *existing = attr,
    }
}

/// Id first, then class, then by name; stable otherwise.
pub(crate) fn sort(attrs: &mut [Attr<'_>]) {
    attrs.sort_by(|a, b| {
        a.rank().cmp(&b.rank()).then_with(|| {
            if a.rank() == 2 && b.rank() == 2 {
                a.name.cmp(b.name)
            } else {
                std::cmp::Ordering::Equal
            }
        })
    });
}

/// Whitespace between consecutive attributes of a tag, as written.
fn gaps<'s>(source: &'s str, attributes: &[(NodeId, AttributeNode)]) -> Vec<&'s str> {
    attributes
        .windows(2)
        .filter_map(|pair| match pair {
            [(_, previous), (_, next)] => {
                Some(Span::new(previous.span().end, next.span().start).text(source))
            }
            _ => None,
        })
        .collect()
}

/// A tag ready to be written: its frame plus already serialized attributes.
pub(crate) struct TagText<'s> {
    pub(crate) opening_space: &'s str,
    pub(crate) closing_space: &'s str,
    /// Whitespace between attributes; `None` joins them with one space.
    pub(crate) gaps: Option<Vec<&'s str>>,
}

impl<'s> TagText<'s> {
    pub(crate) fn new(
        source: &'s str,
        tag: &AttributesNode,
        attributes: &[(NodeId, AttributeNode)],
        spaces: DiscretionaryText,
        keep_gaps: bool,
    ) -> Self {
        let first = attributes
            .first()
            .map_or(tag.text.end, |(_, attr)| attr.span().start);
        let last = attributes
            .last()
            .map_or(tag.text.end, |(_, attr)| attr.span().end);
        let (opening_space, closing_space) = match spaces {
            DiscretionaryText::AsIs => (
                Span::new(tag.text.start, first).text(source),
                Span::new(last, tag.text.end).text(source),
            ),
            DiscretionaryText::Add => (" ", " "),
            DiscretionaryText::Remove => ("", ""),
        };
        Self {
            opening_space,
            closing_space,
            gaps: keep_gaps.then(|| gaps(source, attributes)),
        }
    }

    /// `{` + attributes + `}`; `parts` are the serialized attributes.
    pub(crate) fn assemble(&self, parts: &[String]) -> String {
        let mut out = String::from("{");
        out.push_str(self.opening_space);
        for (index, part) in parts.iter().enumerate() {
            if let Some(previous) = index.checked_sub(1) {
                let gap = self
                    .gaps
                    .as_ref()
                    .and_then(|gaps| gaps.get(previous).copied())
                    .unwrap_or(" ");
                out.push_str(gap);
            }
            out.push_str(part);
        }
        out.push_str(self.closing_space);
        out.push('}');
        out
    }
}

/// Whether a space must be written between `previous` and the tag `node`.
pub(crate) fn space_before(node: NodeRef<'_>) -> bool {
    node.previous().is_some_and(|previous| {
        !previous.span().is_continued_by(node.span())
            && !previous.text().ends_with(' ')
            && !node.text().starts_with(' ')
    })
}

/// Whether a space must be written between the tag `node` and what follows.
pub(crate) fn space_after(node: NodeRef<'_>) -> bool {
    node.next().is_some_and(|next| {
        !matches!(next.kind(), NodeKind::Attributes(_))
            && !node.span().is_continued_by(next.span())
            && !node.text().ends_with(' ')
            && !next.text().starts_with(' ')
    })
}

/// All tags registered against the owner of `tag`, `tag` itself when it has
/// no registered owner.
pub(crate) fn owner_tags(document: &Document, tag: NodeId) -> Vec<NodeId> {
    let repository = document.attributes();
    match repository.owner_of(tag) {
        Some(owner) => repository.get(owner).to_vec(),
        None => vec![tag],
    }
}

#[cfg(test)]
mod tests {
    use mdext_parser::{Error, Options, parse};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    /// Serialize every attribute of the first tag of `input`.
    fn formatted(input: &str, options: &FormatOptions) -> Result<Vec<String>, Error> {
        let document = parse(input, &Options::default())?;
        let source = document.source();
        let tag = document
            .descendants()
            .find(|node| node.kind().as_attributes().is_some())
            .ok_or(Error::UnknownNode(document.root().id()))?;
        Ok(tag_attributes(tag)
            .iter()
            .map(|(_, node)| {
                let mut out = String::new();
                Attr::new(source, node).write(options, &mut out);
                out
            })
            .collect())
    }

    #[rstest]
    #[case::as_is("p {a = 1 b='x y' .c #d}", FormatOptions::default(), &["a = 1", "b='x y'", ".c", "#d"])]
    #[case::equal_space_add(
        "p {a=1}",
        FormatOptions::builder().attribute_equal_space(DiscretionaryText::Add).build(),
        &["a = 1"]
    )]
    #[case::equal_space_remove(
        "p {a = 1}",
        FormatOptions::builder().attribute_equal_space(DiscretionaryText::Remove).build(),
        &["a=1"]
    )]
    #[case::explicit_ids(
        "p {#x .y}",
        FormatOptions::builder()
            .attribute_id(AttributeImplicitName::ExplicitPreferred)
            .attribute_class(AttributeImplicitName::ExplicitPreferred)
            .attribute_value_quotes(AttributeValueQuotes::DoubleQuotes)
            .build(),
        &["id=\"x\"", "class=\"y\""]
    )]
    #[case::explicit_without_quotes(
        "p {#x}",
        FormatOptions::builder().attribute_id(AttributeImplicitName::ExplicitPreferred).build(),
        &["id=x"]
    )]
    #[case::implicit_ids(
        "p {id='x' class=y}",
        FormatOptions::builder()
            .attribute_id(AttributeImplicitName::ImplicitPreferred)
            .attribute_class(AttributeImplicitName::ImplicitPreferred)
            .build(),
        &["#x", ".y"]
    )]
    #[case::spaced_class_stays_explicit(
        "p {class='a b'}",
        FormatOptions::builder().attribute_class(AttributeImplicitName::ImplicitPreferred).build(),
        &["class='a b'"]
    )]
    #[case::unquote_when_safe(
        "p {a='1' b=\"two words\"}",
        FormatOptions::builder().attribute_value_quotes(AttributeValueQuotes::NoQuotesSinglePreferred).build(),
        &["a=1", "b='two words'"]
    )]
    #[case::escape_forced_quote(
        "p {title='say \"hi\"'}",
        FormatOptions::builder().attribute_value_quotes(AttributeValueQuotes::DoubleQuotes).build(),
        &["title=\"say &quot;hi&quot;\""]
    )]
    fn test_write_attribute(
        #[case] input: &str,
        #[case] options: FormatOptions,
        #[case] expected: &[&str],
    ) -> Result<(), Error> {
        assert_eq!(formatted(input, &options)?, expected);
        Ok(())
    }

    fn attrs<'s>(source: &'s str, document: &'s mdext_parser::Document) -> Vec<Attr<'s>> {
        document
            .descendants()
            .filter_map(|node| node.kind().as_attribute().copied())
            .map(|node| Attr::new(source, &node))
            .collect()
    }

    fn combined(input: &str, sorted: bool) -> Result<String, Error> {
        let document = parse(input, &Options::default())?;
        let source = document.source();
        let mut result = Vec::new();
        for attr in attrs(source, &document) {
            combine(&mut result, attr);
        }
        if sorted {
            sort(&mut result);
        }
        let options = FormatOptions::default();
        Ok(result
            .iter()
            .map(|attr| {
                let mut out = String::new();
                attr.write(&options, &mut out);
                out
            })
            .collect::<Vec<_>>()
            .join(" "))
    }

    #[rstest]
    #[case::last_id_wins("p {id=a}{id=b}", false, "id=b")]
    #[case::shorthand_id_replaces("p {#a}{id=b}", false, "id=b")]
    #[case::classes_join("p {.x}{.y}", false, "class=\"x y\"")]
    #[case::same_class_once("p {.x}{.x}", false, ".x")]
    #[case::style_joins("p {style=color:red}{style=margin:0}", false, "style=color:red;margin:0")]
    #[case::other_last_wins("p {a=1 b=2}{a=3}", false, "a=3 b=2")]
    #[case::sorted("p {z=1 .c a=2 #i}", true, "#i .c a=2 z=1")]
    fn test_combine(
        #[case] input: &str,
        #[case] sorted: bool,
        #[case] expected: &str,
    ) -> Result<(), Error> {
        assert_eq!(combined(input, sorted)?, expected);
        Ok(())
    }

    #[test]
    fn test_tag_text_keeps_whitespace() -> Result<(), Error> {
        let input = "p {  a=1   .b }";
        let document = parse(input, &Options::default())?;
        let source = document.source();
        let node = document
            .descendants()
            .find(|node| node.kind().as_attributes().is_some())
            .ok_or(Error::UnknownNode(document.root().id()))?;
        let Some(tag) = node.kind().as_attributes() else {
            return Err(Error::UnknownNode(node.id()));
        };
        let attributes = tag_attributes(node);
        let parts = vec!["a=1".to_string(), ".b".to_string()];
        let as_is = TagText::new(source, tag, &attributes, DiscretionaryText::AsIs, true);
        assert_eq!(as_is.assemble(&parts), "{  a=1   .b }");
        let removed = TagText::new(source, tag, &attributes, DiscretionaryText::Remove, false);
        assert_eq!(removed.assemble(&parts), "{a=1 .b}");
        let added = TagText::new(source, tag, &attributes, DiscretionaryText::Add, false);
        assert_eq!(added.assemble(&parts), "{ a=1 .b }");
        Ok(())
    }
}
