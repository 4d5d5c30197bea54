use crate::{
    Arena, AttributesNode, Error, NodeId, NodeKind,
    grammar::{ParsedTag, parse_tag},
    parser::{InlineParser, InlineParserExtension},
};

/// Recognizes `{...}` attribute tags.
pub(crate) struct AttributesInlineParserExtension;

impl InlineParserExtension for AttributesInlineParserExtension {
    fn characters(&self) -> &'static str {
        "{"
    }

    fn parse(&self, parser: &mut InlineParser<'_, '_>) -> Result<bool, Error> {
        // Neither brace of `{{` opens a tag.
        if parser.previous_char() == Some('{') {
            return Ok(false);
        }
        let delimiters = parser.options().use_empty_implicit_as_span_delimiter;
        let Some(tag) = parse_tag(parser.rest(), parser.index(), delimiters) else {
            return Ok(false);
        };
        let end = tag.span().end;
        parser.flush_text()?;
        let parent = parser.block();
        append_tag(parser.context().arena, parent, tag)?;
        parser.advance_to(end);
        Ok(true)
    }
}

/// Appends the tag node and, for a real tag, its `Attribute` children.
pub(crate) fn append_tag(arena: &mut Arena, parent: NodeId, tag: ParsedTag) -> Result<NodeId, Error> {
    let span = tag.span();
    let node = AttributesNode {
        opening_marker: tag.opening_marker,
        text: tag.text,
        closing_marker: tag.closing_marker,
    };
    let Some(attributes) = tag.attributes else {
        return arena.append(parent, NodeKind::AttributesDelimiter(node), span);
    };
    let id = arena.append(parent, NodeKind::Attributes(node), span)?;
    for attribute in attributes {
        arena.append(id, NodeKind::Attribute(attribute), attribute.span())?;
    }
    Ok(id)
}
