//! Decides which node each attribute tag applies to, once a leaf block's
//! inline content is complete.

use crate::{Error, NodeId, NodeKind, parser::ParserContext};

/// How a child of an inline run takes part in owner assignment.
enum Role {
    Tag,
    Delimiter,
    /// An inline container whose own run is assigned separately.
    Nested,
    Other,
}

fn role(kind: &NodeKind) -> Role {
    match kind {
        NodeKind::Attributes(_) => Role::Tag,
        NodeKind::AttributesDelimiter(_) => Role::Delimiter,
        NodeKind::Highlight(_) | NodeKind::TextSpan => Role::Nested,
        NodeKind::Document
        | NodeKind::Paragraph
        | NodeKind::Heading(_)
        | NodeKind::FencedCode(_)
        | NodeKind::Text
        | NodeKind::SoftBreak
        | NodeKind::Attribute(_)
        | NodeKind::Footnote(_)
        | NodeKind::FootnoteBlock(_) => Role::Other,
    }
}

/// Registers every attribute tag under `block` with its owner, wrapping text
/// into `TextSpan`s where a tag targets only part of a run.
pub(crate) fn assign(context: &mut ParserContext<'_>, block: NodeId) -> Result<(), Error> {
    assign_run(context, block)
}

fn assign_run(context: &mut ParserContext<'_>, container: NodeId) -> Result<(), Error> {
    let mut index = 0;
    let mut delimiter: Option<usize> = None;
    let mut previous_owner: Option<NodeId> = None;

    while let Some(child) = context.arena.children(container).get(index).copied() {
        match role(context.arena.try_get(child)?.kind()) {
            Role::Tag => {
                let (owner, at) = owner_for(context, container, index, delimiter, previous_owner)?;
                index = at;
                if context.attributes.put(owner, child) {
                    tracing::trace!(%owner, tag = %child, "attribute owner assigned");
                }
                previous_owner = Some(owner);
                delimiter = None;
            }
            Role::Delimiter => {
                delimiter = Some(index);
                previous_owner = None;
            }
            Role::Nested => {
                assign_run(context, child)?;
                previous_owner = None;
            }
            Role::Other => previous_owner = None,
        }
        index += 1;
    }
    Ok(())
}

/// The owner of the tag at child `index` of `container`, and the tag's index
/// after any restructuring.
fn owner_for(
    context: &mut ParserContext<'_>,
    container: NodeId,
    index: usize,
    delimiter: Option<usize>,
    previous_owner: Option<NodeId>,
) -> Result<(NodeId, usize), Error> {
    let Some(previous) = index
        .checked_sub(1)
        .and_then(|at| context.arena.children(container).get(at).copied())
    else {
        return Ok((container, index));
    };

    let node = context.arena.try_get(previous)?;
    match node.kind() {
        NodeKind::Attributes(_) => Ok((previous_owner.unwrap_or(container), index)),
        NodeKind::Text => {
            let text = node.span().text(context.source);
            if !context.options.assign_text_attributes || text.ends_with(char::is_whitespace) {
                return Ok((container, index));
            }
            if let Some(delimiter) = delimiter
                && context.options.wrap_non_attribute_text
            {
                let span = context.arena.wrap(container, delimiter + 1..index, NodeKind::TextSpan)?;
                return Ok((span, delimiter + 2));
            }
            wrap_trailing_word(context, container, index)
        }
        NodeKind::Highlight(_) | NodeKind::TextSpan | NodeKind::Footnote(_) => Ok((previous, index)),
        NodeKind::Document
        | NodeKind::Paragraph
        | NodeKind::Heading(_)
        | NodeKind::FencedCode(_)
        | NodeKind::SoftBreak
        | NodeKind::AttributesDelimiter(_)
        | NodeKind::Attribute(_)
        | NodeKind::FootnoteBlock(_) => Ok((container, index)),
    }
}

/// Splits the word right before the tag off its text node and wraps it.
fn wrap_trailing_word(
    context: &mut ParserContext<'_>,
    container: NodeId,
    index: usize,
) -> Result<(NodeId, usize), Error> {
    let text_index = index - 1;
    let Some(text) = context.arena.children(container).get(text_index).copied() else {
        return Err(Error::UnknownNode(container));
    };
    let span = context.arena.try_get(text)?.span();
    let word_start = span
        .text(context.source)
        .char_indices()
        .rev()
        .find(|(_, ch)| ch.is_whitespace())
        .map(|(at, ch)| span.start + at + ch.len_utf8());

    match word_start {
        Some(at) if at > span.start => {
            context.arena.split_text(text, at)?;
            let wrapper = context.arena.wrap(container, index..index + 1, NodeKind::TextSpan)?;
            Ok((wrapper, index + 1))
        }
        Some(_) | None => {
            let wrapper = context.arena.wrap(container, text_index..index, NodeKind::TextSpan)?;
            Ok((wrapper, index))
        }
    }
}
