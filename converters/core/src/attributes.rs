//! Lookups over the attribute tags registered against an owner node.

use mdext_parser::{AttributeNode, Document, NodeId, NodeKind, NodeRef};

/// Every attribute unit applied to `owner`, in tag registration order and
/// source order within a tag.
pub fn applied(document: &Document, owner: NodeId) -> impl Iterator<Item = (NodeRef<'_>, AttributeNode)> {
    document
        .attributes()
        .get(owner)
        .iter()
        .filter_map(|tag| document.node(*tag))
        .flat_map(NodeRef::children)
        .filter_map(|child| match child.kind() {
            NodeKind::Attribute(attribute) => Some((child, *attribute)),
            NodeKind::Document
            | NodeKind::Paragraph
            | NodeKind::Heading(_)
            | NodeKind::FencedCode(_)
            | NodeKind::Text
            | NodeKind::SoftBreak
            | NodeKind::Highlight(_)
            | NodeKind::TextSpan
            | NodeKind::Attributes(_)
            | NodeKind::AttributesDelimiter(_)
            | NodeKind::Footnote(_)
            | NodeKind::FootnoteBlock(_) => None,
        })
}

/// The last id attribute (`#id` or `id=...`) applied to `owner`.
#[must_use]
pub fn explicit_id(document: &Document, owner: NodeId) -> Option<&str> {
    let source = document.source();
    applied(document, owner)
        .filter(|(_, attribute)| attribute.is_id(source))
        .map(|(_, attribute)| attribute.value(source))
        .filter(|value| !value.is_empty())
        .last()
}

/// Whether any tag applied to `owner` carries an id attribute.
#[must_use]
pub fn has_id_attribute(document: &Document, owner: NodeId) -> bool {
    let source = document.source();
    applied(document, owner).any(|(_, attribute)| attribute.is_id(source))
}

/// Concatenated text of the `Text` descendants of `node`, attribute tags
/// excluded.
#[must_use]
pub fn plain_text(node: NodeRef<'_>) -> String {
    node.descendants()
        .filter(|child| matches!(child.kind(), NodeKind::Text | NodeKind::SoftBreak))
        .map(|child| match child.kind() {
            NodeKind::SoftBreak => " ",
            NodeKind::Text
            | NodeKind::Document
            | NodeKind::Paragraph
            | NodeKind::Heading(_)
            | NodeKind::FencedCode(_)
            | NodeKind::Highlight(_)
            | NodeKind::TextSpan
            | NodeKind::Attributes(_)
            | NodeKind::AttributesDelimiter(_)
            | NodeKind::Attribute(_)
            | NodeKind::Footnote(_)
            | NodeKind::FootnoteBlock(_) => child.text(),
        })
        .collect::<String>()
        .trim()
        .to_string()
}
