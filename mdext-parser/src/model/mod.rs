//! The document tree.
//!
//! Nodes live in an [`Arena`] and refer to each other through [`NodeId`]s, so
//! back-references (a footnote to its definition, an attribute tag to its owner)
//! never form ownership cycles. Repositories hold the cross-references; nodes
//! hold only ids.

use std::fmt;

use serde::{Serialize, ser::SerializeMap};

use crate::{
    Error, FootnoteRepository, NodeAttributeRepository, Options, grammar::LineMap,
};

mod attributes;
mod blocks;
mod footnotes;
mod inlines;
mod location;

pub use attributes::{AttributeNode, AttributesNode};
pub use blocks::{FencedCode, Heading};
pub use footnotes::{Footnote, FootnoteBlock};
pub use inlines::Highlight;
pub use location::{Location, Position, Span};

/// Stable identifier of a node inside its document's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(usize);

impl NodeId {
    pub(crate) const ROOT: NodeId = NodeId(0);

    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Every kind of node the tree can hold.
///
/// `Attributes`, `AttributesDelimiter`, `Attribute`, `Footnote` and
/// `FootnoteBlock` belong to the extensions; the rest are the host nodes they
/// attach to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    Document,
    Paragraph,
    Heading(Heading),
    FencedCode(FencedCode),
    Text,
    SoftBreak,
    Highlight(Highlight),
    /// Inline run wrapped so that an attribute tag can own it.
    TextSpan,
    Attributes(AttributesNode),
    AttributesDelimiter(AttributesNode),
    Attribute(AttributeNode),
    Footnote(Footnote),
    FootnoteBlock(FootnoteBlock),
}

impl NodeKind {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Document => "document",
            NodeKind::Paragraph => "paragraph",
            NodeKind::Heading(_) => "heading",
            NodeKind::FencedCode(_) => "fenced_code",
            NodeKind::Text => "text",
            NodeKind::SoftBreak => "soft_break",
            NodeKind::Highlight(_) => "highlight",
            NodeKind::TextSpan => "text_span",
            NodeKind::Attributes(_) => "attributes",
            NodeKind::AttributesDelimiter(_) => "attributes_delimiter",
            NodeKind::Attribute(_) => "attribute",
            NodeKind::Footnote(_) => "footnote",
            NodeKind::FootnoteBlock(_) => "footnote_block",
        }
    }

    #[must_use]
    pub fn is_block(&self) -> bool {
        matches!(
            self,
            NodeKind::Document
                | NodeKind::Paragraph
                | NodeKind::Heading(_)
                | NodeKind::FencedCode(_)
                | NodeKind::FootnoteBlock(_)
        )
    }

    /// Nodes whose literal text never reaches HTML output.
    #[must_use]
    pub fn is_non_rendering(&self) -> bool {
        matches!(
            self,
            NodeKind::Attributes(_) | NodeKind::AttributesDelimiter(_) | NodeKind::Attribute(_)
        )
    }

    /// Nodes framed by an opening and a closing marker.
    #[must_use]
    pub fn is_delimited(&self) -> bool {
        matches!(
            self,
            NodeKind::Attributes(_)
                | NodeKind::AttributesDelimiter(_)
                | NodeKind::Footnote(_)
                | NodeKind::FootnoteBlock(_)
                | NodeKind::Highlight(_)
        )
    }

    #[must_use]
    pub fn as_attributes(&self) -> Option<&AttributesNode> {
        if let NodeKind::Attributes(node) = self {
            Some(node)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_attribute(&self) -> Option<&AttributeNode> {
        if let NodeKind::Attribute(node) = self {
            Some(node)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_footnote(&self) -> Option<&Footnote> {
        if let NodeKind::Footnote(node) = self {
            Some(node)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_footnote_block(&self) -> Option<&FootnoteBlock> {
        if let NodeKind::FootnoteBlock(node) = self {
            Some(node)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_heading(&self) -> Option<&Heading> {
        if let NodeKind::Heading(node) = self {
            Some(node)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) span: Span,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    fn new(kind: NodeKind, span: Span) -> Self {
        Self {
            kind,
            span,
            parent: None,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut NodeKind {
        &mut self.kind
    }

    #[must_use]
    pub fn span(&self) -> Span {
        self.span
    }

    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Node storage. The root document node always exists, so the arena is never
/// empty.
#[derive(Debug, Clone)]
pub struct Arena {
    root: Node,
    nodes: Vec<Node>,
}

impl Arena {
    fn new(span: Span) -> Self {
        Self {
            root: Node::new(NodeKind::Document, span),
            nodes: Vec::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len() + 1
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        match id.0.checked_sub(1) {
            None => Some(&self.root),
            Some(index) => self.nodes.get(index),
        }
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        match id.0.checked_sub(1) {
            None => Some(&mut self.root),
            Some(index) => self.nodes.get_mut(index),
        }
    }

    pub(crate) fn try_get(&self, id: NodeId) -> Result<&Node, Error> {
        self.get(id).ok_or(Error::UnknownNode(id))
    }

    pub(crate) fn try_get_mut(&mut self, id: NodeId) -> Result<&mut Node, Error> {
        self.get_mut(id).ok_or(Error::UnknownNode(id))
    }

    pub(crate) fn alloc(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let id = NodeId(self.nodes.len() + 1);
        self.nodes.push(Node::new(kind, span));
        id
    }

    pub(crate) fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), Error> {
        self.try_get_mut(child)?.parent = Some(parent);
        self.try_get_mut(parent)?.children.push(child);
        Ok(())
    }

    /// Allocates a node and appends it as the last child of `parent`.
    pub(crate) fn append(
        &mut self,
        parent: NodeId,
        kind: NodeKind,
        span: Span,
    ) -> Result<NodeId, Error> {
        let id = self.alloc(kind, span);
        self.append_child(parent, id)?;
        Ok(id)
    }

    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |node| node.children.as_slice())
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|node| node.parent)
    }

    fn position_in_parent(&self, id: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.parent(id)?;
        let index = self.children(parent).iter().position(|child| *child == id)?;
        Some((parent, index))
    }

    #[must_use]
    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (parent, index) = self.position_in_parent(id)?;
        let previous = index.checked_sub(1)?;
        self.children(parent).get(previous).copied()
    }

    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (parent, index) = self.position_in_parent(id)?;
        self.children(parent).get(index + 1).copied()
    }

    /// All nodes below `id` in document (pre-)order.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            result.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        result
    }

    /// Splits a text node at byte offset `at`, returning the new node holding
    /// the tail. The tail is inserted right after the original node.
    pub(crate) fn split_text(&mut self, id: NodeId, at: usize) -> Result<NodeId, Error> {
        let node = self.try_get(id)?;
        let span = node.span;
        let (parent, index) = self.position_in_parent(id).ok_or(Error::UnknownNode(id))?;
        if !(span.start < at && at < span.end) || !matches!(node.kind, NodeKind::Text) {
            return Ok(id);
        }
        self.try_get_mut(id)?.span.end = at;
        let tail = self.alloc(NodeKind::Text, Span::new(at, span.end));
        self.try_get_mut(tail)?.parent = Some(parent);
        self.try_get_mut(parent)?.children.insert(index + 1, tail);
        Ok(tail)
    }

    /// Moves the children of `parent` in `range` (child indices) under a new
    /// node of `kind`, which takes their place.
    pub(crate) fn wrap(
        &mut self,
        parent: NodeId,
        range: std::ops::Range<usize>,
        kind: NodeKind,
    ) -> Result<NodeId, Error> {
        let start = range.start;
        let moved: Vec<NodeId> = {
            let parent_node = self.try_get_mut(parent)?;
            if range.end > parent_node.children.len() || range.is_empty() {
                return Err(Error::UnknownNode(parent));
            }
            parent_node.children.drain(range).collect()
        };
        let mut span: Option<Span> = None;
        for child in &moved {
            let child_span = self.try_get(*child)?.span;
            span = Some(span.map_or(child_span, |s| s.union(child_span)));
        }
        let wrapper = self.alloc(kind, span.unwrap_or_default());
        for child in &moved {
            self.try_get_mut(*child)?.parent = Some(wrapper);
        }
        let wrapper_node = self.try_get_mut(wrapper)?;
        wrapper_node.children = moved;
        wrapper_node.parent = Some(parent);
        self.try_get_mut(parent)?.children.insert(start, wrapper);
        Ok(wrapper)
    }

    pub(crate) fn footnote_mut(&mut self, id: NodeId) -> Option<&mut Footnote> {
        if let NodeKind::Footnote(footnote) = &mut self.get_mut(id)?.kind {
            Some(footnote)
        } else {
            None
        }
    }

    pub(crate) fn footnote_block(&self, id: NodeId) -> Option<&FootnoteBlock> {
        self.get(id)?.kind.as_footnote_block()
    }

    pub(crate) fn footnote_block_mut(&mut self, id: NodeId) -> Option<&mut FootnoteBlock> {
        if let NodeKind::FootnoteBlock(block) = &mut self.get_mut(id)?.kind {
            Some(block)
        } else {
            None
        }
    }
}

/// A parsed document: source text, node arena, and the per-document
/// repositories.
///
/// Each document owns independent repositories; processing several documents
/// concurrently only requires one `Document` per task.
#[derive(Debug, Clone)]
pub struct Document {
    source: String,
    pub(crate) arena: Arena,
    pub(crate) attributes: NodeAttributeRepository,
    pub(crate) footnotes: FootnoteRepository,
    options: Options,
    line_map: LineMap,
}

impl Document {
    pub(crate) fn new(source: String, options: Options) -> Self {
        Self {
            arena: Arena::new(Span::new(0, source.len())),
            attributes: NodeAttributeRepository::new(options.attributes_keep),
            footnotes: FootnoteRepository::new(options.footnotes_keep, options.footnote_key_case),
            line_map: LineMap::new(&source),
            source,
            options,
        }
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    #[must_use]
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    #[must_use]
    pub fn attributes(&self) -> &NodeAttributeRepository {
        &self.attributes
    }

    #[must_use]
    pub fn footnotes(&self) -> &FootnoteRepository {
        &self.footnotes
    }

    #[must_use]
    pub fn root(&self) -> NodeRef<'_> {
        NodeRef {
            document: self,
            id: NodeId::ROOT,
            node: &self.arena.root,
        }
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_>> {
        self.arena.get(id).map(|node| NodeRef {
            document: self,
            id,
            node,
        })
    }

    /// Like [`Document::node`], for callers holding an id that must exist.
    ///
    /// # Errors
    /// Returns [`Error::UnknownNode`] if `id` does not belong to this document.
    pub fn try_node(&self, id: NodeId) -> Result<NodeRef<'_>, Error> {
        self.node(id).ok_or(Error::UnknownNode(id))
    }

    /// Mutable access to a node, for hosts that rewrite the tree after parsing.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.arena.get_mut(id)
    }

    /// Every node in document order, root excluded.
    pub fn descendants(&self) -> impl Iterator<Item = NodeRef<'_>> {
        self.arena
            .descendants(NodeId::ROOT)
            .into_iter()
            .filter_map(|id| self.node(id))
    }

    #[must_use]
    pub fn text(&self, span: Span) -> &str {
        span.text(&self.source)
    }

    #[must_use]
    pub fn location(&self, span: Span) -> Location {
        self.line_map.location(span, &self.source)
    }

    /// Re-walks the tree binding every tentative footnote whose definition is now
    /// known, and re-resolves ordinals if anything new was bound.
    ///
    /// Running it again with nothing new to bind changes nothing.
    ///
    /// # Errors
    /// Returns an error if the tree links are broken.
    pub fn resolve_footnotes(&mut self) -> Result<bool, Error> {
        let Self {
            source,
            arena,
            footnotes,
            ..
        } = self;
        footnotes.resolve_footnotes(source, arena)
    }

    pub(crate) fn parts_mut(
        &mut self,
    ) -> (
        &str,
        &mut Arena,
        &mut NodeAttributeRepository,
        &mut FootnoteRepository,
    ) {
        (
            &self.source,
            &mut self.arena,
            &mut self.attributes,
            &mut self.footnotes,
        )
    }
}

/// A borrowed view of one node together with its document.
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    document: &'a Document,
    id: NodeId,
    node: &'a Node,
}

impl<'a> NodeRef<'a> {
    #[must_use]
    pub fn id(self) -> NodeId {
        self.id
    }

    #[must_use]
    pub fn kind(self) -> &'a NodeKind {
        &self.node.kind
    }

    #[must_use]
    pub fn span(self) -> Span {
        self.node.span
    }

    /// The source text covered by this node.
    #[must_use]
    pub fn text(self) -> &'a str {
        self.node.span.text(&self.document.source)
    }

    #[must_use]
    pub fn slice(self, span: Span) -> &'a str {
        span.text(&self.document.source)
    }

    #[must_use]
    pub fn document(self) -> &'a Document {
        self.document
    }

    #[must_use]
    pub fn parent(self) -> Option<NodeRef<'a>> {
        self.node.parent.and_then(|id| self.document.node(id))
    }

    pub fn children(self) -> impl DoubleEndedIterator<Item = NodeRef<'a>> + 'a {
        let document = self.document;
        self.node
            .children
            .iter()
            .filter_map(move |id| document.node(*id))
    }

    #[must_use]
    pub fn has_children(self) -> bool {
        !self.node.children.is_empty()
    }

    #[must_use]
    pub fn first_child(self) -> Option<NodeRef<'a>> {
        self.children().next()
    }

    #[must_use]
    pub fn previous(self) -> Option<NodeRef<'a>> {
        self.document
            .arena
            .previous_sibling(self.id)
            .and_then(|id| self.document.node(id))
    }

    #[must_use]
    pub fn next(self) -> Option<NodeRef<'a>> {
        self.document
            .arena
            .next_sibling(self.id)
            .and_then(|id| self.document.node(id))
    }

    pub fn descendants(self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let document = self.document;
        document
            .arena
            .descendants(self.id)
            .into_iter()
            .filter_map(move |id| document.node(id))
    }
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("kind", &self.node.kind.name())
            .field("span", &self.node.span)
            .finish()
    }
}

impl Serialize for NodeRef<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let children: Vec<NodeRef<'_>> = self.children().collect();
        let mut state = serializer.serialize_map(None)?;
        state.serialize_entry("id", &self.id)?;
        state.serialize_entry("node", self.kind())?;
        state.serialize_entry("span", &self.span())?;
        if matches!(self.kind(), NodeKind::Text) {
            state.serialize_entry("text", self.text())?;
        }
        if !children.is_empty() {
            state.serialize_entry("children", &children)?;
        }
        state.end()
    }
}

impl Serialize for Document {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.root().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> Result<(Document, NodeId, NodeId, NodeId), Error> {
        let mut document = Document::new("one two{.x}".to_string(), Options::default());
        let paragraph = document
            .arena
            .append(NodeId::ROOT, NodeKind::Paragraph, Span::new(0, 11))?;
        let text = document
            .arena
            .append(paragraph, NodeKind::Text, Span::new(0, 7))?;
        let tag = document.arena.append(
            paragraph,
            NodeKind::Attributes(AttributesNode {
                opening_marker: Span::new(7, 8),
                text: Span::new(8, 10),
                closing_marker: Span::new(10, 11),
            }),
            Span::new(7, 11),
        )?;
        Ok((document, paragraph, text, tag))
    }

    #[test]
    fn test_navigation() -> Result<(), Error> {
        let (document, paragraph, text, tag) = tree()?;
        let tag_ref = document.try_node(tag)?;
        assert_eq!(tag_ref.previous().map(NodeRef::id), Some(text));
        assert_eq!(tag_ref.parent().map(NodeRef::id), Some(paragraph));
        assert_eq!(tag_ref.next().map(NodeRef::id), None);
        assert_eq!(tag_ref.text(), "{.x}");
        assert!(tag_ref.kind().is_non_rendering());
        assert!(tag_ref.kind().is_delimited());
        assert_eq!(
            document.descendants().map(NodeRef::id).collect::<Vec<_>>(),
            vec![paragraph, text, tag]
        );
        Ok(())
    }

    #[test]
    fn test_split_and_wrap() -> Result<(), Error> {
        let (mut document, paragraph, text, tag) = tree()?;
        let tail = document.arena.split_text(text, 4)?;
        assert_eq!(document.try_node(text)?.text(), "one ");
        assert_eq!(document.try_node(tail)?.text(), "two");

        let span = document.arena.wrap(paragraph, 1..2, NodeKind::TextSpan)?;
        let children: Vec<NodeId> = document.arena.children(paragraph).to_vec();
        assert_eq!(children, vec![text, span, tag]);
        assert_eq!(document.arena.children(span), &[tail]);
        assert_eq!(document.arena.parent(tail), Some(span));
        assert_eq!(document.try_node(span)?.text(), "two");
        Ok(())
    }

    #[test]
    fn test_unknown_node() {
        let document = Document::new(String::new(), Options::default());
        let missing = NodeId(42);
        assert!(document.node(missing).is_none());
        assert!(matches!(
            document.try_node(missing),
            Err(Error::UnknownNode(id)) if id == missing
        ));
    }
}
