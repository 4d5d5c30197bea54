//! Visitor pattern for traversing the Markdown node tree.
//!
//! This module provides a Visitor trait with one method per node kind.
//! Converters implement this trait to define how to process each kind.
//!
//! # Naming Conventions
//!
//! - **`visit_*` functions**: orchestration. They accept a node and traverse
//!   its structure, calling back into the visitor for nested content.
//!
//! - **`render_*` functions**: low-level helpers that write specific markup
//!   directly to a writer and never recurse into the tree.

use std::io::Write;

use mdext_parser::{
    AttributesNode, Document, FencedCode, Footnote, FootnoteBlock, Heading, Highlight, NodeKind,
    NodeRef,
};

/// The Visitor trait defines methods for visiting each kind of node.
///
/// # Document Structure
///
/// The `visit_document` method calls visitors in this order:
///
/// 1. `visit_document_start()` - document setup
/// 2. `visit_body_content_start()` - before any block (the "body top" phase)
/// 3. Walk the top-level blocks
/// 4. `visit_document_supplements()` - the "body bottom" phase: footnote lists
/// 5. `visit_document_end()` - document cleanup
///
/// All structural hooks have default no-op implementations.
pub trait Visitor {
    /// The error type that can be returned during visiting
    type Error;

    /// Called before any document processing begins.
    ///
    /// # Errors
    ///
    /// The default implementation never returns an error.
    fn visit_document_start(&mut self, _doc: &Document) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called before any body content blocks are walked.
    ///
    /// # Errors
    ///
    /// The default implementation never returns an error.
    fn visit_body_content_start(&mut self, _doc: &Document) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called after all blocks are processed, before document end.
    ///
    /// Use for: document supplements like the footnote list.
    ///
    /// # Errors
    ///
    /// The default implementation never returns an error.
    fn visit_document_supplements(&mut self, _doc: &Document) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called at document end, after all processing complete.
    ///
    /// # Errors
    ///
    /// The default implementation never returns an error.
    fn visit_document_end(&mut self, _doc: &Document) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Visit a complete document.
    ///
    /// # Errors
    ///
    /// Returns an error if any visitor method fails during document traversal.
    fn visit_document(&mut self, doc: &Document) -> Result<(), Self::Error> {
        self.visit_document_start(doc)?;
        self.visit_body_content_start(doc)?;
        for block in doc.root().children() {
            self.visit_node(block)?;
        }
        self.visit_document_supplements(doc)?;
        self.visit_document_end(doc)?;
        Ok(())
    }

    /// Visit any node, dispatching on its kind.
    ///
    /// # Errors
    ///
    /// Returns an error if conversion of this node fails.
    fn visit_node(&mut self, node: NodeRef<'_>) -> Result<(), Self::Error> {
        match node.kind() {
            NodeKind::Document => self.visit_children(node),
            NodeKind::Paragraph => self.visit_paragraph(node),
            NodeKind::Heading(heading) => self.visit_heading(node, heading),
            NodeKind::FencedCode(code) => self.visit_fenced_code(node, code),
            NodeKind::Text => self.visit_text(node.text()),
            NodeKind::SoftBreak => self.visit_soft_break(node),
            NodeKind::Highlight(highlight) => self.visit_highlight(node, highlight),
            NodeKind::TextSpan => self.visit_text_span(node),
            NodeKind::Attributes(tag) => self.visit_attributes(node, tag),
            NodeKind::AttributesDelimiter(tag) => self.visit_attributes_delimiter(node, tag),
            // Attribute units are consumed through their enclosing tag.
            NodeKind::Attribute(_) => Ok(()),
            NodeKind::Footnote(footnote) => self.visit_footnote(node, footnote),
            NodeKind::FootnoteBlock(block) => self.visit_footnote_block(node, block),
        }
    }

    /// Visit every child of `node` in order.
    ///
    /// # Errors
    ///
    /// Returns an error if conversion of any child fails.
    fn visit_children(&mut self, node: NodeRef<'_>) -> Result<(), Self::Error> {
        for child in node.children() {
            self.visit_node(child)?;
        }
        Ok(())
    }

    /// Visit a paragraph
    ///
    /// # Errors
    ///
    /// Returns an error if conversion of this paragraph fails.
    fn visit_paragraph(&mut self, node: NodeRef<'_>) -> Result<(), Self::Error>;

    /// Visit an ATX heading
    ///
    /// # Errors
    ///
    /// Returns an error if conversion of this heading fails.
    fn visit_heading(&mut self, node: NodeRef<'_>, heading: &Heading) -> Result<(), Self::Error>;

    /// Visit a fenced code block
    ///
    /// # Errors
    ///
    /// Returns an error if conversion of this code block fails.
    fn visit_fenced_code(&mut self, node: NodeRef<'_>, code: &FencedCode)
    -> Result<(), Self::Error>;

    /// Visit plain text
    ///
    /// # Errors
    ///
    /// Returns an error if writing the text fails.
    fn visit_text(&mut self, text: &str) -> Result<(), Self::Error>;

    /// Visit the line break between two lines of a paragraph
    ///
    /// # Errors
    ///
    /// Returns an error if writing the break fails.
    fn visit_soft_break(&mut self, node: NodeRef<'_>) -> Result<(), Self::Error>;

    /// Visit a `==highlight==`
    ///
    /// # Errors
    ///
    /// Returns an error if conversion of this highlight fails.
    fn visit_highlight(
        &mut self,
        node: NodeRef<'_>,
        highlight: &Highlight,
    ) -> Result<(), Self::Error>;

    /// Visit a span created to carry attributes for part of a text run.
    ///
    /// # Errors
    ///
    /// Returns an error if conversion of this span fails.
    fn visit_text_span(&mut self, node: NodeRef<'_>) -> Result<(), Self::Error>;

    /// Visit an attribute tag.
    ///
    /// # Errors
    ///
    /// Returns an error if conversion of this tag fails.
    fn visit_attributes(&mut self, node: NodeRef<'_>, tag: &AttributesNode)
    -> Result<(), Self::Error>;

    /// Visit a bare `{.}` / `{#}` span delimiter.
    ///
    /// Defaults to [`Visitor::visit_attributes`].
    ///
    /// # Errors
    ///
    /// Returns an error if conversion of this delimiter fails.
    fn visit_attributes_delimiter(
        &mut self,
        node: NodeRef<'_>,
        tag: &AttributesNode,
    ) -> Result<(), Self::Error> {
        self.visit_attributes(node, tag)
    }

    /// Visit a `[^id]` footnote reference.
    ///
    /// # Errors
    ///
    /// Returns an error if conversion of this reference fails.
    fn visit_footnote(&mut self, node: NodeRef<'_>, footnote: &Footnote) -> Result<(), Self::Error>;

    /// Visit a `[^id]:` footnote definition.
    ///
    /// # Errors
    ///
    /// Returns an error if conversion of this definition fails.
    fn visit_footnote_block(
        &mut self,
        node: NodeRef<'_>,
        block: &FootnoteBlock,
    ) -> Result<(), Self::Error>;
}

/// A writable visitor that outputs to a writer.
///
/// This is a common pattern for converters that generate text output.
pub trait WritableVisitor: Visitor {
    /// Get a mutable reference to the writer
    fn writer_mut(&mut self) -> &mut dyn Write;
}

/// Extension trait for `WritableVisitor` that provides common rendering helpers.
pub trait WritableVisitorExt: WritableVisitor {
    /// Render the children of `node` between `prefix` and `suffix`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing or visiting fails.
    fn render_children_with_wrapper(
        &mut self,
        node: NodeRef<'_>,
        prefix: &str,
        suffix: &str,
    ) -> Result<(), Self::Error>
    where
        Self::Error: From<std::io::Error>,
    {
        let w = self.writer_mut();
        write!(w, "{prefix}")?;
        let _ = w;
        self.visit_children(node)?;
        let w = self.writer_mut();
        write!(w, "{suffix}")?;
        Ok(())
    }
}

// Blanket implementation for all WritableVisitor types
impl<T: WritableVisitor> WritableVisitorExt for T {}
