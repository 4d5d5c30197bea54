//! Visitor implementation for HTML conversion.

use std::io::Write;

use mdext_converters_core::{
    id::{HeadingIdGenerator, IdGenerator},
    visitor::{Visitor, WritableVisitor},
};
use mdext_parser::{
    AttributesNode, Document, FencedCode, Footnote, FootnoteBlock, Heading, Highlight, NodeRef,
};

use crate::{Error, Processor};

/// HTML visitor that renders a parsed document body.
pub struct HtmlVisitor<W: Write> {
    writer: W,
    pub(crate) processor: Processor,
    ids: HeadingIdGenerator,
    /// Write the table of contents at the top of the body.
    inline_toc: bool,
}

impl<W: Write> HtmlVisitor<W> {
    pub fn new(writer: W, processor: Processor) -> Self {
        let inline_toc = processor.html.toc() && processor.html.template().is_none();
        Self {
            writer,
            processor,
            ids: HeadingIdGenerator::new(),
            inline_toc,
        }
    }

    /// Consume the visitor and return the writer
    pub fn into_writer(self) -> W {
        self.writer
    }

    /// Heading ids assigned while visiting.
    pub(crate) fn ids(&self) -> &HeadingIdGenerator {
        &self.ids
    }
}

impl<W: Write> WritableVisitor for HtmlVisitor<W> {
    fn writer_mut(&mut self) -> &mut dyn Write {
        &mut self.writer
    }
}

impl<W: Write> Visitor for HtmlVisitor<W> {
    type Error = Error;

    fn visit_document_start(&mut self, doc: &Document) -> Result<(), Self::Error> {
        self.ids = HeadingIdGenerator::from_document(doc);
        Ok(())
    }

    fn visit_body_content_start(&mut self, doc: &Document) -> Result<(), Self::Error> {
        if self.inline_toc {
            crate::toc::render(doc, &self.ids, &mut self.writer, &self.processor)?;
        }
        Ok(())
    }

    fn visit_document_supplements(&mut self, doc: &Document) -> Result<(), Self::Error> {
        let processor = self.processor.clone();
        crate::footnotes::render_list(doc, self, &processor)
    }

    fn visit_paragraph(&mut self, node: NodeRef<'_>) -> Result<(), Self::Error> {
        crate::paragraph::visit_paragraph(node, self)
    }

    fn visit_heading(&mut self, node: NodeRef<'_>, heading: &Heading) -> Result<(), Self::Error> {
        let id = self.ids.id_for(node.id()).map(str::to_string);
        let processor = self.processor.clone();
        crate::heading::visit_heading(node, heading, id.as_deref(), self, &processor)
    }

    fn visit_fenced_code(
        &mut self,
        node: NodeRef<'_>,
        code: &FencedCode,
    ) -> Result<(), Self::Error> {
        let processor = self.processor.clone();
        crate::code::visit_fenced_code(node, code, self, &processor)
    }

    fn visit_text(&mut self, text: &str) -> Result<(), Self::Error> {
        crate::inlines::visit_text(text, self)
    }

    fn visit_soft_break(&mut self, _node: NodeRef<'_>) -> Result<(), Self::Error> {
        writeln!(self.writer)?;
        Ok(())
    }

    fn visit_highlight(
        &mut self,
        node: NodeRef<'_>,
        highlight: &Highlight,
    ) -> Result<(), Self::Error> {
        let processor = self.processor.clone();
        crate::inlines::visit_highlight(node, highlight, self, &processor)
    }

    fn visit_text_span(&mut self, node: NodeRef<'_>) -> Result<(), Self::Error> {
        crate::inlines::visit_text_span(node, self)
    }

    fn visit_attributes(
        &mut self,
        _node: NodeRef<'_>,
        _tag: &AttributesNode,
    ) -> Result<(), Self::Error> {
        // Tags are applied to their owner's element.
        Ok(())
    }

    fn visit_footnote(&mut self, node: NodeRef<'_>, footnote: &Footnote) -> Result<(), Self::Error> {
        let processor = self.processor.clone();
        crate::footnotes::visit_footnote(node, footnote, self, &processor)
    }

    fn visit_footnote_block(
        &mut self,
        _node: NodeRef<'_>,
        _block: &FootnoteBlock,
    ) -> Result<(), Self::Error> {
        // Definitions are emitted with the footnote list.
        Ok(())
    }
}
