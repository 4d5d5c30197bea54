//! Visitor implementation for Markdown formatting.

use std::io::Write;

use mdext_converters_core::{
    attributes::has_id_attribute,
    id::{HeadingIdGenerator, IdGenerator},
    visitor::{Visitor, WritableVisitor},
};
use mdext_parser::{
    AttributesNode, Document, FencedCode, Footnote, FootnoteBlock, Heading, Highlight, NodeId,
    NodeKind, NodeRef, Span,
};
use rustc_hash::FxHashSet;

use crate::{
    Error, FormatOptions, Formatter, MarkdownWriter, TranslationStore,
    attributes::{
        Attr, TagText, combine, owner_tags, sort, space_after, space_before, tag_attributes,
    },
    footnotes::{Anchor, FootnotePlan},
    merge::UniqueIds,
    translation::Purpose,
};

/// Per-run state: what is being produced and the id tables it uses.
#[derive(Debug, Default)]
pub(crate) struct Session {
    pub(crate) purpose: Purpose,
    pub(crate) store: TranslationStore,
    pub(crate) unique: UniqueIds,
}

/// Markdown visitor that writes a document back as Markdown.
pub struct MarkdownVisitor {
    writer: MarkdownWriter,
    pub(crate) processor: Formatter,
    session: Session,
    ids: HeadingIdGenerator,
    footnotes: FootnotePlan,
    /// Tags already written as part of a combined tag.
    combined: FxHashSet<NodeId>,
}

impl MarkdownVisitor {
    /// Create a visitor for plain formatting.
    #[must_use]
    pub fn new(processor: Formatter) -> Self {
        Self::with_session(processor, Session::default())
    }

    pub(crate) fn with_session(processor: Formatter, session: Session) -> Self {
        Self {
            writer: MarkdownWriter::new(),
            processor,
            session,
            ids: HeadingIdGenerator::new(),
            footnotes: FootnotePlan::default(),
            combined: FxHashSet::default(),
        }
    }

    /// Consume the visitor and return the writer
    #[must_use]
    pub fn into_writer(self) -> MarkdownWriter {
        self.writer
    }

    pub(crate) fn into_parts(self) -> (MarkdownWriter, Session) {
        (self.writer, self.session)
    }

    fn options(&self) -> &FormatOptions {
        self.processor.format_options()
    }

    fn write_tag(&mut self, node: NodeRef<'_>, tag: &AttributesNode) -> Result<(), Error> {
        if self.combined.contains(&node.id()) {
            if self.leaves_orphaned_space(node) {
                self.writer.trim_line_end();
            }
            return Ok(());
        }
        if space_before(node) {
            self.writer.append(" ");
        }
        if self.session.purpose.is_transforming() {
            self.write_transformed_tag(node, tag);
        } else {
            let text = self.formatted_tag(node, tag)?;
            self.writer.append(&text);
        }
        if space_after(node) {
            self.writer.append(" ");
        }
        Ok(())
    }

    /// Whether skipping the combined tag `node` would leave the space before
    /// it dangling at a line end or doubled with the space that follows.
    fn leaves_orphaned_space(&self, node: NodeRef<'_>) -> bool {
        let mut next = node.next();
        while let Some(skipped) = next.filter(|n| self.combined.contains(&n.id())) {
            next = skipped.next();
        }
        next.is_none_or(|n| matches!(n.kind(), NodeKind::SoftBreak) || n.text().starts_with(' '))
    }

    /// The tag as configured, with merge renames applied.
    fn formatted_tag(&mut self, node: NodeRef<'_>, tag: &AttributesNode) -> Result<String, Error> {
        let document = node.document();
        let source = document.source();
        let combine_tags = self.processor.format_options().attributes_combine_consecutive();
        let tags = if combine_tags {
            owner_tags(document, node.id())
        } else {
            vec![node.id()]
        };

        let mut attrs: Vec<Attr<'_>> = Vec::new();
        for id in tags {
            let tag_node = document.try_node(id)?;
            if !matches!(tag_node.kind(), NodeKind::Attributes(_)) {
                continue;
            }
            if id != node.id() {
                self.combined.insert(id);
            }
            for (_, attribute) in tag_attributes(tag_node) {
                let mut attr = Attr::new(source, &attribute);
                if attr.is_id()
                    && let Some(unique) = self.session.unique.get(attr.value())
                {
                    attr.set_value(unique.clone());
                }
                if combine_tags {
                    combine(&mut attrs, attr);
                } else {
                    attrs.push(attr);
                }
            }
        }

        let options = self.options();
        if options.attributes_sort() {
            sort(&mut attrs);
        }
        let keep_gaps = !combine_tags && !options.attributes_sort();
        let frame = TagText::new(
            source,
            tag,
            &tag_attributes(node),
            options.attributes_spaces(),
            keep_gaps,
        );
        let parts: Vec<String> = attrs
            .iter()
            .map(|attr| {
                let mut out = String::new();
                attr.write(options, &mut out);
                out
            })
            .collect();
        Ok(frame.assemble(&parts))
    }

    /// The tag with ids swapped for placeholders, or placeholders for ids.
    fn write_transformed_tag(&mut self, node: NodeRef<'_>, tag: &AttributesNode) {
        let document = node.document();
        let source = document.source();
        let attributes = tag_attributes(node);
        let frame = TagText::new(
            source,
            tag,
            &attributes,
            crate::DiscretionaryText::AsIs,
            true,
        );
        self.writer.append("{");
        self.writer.append(frame.opening_space);
        for (index, (_, attribute)) in attributes.iter().enumerate() {
            if let Some(previous) = index.checked_sub(1) {
                let gap = frame
                    .gaps
                    .as_ref()
                    .and_then(|gaps| gaps.get(previous).copied())
                    .unwrap_or(" ");
                self.writer.append(gap);
            }
            let attr = Attr::new(source, attribute);
            if !attr.is_id() {
                self.writer.append_non_translating(attr.written());
                continue;
            }
            match self.session.purpose {
                Purpose::TranslationExport => {
                    let encoded = self.session.store.encode_id_attribute(
                        attr.written(),
                        attr.value(),
                        &self.processor.format,
                    );
                    self.writer.append_non_translating(&encoded);
                }
                Purpose::TranslationReimport => {
                    if let Some(original) = self.session.store.decode_id_attribute(attr.value()) {
                        self.writer.append(original);
                    } else {
                        tracing::warn!(
                            placeholder = attr.value(),
                            "unknown translation placeholder, attribute kept as written"
                        );
                        self.writer.append(attr.written());
                    }
                }
                Purpose::Format => self.writer.append(attr.written()),
            }
        }
        self.writer.append(frame.closing_space);
        self.writer.append("}");
    }

    /// The footnote id as it should be written, and whether it is
    /// non-translating.
    fn footnote_id(&mut self, document: &Document, id: &str) -> (String, bool) {
        match self.session.purpose {
            Purpose::Format => {
                let key = document.footnotes().normalize_key(id);
                let written = self
                    .session
                    .unique
                    .get(&key)
                    .cloned()
                    .unwrap_or_else(|| id.to_string());
                (written, false)
            }
            Purpose::TranslationExport => (
                self.session
                    .store
                    .encode_footnote(id, &self.processor.format),
                true,
            ),
            Purpose::TranslationReimport => {
                if let Some(original) = self.session.store.decode_footnote(id) {
                    (original.to_string(), false)
                } else {
                    tracing::warn!(id, "footnote id is not a known placeholder, kept as written");
                    (id.to_string(), false)
                }
            }
        }
    }

    fn write_footnote_id(&mut self, document: &Document, id: &str) {
        let (written, non_translating) = self.footnote_id(document, id);
        self.writer.append("[^");
        if non_translating {
            self.writer.append_non_translating(&written);
        } else {
            self.writer.append(&written);
        }
        self.writer.append("]");
    }

    fn write_definition(&mut self, node: NodeRef<'_>, block: &FootnoteBlock) -> Result<(), Error> {
        self.writer.blank_line();
        self.write_footnote_id(node.document(), node.slice(block.text));
        self.writer.append(":");
        if node.has_children() {
            self.writer.append(" ");
            let indent = " ".repeat(self.options().footnote_indent());
            self.writer.push_prefix(indent);
            self.visit_children(node)?;
            self.writer.pop_prefix();
        }
        self.writer.blank_line();
        Ok(())
    }

    fn write_planned_definitions(&mut self, document: &Document) -> Result<(), Error> {
        for id in std::mem::take(&mut self.footnotes.blocks) {
            let node = document.try_node(id)?;
            if let NodeKind::FootnoteBlock(block) = node.kind() {
                self.write_definition(node, block)?;
            }
        }
        Ok(())
    }
}

impl WritableVisitor for MarkdownVisitor {
    fn writer_mut(&mut self) -> &mut dyn Write {
        &mut self.writer
    }
}

impl Visitor for MarkdownVisitor {
    type Error = Error;

    fn visit_document_start(&mut self, doc: &Document) -> Result<(), Self::Error> {
        self.ids = HeadingIdGenerator::from_document(doc);
        self.footnotes = FootnotePlan::new(doc, self.processor.format_options());
        self.combined.clear();
        Ok(())
    }

    fn visit_body_content_start(&mut self, doc: &Document) -> Result<(), Self::Error> {
        if self.footnotes.anchor == Anchor::Top {
            self.write_planned_definitions(doc)?;
        }
        Ok(())
    }

    fn visit_document_supplements(&mut self, doc: &Document) -> Result<(), Self::Error> {
        if self.footnotes.anchor == Anchor::Bottom {
            self.write_planned_definitions(doc)?;
        }
        Ok(())
    }

    fn visit_paragraph(&mut self, node: NodeRef<'_>) -> Result<(), Self::Error> {
        self.visit_children(node)?;
        self.writer.blank_line();
        Ok(())
    }

    fn visit_heading(&mut self, node: NodeRef<'_>, heading: &Heading) -> Result<(), Self::Error> {
        self.writer.blank_line();
        self.writer.append(node.slice(heading.opening_marker));
        if node.has_children() {
            self.writer.append(" ");
            self.visit_children(node)?;
        }
        if !self.session.unique.is_empty()
            && !has_id_attribute(node.document(), node.id())
            && let Some(unique) = self
                .ids
                .id_for(node.id())
                .and_then(|id| self.session.unique.get(id))
        {
            let explicit = format!(" {{#{unique}}}");
            self.writer.append(&explicit);
        }
        self.writer.blank_line();
        Ok(())
    }

    fn visit_fenced_code(
        &mut self,
        node: NodeRef<'_>,
        code: &FencedCode,
    ) -> Result<(), Self::Error> {
        self.writer.blank_line();
        self.writer
            .append(node.slice(Span::new(code.opening_fence.start, code.info.end)));
        for child in node.children() {
            if let NodeKind::Attributes(tag) = child.kind() {
                self.writer
                    .append(node.slice(Span::new(code.info.end, child.span().start)));
                self.write_tag(child, tag)?;
            }
        }
        self.writer.line();
        for line in &code.lines {
            self.writer.append(node.slice(*line));
            self.writer.append("\n");
        }
        let closing = code.closing_fence.unwrap_or(code.opening_fence);
        self.writer.append(node.slice(closing));
        self.writer.blank_line();
        Ok(())
    }

    fn visit_text(&mut self, text: &str) -> Result<(), Self::Error> {
        self.writer.append(text);
        Ok(())
    }

    fn visit_soft_break(&mut self, _node: NodeRef<'_>) -> Result<(), Self::Error> {
        self.writer.append("\n");
        Ok(())
    }

    fn visit_highlight(
        &mut self,
        node: NodeRef<'_>,
        highlight: &Highlight,
    ) -> Result<(), Self::Error> {
        self.writer.append(node.slice(highlight.opening_marker));
        self.visit_children(node)?;
        self.writer.append(node.slice(highlight.closing_marker));
        Ok(())
    }

    fn visit_text_span(&mut self, node: NodeRef<'_>) -> Result<(), Self::Error> {
        self.visit_children(node)
    }

    fn visit_attributes(
        &mut self,
        node: NodeRef<'_>,
        tag: &AttributesNode,
    ) -> Result<(), Self::Error> {
        self.write_tag(node, tag)
    }

    fn visit_attributes_delimiter(
        &mut self,
        node: NodeRef<'_>,
        _tag: &AttributesNode,
    ) -> Result<(), Self::Error> {
        self.writer.append(node.text());
        Ok(())
    }

    fn visit_footnote(&mut self, node: NodeRef<'_>, footnote: &Footnote) -> Result<(), Self::Error> {
        self.write_footnote_id(node.document(), node.slice(footnote.text));
        Ok(())
    }

    fn visit_footnote_block(
        &mut self,
        node: NodeRef<'_>,
        block: &FootnoteBlock,
    ) -> Result<(), Self::Error> {
        match self.footnotes.anchor {
            Anchor::InPlace => self.write_definition(node, block),
            Anchor::At(anchor) if anchor == node.id() => {
                self.write_planned_definitions(node.document())
            }
            Anchor::At(_) | Anchor::Top | Anchor::Bottom => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use mdext_converters_core::Converter;
    use mdext_parser::{Options, parse};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::{
        AttributeImplicitName, AttributeValueQuotes, DiscretionaryText, ElementPlacement,
        ElementPlacementSort,
    };

    use super::*;

    fn format(input: &str, options: FormatOptions) -> Result<String, Error> {
        let document = parse(input, &Options::default())?;
        Formatter::default()
            .with_format_options(options)
            .convert_to_string(&document)
    }

    #[rstest]
    #[case::heading_id("# Heading {#custom-id}\n")]
    #[case::span_and_style("Some text[.highlight]{style=color:red} here.\n")]
    #[case::footnote("A note[^note].\n\n[^note]: The content.\n")]
    #[case::whitespace_in_tag("para {  a = 'x y'   .b }\n")]
    #[case::highlight("Very ==hot=={.warm} stuff.\n")]
    #[case::code("```rust\nfn main() {}\n```\n")]
    #[case::multi_line("one\ntwo {.x}\n\nthree\n")]
    fn test_as_is_is_identity(#[case] input: &str) -> Result<(), Error> {
        assert_eq!(format(input, FormatOptions::default())?, input);
        Ok(())
    }

    #[test]
    fn test_footnote_content_is_reindented() -> Result<(), Error> {
        let input = "x[^n]\n\n[^n]: First line\n  lazy line\n\n    Second para.\n";
        let expected = "x[^n]\n\n[^n]: First line\n    lazy line\n\n    Second para.\n";
        assert_eq!(format(input, FormatOptions::default())?, expected);
        Ok(())
    }

    #[test]
    fn test_reformatted_tag() -> Result<(), Error> {
        let options = FormatOptions::builder()
            .attributes_spaces(DiscretionaryText::Add)
            .attribute_equal_space(DiscretionaryText::Remove)
            .attribute_value_quotes(AttributeValueQuotes::DoubleQuotes)
            .attribute_id(AttributeImplicitName::ImplicitPreferred)
            .attributes_sort(true)
            .build();
        assert_eq!(
            format("# T {title = 'x' id=top}\n", options)?,
            "# T { #top title=\"x\" }\n"
        );
        Ok(())
    }

    #[rstest]
    #[case::adjacent("para {.x}{.y}\n", "para {class=\"x y\"}\n")]
    #[case::line_end("# A {.x} B {.y}\n", "# A {class=\"x y\"} B\n")]
    #[case::mid_line("# A {.x} B {.y} C\n", "# A {class=\"x y\"} B C\n")]
    #[case::before_soft_break("A {.x} B {.y}\nnext\n", "A {class=\"x y\"} B\nnext\n")]
    fn test_combined_tags(#[case] input: &str, #[case] expected: &str) -> Result<(), Error> {
        let options = FormatOptions::builder()
            .attributes_combine_consecutive(true)
            .build();
        assert_eq!(format(input, options)?, expected);
        Ok(())
    }

    #[test]
    fn test_fenced_info_attributes() -> Result<(), Error> {
        let input = "```rust  {#main .x}\nfn main() {}\n```\n";
        let options = Options::builder().with_fenced_code_info_attributes().build();
        let document = parse(input, &options)?;
        let formatted = Formatter::default()
            .with_format_options(
                FormatOptions::builder()
                    .attribute_class(AttributeImplicitName::ExplicitPreferred)
                    .build(),
            )
            .convert_to_string(&document)?;
        assert_eq!(formatted, "```rust  {#main class=x}\nfn main() {}\n```\n");
        Ok(())
    }

    #[test]
    fn test_unclosed_fence_is_closed() -> Result<(), Error> {
        assert_eq!(
            format("~~~\ncode\n", FormatOptions::default())?,
            "~~~\ncode\n~~~\n"
        );
        Ok(())
    }

    #[rstest]
    #[case::bottom(
        ElementPlacement::DocumentBottom,
        ElementPlacementSort::Sort,
        "Text[^b][^a].\n\nMore.\n\n[^a]: A\n\n[^b]: B\n"
    )]
    #[case::top(
        ElementPlacement::DocumentTop,
        ElementPlacementSort::AsIs,
        "[^b]: B\n\n[^a]: A\n\nText[^b][^a].\n\nMore.\n"
    )]
    #[case::group_with_first(
        ElementPlacement::GroupWithFirst,
        ElementPlacementSort::DeleteUnused,
        "Text[^b][^a].\n\n[^b]: B\n\n[^a]: A\n\nMore.\n"
    )]
    fn test_footnote_placement(
        #[case] placement: ElementPlacement,
        #[case] sort: ElementPlacementSort,
        #[case] expected: &str,
    ) -> Result<(), Error> {
        let input = "Text[^b][^a].\n\n[^b]: B\n\nMore.\n\n[^a]: A\n";
        let options = FormatOptions::builder()
            .footnote_placement(placement)
            .footnote_sort(sort)
            .build();
        assert_eq!(format(input, options)?, expected);
        Ok(())
    }
}
