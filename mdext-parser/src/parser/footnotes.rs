use crate::{
    Error, Footnote, FootnoteBlock, NodeId, NodeKind, Span,
    grammar::{parse_definition, parse_reference},
    parser::{
        BlockContinue, BlockParser, BlockParserFactory, BlockStart, InlineParser, Line,
        LinkRefProcessor, ParserContext,
    },
};

const CODE_INDENT: usize = 4;

/// Opens a footnote definition on `[^id]:`.
pub(crate) struct FootnoteBlockParserFactory;

impl BlockParserFactory for FootnoteBlockParserFactory {
    fn try_start(
        &self,
        line: &Line<'_>,
        context: &mut ParserContext<'_>,
    ) -> Result<Option<BlockStart>, Error> {
        if line.indent() >= CODE_INDENT {
            return Ok(None);
        }
        let start = line.next_non_space();
        let rest = line.text.get(start..).unwrap_or_default();
        let Some(markers) = parse_definition(rest, line.offset + start) else {
            return Ok(None);
        };

        let block = context.arena.alloc(
            NodeKind::FootnoteBlock(FootnoteBlock::new(
                markers.opening_marker,
                markers.text,
                markers.closing_marker,
            )),
            markers.span(),
        );
        tracing::trace!(%block, id = markers.text.text(context.source), "footnote definition opened");
        Ok(Some(BlockStart {
            parser: Box::new(FootnoteBlockParser {
                block,
                id: markers.text,
                content_indent: context.options.footnote_content_indent,
            }),
            index: markers.closing_marker.end - line.offset,
        }))
    }
}

/// Container for the content of one definition. Content continues on lines
/// indented at least `content_indent` columns, and across blank lines once
/// there is some content.
struct FootnoteBlockParser {
    block: NodeId,
    id: Span,
    content_indent: usize,
}

impl BlockParser for FootnoteBlockParser {
    fn block(&self) -> NodeId {
        self.block
    }

    fn is_container(&self) -> bool {
        true
    }

    fn try_continue(&mut self, line: &Line<'_>, context: &ParserContext<'_>) -> BlockContinue {
        if line.is_blank() {
            if context.arena.children(self.block).is_empty() {
                BlockContinue::None
            } else {
                BlockContinue::AtIndex(line.next_non_space())
            }
        } else if line.indent() >= self.content_indent {
            BlockContinue::AtIndex(line.advance_columns(self.content_indent))
        } else {
            BlockContinue::None
        }
    }

    fn close_block(&mut self, context: &mut ParserContext<'_>) -> Result<(), Error> {
        let last = context
            .arena
            .children(self.block)
            .last()
            .copied()
            .map(|child| context.arena.try_get(child).map(|node| node.span))
            .transpose()?;
        if let Some(last) = last {
            let node = context.arena.try_get_mut(self.block)?;
            node.span = node.span.union(last);
        }

        let id = self.id.text(context.source);
        match context.footnotes.put(context.arena, id, self.block)? {
            Some(displaced) if displaced == self.block => {
                tracing::debug!(block = %self.block, id, "footnote definition not kept");
            }
            Some(displaced) => {
                tracing::debug!(block = %self.block, %displaced, id, "footnote definition replaced");
            }
            None => tracing::trace!(block = %self.block, id, "footnote definition stored"),
        }
        Ok(())
    }
}

/// Turns `[^id]` into a `Footnote`, bound right away when the definition is
/// already known.
pub(crate) struct FootnoteLinkRefProcessor;

impl LinkRefProcessor for FootnoteLinkRefProcessor {
    fn is_match(&self, chars: &str) -> bool {
        chars.len() >= 3 && chars.starts_with("[^") && chars.ends_with(']')
    }

    fn create_node(
        &self,
        parser: &mut InlineParser<'_, '_>,
        span: Span,
    ) -> Result<Option<NodeId>, Error> {
        let Some(markers) = parse_reference(span.text(parser.source()), span.start)
            .filter(|markers| markers.span() == span)
        else {
            return Ok(None);
        };

        parser.flush_text()?;
        let id = parser.append(
            NodeKind::Footnote(Footnote::new(
                markers.opening_marker,
                markers.text,
                markers.closing_marker,
            )),
            span,
        )?;

        let key = markers.text.text(parser.source());
        let context = parser.context();
        if !key.is_empty()
            && let Some(block) = context.footnotes.get(key)
        {
            context.footnotes.add_reference(context.arena, block, id)?;
        }
        Ok(Some(id))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::{Document, Error, FootnoteKeyCase, KeepType, NodeKind, NodeRef, Options, parse};

    fn references(document: &Document) -> Vec<(&str, Option<usize>, usize)> {
        document
            .descendants()
            .filter_map(|node| {
                let footnote = node.kind().as_footnote()?;
                let ordinal = footnote
                    .block
                    .and_then(|block| document.node(block))
                    .and_then(|block| block.kind().as_footnote_block())
                    .map(|block| block.ordinal);
                Some((node.text(), ordinal, footnote.reference_ordinal))
            })
            .collect()
    }

    #[test]
    fn test_forward_and_backward_references() -> Result<(), Error> {
        let input = "See [^b] and [^a].\n\n[^a]: A\n\n[^b]: B\n\nAgain [^a].\n";
        let document = parse(input, &Options::default())?;
        assert_eq!(
            references(&document),
            vec![
                ("[^b]", Some(1), 0),
                ("[^a]", Some(2), 0),
                ("[^a]", Some(2), 1),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_undefined_reference_stays_tentative() -> Result<(), Error> {
        let document = parse("Missing [^nope].\n", &Options::default())?;
        let footnote = document
            .descendants()
            .find_map(|node| node.kind().as_footnote().copied());
        assert_eq!(footnote.map(|f| f.is_tentative()), Some(true));
        assert!(document.footnotes().referenced_blocks().is_empty());
        Ok(())
    }

    #[test]
    fn test_unreferenced_definition_has_no_ordinal() -> Result<(), Error> {
        let document = parse("[^lonely]: nobody cites me\n", &Options::default())?;
        let block = document
            .root()
            .first_child()
            .and_then(|node| node.kind().as_footnote_block().cloned());
        assert_eq!(block.as_ref().map(|b| b.ordinal), Some(0));
        assert_eq!(block.as_ref().map(|b| b.key.as_str()), Some("lonely"));
        Ok(())
    }

    #[rstest]
    #[case::sensitive(FootnoteKeyCase::Sensitive, None)]
    #[case::insensitive(FootnoteKeyCase::Insensitive, Some(1))]
    fn test_key_case(#[case] key_case: FootnoteKeyCase, #[case] expected: Option<usize>) -> Result<(), Error> {
        let options = Options::builder().with_footnote_key_case(key_case).build();
        let document = parse("x[^Note]\n\n[^note]: n\n", &options)?;
        let ordinals: Vec<Option<usize>> = references(&document).into_iter().map(|(_, o, _)| o).collect();
        assert_eq!(ordinals, vec![expected]);
        Ok(())
    }

    #[rstest]
    #[case::first(KeepType::First, "one")]
    #[case::last(KeepType::Last, "two")]
    fn test_duplicate_definition_policy(#[case] keep: KeepType, #[case] expected: &str) -> Result<(), Error> {
        let options = Options::builder().with_footnotes_keep(keep).build();
        let document = parse("[^n]\n\n[^n]: one\n\n[^n]: two\n", &options)?;
        let bound = document
            .descendants()
            .find_map(|node| node.kind().as_footnote().and_then(|f| f.block))
            .and_then(|block| document.node(block));
        let text: Vec<&str> = bound
            .into_iter()
            .flat_map(NodeRef::descendants)
            .filter(|node| matches!(node.kind(), NodeKind::Text))
            .map(NodeRef::text)
            .collect();
        assert_eq!(text, vec![expected]);
        Ok(())
    }

    #[tracing_test::traced_test]
    #[rstest]
    #[case::first(KeepType::First, "footnote definition not kept")]
    #[case::last(KeepType::Last, "footnote definition replaced")]
    fn test_duplicate_definition_is_logged(
        #[case] keep: KeepType,
        #[case] message: &str,
    ) -> Result<(), Error> {
        let options = Options::builder().with_footnotes_keep(keep).build();
        parse("[^n]: one\n\n[^n]: two\n", &options)?;
        assert!(logs_contain(message));
        Ok(())
    }

    #[test]
    #[tracing_test::traced_test]
    fn test_bound_reference_is_logged() -> Result<(), Error> {
        parse("[^n]: note\n\nSee [^n].\n", &Options::default())?;
        assert!(logs_contain("footnote definition stored"));
        assert!(logs_contain("footnote reference bound"));
        assert!(logs_contain("footnote ordinals resolved"));
        Ok(())
    }

    #[test]
    fn test_reference_inside_definition() -> Result<(), Error> {
        let document = parse("[^a]: see [^a]\n", &Options::default())?;
        assert_eq!(references(&document), vec![("[^a]", Some(1), 0)]);
        Ok(())
    }
}
