use crate::{
    Error, FencedCode, Heading, NodeId, NodeKind, Span,
    grammar::parse_tag,
    parser::{ParserContext, attributes::append_tag, inline, owners},
};

const TAB_STOP: usize = 4;
/// Lines indented this much are never block starts.
const CODE_INDENT: usize = 4;

/// One source line, newline excluded, with a cursor into it.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Line<'a> {
    pub(crate) text: &'a str,
    /// Document offset of `text`.
    pub(crate) offset: usize,
    /// Byte index into `text` up to which containers have consumed the line.
    pub(crate) index: usize,
}

impl<'a> Line<'a> {
    pub(crate) fn new(text: &'a str, offset: usize) -> Self {
        Self {
            text,
            offset,
            index: 0,
        }
    }

    pub(crate) fn rest(&self) -> &'a str {
        self.text.get(self.index..).unwrap_or_default()
    }

    pub(crate) fn end(&self) -> usize {
        self.text.len()
    }

    pub(crate) fn next_non_space(&self) -> usize {
        let rest = self.rest();
        self.index + (rest.len() - rest.trim_start_matches([' ', '\t']).len())
    }

    /// Whitespace columns at the cursor, tabs expanded to the next tab stop.
    pub(crate) fn indent(&self) -> usize {
        let mut column = 0;
        for ch in self.rest().chars() {
            match ch {
                ' ' => column += 1,
                '\t' => column += TAB_STOP - column % TAB_STOP,
                _ => break,
            }
        }
        column
    }

    pub(crate) fn is_blank(&self) -> bool {
        self.rest().trim().is_empty()
    }

    /// Index after consuming up to `columns` columns of leading whitespace.
    pub(crate) fn advance_columns(&self, columns: usize) -> usize {
        let mut column = 0;
        let mut index = self.index;
        for ch in self.rest().chars() {
            if column >= columns {
                break;
            }
            match ch {
                ' ' => column += 1,
                '\t' => column += TAB_STOP - column % TAB_STOP,
                _ => break,
            }
            index += 1;
        }
        index
    }

    /// Document span of the byte range `start..end` of this line.
    pub(crate) fn span(&self, start: usize, end: usize) -> Span {
        Span::new(self.offset + start, self.offset + end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BlockContinue {
    /// The block does not continue on this line.
    None,
    /// The block continues; its content starts at this index.
    AtIndex(usize),
    /// The line ends the block and is consumed by it.
    Finished,
}

/// A block opened by a [`BlockParserFactory`]. The node is allocated but not
/// yet attached; the driver appends it to the innermost open container.
pub(crate) struct BlockStart {
    pub(crate) parser: Box<dyn BlockParser>,
    /// Index in the line where parsing continues.
    pub(crate) index: usize,
}

pub(crate) trait BlockParserFactory {
    fn try_start(
        &self,
        line: &Line<'_>,
        context: &mut ParserContext<'_>,
    ) -> Result<Option<BlockStart>, Error>;
}

/// An open block.
pub(crate) trait BlockParser {
    fn block(&self) -> NodeId;

    /// Containers hold other blocks; leaves are closed when a sibling opens.
    fn is_container(&self) -> bool {
        false
    }

    fn is_paragraph(&self) -> bool {
        false
    }

    fn accepts_lines(&self) -> bool {
        false
    }

    fn try_continue(&mut self, line: &Line<'_>, context: &ParserContext<'_>) -> BlockContinue;

    fn add_line(&mut self, _line: &Line<'_>) {}

    /// Segments to inline-parse once the block structure is complete.
    fn take_inline_content(&mut self) -> Option<Vec<Span>> {
        None
    }

    fn close_block(&mut self, context: &mut ParserContext<'_>) -> Result<(), Error>;
}

struct DocumentBlockParser;

impl BlockParser for DocumentBlockParser {
    fn block(&self) -> NodeId {
        NodeId::ROOT
    }

    fn is_container(&self) -> bool {
        true
    }

    fn try_continue(&mut self, line: &Line<'_>, _context: &ParserContext<'_>) -> BlockContinue {
        BlockContinue::AtIndex(line.index)
    }

    fn close_block(&mut self, _context: &mut ParserContext<'_>) -> Result<(), Error> {
        Ok(())
    }
}

struct ParagraphParser {
    block: NodeId,
    lines: Vec<Span>,
}

impl BlockParser for ParagraphParser {
    fn block(&self) -> NodeId {
        self.block
    }

    fn is_paragraph(&self) -> bool {
        true
    }

    fn accepts_lines(&self) -> bool {
        true
    }

    fn try_continue(&mut self, line: &Line<'_>, _context: &ParserContext<'_>) -> BlockContinue {
        if line.is_blank() {
            BlockContinue::None
        } else {
            BlockContinue::AtIndex(line.index)
        }
    }

    fn add_line(&mut self, line: &Line<'_>) {
        let start = line.next_non_space();
        let content = line.text.get(start..).unwrap_or_default().trim_end();
        self.lines.push(line.span(start, start + content.len()));
    }

    fn take_inline_content(&mut self) -> Option<Vec<Span>> {
        Some(std::mem::take(&mut self.lines))
    }

    fn close_block(&mut self, context: &mut ParserContext<'_>) -> Result<(), Error> {
        if let (Some(first), Some(last)) = (self.lines.first(), self.lines.last()) {
            context.arena.try_get_mut(self.block)?.span = first.union(*last);
        }
        Ok(())
    }
}

pub(crate) struct HeadingParserFactory;

impl BlockParserFactory for HeadingParserFactory {
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
        let marker_len = rest.chars().take_while(|ch| *ch == '#').count();
        let Ok(level) = u8::try_from(marker_len) else {
            return Ok(None);
        };
        let after = rest.get(marker_len..).unwrap_or_default();
        if !(1..=6).contains(&level) || !(after.is_empty() || after.starts_with([' ', '\t'])) {
            return Ok(None);
        }

        let content_start = start + marker_len + (after.len() - after.trim_start().len());
        let mut content = line.text.get(content_start..).unwrap_or_default().trim_end();
        let without_closing = content.trim_end_matches('#');
        if without_closing.is_empty() {
            content = without_closing;
        } else if without_closing.ends_with([' ', '\t']) {
            content = without_closing.trim_end();
        }

        let heading = Heading {
            level,
            opening_marker: line.span(start, start + marker_len),
            text: line.span(content_start, content_start + content.len()),
        };
        let end = line.text.trim_end().len();
        let block = context
            .arena
            .alloc(NodeKind::Heading(heading), line.span(start, end));
        Ok(Some(BlockStart {
            parser: Box::new(HeadingParser {
                block,
                text: heading.text,
            }),
            index: line.end(),
        }))
    }
}

struct HeadingParser {
    block: NodeId,
    text: Span,
}

impl BlockParser for HeadingParser {
    fn block(&self) -> NodeId {
        self.block
    }

    fn try_continue(&mut self, _line: &Line<'_>, _context: &ParserContext<'_>) -> BlockContinue {
        BlockContinue::None
    }

    fn take_inline_content(&mut self) -> Option<Vec<Span>> {
        Some(if self.text.is_empty() {
            Vec::new()
        } else {
            vec![self.text]
        })
    }

    fn close_block(&mut self, _context: &mut ParserContext<'_>) -> Result<(), Error> {
        Ok(())
    }
}

pub(crate) struct FencedCodeParserFactory;

impl BlockParserFactory for FencedCodeParserFactory {
    fn try_start(
        &self,
        line: &Line<'_>,
        context: &mut ParserContext<'_>,
    ) -> Result<Option<BlockStart>, Error> {
        let fence_indent = line.indent();
        if fence_indent >= CODE_INDENT {
            return Ok(None);
        }
        let start = line.next_non_space();
        let rest = line.text.get(start..).unwrap_or_default();
        let Some(fence_char) = rest.chars().next().filter(|ch| matches!(ch, '`' | '~')) else {
            return Ok(None);
        };
        let fence_len = rest.chars().take_while(|ch| *ch == fence_char).count();
        let info_raw = rest.get(fence_len..).unwrap_or_default();
        if fence_len < 3 || (fence_char == '`' && info_raw.contains('`')) {
            return Ok(None);
        }

        let info_start = start + fence_len + (info_raw.len() - info_raw.trim_start().len());
        let info = line.span(info_start, info_start + info_raw.trim().len());
        let opening_fence = line.span(start, start + fence_len);
        let block = context.arena.alloc(
            NodeKind::FencedCode(FencedCode {
                opening_fence,
                info,
                closing_fence: None,
                lines: Vec::new(),
            }),
            line.span(start, line.text.trim_end().len()),
        );
        if context.options.fenced_code_info_attributes {
            attach_info_attributes(context, block, info)?;
        }

        Ok(Some(BlockStart {
            parser: Box::new(FencedCodeParser {
                block,
                fence_char,
                fence_len,
                fence_indent,
                lines: Vec::new(),
                closing_fence: None,
            }),
            index: line.end(),
        }))
    }
}

/// Moves a trailing `{...}` of the info string into an attribute tag owned by
/// the code block.
fn attach_info_attributes(
    context: &mut ParserContext<'_>,
    block: NodeId,
    info: Span,
) -> Result<(), Error> {
    let text = info.text(context.source);
    if !text.ends_with('}') {
        return Ok(());
    }
    let Some(tag) = text
        .match_indices('{')
        .filter_map(|(at, _)| parse_tag(text.get(at..)?, info.start + at, false))
        .find(|tag| tag.span().end == info.end)
    else {
        return Ok(());
    };

    let remaining = Span::new(info.start, tag.span().start);
    let trimmed = Span::new(
        info.start,
        info.start + remaining.text(context.source).trim_end().len(),
    );
    let id = append_tag(context.arena, block, tag)?;
    context.attributes.put(block, id);
    if let NodeKind::FencedCode(code) = &mut context.arena.try_get_mut(block)?.kind {
        code.info = trimmed;
    }
    tracing::trace!(%block, tag = %id, "fenced code info attributes");
    Ok(())
}

struct FencedCodeParser {
    block: NodeId,
    fence_char: char,
    fence_len: usize,
    fence_indent: usize,
    lines: Vec<Span>,
    closing_fence: Option<Span>,
}

impl BlockParser for FencedCodeParser {
    fn block(&self) -> NodeId {
        self.block
    }

    fn accepts_lines(&self) -> bool {
        true
    }

    fn try_continue(&mut self, line: &Line<'_>, _context: &ParserContext<'_>) -> BlockContinue {
        if line.indent() < CODE_INDENT {
            let start = line.next_non_space();
            let rest = line.text.get(start..).unwrap_or_default();
            let count = rest.chars().take_while(|ch| *ch == self.fence_char).count();
            if count >= self.fence_len && rest.get(count..).is_some_and(|after| after.trim().is_empty()) {
                self.closing_fence = Some(line.span(start, start + count));
                return BlockContinue::Finished;
            }
        }
        BlockContinue::AtIndex(line.advance_columns(self.fence_indent))
    }

    fn add_line(&mut self, line: &Line<'_>) {
        self.lines.push(line.span(line.index, line.end()));
    }

    fn close_block(&mut self, context: &mut ParserContext<'_>) -> Result<(), Error> {
        let node = context.arena.try_get_mut(self.block)?;
        let end = self
            .closing_fence
            .or_else(|| self.lines.last().copied())
            .map_or(node.span.end, |span| span.end);
        node.span.end = node.span.end.max(end);
        if let NodeKind::FencedCode(code) = &mut node.kind {
            code.lines = std::mem::take(&mut self.lines);
            code.closing_fence = self.closing_fence;
        }
        Ok(())
    }
}

/// The line-by-line block structure pass.
///
/// Open blocks form a stack from the document down to the innermost block.
/// Each line first walks the stack to see which blocks continue, then tries
/// block starts, then falls back to paragraph text. Inline content is parsed
/// only after every block is closed, so all footnote definitions are known by
/// then and references bind in document order.
pub(crate) struct BlockParsing {
    stack: Vec<Box<dyn BlockParser>>,
    /// Closed leaf blocks with their inline segments, in document order.
    leaves: Vec<(NodeId, Vec<Span>)>,
}

impl BlockParsing {
    pub(crate) fn new() -> Self {
        Self {
            stack: vec![Box::new(DocumentBlockParser)],
            leaves: Vec::new(),
        }
    }

    #[tracing::instrument(level = "debug", skip_all, fields(len = context.source.len()))]
    pub(crate) fn parse(mut self, context: &mut ParserContext<'_>) -> Result<(), Error> {
        let source = context.source;
        let mut offset = 0;
        for raw in source.split_inclusive('\n') {
            let text = raw.strip_suffix('\n').unwrap_or(raw);
            let text = text.strip_suffix('\r').unwrap_or(text);
            self.incorporate_line(Line::new(text, offset), context)?;
            offset += raw.len();
        }
        self.close_from(0, context)?;

        for (block, lines) in &self.leaves {
            inline::parse_lines(context, *block, lines)?;
            owners::assign(context, *block)?;
        }
        Ok(())
    }

    fn incorporate_line(
        &mut self,
        mut line: Line<'_>,
        context: &mut ParserContext<'_>,
    ) -> Result<(), Error> {
        let mut matched = 1;
        for depth in 1..self.stack.len() {
            let Some(parser) = self.stack.get_mut(depth) else {
                break;
            };
            match parser.try_continue(&line, context) {
                BlockContinue::AtIndex(index) => {
                    line.index = index;
                    matched += 1;
                }
                BlockContinue::Finished => return self.close_from(depth, context),
                BlockContinue::None => break,
            }
        }

        // Fenced code takes the line verbatim.
        if self
            .stack
            .get(matched - 1)
            .is_some_and(|parser| parser.accepts_lines() && !parser.is_paragraph())
        {
            self.close_from(matched, context)?;
            if let Some(parser) = self.stack.last_mut() {
                parser.add_line(&line);
            }
            return Ok(());
        }

        let mut unmatched_closed = matched == self.stack.len();
        let mut started = false;
        while !line.is_blank() {
            let Some(start) = Self::try_start(&line, context)? else {
                break;
            };
            if !unmatched_closed {
                self.close_from(matched, context)?;
                unmatched_closed = true;
            }
            line.index = start.index;
            let is_container = start.parser.is_container();
            self.add_child(start.parser, context)?;
            started = true;
            if !is_container {
                break;
            }
        }

        // Lazy paragraph continuation keeps unmatched containers open.
        if !started
            && !unmatched_closed
            && !line.is_blank()
            && let Some(parser) = self.stack.last_mut()
            && parser.is_paragraph()
        {
            parser.add_line(&line);
            return Ok(());
        }
        if !unmatched_closed {
            self.close_from(matched, context)?;
        }
        if line.is_blank() {
            return Ok(());
        }

        if let Some(parser) = self.stack.last_mut()
            && parser.accepts_lines()
        {
            parser.add_line(&line);
            return Ok(());
        }
        let block = context
            .arena
            .alloc(NodeKind::Paragraph, line.span(line.index, line.end()));
        let mut paragraph = ParagraphParser {
            block,
            lines: Vec::new(),
        };
        paragraph.add_line(&line);
        self.add_child(Box::new(paragraph), context)
    }

    fn try_start(
        line: &Line<'_>,
        context: &mut ParserContext<'_>,
    ) -> Result<Option<BlockStart>, Error> {
        let extensions = context.extensions;
        for factory in &extensions.blocks {
            if let Some(start) = factory.try_start(line, context)? {
                return Ok(Some(start));
            }
        }
        Ok(None)
    }

    fn add_child(
        &mut self,
        parser: Box<dyn BlockParser>,
        context: &mut ParserContext<'_>,
    ) -> Result<(), Error> {
        while self.stack.last().is_some_and(|top| !top.is_container()) {
            self.close_top(context)?;
        }
        let parent = self.stack.last().map_or(NodeId::ROOT, |top| top.block());
        context.arena.append_child(parent, parser.block())?;
        self.stack.push(parser);
        Ok(())
    }

    fn close_from(&mut self, depth: usize, context: &mut ParserContext<'_>) -> Result<(), Error> {
        while self.stack.len() > depth {
            self.close_top(context)?;
        }
        Ok(())
    }

    fn close_top(&mut self, context: &mut ParserContext<'_>) -> Result<(), Error> {
        if let Some(mut parser) = self.stack.pop() {
            parser.close_block(context)?;
            if let Some(lines) = parser.take_inline_content() {
                self.leaves.push((parser.block(), lines));
            }
        }
        Ok(())
    }
}
