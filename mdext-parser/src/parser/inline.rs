use crate::{
    Error, NodeId, NodeKind, Options, Span,
    parser::{Extensions, ParserContext},
};

/// Scans one segment of a leaf block, emitting `Text` runs and giving
/// extensions a chance at their trigger characters.
pub(crate) struct InlineParser<'p, 'a> {
    context: &'p mut ParserContext<'a>,
    block: NodeId,
    start: usize,
    end: usize,
    index: usize,
    text_start: usize,
}

impl<'p, 'a> InlineParser<'p, 'a> {
    fn new(context: &'p mut ParserContext<'a>, block: NodeId, segment: Span) -> Self {
        Self {
            context,
            block,
            start: segment.start,
            end: segment.end,
            index: segment.start,
            text_start: segment.start,
        }
    }

    pub(crate) fn context(&mut self) -> &mut ParserContext<'a> {
        self.context
    }

    pub(crate) fn options(&self) -> &'a Options {
        self.context.options
    }

    pub(crate) fn source(&self) -> &'a str {
        self.context.source
    }

    /// The node receiving parsed children.
    pub(crate) fn block(&self) -> NodeId {
        self.block
    }

    /// Document offset of the cursor.
    pub(crate) fn index(&self) -> usize {
        self.index
    }

    /// The unparsed remainder of the segment.
    pub(crate) fn rest(&self) -> &'a str {
        self.context
            .source
            .get(self.index..self.end)
            .unwrap_or_default()
    }

    /// The character before the cursor, within the segment.
    pub(crate) fn previous_char(&self) -> Option<char> {
        self.context
            .source
            .get(self.start..self.index)?
            .chars()
            .next_back()
    }

    /// Emits the pending text run, if any.
    pub(crate) fn flush_text(&mut self) -> Result<(), Error> {
        if self.text_start < self.index {
            self.context.arena.append(
                self.block,
                NodeKind::Text,
                Span::new(self.text_start, self.index),
            )?;
        }
        self.text_start = self.index;
        Ok(())
    }

    /// Appends a node to the block being parsed.
    pub(crate) fn append(&mut self, kind: NodeKind, span: Span) -> Result<NodeId, Error> {
        self.context.arena.append(self.block, kind, span)
    }

    /// Moves the cursor past a construct an extension consumed.
    pub(crate) fn advance_to(&mut self, offset: usize) {
        self.index = offset;
        self.text_start = offset;
    }

    /// Parses `segment` into children of `parent`, with the same extensions.
    pub(crate) fn parse_nested(&mut self, parent: NodeId, segment: Span) -> Result<(), Error> {
        InlineParser::new(self.context, parent, segment).run()
    }

    fn run(mut self) -> Result<(), Error> {
        let extensions = self.context.extensions;
        while let Some(ch) = self.rest().chars().next() {
            let handled = if ch == '[' {
                self.parse_bracket(extensions)?
            } else {
                self.parse_extension(extensions, ch)?
            };
            if !handled {
                self.index += ch.len_utf8();
            }
        }
        self.flush_text()
    }

    fn parse_extension(&mut self, extensions: &Extensions, ch: char) -> Result<bool, Error> {
        for extension in extensions.inline_for(ch) {
            if extension.parse(self)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Offers a `[...]` span without nested brackets to the link-ref
    /// processors.
    fn parse_bracket(&mut self, extensions: &Extensions) -> Result<bool, Error> {
        let Some(close) = self
            .rest()
            .char_indices()
            .skip(1)
            .find(|(_, ch)| matches!(ch, '[' | ']'))
            .and_then(|(at, ch)| (ch == ']').then_some(at))
        else {
            return Ok(false);
        };
        let span = Span::new(self.index, self.index + close + 1);
        let chars = span.text(self.source());
        for processor in &extensions.link_refs {
            if processor.is_match(chars) && processor.create_node(self, span)?.is_some() {
                self.advance_to(span.end);
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Inline-parses the content lines of a leaf block, with a `SoftBreak` between
/// consecutive lines.
pub(crate) fn parse_lines(
    context: &mut ParserContext<'_>,
    block: NodeId,
    lines: &[Span],
) -> Result<(), Error> {
    let mut previous: Option<Span> = None;
    for line in lines {
        if let Some(previous) = previous {
            context
                .arena
                .append(block, NodeKind::SoftBreak, Span::new(previous.end, line.start))?;
        }
        InlineParser::new(context, block, *line).run()?;
        previous = Some(*line);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::{Document, Error, NodeRef, Options, parse};

    /// `(kind, text)` of every node under the first block.
    fn inlines(document: &Document) -> Vec<(&'static str, &str)> {
        document
            .root()
            .first_child()
            .into_iter()
            .flat_map(NodeRef::descendants)
            .map(|node| (node.kind().name(), node.text()))
            .collect()
    }

    #[test]
    fn test_text_and_soft_breaks() -> Result<(), Error> {
        let document = parse("one  \n  two", &Options::default())?;
        assert_eq!(
            inlines(&document),
            vec![("text", "one"), ("soft_break", "  \n  "), ("text", "two")]
        );
        Ok(())
    }

    #[test]
    fn test_double_brace_is_text() -> Result<(), Error> {
        let document = parse("a {{.x}} b", &Options::default())?;
        assert_eq!(inlines(&document), vec![("text", "a {{.x}} b")]);
        Ok(())
    }

    #[test]
    fn test_plain_brackets_are_text() -> Result<(), Error> {
        let document = parse("[link] and [^", &Options::default())?;
        assert_eq!(inlines(&document), vec![("text", "[link] and [^")]);
        Ok(())
    }
}
