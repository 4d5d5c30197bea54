//! Block and inline parsing, with the extension seams the attribute, footnote
//! and highlight extensions plug into.

use crate::{Arena, Error, FootnoteRepository, NodeAttributeRepository, NodeId, Options, Span};

mod attributes;
mod block;
mod footnotes;
mod highlight;
mod inline;
mod owners;

pub(crate) use block::{BlockContinue, BlockParser, BlockParserFactory, BlockParsing, BlockStart, Line};
pub(crate) use inline::InlineParser;

/// Everything a parser extension may read or write while a document is being
/// built.
pub(crate) struct ParserContext<'a> {
    pub(crate) source: &'a str,
    pub(crate) options: &'a Options,
    pub(crate) extensions: &'a Extensions,
    pub(crate) arena: &'a mut Arena,
    pub(crate) attributes: &'a mut NodeAttributeRepository,
    pub(crate) footnotes: &'a mut FootnoteRepository,
}

/// Hook into the inline parser, keyed on trigger characters.
pub(crate) trait InlineParserExtension {
    /// Characters at which [`InlineParserExtension::parse`] is attempted.
    fn characters(&self) -> &'static str;

    /// Tries to match at the parser's current index. On a match the extension
    /// appends its nodes and moves the index past them; otherwise it returns
    /// `false` with the parser untouched.
    fn parse(&self, parser: &mut InlineParser<'_, '_>) -> Result<bool, Error>;

    /// Whether a match can change how other blocks of the document parse.
    fn affects_global_scope(&self) -> bool {
        false
    }
}

/// Hook into bracket handling: gets a chance at every `[...]` span without
/// nested brackets.
pub(crate) trait LinkRefProcessor {
    /// Cheap check on the bracketed text, `[` and `]` included.
    fn is_match(&self, chars: &str) -> bool;

    /// Builds the node for `span`, or declines with `None`.
    fn create_node(
        &self,
        parser: &mut InlineParser<'_, '_>,
        span: Span,
    ) -> Result<Option<NodeId>, Error>;
}

/// The extension set active for one parse.
pub(crate) struct Extensions {
    pub(crate) blocks: Vec<Box<dyn BlockParserFactory>>,
    pub(crate) inlines: Vec<Box<dyn InlineParserExtension>>,
    pub(crate) link_refs: Vec<Box<dyn LinkRefProcessor>>,
}

impl Extensions {
    pub(crate) fn new(options: &Options) -> Self {
        let mut inlines: Vec<Box<dyn InlineParserExtension>> =
            vec![Box::new(attributes::AttributesInlineParserExtension)];
        if options.highlight {
            inlines.push(Box::new(highlight::HighlightInlineParserExtension));
        }
        Self {
            blocks: vec![
                Box::new(footnotes::FootnoteBlockParserFactory),
                Box::new(block::HeadingParserFactory),
                Box::new(block::FencedCodeParserFactory),
            ],
            inlines,
            link_refs: vec![Box::new(footnotes::FootnoteLinkRefProcessor)],
        }
    }

    /// Inline extensions triggered by `ch`.
    pub(crate) fn inline_for(&self, ch: char) -> impl Iterator<Item = &dyn InlineParserExtension> {
        self.inlines
            .iter()
            .map(AsRef::as_ref)
            .filter(move |extension| extension.characters().contains(ch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_extensions_are_local() {
        let extensions = Extensions::new(&Options::default());
        assert!(extensions.inlines.iter().all(|extension| !extension.affects_global_scope()));
        assert_eq!(extensions.inline_for('{').count(), 1);
        assert_eq!(extensions.inline_for('=').count(), 1);
        assert_eq!(extensions.inline_for('a').count(), 0);
    }

    #[test]
    fn test_highlight_can_be_disabled() {
        let options = Options::builder().without_highlight().build();
        let extensions = Extensions::new(&options);
        assert_eq!(extensions.inline_for('=').count(), 0);
    }
}
