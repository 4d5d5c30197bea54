//! Markdown attribute and footnote extensions.
//!
//! [`parse`] turns Markdown source into a [`Document`]: an arena of nodes in
//! which `{...}` attribute tags, `[^id]` footnote references, `[^id]:`
//! definitions and `==highlights==` are first-class nodes. The document also
//! owns the repositories that answer the cross-reference questions renderers
//! ask: which tags apply to a node, and which definition a reference points
//! to, in what order.
//!
//! ```
//! use mdext_parser::{Options, parse};
//!
//! let document = parse("# Title {#intro}\n\nSee[^1].\n\n[^1]: Note.\n", &Options::default())?;
//! assert_eq!(document.footnotes().referenced_blocks().len(), 1);
//! # Ok::<(), mdext_parser::Error>(())
//! ```

mod error;
mod grammar;
mod model;
mod options;
mod parser;
mod repository;

pub use error::{Detail, Error};
pub use model::{
    Arena, AttributeNode, AttributesNode, Document, FencedCode, Footnote, FootnoteBlock, Heading,
    Highlight, Location, Node, NodeId, NodeKind, NodeRef, Position, Span,
};
pub use options::{Options, OptionsBuilder};
pub use repository::{FootnoteKeyCase, FootnoteRepository, KeepType, NodeAttributeRepository};

use parser::{BlockParsing, Extensions, ParserContext};

/// Parses `input` into a [`Document`].
///
/// Footnote references are bound to their definitions wherever those appear in
/// the document, and ordinals are resolved before returning.
///
/// # Errors
/// Returns [`Error::UnknownNode`] or [`Error::InvariantViolation`] if the tree
/// is left inconsistent; malformed Markdown is never an error.
#[tracing::instrument(skip_all, fields(len = input.len()))]
pub fn parse(input: &str, options: &Options) -> Result<Document, Error> {
    let mut document = Document::new(input.to_string(), options.clone());
    let extensions = Extensions::new(options);
    let (source, arena, attributes, footnotes) = document.parts_mut();
    let mut context = ParserContext {
        source,
        options,
        extensions: &extensions,
        arena,
        attributes,
        footnotes,
    };
    BlockParsing::new().parse(&mut context)?;
    context.footnotes.resolve_ordinals(context.arena)?;
    tracing::debug!(
        nodes = document.arena().len(),
        owners = document.attributes().len(),
        definitions = document.footnotes().definitions().len(),
        "document parsed"
    );
    Ok(document)
}
