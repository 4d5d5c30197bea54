//! Markdown formatter for mdext documents.
//!
//! Writes a parsed document back as Markdown. With default options every
//! attribute tag and footnote comes out exactly as it was written; the
//! [`FormatOptions`] normalize tag spacing, quoting, shorthand names and
//! order, combine consecutive tags, and move footnote definitions.
//!
//! Two more outputs build on the same visitor:
//!
//! - a translation round trip, where [`Formatter::translation_export`] swaps
//!   ids for opaque placeholders and [`Formatter::translation_reimport`]
//!   restores them in the translated text;
//! - [`Formatter::merge`], which concatenates documents and renames ids that
//!   collide with an earlier document.
//!
//! ```
//! use mdext_converters_core::Converter;
//! use mdext_converters_markdown::{DiscretionaryText, FormatOptions, Formatter};
//! use mdext_parser::{Options, parse};
//!
//! let document = parse("Text {  .a   #b }\n", &Options::default())?;
//! let formatter = Formatter::default().with_format_options(
//!     FormatOptions::builder()
//!         .attributes_spaces(DiscretionaryText::Remove)
//!         .attributes_sort(true)
//!         .build(),
//! );
//! assert_eq!(formatter.convert_to_string(&document)?, "Text {#b .a}\n");
//! # Ok::<(), mdext_converters_markdown::Error>(())
//! ```

use std::{
    io::Write,
    path::{Path, PathBuf},
    sync::Arc,
    time::Instant,
};

use mdext_converters_core::{Backend, Converter, Options, PrettyDuration, visitor::Visitor};
use mdext_parser::{Document, parse};

mod attributes;
mod error;
mod footnotes;
mod markdown_visitor;
mod merge;
mod options;
mod translation;
mod writer;

pub use error::Error;
pub use markdown_visitor::MarkdownVisitor;
pub use options::{
    AttributeImplicitName, AttributeValueQuotes, DiscretionaryText, ElementPlacement,
    ElementPlacementSort, FormatOptions, FormatOptionsBuilder,
};
pub use translation::{TranslationHandoff, TranslationStore};
pub use writer::MarkdownWriter;

use crate::{markdown_visitor::Session, translation::Purpose};

/// Markdown formatter.
#[derive(Clone, Debug, Default)]
pub struct Formatter {
    options: Options,
    pub(crate) format: Arc<FormatOptions>,
}

impl Formatter {
    #[must_use]
    pub fn new(options: Options, format: FormatOptions) -> Self {
        Self {
            options,
            format: Arc::new(format),
        }
    }

    #[must_use]
    pub fn with_format_options(mut self, format: FormatOptions) -> Self {
        self.format = Arc::new(format);
        self
    }

    #[must_use]
    pub fn format_options(&self) -> &FormatOptions {
        &self.format
    }

    fn run(&self, doc: &Document, session: Session) -> Result<(MarkdownWriter, Session), Error> {
        let mut visitor = MarkdownVisitor::with_session(self.clone(), session);
        visitor.visit_document(doc)?;
        Ok(visitor.into_parts())
    }

    /// Formats `doc` with every id attribute and footnote id replaced by a
    /// placeholder, ready to be sent for translation.
    ///
    /// # Errors
    ///
    /// Returns an error if the document tree is inconsistent.
    #[tracing::instrument(skip_all)]
    pub fn translation_export(&self, doc: &Document) -> Result<TranslationHandoff, Error> {
        let session = Session {
            purpose: Purpose::TranslationExport,
            store: TranslationStore::new(doc.options().clone()),
            ..Session::default()
        };
        let (writer, session) = self.run(doc, session)?;
        let (markdown, non_translating) = writer.finish();
        tracing::debug!(
            placeholders = session.store.len(),
            ranges = non_translating.len(),
            "translation export ready"
        );
        Ok(TranslationHandoff {
            markdown,
            non_translating,
            store: session.store,
        })
    }

    /// Parses translated text and puts the original ids back in place of
    /// the placeholders `store` handed out. Placeholders the store does not
    /// know are kept as written.
    ///
    /// # Errors
    ///
    /// Returns an error if the translated text cannot be parsed.
    #[tracing::instrument(skip_all)]
    pub fn translation_reimport(
        &self,
        translated: &str,
        store: TranslationStore,
    ) -> Result<String, Error> {
        let doc = parse(translated, store.parser_options())?;
        let session = Session {
            purpose: Purpose::TranslationReimport,
            store,
            ..Session::default()
        };
        let (writer, _) = self.run(&doc, session)?;
        Ok(writer.finish().0)
    }

    /// Formats `docs` one after another, separated by a blank line.
    ///
    /// Ids share one namespace across the merged output. An attribute id,
    /// generated heading id or footnote id already defined by an earlier
    /// document is written with the smallest numeric suffix that makes it
    /// unique; headings whose generated id changes get an explicit
    /// `{#id}` tag.
    ///
    /// # Errors
    ///
    /// Returns an error if a document tree is inconsistent.
    #[tracing::instrument(skip_all, fields(documents = docs.len()))]
    pub fn merge(&self, docs: &[&Document]) -> Result<String, Error> {
        let tables = merge::uniquification_tables(docs);
        let mut outputs = Vec::with_capacity(docs.len());
        for (doc, unique) in docs.iter().zip(tables) {
            let session = Session {
                unique,
                ..Session::default()
            };
            let (writer, _) = self.run(doc, session)?;
            let (markdown, _) = writer.finish();
            if !markdown.is_empty() {
                outputs.push(markdown);
            }
        }
        Ok(outputs.join("\n"))
    }
}

impl Converter for Formatter {
    type Error = Error;

    fn options(&self) -> &Options {
        &self.options
    }

    fn backend(&self) -> Backend {
        Backend::Markdown
    }

    fn derive_output_path(
        &self,
        input: &Path,
        _doc: &Document,
    ) -> Result<Option<PathBuf>, Self::Error> {
        let output = input.with_extension(self.backend().output_extension());
        // Avoid overwriting the input file
        if output == input {
            return Err(Error::OutputPathSameAsInput(output));
        }
        Ok(Some(output))
    }

    #[tracing::instrument(skip_all, fields(source = ?source_file))]
    fn write_to<W: Write>(
        &self,
        doc: &Document,
        mut writer: W,
        source_file: Option<&Path>,
    ) -> Result<(), Self::Error> {
        let now = Instant::now();
        let (output, _) = self.run(doc, Session::default())?;
        let (markdown, _) = output.finish();
        writer.write_all(markdown.as_bytes())?;
        writer.flush()?;
        let elapsed = now.elapsed();
        tracing::debug!(time = elapsed.pretty_print(), "time to format document");
        if self.options.timings() {
            tracing::info!(time = elapsed.pretty_print(), source = ?source_file, "formatted document");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use mdext_parser::Options as ParserOptions;
    use pretty_assertions::assert_eq;

    use super::*;

    fn parse_all(inputs: &[&str]) -> Result<Vec<Document>, Error> {
        Ok(inputs
            .iter()
            .map(|input| parse(input, &ParserOptions::default()))
            .collect::<Result<Vec<_>, _>>()?)
    }

    const FIRST: &str = "# Intro {#intro}\n\nSee[^n].\n\n[^n]: Note\n";
    const SECOND: &str = "# Intro\n\nAgain[^n].\n\n[^n]: Other\n";

    #[test]
    fn test_merge_renames_later_ids() -> Result<(), Error> {
        let docs = parse_all(&[FIRST, SECOND])?;
        let merged = Formatter::default().merge(&[&docs[0], &docs[1]])?;
        assert_eq!(
            merged,
            "# Intro {#intro}\n\nSee[^n].\n\n[^n]: Note\n\n\
             # Intro {#intro1}\n\nAgain[^n1].\n\n[^n1]: Other\n"
        );
        Ok(())
    }

    #[test]
    fn test_merge_order_decides_renames() -> Result<(), Error> {
        let docs = parse_all(&[FIRST, SECOND])?;
        let merged = Formatter::default().merge(&[&docs[1], &docs[0]])?;
        assert_eq!(
            merged,
            "# Intro\n\nAgain[^n].\n\n[^n]: Other\n\n\
             # Intro {#intro1}\n\nSee[^n1].\n\n[^n1]: Note\n"
        );
        Ok(())
    }

    #[test]
    fn test_merge_without_collisions_is_concatenation() -> Result<(), Error> {
        let docs = parse_all(&["one {#a}\n", "two {#b}\n"])?;
        let merged = Formatter::default().merge(&[&docs[0], &docs[1]])?;
        assert_eq!(merged, "one {#a}\n\ntwo {#b}\n");
        Ok(())
    }

    #[test]
    fn test_merge_rename_skips_ids_of_same_document() -> Result<(), Error> {
        let docs = parse_all(&["one {#intro}\n", "two {#intro}\n\nthree {#intro1}\n"])?;
        let merged = Formatter::default().merge(&[&docs[0], &docs[1]])?;
        assert_eq!(
            merged,
            "one {#intro}\n\ntwo {#intro2}\n\nthree {#intro1}\n"
        );
        Ok(())
    }

    const TRANSLATABLE: &str =
        "# Title {#intro}\n\nA figure{#fig:one .wide}.\n\nSee[^note].\n\n[^note]: The note.\n";

    #[test]
    fn test_translation_export() -> Result<(), Error> {
        let docs = parse_all(&[TRANSLATABLE])?;
        let handoff = Formatter::default().translation_export(&docs[0])?;
        assert_eq!(
            handoff.markdown,
            "# Title {#_1_}\n\nA figure{#_2_:_3_ .wide}.\n\nSee[^_4_].\n\n[^_4_]: The note.\n"
        );
        assert_eq!(
            handoff.non_translating_text().collect::<Vec<_>>(),
            vec!["#_1_", "#_2_:_3_", ".wide", "_4_", "_4_"]
        );
        assert_eq!(handoff.store.len(), 4);
        Ok(())
    }

    #[test]
    fn test_translation_round_trip() -> Result<(), Error> {
        let docs = parse_all(&[TRANSLATABLE])?;
        let formatter = Formatter::default();
        let handoff = formatter.translation_export(&docs[0])?;
        let translated = handoff
            .markdown
            .replace("A figure", "Une figure")
            .replace("The note.", "La note.");
        let restored = formatter.translation_reimport(&translated, handoff.store)?;
        assert_eq!(
            restored,
            "# Title {#intro}\n\nUne figure{#fig:one .wide}.\n\nSee[^note].\n\n[^note]: La note.\n"
        );
        Ok(())
    }

    #[test]
    fn test_untranslated_round_trip_is_identity() -> Result<(), Error> {
        let input = "Para {id=x title='t'}\n\n```rust {#code}\nlet a = 1;\n```\n";
        let docs = parse_all(&[input])?;
        let formatter = Formatter::default();
        let handoff = formatter.translation_export(&docs[0])?;
        let restored = formatter.translation_reimport(&handoff.markdown, handoff.store)?;
        assert_eq!(restored, input);
        Ok(())
    }

    #[test]
    #[tracing_test::traced_test]
    fn test_unknown_placeholder_is_kept() -> Result<(), Error> {
        let restored = Formatter::default()
            .translation_reimport("para {#_9_}\n", TranslationStore::default())?;
        assert_eq!(restored, "para {#_9_}\n");
        assert!(logs_contain("unknown translation placeholder"));
        Ok(())
    }

    #[test]
    fn test_derive_output_path() -> Result<(), Error> {
        let docs = parse_all(&["x\n"])?;
        let path = Formatter::default().derive_output_path(Path::new("notes.md"), &docs[0])?;
        assert_eq!(path, Some(PathBuf::from("notes.formatted.md")));
        Ok(())
    }

    #[test]
    fn test_empty_document() -> Result<(), Error> {
        let docs = parse_all(&[""])?;
        assert_eq!(Formatter::default().convert_to_string(&docs[0])?, "");
        Ok(())
    }
}
