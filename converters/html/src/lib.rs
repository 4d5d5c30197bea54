//! HTML renderer for mdext documents.
//!
//! Renders paragraphs, headings, fenced code, highlights and attribute spans,
//! applying every `{...}` tag to its owner element, and appends the footnote
//! list after the body. Optionally wraps the body in a page template with a
//! table of contents.
//!
//! ```
//! use mdext_converters_core::Converter;
//! use mdext_converters_html::{HtmlOptions, Processor};
//! use mdext_parser::{Options, parse};
//!
//! let document = parse("# Hi {.big}\n", &Options::default())?;
//! let processor = Processor::default().with_html_options(HtmlOptions::default());
//! let html = processor.convert_to_string(&document)?;
//! assert_eq!(html, "<h1 id=\"hi\" class=\"big\">Hi</h1>\n");
//! # Ok::<(), mdext_converters_html::Error>(())
//! ```

use std::{
    borrow::Cow,
    io::Write,
    path::{Path, PathBuf},
    sync::Arc,
    time::Instant,
};

use mdext_converters_core::{
    Backend, Converter, Options, PrettyDuration, attributes::plain_text, visitor::Visitor,
};
use mdext_parser::Document;

mod attributes;
mod code;
mod error;
mod footnotes;
mod heading;
mod html_visitor;
mod inlines;
mod options;
mod paragraph;
mod template;
mod toc;

pub use attributes::HtmlAttributes;
pub use error::Error;
pub use html_visitor::HtmlVisitor;
pub use options::{FencedCodeAddType, HtmlOptions, HtmlOptionsBuilder};
pub use template::{DEFAULT_TEMPLATE, TemplateRegistry};

#[derive(Clone, Debug, Default)]
pub struct Processor {
    options: Options,
    pub(crate) html: Arc<HtmlOptions>,
    templates: Arc<TemplateRegistry>,
}

impl Processor {
    #[must_use]
    pub fn new(options: Options, html: HtmlOptions) -> Self {
        Self {
            options,
            html: Arc::new(html),
            templates: Arc::new(TemplateRegistry::new()),
        }
    }

    #[must_use]
    pub fn with_html_options(mut self, html: HtmlOptions) -> Self {
        self.html = Arc::new(html);
        self
    }

    #[must_use]
    pub fn with_templates(mut self, templates: TemplateRegistry) -> Self {
        self.templates = Arc::new(templates);
        self
    }

    #[must_use]
    pub fn html_options(&self) -> &HtmlOptions {
        &self.html
    }

    fn render_page<W: Write>(
        &self,
        template: &str,
        doc: &Document,
        mut writer: W,
        source_file: Option<&Path>,
    ) -> Result<(), Error> {
        let mut visitor = HtmlVisitor::new(Vec::new(), self.clone());
        visitor.visit_document(doc)?;
        let mut toc_html = Vec::new();
        if self.html.toc() {
            toc::render(doc, visitor.ids(), &mut toc_html, self)?;
        }
        let body = String::from_utf8(visitor.into_writer())?;
        let toc = String::from_utf8(toc_html)?;
        let generator = self.options.generator_metadata().to_string();
        let title = self
            .html
            .variables()
            .get("title")
            .cloned()
            .unwrap_or_else(|| attributes::escape(&default_title(doc, source_file)));
        let page = template::expand(template, |name| match name {
            "body" => Some(body.as_str()),
            "toc" => Some(toc.as_str()),
            "generator" => Some(generator.as_str()),
            "title" => Some(title.as_str()),
            other => self.html.variables().get(other).map(String::as_str),
        });
        writer.write_all(page.as_bytes())?;
        writer.flush()?;
        Ok(())
    }
}

/// The first top-level `#` heading, else the input file stem.
fn default_title(doc: &Document, source_file: Option<&Path>) -> String {
    doc.root()
        .children()
        .find(|node| node.kind().as_heading().is_some_and(|heading| heading.level == 1))
        .map(plain_text)
        .or_else(|| {
            source_file
                .and_then(Path::file_stem)
                .map(|stem| stem.to_string_lossy().into_owned())
        })
        .unwrap_or_default()
}

impl Converter for Processor {
    type Error = Error;

    fn options(&self) -> &Options {
        &self.options
    }

    fn backend(&self) -> Backend {
        Backend::Html
    }

    fn derive_output_path(
        &self,
        input: &Path,
        _doc: &Document,
    ) -> Result<Option<PathBuf>, Self::Error> {
        let output = input.with_extension(self.backend().output_extension());
        if output == input {
            return Err(Error::OutputPathSameAsInput(output));
        }
        Ok(Some(output))
    }

    #[tracing::instrument(skip_all, fields(source = ?source_file))]
    fn write_to<W: Write>(
        &self,
        doc: &Document,
        writer: W,
        source_file: Option<&Path>,
    ) -> Result<(), Self::Error> {
        let now = Instant::now();
        let doc = if self.html.recheck_undefined_references() {
            footnotes::recheck(doc)?
        } else {
            Cow::Borrowed(doc)
        };
        if let Some(name) = self.html.template() {
            let template = self.templates.require(name)?;
            self.render_page(template, &doc, writer, source_file)?;
        } else {
            let mut visitor = HtmlVisitor::new(writer, self.clone());
            visitor.visit_document(&doc)?;
            visitor.into_writer().flush()?;
        }
        let elapsed = now.elapsed();
        tracing::debug!(time = elapsed.pretty_print(), "time to convert document");
        if self.options.timings() {
            tracing::info!(time = elapsed.pretty_print(), source = ?source_file, "converted document");
        }
        Ok(())
    }
}
