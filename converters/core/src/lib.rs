//! Core traits and utilities for mdext document converters.
//!
//! This crate provides the shared infrastructure used by the HTML renderer and
//! the Markdown formatter:
//!
//! - [`Converter`] - trait that all converters implement
//! - [`Visitor`](visitor::Visitor) - visitor pattern over the closed node enum
//! - [`Options`] - configuration shared by every converter
//! - [`HeadingIdGenerator`](id::HeadingIdGenerator) - anchor ids for headings
//!
//! # Example
//!
//! ```
//! use mdext_converters_core::{GeneratorMetadata, Options};
//!
//! let options = Options::builder()
//!     .generator_metadata(GeneratorMetadata::new("mdext", "0.1.0"))
//!     .timings(true)
//!     .build();
//! assert_eq!(options.generator_metadata().name(), "mdext");
//! ```
//!
//! # Modules
//!
//! - [`attributes`] - Effective attribute lookups on owner nodes
//! - [`id`] - Heading anchor id generation
//! - [`toc`] - Table of contents entries
//! - [`visitor`] - Visitor pattern infrastructure for tree traversal

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use mdext_parser::Document;

pub mod attributes;
mod backend;
pub mod id;
pub mod toc;
pub mod visitor;

pub use backend::Backend;

/// Converter options.
///
/// Use [`Options::builder()`] to construct an instance. This struct is marked
/// `#[non_exhaustive]` to allow adding new fields in future minor versions.
#[derive(Debug, Clone, Default)]
#[non_exhaustive]
pub struct Options {
    generator_metadata: GeneratorMetadata,
    timings: bool,
}

impl Options {
    /// Create a new builder with default values.
    #[must_use]
    pub fn builder() -> OptionsBuilder {
        OptionsBuilder::default()
    }

    /// Get the generator metadata.
    #[must_use]
    pub fn generator_metadata(&self) -> &GeneratorMetadata {
        &self.generator_metadata
    }

    /// Get whether timing information should be output.
    #[must_use]
    pub fn timings(&self) -> bool {
        self.timings
    }
}

/// Builder for [`Options`].
///
/// Use [`Options::builder()`] to create a new builder.
#[derive(Debug, Default, Clone)]
pub struct OptionsBuilder {
    generator_metadata: GeneratorMetadata,
    timings: bool,
}

impl OptionsBuilder {
    /// Set the generator metadata (name and version).
    #[must_use]
    pub fn generator_metadata(mut self, meta: GeneratorMetadata) -> Self {
        self.generator_metadata = meta;
        self
    }

    /// Enable or disable timing output.
    #[must_use]
    pub fn timings(mut self, timings: bool) -> Self {
        self.timings = timings;
        self
    }

    /// Build the [`Options`] instance.
    #[must_use]
    pub fn build(self) -> Options {
        Options {
            generator_metadata: self.generator_metadata,
            timings: self.timings,
        }
    }
}

/// Extension trait for formatting [`Duration`](std::time::Duration) in human-readable form.
pub trait PrettyDuration {
    /// Returns a human-readable string representation of the duration.
    ///
    /// - Automatically selects appropriate unit (ns, µs, ms, s)
    /// - Rounds to 2 decimal places
    /// - Strips trailing zeros
    fn pretty_print(&self) -> String;
}

impl PrettyDuration for std::time::Duration {
    fn pretty_print(&self) -> String {
        let nanos = self.as_nanos();

        // f64 represents every integer up to u128::MAX closely enough for display.
        #[allow(clippy::cast_precision_loss)]
        let f_nanos = nanos as f64;
        let (value, unit) = match nanos {
            0..=999 => return format!("{nanos}ns"),
            1_000..=999_999 => (f_nanos / 1_000.0, "µs"),
            1_000_000..=999_999_999 => (f_nanos / 1_000_000.0, "ms"),
            _ => (f_nanos / 1_000_000_000.0, "s"),
        };
        let number = format!("{value:.2}");
        format!("{}{unit}", number.trim_end_matches('0').trim_end_matches('.'))
    }
}

/// Generator metadata for tracking which tool produced the output.
///
/// Exposed to HTML page templates as the `generator` variable.
#[derive(Debug, Default, Clone)]
#[non_exhaustive]
pub struct GeneratorMetadata {
    name: String,
    version: String,
}

impl GeneratorMetadata {
    /// Create new generator metadata.
    #[must_use]
    pub fn new<S: AsRef<str>>(name: S, version: S) -> Self {
        Self {
            name: name.as_ref().to_string(),
            version: version.as_ref().to_string(),
        }
    }

    /// Get the generator name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the generator version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }
}

impl std::fmt::Display for GeneratorMetadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} v{}", self.name, self.version)
    }
}

/// Trait for document converters (HTML, Markdown).
///
/// Converters receive an already parsed [`Document`]; parsing and reading
/// input is the caller's job.
pub trait Converter {
    /// The error type for this converter.
    type Error: From<std::io::Error>;

    /// The shared converter options.
    fn options(&self) -> &Options;

    /// The output format this converter produces.
    fn backend(&self) -> Backend;

    /// Where the output for `input` goes, or `None` to write to stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if no usable output path exists (for instance it
    /// would overwrite the input).
    fn derive_output_path(
        &self,
        input: &Path,
        doc: &Document,
    ) -> Result<Option<PathBuf>, Self::Error>;

    /// Convert `doc` into `writer`.
    ///
    /// # Errors
    ///
    /// Returns an error if conversion or writing fails.
    fn write_to<W: Write>(
        &self,
        doc: &Document,
        writer: W,
        source_file: Option<&Path>,
    ) -> Result<(), Self::Error>;

    /// Convert a pre-parsed document, writing next to `file` when given and
    /// to stdout otherwise. Returns the path written, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if conversion or writing fails.
    fn convert(&self, doc: &Document, file: Option<&Path>) -> Result<Option<PathBuf>, Self::Error> {
        let output = match file {
            Some(input) => self.derive_output_path(input, doc)?,
            None => None,
        };
        if let Some(path) = &output {
            tracing::debug!(source = ?file, destination = ?path, backend = %self.backend(), "converting document");
            let mut writer = BufWriter::new(File::create(path)?);
            self.write_to(doc, &mut writer, file)?;
            writer.flush()?;
        } else {
            let stdout = std::io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            self.write_to(doc, &mut writer, file)?;
            writer.flush()?;
        }
        Ok(output)
    }

    /// Convert a pre-parsed document into a string.
    ///
    /// # Errors
    ///
    /// Returns an error if conversion fails or the output is not UTF-8.
    fn convert_to_string(&self, doc: &Document) -> Result<String, Self::Error>
    where
        Self::Error: From<std::string::FromUtf8Error>,
    {
        let mut buffer = Vec::new();
        self.write_to(doc, &mut buffer, None)?;
        Ok(String::from_utf8(buffer)?)
    }
}

/// Walk the error source chain to find a parser error.
///
/// This utility function searches through the error chain looking for
/// an [`mdext_parser::Error`] instance, which allows the CLI to provide
/// rich error displays with source code context.
///
/// Works automatically with any error type that uses `#[error(transparent)]`
/// or `#[from]` so that `source()` is implemented correctly.
pub fn find_parser_error<'e>(
    e: &'e (dyn std::error::Error + 'static),
) -> Option<&'e mdext_parser::Error> {
    if let Some(parser_error) = e.downcast_ref::<mdext_parser::Error>() {
        return Some(parser_error);
    }

    let mut current = e.source();
    while let Some(err) = current {
        if let Some(parser_error) = err.downcast_ref::<mdext_parser::Error>() {
            return Some(parser_error);
        }
        current = err.source();
    }
    None
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[derive(thiserror::Error, Debug)]
    enum Wrapper {
        #[error("conversion failed")]
        Parser(#[from] mdext_parser::Error),
    }

    #[rstest]
    #[case::nanos(Duration::from_nanos(512), "512ns")]
    #[case::micros(Duration::from_nanos(1_500), "1.5µs")]
    #[case::millis(Duration::from_millis(20), "20ms")]
    #[case::seconds(Duration::from_millis(1_250), "1.25s")]
    fn test_pretty_print(#[case] duration: Duration, #[case] expected: &str) {
        assert_eq!(duration.pretty_print(), expected);
    }

    #[test]
    fn test_find_parser_error_in_chain() {
        let error = Wrapper::from(mdext_parser::Error::Deserialize("bad".to_string()));
        let found = find_parser_error(&error);
        assert!(matches!(found, Some(mdext_parser::Error::Deserialize(message)) if message == "bad"));
    }

    #[test]
    fn test_generator_metadata_display() {
        assert_eq!(GeneratorMetadata::new("mdext", "0.1.0").to_string(), "mdext v0.1.0");
    }
}
