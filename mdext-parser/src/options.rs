use serde::{Deserialize, Serialize};

use crate::{Error, FootnoteKeyCase, KeepType};

/// Parser configuration.
///
/// Every field can be set independently, either through [`Options::builder`]
/// or by deserializing a (possibly partial) JSON object with
/// [`Options::from_json`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
#[non_exhaustive]
pub struct Options {
    /// Duplicate policy for attribute tags targeting the same owner.
    pub attributes_keep: KeepType,
    /// A tag touching preceding text wraps that text into a span owner instead
    /// of applying to the enclosing block.
    pub assign_text_attributes: bool,
    /// Parse a trailing `{...}` in a fenced code info string.
    pub fenced_code_info_attributes: bool,
    /// Accept bare `{.}` / `{#}` as span delimiters.
    pub use_empty_implicit_as_span_delimiter: bool,
    /// Text between a span delimiter and its attribute tag is wrapped into the
    /// span.
    pub wrap_non_attribute_text: bool,
    /// Duplicate policy for footnote definitions.
    pub footnotes_keep: KeepType,
    pub footnote_key_case: FootnoteKeyCase,
    /// Continuation indent of footnote definition content.
    pub footnote_content_indent: usize,
    /// Enable `==highlight==`.
    pub highlight: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            attributes_keep: KeepType::All,
            assign_text_attributes: true,
            fenced_code_info_attributes: false,
            use_empty_implicit_as_span_delimiter: false,
            wrap_non_attribute_text: true,
            footnotes_keep: KeepType::First,
            footnote_key_case: FootnoteKeyCase::Sensitive,
            footnote_content_indent: 4,
            highlight: true,
        }
    }
}

impl Options {
    /// Create a new `OptionsBuilder` for fluent configuration.
    ///
    /// # Example
    ///
    /// ```
    /// use mdext_parser::{KeepType, Options};
    ///
    /// let options = Options::builder()
    ///     .with_attributes_keep(KeepType::Last)
    ///     .with_fenced_code_info_attributes()
    ///     .build();
    /// assert!(options.fenced_code_info_attributes);
    /// ```
    #[must_use]
    pub fn builder() -> OptionsBuilder {
        OptionsBuilder::default()
    }

    /// Create a new `Options` with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads options from JSON; missing keys keep their defaults.
    ///
    /// # Errors
    /// Returns [`Error::Deserialize`] if the JSON is malformed or a value has the
    /// wrong type.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        serde_json::from_str(json).map_err(|error| Error::Deserialize(error.to_string()))
    }
}

/// Builder for `Options`.
///
/// Create an `OptionsBuilder` using `Options::builder()`.
#[derive(Debug, Clone, Default)]
#[non_exhaustive]
pub struct OptionsBuilder {
    options: Options,
}

impl OptionsBuilder {
    #[must_use]
    pub fn with_attributes_keep(mut self, keep: KeepType) -> Self {
        self.options.attributes_keep = keep;
        self
    }

    /// Tags touching preceding text apply to the enclosing block instead of
    /// wrapping the text.
    #[must_use]
    pub fn without_text_attributes(mut self) -> Self {
        self.options.assign_text_attributes = false;
        self
    }

    #[must_use]
    pub fn with_fenced_code_info_attributes(mut self) -> Self {
        self.options.fenced_code_info_attributes = true;
        self
    }

    #[must_use]
    pub fn with_span_delimiters(mut self) -> Self {
        self.options.use_empty_implicit_as_span_delimiter = true;
        self
    }

    /// Only the node right before a tag is wrapped when a span delimiter is
    /// open; text in between is left alone.
    #[must_use]
    pub fn without_wrapping_non_attribute_text(mut self) -> Self {
        self.options.wrap_non_attribute_text = false;
        self
    }

    #[must_use]
    pub fn with_footnotes_keep(mut self, keep: KeepType) -> Self {
        self.options.footnotes_keep = keep;
        self
    }

    #[must_use]
    pub fn with_footnote_key_case(mut self, key_case: FootnoteKeyCase) -> Self {
        self.options.footnote_key_case = key_case;
        self
    }

    #[must_use]
    pub fn with_footnote_content_indent(mut self, indent: usize) -> Self {
        self.options.footnote_content_indent = indent;
        self
    }

    #[must_use]
    pub fn without_highlight(mut self) -> Self {
        self.options.highlight = false;
        self
    }

    #[must_use]
    pub fn build(self) -> Options {
        self.options
    }
}
