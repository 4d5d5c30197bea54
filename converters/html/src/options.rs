use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Which element of a fenced code block receives the block's attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FencedCodeAddType {
    /// Only the `<pre>` tag.
    AddToPre,
    /// Only the `<code>` tag.
    AddToCode,
    /// Both tags receive the same attributes.
    AddToPreCode,
}

/// HTML renderer configuration.
///
/// Build with [`HtmlOptions::builder`] or load a partial JSON object with
/// [`HtmlOptions::from_json`]; every missing key keeps its default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
#[non_exhaustive]
pub struct HtmlOptions {
    footnote_ref_prefix: String,
    footnote_ref_suffix: String,
    footnote_back_ref_string: String,
    footnote_link_ref_class: String,
    footnote_back_link_ref_class: String,
    fenced_code_add_attributes: Option<FencedCodeAddType>,
    recheck_undefined_references: bool,
    highlight_open: Option<String>,
    highlight_close: Option<String>,
    render_heading_ids: bool,
    toc: bool,
    toc_levels: u8,
    template: Option<String>,
    variables: BTreeMap<String, String>,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            footnote_ref_prefix: String::new(),
            footnote_ref_suffix: String::new(),
            footnote_back_ref_string: "&#8617;".to_string(),
            footnote_link_ref_class: "footnote-ref".to_string(),
            footnote_back_link_ref_class: "footnote-backref".to_string(),
            fenced_code_add_attributes: None,
            recheck_undefined_references: false,
            highlight_open: None,
            highlight_close: None,
            render_heading_ids: true,
            toc: false,
            toc_levels: 2,
            template: None,
            variables: BTreeMap::new(),
        }
    }
}

impl HtmlOptions {
    /// Create a new builder with default values.
    #[must_use]
    pub fn builder() -> HtmlOptionsBuilder {
        HtmlOptionsBuilder::default()
    }

    /// Reads options from JSON; missing keys keep their defaults.
    ///
    /// # Errors
    /// Returns [`Error::Options`] if the JSON is malformed or a value has the
    /// wrong type.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    /// Text written before the footnote number at a reference site.
    #[must_use]
    pub fn footnote_ref_prefix(&self) -> &str {
        &self.footnote_ref_prefix
    }

    /// Text written after the footnote number at a reference site.
    #[must_use]
    pub fn footnote_ref_suffix(&self) -> &str {
        &self.footnote_ref_suffix
    }

    /// Content of every back-reference link (default: `&#8617;`).
    #[must_use]
    pub fn footnote_back_ref_string(&self) -> &str {
        &self.footnote_back_ref_string
    }

    #[must_use]
    pub fn footnote_link_ref_class(&self) -> &str {
        &self.footnote_link_ref_class
    }

    #[must_use]
    pub fn footnote_back_link_ref_class(&self) -> &str {
        &self.footnote_back_link_ref_class
    }

    /// The configured fenced code routing, if any was set explicitly.
    #[must_use]
    pub fn fenced_code_add_attributes(&self) -> Option<FencedCodeAddType> {
        self.fenced_code_add_attributes
    }

    /// The fenced code routing in effect for a document.
    ///
    /// When unset, info string attributes go to `<pre>` only and anything else
    /// goes to both tags.
    #[must_use]
    pub fn effective_fenced_code_add_attributes(
        &self,
        info_attributes: bool,
    ) -> FencedCodeAddType {
        match self.fenced_code_add_attributes {
            Some(add_type) => add_type,
            None if info_attributes => FencedCodeAddType::AddToPre,
            None => FencedCodeAddType::AddToPreCode,
        }
    }

    /// Re-resolve tentative footnote references before rendering.
    #[must_use]
    pub fn recheck_undefined_references(&self) -> bool {
        self.recheck_undefined_references
    }

    /// Custom highlight markup, if both open and close strings are set.
    #[must_use]
    pub fn highlight_tags(&self) -> Option<(&str, &str)> {
        match (&self.highlight_open, &self.highlight_close) {
            (Some(open), Some(close)) => Some((open, close)),
            (Some(_) | None, _) => None,
        }
    }

    #[must_use]
    pub fn render_heading_ids(&self) -> bool {
        self.render_heading_ids
    }

    #[must_use]
    pub fn toc(&self) -> bool {
        self.toc
    }

    /// Deepest heading level listed in the table of contents.
    #[must_use]
    pub fn toc_levels(&self) -> u8 {
        self.toc_levels
    }

    /// Name of the page template wrapping the body.
    #[must_use]
    pub fn template(&self) -> Option<&str> {
        self.template.as_deref()
    }

    /// Template variables, by name.
    #[must_use]
    pub fn variables(&self) -> &BTreeMap<String, String> {
        &self.variables
    }
}

/// Builder for [`HtmlOptions`].
#[derive(Debug, Default, Clone)]
pub struct HtmlOptionsBuilder {
    options: HtmlOptions,
}

impl HtmlOptionsBuilder {
    #[must_use]
    pub fn footnote_ref_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.options.footnote_ref_prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn footnote_ref_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.options.footnote_ref_suffix = suffix.into();
        self
    }

    #[must_use]
    pub fn footnote_back_ref_string(mut self, back_ref: impl Into<String>) -> Self {
        self.options.footnote_back_ref_string = back_ref.into();
        self
    }

    #[must_use]
    pub fn footnote_link_ref_class(mut self, class: impl Into<String>) -> Self {
        self.options.footnote_link_ref_class = class.into();
        self
    }

    #[must_use]
    pub fn footnote_back_link_ref_class(mut self, class: impl Into<String>) -> Self {
        self.options.footnote_back_link_ref_class = class.into();
        self
    }

    #[must_use]
    pub fn fenced_code_add_attributes(mut self, add_type: FencedCodeAddType) -> Self {
        self.options.fenced_code_add_attributes = Some(add_type);
        self
    }

    #[must_use]
    pub fn recheck_undefined_references(mut self, recheck: bool) -> Self {
        self.options.recheck_undefined_references = recheck;
        self
    }

    /// Replace `<mark>`/`</mark>` with custom strings. Attributes are not
    /// written into custom markup.
    #[must_use]
    pub fn highlight_tags(mut self, open: impl Into<String>, close: impl Into<String>) -> Self {
        self.options.highlight_open = Some(open.into());
        self.options.highlight_close = Some(close.into());
        self
    }

    #[must_use]
    pub fn render_heading_ids(mut self, render: bool) -> Self {
        self.options.render_heading_ids = render;
        self
    }

    #[must_use]
    pub fn toc(mut self, toc: bool) -> Self {
        self.options.toc = toc;
        self
    }

    #[must_use]
    pub fn toc_levels(mut self, levels: u8) -> Self {
        self.options.toc_levels = levels;
        self
    }

    #[must_use]
    pub fn template(mut self, name: impl Into<String>) -> Self {
        self.options.template = Some(name.into());
        self
    }

    #[must_use]
    pub fn variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.variables.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn build(self) -> HtmlOptions {
        self.options
    }
}
