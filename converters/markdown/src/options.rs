use serde::{Deserialize, Serialize};

use crate::Error;

/// Keep, add or remove an optional run of whitespace.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiscretionaryText {
    #[default]
    AsIs,
    Add,
    Remove,
}

/// Quoting policy for attribute values.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttributeValueQuotes {
    #[default]
    AsIs,
    NoQuotesSinglePreferred,
    NoQuotesDoublePreferred,
    SinglePreferred,
    DoublePreferred,
    SingleQuotes,
    DoubleQuotes,
}

impl AttributeValueQuotes {
    /// The quote to write around `value`; `original` is the quote it had in
    /// the source, empty when unquoted.
    #[must_use]
    pub fn quotes_for<'a>(self, value: &str, original: &'a str) -> &'a str {
        let single = value.contains('\'');
        let double = value.contains('"');
        match self {
            Self::NoQuotesSinglePreferred | Self::NoQuotesDoublePreferred
                if !needs_quotes(value) =>
            {
                ""
            }
            Self::NoQuotesSinglePreferred | Self::SinglePreferred => {
                if !single || double {
                    "'"
                } else {
                    "\""
                }
            }
            Self::NoQuotesDoublePreferred | Self::DoublePreferred => {
                if !double || single {
                    "\""
                } else {
                    "'"
                }
            }
            Self::SingleQuotes => "'",
            Self::DoubleQuotes => "\"",
            Self::AsIs => original,
        }
    }
}

/// Whether `value` cannot be written without quotes and still read back as
/// the same value.
pub(crate) fn needs_quotes(value: &str) -> bool {
    value.chars().any(|ch| {
        ch.is_whitespace() || matches!(ch, '\'' | '"' | '=' | '<' | '>' | '{' | '}' | '`')
    })
}

/// Preferred spelling of id and class attributes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttributeImplicitName {
    #[default]
    AsIs,
    /// `#id` / `.class`
    ImplicitPreferred,
    /// `id=...` / `class=...`
    ExplicitPreferred,
}

/// Where footnote definitions are written.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementPlacement {
    #[default]
    AsIs,
    DocumentTop,
    DocumentBottom,
    GroupWithFirst,
    GroupWithLast,
}

/// Order of relocated footnote definitions.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementPlacementSort {
    #[default]
    AsIs,
    Sort,
    SortUnusedLast,
    SortDeleteUnused,
    DeleteUnused,
}

impl ElementPlacementSort {
    #[must_use]
    pub fn is_sorted(self) -> bool {
        matches!(
            self,
            Self::Sort | Self::SortUnusedLast | Self::SortDeleteUnused
        )
    }

    #[must_use]
    pub fn deletes_unused(self) -> bool {
        matches!(self, Self::SortDeleteUnused | Self::DeleteUnused)
    }
}

/// Markdown formatter configuration.
///
/// The defaults reproduce attribute tags exactly as written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
#[non_exhaustive]
pub struct FormatOptions {
    attributes_spaces: DiscretionaryText,
    attribute_equal_space: DiscretionaryText,
    attribute_value_quotes: AttributeValueQuotes,
    attribute_id: AttributeImplicitName,
    attribute_class: AttributeImplicitName,
    attributes_sort: bool,
    attributes_combine_consecutive: bool,
    footnote_placement: ElementPlacement,
    footnote_sort: ElementPlacementSort,
    translation_id_format: String,
    footnote_indent: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            attributes_spaces: DiscretionaryText::AsIs,
            attribute_equal_space: DiscretionaryText::AsIs,
            attribute_value_quotes: AttributeValueQuotes::AsIs,
            attribute_id: AttributeImplicitName::AsIs,
            attribute_class: AttributeImplicitName::AsIs,
            attributes_sort: false,
            attributes_combine_consecutive: false,
            footnote_placement: ElementPlacement::AsIs,
            footnote_sort: ElementPlacementSort::AsIs,
            translation_id_format: "_{}_".to_string(),
            footnote_indent: 4,
        }
    }
}

impl FormatOptions {
    #[must_use]
    pub fn builder() -> FormatOptionsBuilder {
        FormatOptionsBuilder::default()
    }

    /// Reads options from JSON; missing keys keep their defaults.
    ///
    /// # Errors
    /// Returns [`Error::Options`] for malformed JSON or mistyped values.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    /// Whitespace just inside `{` and `}`.
    #[must_use]
    pub fn attributes_spaces(&self) -> DiscretionaryText {
        self.attributes_spaces
    }

    /// Whitespace around `=`.
    #[must_use]
    pub fn attribute_equal_space(&self) -> DiscretionaryText {
        self.attribute_equal_space
    }

    #[must_use]
    pub fn attribute_value_quotes(&self) -> AttributeValueQuotes {
        self.attribute_value_quotes
    }

    #[must_use]
    pub fn attribute_id(&self) -> AttributeImplicitName {
        self.attribute_id
    }

    #[must_use]
    pub fn attribute_class(&self) -> AttributeImplicitName {
        self.attribute_class
    }

    #[must_use]
    pub fn attributes_sort(&self) -> bool {
        self.attributes_sort
    }

    /// Merge every tag of one owner into the first of them.
    #[must_use]
    pub fn attributes_combine_consecutive(&self) -> bool {
        self.attributes_combine_consecutive
    }

    #[must_use]
    pub fn footnote_placement(&self) -> ElementPlacement {
        self.footnote_placement
    }

    /// Ignored while placement is [`ElementPlacement::AsIs`].
    #[must_use]
    pub fn footnote_sort(&self) -> ElementPlacementSort {
        self.footnote_sort
    }

    /// Placeholder pattern for translated ids; `{}` receives the counter.
    #[must_use]
    pub fn translation_id_format(&self) -> &str {
        &self.translation_id_format
    }

    /// Indentation of footnote definition continuation lines.
    #[must_use]
    pub fn footnote_indent(&self) -> usize {
        self.footnote_indent
    }

    /// The `n`-th translation placeholder.
    #[must_use]
    pub fn placeholder(&self, n: usize) -> String {
        if self.translation_id_format.contains("{}") {
            self.translation_id_format.replacen("{}", &n.to_string(), 1)
        } else {
            format!("{}{n}", self.translation_id_format)
        }
    }
}

/// Builder for [`FormatOptions`].
#[derive(Debug, Default, Clone)]
pub struct FormatOptionsBuilder {
    options: FormatOptions,
}

impl FormatOptionsBuilder {
    #[must_use]
    pub fn attributes_spaces(mut self, spaces: DiscretionaryText) -> Self {
        self.options.attributes_spaces = spaces;
        self
    }

    #[must_use]
    pub fn attribute_equal_space(mut self, spaces: DiscretionaryText) -> Self {
        self.options.attribute_equal_space = spaces;
        self
    }

    #[must_use]
    pub fn attribute_value_quotes(mut self, quotes: AttributeValueQuotes) -> Self {
        self.options.attribute_value_quotes = quotes;
        self
    }

    #[must_use]
    pub fn attribute_id(mut self, format: AttributeImplicitName) -> Self {
        self.options.attribute_id = format;
        self
    }

    #[must_use]
    pub fn attribute_class(mut self, format: AttributeImplicitName) -> Self {
        self.options.attribute_class = format;
        self
    }

    #[must_use]
    pub fn attributes_sort(mut self, sort: bool) -> Self {
        self.options.attributes_sort = sort;
        self
    }

    #[must_use]
    pub fn attributes_combine_consecutive(mut self, combine: bool) -> Self {
        self.options.attributes_combine_consecutive = combine;
        self
    }

    #[must_use]
    pub fn footnote_placement(mut self, placement: ElementPlacement) -> Self {
        self.options.footnote_placement = placement;
        self
    }

    #[must_use]
    pub fn footnote_sort(mut self, sort: ElementPlacementSort) -> Self {
        self.options.footnote_sort = sort;
        self
    }

    #[must_use]
    pub fn translation_id_format(mut self, format: impl Into<String>) -> Self {
        self.options.translation_id_format = format.into();
        self
    }

    #[must_use]
    pub fn footnote_indent(mut self, indent: usize) -> Self {
        self.options.footnote_indent = indent;
        self
    }

    #[must_use]
    pub fn build(self) -> FormatOptions {
        self.options
    }
}
