//! Placeholder ids for the translation round trip.
//!
//! An export replaces every id attribute and footnote id with an opaque
//! placeholder built from [`FormatOptions::translation_id_format`], and keeps
//! the mapping in a [`TranslationStore`]. The store is handed back, by value,
//! to the reimport that restores the originals.

use std::ops::Range;

use mdext_parser::Options as ParserOptions;
use rustc_hash::FxHashMap;

use crate::FormatOptions;

/// What the formatter is producing.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Purpose {
    #[default]
    Format,
    /// Ids become placeholders.
    TranslationExport,
    /// Placeholders become ids again.
    TranslationReimport,
}

impl Purpose {
    pub(crate) fn is_transforming(self) -> bool {
        match self {
            Purpose::Format => false,
            Purpose::TranslationExport | Purpose::TranslationReimport => true,
        }
    }
}

/// Mapping between placeholders and the ids they stand for, valid for one
/// export and the matching reimport.
#[derive(Debug, Default)]
pub struct TranslationStore {
    parser_options: ParserOptions,
    placeholders: usize,
    /// Id part (plain id, category or category id) to placeholder.
    encoded: FxHashMap<String, String>,
    /// Placeholder to id part.
    decoded: FxHashMap<String, String>,
    /// Encoded attribute (`#_1_`, `#_1_:_2_`) to the attribute as written.
    original_attributes: FxHashMap<String, String>,
    footnotes: FxHashMap<String, String>,
    footnotes_decoded: FxHashMap<String, String>,
}

impl TranslationStore {
    pub(crate) fn new(parser_options: ParserOptions) -> Self {
        Self {
            parser_options,
            ..Self::default()
        }
    }

    /// Options the exported document was parsed with; the translated text is
    /// parsed with the same ones.
    #[must_use]
    pub fn parser_options(&self) -> &ParserOptions {
        &self.parser_options
    }

    /// Number of placeholders handed out.
    #[must_use]
    pub fn len(&self) -> usize {
        self.placeholders
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.placeholders == 0
    }

    fn next_placeholder(&mut self, options: &FormatOptions) -> String {
        self.placeholders += 1;
        options.placeholder(self.placeholders)
    }

    fn encode_part(&mut self, part: &str, options: &FormatOptions) -> String {
        if let Some(encoded) = self.encoded.get(part) {
            return encoded.clone();
        }
        let encoded = self.next_placeholder(options);
        self.encoded.insert(part.to_string(), encoded.clone());
        self.decoded.insert(encoded.clone(), part.to_string());
        encoded
    }

    /// The `#placeholder` written in place of an id attribute.
    ///
    /// A plain id gets a fresh placeholder per occurrence; `category:id`
    /// encodes both halves through the shared part map.
    pub(crate) fn encode_id_attribute(
        &mut self,
        written: &str,
        value: &str,
        options: &FormatOptions,
    ) -> String {
        let encoded = match value.split_once(':') {
            Some((category, id)) => format!(
                "#{}:{}",
                self.encode_part(category, options),
                self.encode_part(id, options)
            ),
            None => format!("#{}", self.next_placeholder(options)),
        };
        self.original_attributes
            .insert(encoded.clone(), written.to_string());
        encoded
    }

    /// The attribute as originally written, for the value of a `#placeholder`.
    pub(crate) fn decode_id_attribute(&self, value: &str) -> Option<&str> {
        self.original_attributes
            .get(&format!("#{value}"))
            .map(String::as_str)
    }

    /// The placeholder for a footnote id; every use of an id shares one.
    pub(crate) fn encode_footnote(&mut self, id: &str, options: &FormatOptions) -> String {
        if let Some(encoded) = self.footnotes.get(id) {
            return encoded.clone();
        }
        let encoded = self.next_placeholder(options);
        self.footnotes.insert(id.to_string(), encoded.clone());
        self.footnotes_decoded
            .insert(encoded.clone(), id.to_string());
        encoded
    }

    pub(crate) fn decode_footnote(&self, placeholder: &str) -> Option<&str> {
        self.footnotes_decoded.get(placeholder).map(String::as_str)
    }

    /// The id part behind a placeholder, for `category:id` halves.
    #[must_use]
    pub fn decode_part(&self, placeholder: &str) -> Option<&str> {
        self.decoded.get(placeholder).map(String::as_str)
    }
}

/// Result of a translation export.
#[derive(Debug)]
pub struct TranslationHandoff {
    /// The document with ids replaced by placeholders.
    pub markdown: String,
    /// Byte ranges of `markdown` a translator must not alter.
    pub non_translating: Vec<Range<usize>>,
    /// Mapping for the one reimport of the translated text.
    pub store: TranslationStore,
}

impl TranslationHandoff {
    /// The text of every non-translating range, in order.
    #[must_use]
    pub fn non_translating_text(&self) -> impl Iterator<Item = &str> {
        self.non_translating
            .iter()
            .filter_map(|range| self.markdown.get(range.clone()))
    }
}
