//! HTML attributes collected from the tags applied to an owner node.

use std::io::Write;

use mdext_converters_core::attributes::applied;
use mdext_parser::{Document, NodeId};

use crate::Error;

/// An ordered set of HTML attributes for one element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlAttributes {
    entries: Vec<(String, String)>,
}

impl HtmlAttributes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace any previous value of `name`; the attribute moves to the end.
    pub fn set(&mut self, name: &str, value: &str) {
        self.remove(name);
        self.entries.push((name.to_string(), value.to_string()));
    }

    /// Append to the space separated `class` value.
    pub fn add_class(&mut self, class: &str) {
        if class.is_empty() {
            return;
        }
        if let Some((_, value)) = self.entries.iter_mut().find(|(name, _)| name == "class") {
            if !value.is_empty() {
                value.push(' ');
            }
            value.push_str(class);
        } else {
            self.entries.push(("class".to_string(), class.to_string()));
        }
    }

    pub fn remove(&mut self, name: &str) {
        self.entries.retain(|(existing, _)| existing != name);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write ` name="value"` for every attribute, values escaped.
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn render(&self, w: &mut dyn Write) -> Result<(), Error> {
        for (name, value) in &self.entries {
            write!(w, " {name}=\"{}\"", escape(value))?;
        }
        Ok(())
    }

    /// Apply every attribute tag registered against `owner`.
    ///
    /// An implicit `#id` yields to `generated_id` when the owner already has
    /// one, so anchors stay stable. `class` accumulates; any other explicit
    /// name is last-wins.
    ///
    /// # Errors
    /// Returns [`mdext_parser::Error::InvariantViolation`] for an implicit
    /// attribute that is neither a class nor an id.
    pub fn apply(
        &mut self,
        document: &Document,
        owner: NodeId,
        generated_id: Option<&str>,
    ) -> Result<(), Error> {
        let source = document.source();
        for (node, attribute) in applied(document, owner) {
            let value = attribute.value(source);
            if !attribute.is_implicit_name() {
                let name = attribute.name(source).trim();
                if name.is_empty() {
                    continue;
                }
                if name == "class" {
                    self.add_class(value);
                } else {
                    self.set(name, value);
                }
            } else if attribute.is_class(source) {
                self.add_class(value);
            } else if attribute.is_id(source) {
                self.set("id", generated_id.unwrap_or(value));
            } else {
                return Err(mdext_parser::Error::invariant_violation(
                    document.location(node.span()),
                    format!(
                        "implicit attribute `{}` is neither a class nor an id",
                        attribute.name(source)
                    ),
                )
                .into());
            }
        }
        Ok(())
    }

    /// Shorthand for a fresh set with `owner`'s attributes applied.
    ///
    /// # Errors
    /// See [`HtmlAttributes::apply`].
    pub fn for_owner(
        document: &Document,
        owner: NodeId,
        generated_id: Option<&str>,
    ) -> Result<Self, Error> {
        let mut attributes = Self::new();
        attributes.apply(document, owner, generated_id)?;
        Ok(attributes)
    }
}

/// Escape text for element content and attribute values.
pub(crate) fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
