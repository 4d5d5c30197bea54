//! Heading anchor id generation.
//!
//! Ids are assigned in document order. An explicit `{#id}` or `id=` attribute
//! on the heading wins; otherwise the id is derived from the heading text and
//! made unique with a `-1`, `-2`... suffix.

use mdext_parser::{Document, NodeId, NodeKind};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::attributes::{explicit_id, plain_text};

/// Produces anchor ids for nodes, and unique ids for arbitrary text.
pub trait IdGenerator {
    /// The id assigned to `node`, if any.
    fn id_for(&self, node: NodeId) -> Option<&str>;

    /// A fresh id for `text`, unique among the ids handed out so far.
    /// Returns `None` when the text yields an empty id.
    fn generate(&mut self, text: &str) -> Option<String>;
}

/// Anchor ids for the headings of one document.
#[derive(Debug, Clone, Default)]
pub struct HeadingIdGenerator {
    ids: FxHashMap<NodeId, String>,
    used: FxHashSet<String>,
}

impl HeadingIdGenerator {
    /// Create an empty generator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign ids to every heading of `document`, in document order.
    #[must_use]
    pub fn from_document(document: &Document) -> Self {
        let mut generator = Self::new();
        for node in document.descendants() {
            if !matches!(node.kind(), NodeKind::Heading(_)) {
                continue;
            }
            let id = match explicit_id(document, node.id()) {
                Some(explicit) => {
                    generator.used.insert(explicit.to_string());
                    Some(explicit.to_string())
                }
                None => generator.generate(&plain_text(node)),
            };
            if let Some(id) = id {
                tracing::trace!(heading = %node.id(), %id, "heading id assigned");
                generator.ids.insert(node.id(), id);
            }
        }
        generator
    }

    /// Whether `id` has already been handed out.
    #[must_use]
    pub fn is_used(&self, id: &str) -> bool {
        self.used.contains(id)
    }

    /// Heading ids in no particular order.
    pub fn ids(&self) -> impl Iterator<Item = (NodeId, &str)> {
        self.ids.iter().map(|(node, id)| (*node, id.as_str()))
    }
}

impl IdGenerator for HeadingIdGenerator {
    fn id_for(&self, node: NodeId) -> Option<&str> {
        self.ids.get(&node).map(String::as_str)
    }

    fn generate(&mut self, text: &str) -> Option<String> {
        let base = slug(text);
        if base.is_empty() {
            return None;
        }
        let mut id = base.clone();
        let mut suffix = 0;
        while self.used.contains(&id) {
            suffix += 1;
            id = format!("{base}-{suffix}");
        }
        self.used.insert(id.clone());
        Some(id)
    }
}

/// Lowercase alphanumerics; whitespace, `-` and `_` become single dashes.
#[must_use]
pub fn slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for ch in text.trim().chars() {
        if ch.is_alphanumeric() {
            slug.extend(ch.to_lowercase());
        } else if (ch.is_whitespace() || ch == '-' || ch == '_') && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use mdext_parser::{Error, NodeRef, Options, parse};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::words("Hello World", "hello-world")]
    #[case::punctuation("What's new?", "whats-new")]
    #[case::collapse("a -- b__c", "a-b-c")]
    #[case::unicode("Ärger Über", "ärger-über")]
    #[case::empty("!!!", "")]
    fn test_slug(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(slug(text), expected);
    }

    #[test]
    fn test_heading_ids() -> Result<(), Error> {
        let input = "# Intro\n\n# Intro\n\n## Custom {#intro-1}\n\n# Intro\n\n# ???\n";
        let document = parse(input, &Options::default())?;
        let generator = HeadingIdGenerator::from_document(&document);
        let ids: Vec<Option<&str>> = document
            .root()
            .children()
            .map(NodeRef::id)
            .map(|id| generator.id_for(id))
            .collect();
        assert_eq!(
            ids,
            vec![
                Some("intro"),
                Some("intro-1"),
                Some("intro-1"),
                Some("intro-2"),
                None
            ]
        );
        Ok(())
    }

    #[test]
    fn test_generate_after_explicit() -> Result<(), Error> {
        let document = parse("# A {#taken}\n", &Options::default())?;
        let mut generator = HeadingIdGenerator::from_document(&document);
        assert!(generator.is_used("taken"));
        assert_eq!(generator.generate("Taken").as_deref(), Some("taken-1"));
        Ok(())
    }
}
