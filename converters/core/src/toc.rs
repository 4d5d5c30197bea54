//! Table of contents entries.
//!
//! Only top-level headings take part; nested headings (inside footnote
//! definitions) never do.

use mdext_parser::{Document, NodeId};

use crate::id::IdGenerator;

/// Configuration for the table of contents.
#[derive(Debug, Clone, Copy)]
#[non_exhaustive]
pub struct Config {
    levels: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self { levels: 2 }
    }
}

impl Config {
    /// Include headings up to `levels` deep.
    #[must_use]
    pub fn with_levels(levels: u8) -> Self {
        Self { levels }
    }

    /// Get the number of heading levels to include (default: 2).
    #[must_use]
    pub fn levels(&self) -> u8 {
        self.levels
    }
}

/// One heading listed in the table of contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// The heading node.
    pub node: NodeId,
    /// Heading level, 1 to 6.
    pub level: u8,
    /// The anchor the entry links to.
    pub id: String,
}

/// Top-level headings within the configured depth that have an anchor id.
#[must_use]
pub fn entries(document: &Document, ids: &dyn IdGenerator, config: Config) -> Vec<Entry> {
    document
        .root()
        .children()
        .filter_map(|node| {
            let heading = node.kind().as_heading()?;
            if heading.level > config.levels {
                return None;
            }
            let id = ids.id_for(node.id())?;
            Some(Entry {
                node: node.id(),
                level: heading.level,
                id: id.to_string(),
            })
        })
        .collect()
}
