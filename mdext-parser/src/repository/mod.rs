//! Per-document cross-reference indexes.

use serde::{Deserialize, Serialize};

mod attributes;
mod footnotes;

pub use attributes::NodeAttributeRepository;
pub use footnotes::{FootnoteKeyCase, FootnoteRepository};

/// What to do when a second entry arrives for a key that is already present.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeepType {
    /// The first entry stays, later ones are discarded.
    #[default]
    First,
    /// Each new entry replaces the previous one.
    Last,
    /// Every entry is kept; lookups see the first one.
    All,
}
