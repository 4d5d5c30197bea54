use rustc_hash::FxHashMap;

use crate::{KeepType, NodeId};

/// Lookup index from an owner node to the attribute tags that target it.
///
/// This is not a tree relationship: the repository owns neither the owner nor
/// the tags, it only records ids in registration order.
#[derive(Debug, Clone, Default)]
pub struct NodeAttributeRepository {
    keep: KeepType,
    entries: FxHashMap<NodeId, Vec<NodeId>>,
    owners: Vec<NodeId>,
    owner_by_tag: FxHashMap<NodeId, NodeId>,
}

impl NodeAttributeRepository {
    #[must_use]
    pub fn new(keep: KeepType) -> Self {
        Self {
            keep,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn keep(&self) -> KeepType {
        self.keep
    }

    /// Registers `tag` against `owner`, honoring the duplicate policy. Returns
    /// whether the tag was kept.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn put(&mut self, owner: NodeId, tag: NodeId) -> bool {
        let list = self.entries.entry(owner).or_default();
        if list.is_empty() {
            self.owners.push(owner);
        } else {
            match self.keep {
                KeepType::First => {
                    tracing::trace!(%owner, %tag, "owner already has attributes, tag discarded");
                    return false;
                }
                KeepType::Last => {
                    for displaced in list.drain(..) {
                        self.owner_by_tag.remove(&displaced);
                    }
                }
                KeepType::All => {}
            }
        }
        list.push(tag);
        self.owner_by_tag.insert(tag, owner);
        true
    }

    /// Tags registered against `owner`, in registration order.
    #[must_use]
    pub fn get(&self, owner: NodeId) -> &[NodeId] {
        self.entries.get(&owner).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn contains(&self, owner: NodeId) -> bool {
        !self.get(owner).is_empty()
    }

    /// The owner a registered tag applies to.
    #[must_use]
    pub fn owner_of(&self, tag: NodeId) -> Option<NodeId> {
        self.owner_by_tag.get(&tag).copied()
    }

    /// `(owner, tags)` pairs in the order owners were first registered.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &[NodeId])> {
        self.owners
            .iter()
            .map(|owner| (*owner, self.get(*owner)))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}
