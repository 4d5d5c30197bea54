use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::{Arena, Error, KeepType, NodeId, NodeKind};

/// Case policy applied when normalizing footnote keys.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FootnoteKeyCase {
    #[default]
    Sensitive,
    Insensitive,
}

/// Keyed store of footnote definitions plus the referenced-blocks list that
/// drives ordinal assignment.
#[derive(Debug, Clone, Default)]
pub struct FootnoteRepository {
    keep: KeepType,
    key_case: FootnoteKeyCase,
    blocks: FxHashMap<String, NodeId>,
    alternates: FxHashMap<String, Vec<NodeId>>,
    definitions: Vec<NodeId>,
    referenced: Vec<NodeId>,
}

impl FootnoteRepository {
    #[must_use]
    pub fn new(keep: KeepType, key_case: FootnoteKeyCase) -> Self {
        Self {
            keep,
            key_case,
            ..Self::default()
        }
    }

    /// Trims the id, collapses inner whitespace runs, and applies the case policy.
    #[must_use]
    pub fn normalize_key(&self, id: &str) -> String {
        let collapsed = id.split_whitespace().collect::<Vec<_>>().join(" ");
        match self.key_case {
            FootnoteKeyCase::Sensitive => collapsed,
            FootnoteKeyCase::Insensitive => collapsed.to_lowercase(),
        }
    }

    /// Stores a definition under `id`, honoring the duplicate policy.
    ///
    /// Returns the block that lost its place under the key (the new block when
    /// it is discarded, the previous one when it is replaced), if any.
    #[tracing::instrument(level = "debug", skip(self, arena))]
    pub fn put(
        &mut self,
        arena: &mut Arena,
        id: &str,
        block: NodeId,
    ) -> Result<Option<NodeId>, Error> {
        let key = self.normalize_key(id);
        arena
            .footnote_block_mut(block)
            .ok_or(Error::UnknownNode(block))?
            .key.clone_from(&key);

        let Some(existing) = self.blocks.get(&key).copied() else {
            self.blocks.insert(key, block);
            self.definitions.push(block);
            return Ok(None);
        };

        match self.keep {
            KeepType::First => {
                tracing::debug!(%key, "duplicate footnote definition discarded");
                Ok(Some(block))
            }
            KeepType::Last => {
                self.definitions.retain(|id| *id != existing);
                self.definitions.push(block);
                self.blocks.insert(key, block);
                Ok(Some(existing))
            }
            KeepType::All => {
                self.alternates.entry(key).or_default().push(block);
                Ok(None)
            }
        }
    }

    /// The definition a reference with this id resolves to.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<NodeId> {
        self.blocks.get(&self.normalize_key(id)).copied()
    }

    /// Additional definitions kept for `id` under [`KeepType::All`].
    #[must_use]
    pub fn alternates(&self, id: &str) -> &[NodeId] {
        self.alternates
            .get(&self.normalize_key(id))
            .map_or(&[], Vec::as_slice)
    }

    /// Kept definitions in definition order.
    #[must_use]
    pub fn definitions(&self) -> &[NodeId] {
        &self.definitions
    }

    /// Referenced blocks; after [`FootnoteRepository::resolve_ordinals`] this is
    /// ordinal order.
    #[must_use]
    pub fn referenced_blocks(&self) -> &[NodeId] {
        &self.referenced
    }

    /// Binds `footnote` to `block` and records the reference.
    ///
    /// # Errors
    /// Returns [`Error::UnknownNode`] if either id is not a node of the
    /// expected kind.
    pub fn add_reference(
        &mut self,
        arena: &mut Arena,
        block: NodeId,
        footnote: NodeId,
    ) -> Result<(), Error> {
        let offset = arena.try_get(footnote)?.span.start;

        let definition = arena
            .footnote_block_mut(block)
            .ok_or(Error::UnknownNode(block))?;
        if definition.first_reference_offset.is_none() {
            self.referenced.push(block);
        }
        definition.first_reference_offset = Some(
            definition
                .first_reference_offset
                .map_or(offset, |current| current.min(offset)),
        );
        let reference_ordinal = definition.reference_count;
        definition.reference_count += 1;

        let reference = arena
            .footnote_mut(footnote)
            .ok_or(Error::UnknownNode(footnote))?;
        reference.block = Some(block);
        reference.reference_ordinal = reference_ordinal;
        tracing::trace!(%block, %footnote, reference_ordinal, "footnote reference bound");
        Ok(())
    }

    /// Stable-sorts the referenced blocks by first reference offset and numbers
    /// them from 1.
    ///
    /// # Errors
    /// Returns [`Error::UnknownNode`] if a referenced id is not a footnote block.
    pub fn resolve_ordinals(&mut self, arena: &mut Arena) -> Result<(), Error> {
        let mut keyed = Vec::with_capacity(self.referenced.len());
        for block in &self.referenced {
            let offset = arena
                .footnote_block(*block)
                .ok_or(Error::UnknownNode(*block))?
                .first_reference_offset
                .unwrap_or(usize::MAX);
            keyed.push((*block, offset));
        }
        keyed.sort_by_key(|(_, offset)| *offset);
        self.referenced = keyed.into_iter().map(|(block, _)| block).collect();

        for (index, block) in self.referenced.iter().enumerate() {
            arena
                .footnote_block_mut(*block)
                .ok_or(Error::UnknownNode(*block))?
                .ordinal = index + 1;
        }
        tracing::debug!(referenced = self.referenced.len(), "footnote ordinals resolved");
        Ok(())
    }

    /// Binds every tentative reference under the root whose definition is now
    /// known, visiting in document order. Ordinals are re-resolved only when
    /// something new was bound.
    ///
    /// # Errors
    /// Returns an error if the tree links are broken.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn resolve_footnotes(&mut self, source: &str, arena: &mut Arena) -> Result<bool, Error> {
        let mut bound = false;
        for id in arena.descendants(NodeId::ROOT) {
            let Some(NodeKind::Footnote(footnote)) = arena.get(id).map(|node| &node.kind) else {
                continue;
            };
            if !footnote.is_tentative() {
                continue;
            }
            let text = footnote.text.text(source).trim();
            if text.is_empty() {
                continue;
            }
            if let Some(block) = self.get(text) {
                self.add_reference(arena, block, id)?;
                bound = true;
            }
        }
        if bound {
            self.resolve_ordinals(arena)?;
        }
        Ok(bound)
    }
}
