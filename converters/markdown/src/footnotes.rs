//! Placement and order of footnote definitions in formatted output.

use mdext_parser::{Document, NodeId, NodeRef};

use crate::{ElementPlacement, FormatOptions};

/// Where relocated definitions are written.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Anchor {
    /// Every definition stays where it is.
    #[default]
    InPlace,
    Top,
    Bottom,
    /// In place of this definition.
    At(NodeId),
}

/// The definitions to write at the anchor, in output order.
#[derive(Debug, Default)]
pub(crate) struct FootnotePlan {
    pub(crate) anchor: Anchor,
    pub(crate) blocks: Vec<NodeId>,
}

impl FootnotePlan {
    pub(crate) fn new(document: &Document, options: &FormatOptions) -> Self {
        let definitions: Vec<NodeRef<'_>> = document
            .root()
            .children()
            .filter(|node| node.kind().as_footnote_block().is_some())
            .collect();
        let anchor = match options.footnote_placement() {
            ElementPlacement::AsIs => return Self::default(),
            ElementPlacement::DocumentTop => Anchor::Top,
            ElementPlacement::DocumentBottom => Anchor::Bottom,
            ElementPlacement::GroupWithFirst => definitions
                .first()
                .map_or(Anchor::Bottom, |node| Anchor::At(node.id())),
            ElementPlacement::GroupWithLast => definitions
                .last()
                .map_or(Anchor::Bottom, |node| Anchor::At(node.id())),
        };

        let sort = options.footnote_sort();
        let mut entries: Vec<(&str, bool, NodeId)> = definitions
            .iter()
            .filter_map(|node| {
                let block = node.kind().as_footnote_block()?;
                Some((block.key.as_str(), block.is_referenced(), node.id()))
            })
            .filter(|(_, used, _)| *used || !sort.deletes_unused())
            .collect();
        if sort.is_sorted() {
            entries.sort_by(|a, b| a.0.cmp(b.0));
        }
        if sort == crate::ElementPlacementSort::SortUnusedLast {
            entries.sort_by_key(|(_, used, _)| !used);
        }
        tracing::debug!(?anchor, kept = entries.len(), total = definitions.len(), "footnote placement");
        Self {
            anchor,
            blocks: entries.into_iter().map(|(_, _, id)| id).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use mdext_parser::{Error, Options, parse};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::ElementPlacementSort;

    use super::*;

    const INPUT: &str = "[^b]: B\n\nUse [^b] and [^a].\n\n[^0]: Z\n\n[^a]: A\n";

    fn keys(document: &Document, plan: &FootnotePlan) -> Vec<String> {
        plan.blocks
            .iter()
            .filter_map(|id| document.node(*id))
            .filter_map(|node| node.kind().as_footnote_block().map(|b| b.key.clone()))
            .collect()
    }

    #[rstest]
    #[case::as_is(ElementPlacementSort::AsIs, &["b", "0", "a"])]
    #[case::sort(ElementPlacementSort::Sort, &["0", "a", "b"])]
    #[case::sort_unused_last(ElementPlacementSort::SortUnusedLast, &["a", "b", "0"])]
    #[case::sort_delete_unused(ElementPlacementSort::SortDeleteUnused, &["a", "b"])]
    #[case::delete_unused(ElementPlacementSort::DeleteUnused, &["b", "a"])]
    fn test_sort(#[case] sort: ElementPlacementSort, #[case] expected: &[&str]) -> Result<(), Error> {
        let document = parse(INPUT, &Options::default())?;
        let options = FormatOptions::builder()
            .footnote_placement(ElementPlacement::DocumentBottom)
            .footnote_sort(sort)
            .build();
        let plan = FootnotePlan::new(&document, &options);
        assert_eq!(plan.anchor, Anchor::Bottom);
        assert_eq!(keys(&document, &plan), expected);
        Ok(())
    }

    #[test]
    fn test_unused_last_after_sort() -> Result<(), Error> {
        let document = parse("[^a]: A\n\n[^z]: Z\n\n[^m]: M\n\nx[^z] y[^m]\n", &Options::default())?;
        let options = FormatOptions::builder()
            .footnote_placement(ElementPlacement::DocumentTop)
            .footnote_sort(ElementPlacementSort::SortUnusedLast)
            .build();
        let plan = FootnotePlan::new(&document, &options);
        assert_eq!(keys(&document, &plan), vec!["m", "z", "a"]);
        Ok(())
    }

    #[test]
    fn test_group_anchors() -> Result<(), Error> {
        let document = parse(INPUT, &Options::default())?;
        let definitions: Vec<NodeId> = document
            .root()
            .children()
            .filter(|node| node.kind().as_footnote_block().is_some())
            .map(NodeRef::id)
            .collect();
        let first = FootnotePlan::new(
            &document,
            &FormatOptions::builder()
                .footnote_placement(ElementPlacement::GroupWithFirst)
                .build(),
        );
        let last = FootnotePlan::new(
            &document,
            &FormatOptions::builder()
                .footnote_placement(ElementPlacement::GroupWithLast)
                .build(),
        );
        assert_eq!(Some(&first.anchor), definitions.first().map(|id| Anchor::At(*id)).as_ref());
        assert_eq!(Some(&last.anchor), definitions.last().map(|id| Anchor::At(*id)).as_ref());
        assert_eq!(
            FootnotePlan::new(&document, &FormatOptions::default()).anchor,
            Anchor::InPlace
        );
        Ok(())
    }
}
