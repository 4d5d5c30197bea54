//! Id uniquification across merged documents.
//!
//! Attribute ids, generated heading ids and footnote ids share one namespace.
//! Each document is checked against the ids of every document before it; a
//! colliding id gets the smallest numeric suffix that is still free.

use mdext_converters_core::{
    attributes::has_id_attribute,
    id::{HeadingIdGenerator, IdGenerator},
};
use mdext_parser::{Document, NodeKind};
use rustc_hash::{FxHashMap, FxHashSet};

/// Original id to the id it is written as.
pub(crate) type UniqueIds = FxHashMap<String, String>;

/// Every id `document` defines, in document order.
fn defined_ids(document: &Document) -> Vec<String> {
    let source = document.source();
    let headings = HeadingIdGenerator::from_document(document);
    let mut ids = Vec::new();
    for node in document.descendants() {
        match node.kind() {
            NodeKind::Attribute(attribute) if attribute.is_id(source) => {
                let value = attribute.value(source);
                if !value.is_empty() {
                    ids.push(value.to_string());
                }
            }
            NodeKind::Heading(_) if !has_id_attribute(document, node.id()) => {
                if let Some(id) = headings.id_for(node.id()) {
                    ids.push(id.to_string());
                }
            }
            NodeKind::FootnoteBlock(block) => ids.push(block.key.clone()),
            NodeKind::Document
            | NodeKind::Paragraph
            | NodeKind::Heading(_)
            | NodeKind::FencedCode(_)
            | NodeKind::Text
            | NodeKind::SoftBreak
            | NodeKind::Highlight(_)
            | NodeKind::TextSpan
            | NodeKind::Attributes(_)
            | NodeKind::AttributesDelimiter(_)
            | NodeKind::Attribute(_)
            | NodeKind::Footnote(_) => {}
        }
    }
    ids
}

/// One table per document, in merge order.
#[tracing::instrument(skip_all, fields(documents = documents.len()))]
pub(crate) fn uniquification_tables(documents: &[&Document]) -> Vec<UniqueIds> {
    let mut used: FxHashSet<String> = FxHashSet::default();
    let mut tables = Vec::with_capacity(documents.len());
    for (index, document) in documents.iter().enumerate() {
        let ids = defined_ids(document);
        // Renames also stay clear of ids this document defines itself.
        let mut taken: FxHashSet<String> = ids.iter().cloned().collect();
        let mut table = UniqueIds::default();
        for id in &ids {
            if table.contains_key(id) || !used.contains(id) {
                continue;
            }
            let mut suffix = 1;
            let mut unique = format!("{id}{suffix}");
            while used.contains(&unique) || taken.contains(&unique) {
                suffix += 1;
                unique = format!("{id}{suffix}");
            }
            tracing::debug!(document = index, %id, %unique, "id made unique");
            taken.insert(unique.clone());
            table.insert(id.clone(), unique);
        }
        for id in ids {
            let written = table.get(&id).cloned().unwrap_or(id);
            used.insert(written);
        }
        tables.push(table);
    }
    tables
}

#[cfg(test)]
mod tests {
    use mdext_parser::{Error, Options, parse};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn tables(inputs: &[&str]) -> Result<Vec<Vec<(String, String)>>, Error> {
        let documents = inputs
            .iter()
            .map(|input| parse(input, &Options::default()))
            .collect::<Result<Vec<_>, _>>()?;
        let refs: Vec<&Document> = documents.iter().collect();
        Ok(uniquification_tables(&refs)
            .into_iter()
            .map(|table| {
                let mut entries: Vec<(String, String)> = table.into_iter().collect();
                entries.sort();
                entries
            })
            .collect())
    }

    fn entry(from: &str, to: &str) -> (String, String) {
        (from.to_string(), to.to_string())
    }

    #[test]
    fn test_later_document_is_renamed() -> Result<(), Error> {
        let result = tables(&["# A {#intro}\n", "# B {#intro}\n"])?;
        assert_eq!(result, vec![vec![], vec![entry("intro", "intro1")]]);
        Ok(())
    }

    #[test]
    fn test_smallest_free_suffix() -> Result<(), Error> {
        let result = tables(&["# Intro\n", "# X {#intro1}\n", "# Intro\n"])?;
        assert_eq!(result, vec![vec![], vec![], vec![entry("intro", "intro2")]]);
        Ok(())
    }

    #[test]
    fn test_shared_namespace() -> Result<(), Error> {
        let result = tables(&["# Note\n", "x[^note]\n\n[^note]: y\n"])?;
        assert_eq!(result, vec![vec![], vec![entry("note", "note1")]]);
        Ok(())
    }

    #[rstest]
    #[case::own_id(
        &["one {#intro}\n", "two {#intro}\n\nthree {#intro1}\n"],
        &[("intro", "intro2")]
    )]
    #[case::own_heading_id(
        &["# Intro\n", "# Intro\n\n# Other {#intro1}\n"],
        &[("intro", "intro2")]
    )]
    #[case::earlier_rename(
        &[
            "a {#a}\n\nb {#a1}\n\nc {#a2}\n\nd {#a3}\n\ne {#a4}\n\nf {#a5}\n\n\
             g {#a6}\n\nh {#a7}\n\ni {#a8}\n\nj {#a9}\n\nk {#a10}\n",
            "x {#a}\n\ny {#a1}\n",
        ],
        &[("a", "a11"), ("a1", "a12")]
    )]
    fn test_rename_avoids_taken_ids(
        #[case] inputs: &[&str],
        #[case] renames: &[(&str, &str)],
    ) -> Result<(), Error> {
        let result = tables(inputs)?;
        let expected: Vec<(String, String)> =
            renames.iter().map(|(from, to)| entry(from, to)).collect();
        assert_eq!(result.last(), Some(&expected));
        Ok(())
    }

    #[test]
    fn test_renamed_ids_stay_taken() -> Result<(), Error> {
        let result = tables(&["{#a}\npara\n", "para {#a}\n", "para {#a1}\n"])?;
        assert_eq!(
            result,
            vec![vec![], vec![entry("a", "a1")], vec![entry("a1", "a11")]]
        );
        Ok(())
    }
}
