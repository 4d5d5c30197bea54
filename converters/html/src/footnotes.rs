//! Footnote references and the footnote list.
//!
//! References render as `<sup id="fnref-N"><a href="#fn-N">N</a></sup>`; the
//! k-th additional reference to the same definition gets `fnref-N-k`. The list
//! after the body holds one `<li id="fn-N">` per referenced definition, in
//! ordinal order, with one back link per reference.

use std::borrow::Cow;

use mdext_converters_core::visitor::WritableVisitor;
use mdext_parser::{Document, Footnote, NodeKind, NodeRef};

use crate::{Error, HtmlAttributes, Processor, attributes::escape};

/// Anchor id of a reference site.
pub(crate) fn reference_anchor(ordinal: usize, reference_ordinal: usize) -> String {
    if reference_ordinal == 0 {
        format!("fnref-{ordinal}")
    } else {
        format!("fnref-{ordinal}-{reference_ordinal}")
    }
}

pub(crate) fn visit_footnote<V: WritableVisitor<Error = Error>>(
    node: NodeRef<'_>,
    footnote: &Footnote,
    visitor: &mut V,
    processor: &Processor,
) -> Result<(), Error> {
    let document = node.document();
    let Some(block) = footnote.block else {
        let w = visitor.writer_mut();
        write!(w, "[^{}]", escape(node.slice(footnote.text)))?;
        return Ok(());
    };
    let ordinal = document
        .try_node(block)?
        .kind()
        .as_footnote_block()
        .map_or(0, |block| block.ordinal);
    let anchor = reference_anchor(ordinal, footnote.reference_ordinal);
    let mut attributes = HtmlAttributes::new();
    attributes.set("id", &anchor);
    attributes.apply(document, node.id(), Some(&anchor))?;

    let options = &processor.html;
    let mut link = HtmlAttributes::new();
    if !options.footnote_link_ref_class().is_empty() {
        link.set("class", options.footnote_link_ref_class());
    }
    link.set("href", &format!("#fn-{ordinal}"));

    let w = visitor.writer_mut();
    write!(w, "<sup")?;
    attributes.render(w)?;
    write!(w, "><a")?;
    link.render(w)?;
    write!(
        w,
        ">{}{ordinal}{}</a></sup>",
        options.footnote_ref_prefix(),
        options.footnote_ref_suffix()
    )?;
    Ok(())
}

/// Write the footnote list; nothing when no definition is referenced.
pub(crate) fn render_list<V: WritableVisitor<Error = Error>>(
    document: &Document,
    visitor: &mut V,
    processor: &Processor,
) -> Result<(), Error> {
    let blocks = document.footnotes().referenced_blocks();
    if blocks.is_empty() {
        return Ok(());
    }
    let options = &processor.html;
    let mut w = visitor.writer_mut();
    writeln!(w, "<div class=\"footnotes\">")?;
    writeln!(w, "<ol>")?;
    for &id in blocks {
        let node = document.try_node(id)?;
        let NodeKind::FootnoteBlock(block) = node.kind() else {
            return Err(mdext_parser::Error::UnknownNode(id).into());
        };
        let ordinal = block.ordinal;
        w = visitor.writer_mut();
        writeln!(w, "<li id=\"fn-{ordinal}\">")?;
        let _ = w;
        visitor.visit_children(node)?;
        w = visitor.writer_mut();
        for reference_ordinal in 0..block.reference_count {
            let mut back_link = HtmlAttributes::new();
            back_link.set(
                "href",
                &format!("#{}", reference_anchor(ordinal, reference_ordinal)),
            );
            let class = options.footnote_back_link_ref_class();
            if !class.is_empty() {
                back_link.set("class", class);
            }
            write!(w, "<a")?;
            back_link.render(w)?;
            writeln!(w, ">{}</a>", options.footnote_back_ref_string())?;
        }
        writeln!(w, "</li>")?;
    }
    writeln!(w, "</ol>")?;
    writeln!(w, "</div>")?;
    Ok(())
}

/// Bind references whose definition became known after parsing, re-resolving
/// ordinals once if anything was bound.
///
/// The document is only cloned when it still has tentative references.
#[tracing::instrument(skip_all)]
pub(crate) fn recheck(document: &Document) -> Result<Cow<'_, Document>, Error> {
    let tentative = document
        .descendants()
        .filter_map(|node| node.kind().as_footnote())
        .any(Footnote::is_tentative);
    if !tentative {
        return Ok(Cow::Borrowed(document));
    }
    let mut rechecked = document.clone();
    if rechecked.resolve_footnotes()? {
        tracing::debug!(
            referenced = rechecked.footnotes().referenced_blocks().len(),
            "late footnote references bound"
        );
        Ok(Cow::Owned(rechecked))
    } else {
        Ok(Cow::Borrowed(document))
    }
}

#[cfg(test)]
mod tests {
    use mdext_parser::{Options, parse};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::{HtmlOptions, tests::render};

    use super::*;

    #[rstest]
    #[case::first(1, 0, "fnref-1")]
    #[case::second(1, 1, "fnref-1-1")]
    #[case::third(3, 2, "fnref-3-2")]
    fn test_reference_anchor(
        #[case] ordinal: usize,
        #[case] reference_ordinal: usize,
        #[case] expected: &str,
    ) {
        assert_eq!(reference_anchor(ordinal, reference_ordinal), expected);
    }

    #[test]
    fn test_repeated_references() -> Result<(), Error> {
        let document = parse("A[^n] B[^n] C[^n]\n\n[^n]: Note.\n", &Options::default())?;
        let expected = r##"<p>A<sup id="fnref-1"><a class="footnote-ref" href="#fn-1">1</a></sup> B<sup id="fnref-1-1"><a class="footnote-ref" href="#fn-1">1</a></sup> C<sup id="fnref-1-2"><a class="footnote-ref" href="#fn-1">1</a></sup></p>
<div class="footnotes">
<ol>
<li id="fn-1">
<p>Note.</p>
<a href="#fnref-1" class="footnote-backref">&#8617;</a>
<a href="#fnref-1-1" class="footnote-backref">&#8617;</a>
<a href="#fnref-1-2" class="footnote-backref">&#8617;</a>
</li>
</ol>
</div>
"##;
        assert_eq!(render(&document, HtmlOptions::default())?, expected);
        Ok(())
    }

    #[test]
    fn test_list_follows_ordinal_order() -> Result<(), Error> {
        let input = "[^a]: Alpha.\n\n[^c]: Unused.\n\nFirst[^b] then[^a].\n\n[^b]: Beta.\n";
        let document = parse(input, &Options::default())?;
        let html = render(&document, HtmlOptions::default())?;
        let beta = html.find("<p>Beta.</p>");
        let alpha = html.find("<p>Alpha.</p>");
        assert!(beta.is_some() && alpha.is_some() && beta < alpha);
        assert!(html.contains("<li id=\"fn-1\">\n<p>Beta.</p>"));
        assert!(!html.contains("Unused"));
        Ok(())
    }

    #[test]
    fn test_undefined_reference_is_literal() -> Result<(), Error> {
        let document = parse("See [^missing].\n", &Options::default())?;
        assert_eq!(
            render(&document, HtmlOptions::default())?,
            "<p>See [^missing].</p>\n"
        );
        Ok(())
    }

    #[test]
    fn test_prefix_suffix_and_classes() -> Result<(), Error> {
        let document = parse("x[^1]\n\n[^1]: y\n", &Options::default())?;
        let options = HtmlOptions::builder()
            .footnote_ref_prefix("[")
            .footnote_ref_suffix("]")
            .footnote_link_ref_class("")
            .footnote_back_link_ref_class("")
            .footnote_back_ref_string("^")
            .build();
        let html = render(&document, options)?;
        assert!(html.contains(r##"<sup id="fnref-1"><a href="#fn-1">[1]</a></sup>"##));
        assert!(html.contains("<a href=\"#fnref-1\">^</a>\n"));
        Ok(())
    }

    #[test]
    fn test_reference_attributes_keep_anchor() -> Result<(), Error> {
        let document = parse("x[^1]{#other .ref}\n\n[^1]: y\n", &Options::default())?;
        let html = render(&document, HtmlOptions::default())?;
        assert!(html.contains(r#"<sup id="fnref-1" class="ref">"#));
        Ok(())
    }

    #[test]
    fn test_recheck_borrows_resolved_document() -> Result<(), Error> {
        let document = parse("x[^1]\n\n[^1]: y\n", &Options::default())?;
        assert!(matches!(recheck(&document)?, Cow::Borrowed(_)));
        Ok(())
    }
}
