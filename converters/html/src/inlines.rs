use mdext_converters_core::visitor::WritableVisitor;
use mdext_parser::{Highlight, NodeKind, NodeRef};

use crate::{Error, HtmlAttributes, Processor};

/// Visit the inline children of a leaf block.
///
/// Whitespace that only separates the text from trailing attribute tags is
/// dropped, so `# Title {#t}` renders `Title` and not `Title `.
pub(crate) fn visit_inline_children<V: WritableVisitor<Error = Error>>(
    node: NodeRef<'_>,
    visitor: &mut V,
) -> Result<(), Error> {
    for child in node.children() {
        if matches!(child.kind(), NodeKind::Text) && only_tags_follow(child) {
            visitor.visit_text(child.text().trim_end())?;
        } else {
            visitor.visit_node(child)?;
        }
    }
    Ok(())
}

fn only_tags_follow(node: NodeRef<'_>) -> bool {
    let mut next = node.next();
    let mut any = false;
    while let Some(sibling) = next {
        if !sibling.kind().is_non_rendering() {
            return false;
        }
        any = true;
        next = sibling.next();
    }
    any
}

pub(crate) fn visit_text<V: WritableVisitor<Error = Error>>(
    text: &str,
    visitor: &mut V,
) -> Result<(), Error> {
    let w = visitor.writer_mut();
    write!(w, "{}", crate::attributes::escape(text))?;
    Ok(())
}

pub(crate) fn visit_highlight<V: WritableVisitor<Error = Error>>(
    node: NodeRef<'_>,
    _highlight: &Highlight,
    visitor: &mut V,
    processor: &Processor,
) -> Result<(), Error> {
    let custom = processor
        .html
        .highlight_tags()
        .map(|(open, close)| (open.to_string(), close.to_string()));
    let mut w = visitor.writer_mut();
    match &custom {
        Some((open, _)) => write!(w, "{open}")?,
        None => {
            let attributes = HtmlAttributes::for_owner(node.document(), node.id(), None)?;
            write!(w, "<mark")?;
            attributes.render(w)?;
            write!(w, ">")?;
        }
    }
    let _ = w;
    visitor.visit_children(node)?;
    w = visitor.writer_mut();
    match &custom {
        Some((_, close)) => write!(w, "{close}")?,
        None => write!(w, "</mark>")?,
    }
    Ok(())
}

pub(crate) fn visit_text_span<V: WritableVisitor<Error = Error>>(
    node: NodeRef<'_>,
    visitor: &mut V,
) -> Result<(), Error> {
    let attributes = HtmlAttributes::for_owner(node.document(), node.id(), None)?;
    let mut w = visitor.writer_mut();
    write!(w, "<span")?;
    attributes.render(w)?;
    write!(w, ">")?;
    let _ = w;
    visitor.visit_children(node)?;
    w = visitor.writer_mut();
    write!(w, "</span>")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use mdext_parser::{Options, parse};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::{HtmlOptions, tests::render};

    use super::*;

    #[rstest]
    #[case::plain("a ==b== c", "<p>a <mark>b</mark> c</p>\n")]
    #[case::with_attributes("==hot=={.warm}", "<p><mark class=\"warm\">hot</mark></p>\n")]
    #[case::escaped("1 < 2 & 3", "<p>1 &lt; 2 &amp; 3</p>\n")]
    #[case::span("some word{.x} here", "<p>some <span class=\"x\">word</span> here</p>\n")]
    #[case::trailing_tag("text {.c}", "<p class=\"c\">text</p>\n")]
    fn test_inlines(#[case] input: &str, #[case] expected: &str) -> Result<(), Error> {
        let document = parse(input, &Options::default())?;
        assert_eq!(render(&document, HtmlOptions::default())?, expected);
        Ok(())
    }

    #[test]
    fn test_custom_highlight_tags() -> Result<(), Error> {
        let document = parse("==hot=={.warm}", &Options::default())?;
        let options = HtmlOptions::builder()
            .highlight_tags("<span class=\"hl\">", "</span>")
            .build();
        assert_eq!(
            render(&document, options)?,
            "<p><span class=\"hl\">hot</span></p>\n"
        );
        Ok(())
    }
}
