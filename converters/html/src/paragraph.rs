use mdext_converters_core::visitor::WritableVisitor;
use mdext_parser::NodeRef;

use crate::{Error, HtmlAttributes, inlines::visit_inline_children};

/// Visit a paragraph using the visitor pattern
///
/// This is called from the `HtmlVisitor` trait implementation.
pub(crate) fn visit_paragraph<V: WritableVisitor<Error = Error>>(
    node: NodeRef<'_>,
    visitor: &mut V,
) -> Result<(), Error> {
    let attributes = HtmlAttributes::for_owner(node.document(), node.id(), None)?;
    let mut w = visitor.writer_mut();
    write!(w, "<p")?;
    attributes.render(w)?;
    write!(w, ">")?;
    let _ = w;
    visit_inline_children(node, visitor)?;
    w = visitor.writer_mut();
    writeln!(w, "</p>")?;
    Ok(())
}
