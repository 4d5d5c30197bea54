use mdext_converters_core::visitor::WritableVisitor;
use mdext_parser::{Heading, NodeRef};

use crate::{Error, HtmlAttributes, Processor, inlines::visit_inline_children};

/// Render an ATX heading; `id` is the anchor assigned by the heading id
/// generator.
pub(crate) fn visit_heading<V: WritableVisitor<Error = Error>>(
    node: NodeRef<'_>,
    heading: &Heading,
    id: Option<&str>,
    visitor: &mut V,
    processor: &Processor,
) -> Result<(), Error> {
    let id = id.filter(|_| processor.html.render_heading_ids());
    let mut attributes = HtmlAttributes::new();
    if let Some(id) = id {
        attributes.set("id", id);
    }
    attributes.apply(node.document(), node.id(), id)?;

    let level = heading.level;
    let mut w = visitor.writer_mut();
    write!(w, "<h{level}")?;
    attributes.render(w)?;
    write!(w, ">")?;
    let _ = w;
    visit_inline_children(node, visitor)?;
    w = visitor.writer_mut();
    writeln!(w, "</h{level}>")?;
    Ok(())
}
