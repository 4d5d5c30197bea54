use mdext_converters_core::visitor::WritableVisitor;
use mdext_parser::{FencedCode, NodeRef};

use crate::{Error, FencedCodeAddType, HtmlAttributes, Processor, attributes::escape};

pub(crate) fn visit_fenced_code<V: WritableVisitor<Error = Error>>(
    node: NodeRef<'_>,
    code: &FencedCode,
    visitor: &mut V,
    processor: &Processor,
) -> Result<(), Error> {
    let document = node.document();
    let source = document.source();
    let owned = HtmlAttributes::for_owner(document, node.id(), None)?;
    let add_type = processor
        .html
        .effective_fenced_code_add_attributes(document.options().fenced_code_info_attributes);

    let pre = match add_type {
        FencedCodeAddType::AddToPre | FencedCodeAddType::AddToPreCode => owned.clone(),
        FencedCodeAddType::AddToCode => HtmlAttributes::new(),
    };
    let mut code_attributes = HtmlAttributes::new();
    if let Some(language) = code.language(source) {
        code_attributes.add_class(&format!("language-{language}"));
    }
    if matches!(
        add_type,
        FencedCodeAddType::AddToCode | FencedCodeAddType::AddToPreCode
    ) {
        code_attributes.apply(document, node.id(), None)?;
    }

    let w = visitor.writer_mut();
    write!(w, "<pre")?;
    pre.render(w)?;
    write!(w, "><code")?;
    code_attributes.render(w)?;
    write!(w, ">")?;
    for line in &code.lines {
        writeln!(w, "{}", escape(line.text(source)))?;
    }
    writeln!(w, "</code></pre>")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use mdext_parser::{Options, parse};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::{HtmlOptions, tests::render};

    use super::*;

    const INPUT: &str = "```rust {.numbered #main}\nfn main() {}\n```\n";

    #[rstest]
    #[case::default_info(
        None,
        "<pre class=\"numbered\" id=\"main\"><code class=\"language-rust\">fn main() {}\n</code></pre>\n"
    )]
    #[case::code(
        Some(FencedCodeAddType::AddToCode),
        "<pre><code class=\"language-rust numbered\" id=\"main\">fn main() {}\n</code></pre>\n"
    )]
    #[case::both(
        Some(FencedCodeAddType::AddToPreCode),
        "<pre class=\"numbered\" id=\"main\"><code class=\"language-rust numbered\" id=\"main\">fn main() {}\n</code></pre>\n"
    )]
    fn test_fenced_code_routing(
        #[case] add_type: Option<FencedCodeAddType>,
        #[case] expected: &str,
    ) -> Result<(), Error> {
        let options = Options::builder().with_fenced_code_info_attributes().build();
        let document = parse(INPUT, &options)?;
        let mut html = HtmlOptions::builder();
        if let Some(add_type) = add_type {
            html = html.fenced_code_add_attributes(add_type);
        }
        assert_eq!(render(&document, html.build())?, expected);
        Ok(())
    }

    #[test]
    fn test_code_is_escaped() -> Result<(), Error> {
        let document = parse("~~~\n<b>&\n~~~\n", &Options::default())?;
        assert_eq!(
            render(&document, HtmlOptions::default())?,
            "<pre><code>&lt;b&gt;&amp;\n</code></pre>\n"
        );
        Ok(())
    }
}
