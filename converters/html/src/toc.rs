use std::io::Write;

use mdext_converters_core::{
    attributes::plain_text,
    id::IdGenerator,
    toc::{Config as TocConfig, Entry, entries},
};
use mdext_parser::Document;

use crate::{Error, Processor, attributes::escape};

fn render_entries(document: &Document, entries: &[Entry], w: &mut dyn Write) -> Result<(), Error> {
    // Levels of the currently open lists, innermost last.
    let mut open: Vec<u8> = Vec::new();
    for entry in entries {
        while let Some(&level) = open.last()
            && level > entry.level
        {
            writeln!(w, "</li>\n</ul>")?;
            open.pop();
        }
        match open.last() {
            Some(&level) if level == entry.level => writeln!(w, "</li>")?,
            Some(_) | None => {
                writeln!(w, "<ul>")?;
                open.push(entry.level);
            }
        }
        let title = document
            .try_node(entry.node)
            .map(plain_text)
            .unwrap_or_default();
        writeln!(
            w,
            "<li><a href=\"#{}\">{}</a>",
            escape(&entry.id),
            escape(&title)
        )?;
    }
    while open.pop().is_some() {
        writeln!(w, "</li>\n</ul>")?;
    }
    Ok(())
}

/// Render the table of contents as a nested `<nav class="toc">` list.
/// Writes nothing when no heading qualifies.
pub(crate) fn render(
    document: &Document,
    ids: &dyn IdGenerator,
    w: &mut dyn Write,
    processor: &Processor,
) -> Result<(), Error> {
    let config = TocConfig::with_levels(processor.html.toc_levels());
    let entries = entries(document, ids, config);
    if entries.is_empty() {
        return Ok(());
    }
    writeln!(w, "<nav class=\"toc\">")?;
    render_entries(document, &entries, w)?;
    writeln!(w, "</nav>")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use mdext_converters_core::id::HeadingIdGenerator;
    use mdext_parser::{Options, parse};
    use pretty_assertions::assert_eq;

    use crate::HtmlOptions;

    use super::*;

    fn toc(input: &str, html: HtmlOptions) -> Result<String, Error> {
        let document = parse(input, &Options::default())?;
        let ids = HeadingIdGenerator::from_document(&document);
        let processor = Processor::default().with_html_options(html);
        let mut buffer = Vec::new();
        render(&document, &ids, &mut buffer, &processor)?;
        Ok(String::from_utf8(buffer)?)
    }

    #[test]
    fn test_nested_levels() -> Result<(), Error> {
        let input = "# One\n\n## Two {#second}\n\n### Deep\n\n# Three & Four\n";
        let expected = r##"<nav class="toc">
<ul>
<li><a href="#one">One</a>
<ul>
<li><a href="#second">Two</a>
</li>
</ul>
</li>
<li><a href="#three-four">Three &amp; Four</a>
</li>
</ul>
</nav>
"##;
        assert_eq!(toc(input, HtmlOptions::default())?, expected);
        Ok(())
    }

    #[test]
    fn test_levels_option() -> Result<(), Error> {
        let html = toc(
            "# One\n\n## Two\n",
            HtmlOptions::builder().toc_levels(1).build(),
        )?;
        assert!(!html.contains("Two"));
        Ok(())
    }

    #[test]
    fn test_empty_without_headings() -> Result<(), Error> {
        assert_eq!(toc("just text\n", HtmlOptions::default())?, "");
        Ok(())
    }
}
