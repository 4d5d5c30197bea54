//! Generate expected formatter output files for integration tests.
//!
//! Usage:
//!   `cargo run -p mdext-converters-markdown --example generate_expected_fixtures`
//!
//! Fixtures are formatted with the same normalizing options the integration
//! test uses.

use mdext_converters_core::{Converter, Options};
use mdext_converters_dev::generate_fixtures::FixtureGenerator;
use mdext_converters_markdown::{
    AttributeImplicitName, AttributeValueQuotes, DiscretionaryText, ElementPlacement,
    ElementPlacementSort, FormatOptions, Formatter,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    FixtureGenerator::new("markdown", "formatted.md").generate(|doc, output| {
        let format = FormatOptions::builder()
            .attributes_spaces(DiscretionaryText::Remove)
            .attribute_equal_space(DiscretionaryText::Remove)
            .attribute_value_quotes(AttributeValueQuotes::NoQuotesDoublePreferred)
            .attribute_id(AttributeImplicitName::ImplicitPreferred)
            .attribute_class(AttributeImplicitName::ImplicitPreferred)
            .attributes_sort(true)
            .footnote_placement(ElementPlacement::DocumentBottom)
            .footnote_sort(ElementPlacementSort::Sort)
            .build();
        let formatter = Formatter::new(Options::default(), format);
        formatter.write_to(doc, output, None)?;
        Ok(())
    })
}
