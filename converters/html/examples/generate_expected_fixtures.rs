//! Generate expected HTML output files for integration tests.
//!
//! Usage:
//!   `cargo run -p mdext-converters-html --example generate_expected_fixtures`

use mdext_converters_core::{Converter, GeneratorMetadata, Options};
use mdext_converters_dev::generate_fixtures::FixtureGenerator;
use mdext_converters_html::{HtmlOptions, Processor};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    FixtureGenerator::new("html", "html").generate(|doc, output| {
        let options = Options::builder()
            .generator_metadata(GeneratorMetadata::new("mdext", "0.1.0"))
            .build();
        let processor = Processor::new(options, HtmlOptions::default());
        processor.write_to(doc, output, None)?;
        Ok(())
    })
}
