use std::path::{Path, PathBuf};

use mdext_converters_core::{Converter, GeneratorMetadata, Options as ConverterOptions};
use mdext_converters_dev::{generate_fixtures::parser_options_for, output::remove_lines_trailing_whitespace};
use mdext_converters_html::{HtmlOptions, Processor};

type Error = Box<dyn std::error::Error>;

fn run_fixture_test(path: &Path, expected_dir: &Path) -> Result<(), Error> {
    let file_name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or("Invalid fixture file name")?;
    let expected_path = expected_dir.join(file_name).with_extension("html");

    let parser_options = parser_options_for(path)?;
    let source = std::fs::read_to_string(path)?;
    let doc = mdext_parser::parse(&source, &parser_options)?;

    let converter_options = ConverterOptions::builder()
        .generator_metadata(GeneratorMetadata::new("mdext", "0.1.0"))
        .build();
    let processor = Processor::new(converter_options, HtmlOptions::default());

    let mut output = Vec::new();
    processor.write_to(&doc, &mut output, Some(path))?;

    let expected = std::fs::read_to_string(&expected_path)?;
    let actual = String::from_utf8(output)?;
    let expected_normalized = remove_lines_trailing_whitespace(&expected);
    let actual_normalized = remove_lines_trailing_whitespace(&actual);

    pretty_assertions::assert_eq!(
        expected_normalized,
        actual_normalized,
        "HTML output mismatch for fixture: {file_name}",
    );
    Ok(())
}

#[rstest::rstest]
#[tracing_test::traced_test]
fn test_with_fixtures(#[files("tests/fixtures/source/*.md")] path: PathBuf) -> Result<(), Error> {
    run_fixture_test(&path, Path::new("tests/fixtures/expected"))
}
