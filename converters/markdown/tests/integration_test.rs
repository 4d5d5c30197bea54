use std::path::{Path, PathBuf};

use mdext_converters_core::{Converter, Options as ConverterOptions};
use mdext_converters_dev::{generate_fixtures::parser_options_for, output::remove_lines_trailing_whitespace};
use mdext_converters_markdown::{
    AttributeImplicitName, AttributeValueQuotes, DiscretionaryText, ElementPlacement,
    ElementPlacementSort, FormatOptions, Formatter,
};
use mdext_parser::Options;
use proptest::prelude::*;

type Error = Box<dyn std::error::Error>;

/// The normalizing style every fixture is formatted with.
fn fixture_format_options() -> FormatOptions {
    FormatOptions::builder()
        .attributes_spaces(DiscretionaryText::Remove)
        .attribute_equal_space(DiscretionaryText::Remove)
        .attribute_value_quotes(AttributeValueQuotes::NoQuotesDoublePreferred)
        .attribute_id(AttributeImplicitName::ImplicitPreferred)
        .attribute_class(AttributeImplicitName::ImplicitPreferred)
        .attributes_sort(true)
        .footnote_placement(ElementPlacement::DocumentBottom)
        .footnote_sort(ElementPlacementSort::Sort)
        .build()
}

fn run_fixture_test(path: &Path, expected_dir: &Path) -> Result<(), Error> {
    let file_name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or("Invalid fixture file name")?;
    let expected_path = expected_dir.join(file_name).with_extension("formatted.md");

    let parser_options = parser_options_for(path)?;
    let source = std::fs::read_to_string(path)?;
    let doc = mdext_parser::parse(&source, &parser_options)?;

    let formatter = Formatter::new(ConverterOptions::default(), fixture_format_options());
    let mut output = Vec::new();
    formatter.write_to(&doc, &mut output, Some(path))?;

    let expected = std::fs::read_to_string(&expected_path)?;
    let actual = String::from_utf8(output)?;
    pretty_assertions::assert_eq!(
        remove_lines_trailing_whitespace(&expected),
        remove_lines_trailing_whitespace(&actual),
        "Markdown output mismatch for fixture: {file_name}",
    );
    Ok(())
}

#[rstest::rstest]
#[tracing_test::traced_test]
fn test_with_fixtures(#[files("tests/fixtures/source/*.md")] path: PathBuf) -> Result<(), Error> {
    run_fixture_test(&path, Path::new("tests/fixtures/expected"))
}

#[rstest::rstest]
fn test_fixtures_are_stable(#[files("tests/fixtures/expected/*.md")] path: PathBuf) -> Result<(), Error> {
    let source = std::fs::read_to_string(&path)?;
    let options = Options::builder().with_fenced_code_info_attributes().build();
    let doc = mdext_parser::parse(&source, &options)?;
    let formatter = Formatter::new(ConverterOptions::default(), fixture_format_options());
    pretty_assertions::assert_eq!(formatter.convert_to_string(&doc)?, source);
    Ok(())
}

fn attribute() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z][a-z0-9]{0,5}".prop_map(|name| format!(".{name}")),
        "[a-z][a-z0-9]{0,5}".prop_map(|name| format!("#{name}")),
        ("[a-z][a-z0-9_-]{0,5}", " ?", " ?", "[a-z0-9]{1,5}")
            .prop_map(|(name, before, after, value)| format!("{name}{before}={after}{value}")),
        ("[a-z]{1,6}", "[a-z0-9 ]{0,8}", prop_oneof![Just('\''), Just('"')])
            .prop_map(|(name, value, quote)| format!("{name}={quote}{value}{quote}")),
    ]
}

fn tag() -> impl Strategy<Value = String> {
    (
        " {0,2}",
        prop::collection::vec((attribute(), " {1,3}"), 1..5),
        " {0,2}",
    )
        .prop_map(|(opening, attributes, closing)| {
            let mut tag = format!("{{{opening}");
            for (index, (attribute, gap)) in attributes.iter().enumerate() {
                if index > 0 {
                    tag.push_str(gap);
                }
                tag.push_str(attribute);
            }
            tag.push_str(&closing);
            tag.push('}');
            tag
        })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    /// Default options write every tag exactly as it was read.
    #[test]
    fn as_is_formatting_is_identity(
        words in "[a-z]{1,8}( [a-z]{1,8}){0,3}",
        tag in tag(),
        heading in any::<bool>(),
    ) {
        let input = if heading {
            format!("# {words} {tag}\n")
        } else {
            format!("{words} {tag}\n\nafter {tag}\n")
        };
        let doc = mdext_parser::parse(&input, &Options::default())
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        let output = Formatter::default()
            .convert_to_string(&doc)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(output, input);
    }
}
