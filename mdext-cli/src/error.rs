use std::{error::Error, path::Path};

use mdext_converters_core::find_parser_error;
use mdext_parser::Location;
use miette::{Diagnostic, NamedSource, SourceSpan};

/// Rich error wrapper for miette display with source code
#[derive(Debug, Diagnostic, thiserror::Error)]
#[error("{message}")]
#[diagnostic()]
pub(crate) struct RichError {
    message: String,

    #[help]
    advice: String,

    #[source_code]
    src: NamedSource<String>,

    #[label("{position_advice}")]
    span: SourceSpan,
    position_advice: String,
}

fn source_span_from_location(location: &Location) -> SourceSpan {
    let start_offset = location.absolute_start;
    let length = location.absolute_end.saturating_sub(location.absolute_start);

    SourceSpan::new(start_offset.into(), length)
}

/// Build a report for `e`, pointing into `source` when the error carries a
/// parser location.
pub(crate) fn display(e: &(dyn Error + 'static), source: Option<(&Path, &str)>) -> miette::Report {
    let Some(parser_error) = find_parser_error(e) else {
        return miette::miette!("{e}");
    };

    if let (Some((path, source)), Some(location)) = (source, parser_error.location()) {
        let line = location.start.line;
        let column = location.start.column;
        return miette::Report::new(RichError {
            message: parser_error.to_string(),
            advice: parser_error.advice().unwrap_or_default().to_string(),
            src: NamedSource::new(path.display().to_string(), source.to_string()),
            span: source_span_from_location(location),
            position_advice: format!("error occurred here (line {line}, column {column})"),
        });
    }

    match parser_error.advice() {
        Some(advice) => miette::miette!(help = advice, "{parser_error}"),
        None => miette::miette!("{parser_error}"),
    }
}
