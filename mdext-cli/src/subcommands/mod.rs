use std::{
    fs,
    path::{Path, PathBuf},
    time::Instant,
};

use anyhow::Context;
use mdext_converters_core::PrettyDuration;
use mdext_converters_markdown::FormatOptions;
use mdext_parser::{Document, Options as ParserOptions};
use rayon::prelude::*;

use crate::error;

pub(crate) mod convert;
pub(crate) mod merge;

/// One input file and what became of parsing it.
pub(crate) struct Parsed {
    pub(crate) file: PathBuf,
    pub(crate) source: String,
    pub(crate) document: anyhow::Result<Document>,
}

pub(crate) fn parser_options(path: Option<&Path>) -> anyhow::Result<ParserOptions> {
    let Some(path) = path else {
        return Ok(ParserOptions::default());
    };
    let json = fs::read_to_string(path)
        .with_context(|| format!("reading parser options from {}", path.display()))?;
    Ok(ParserOptions::from_json(&json)?)
}

pub(crate) fn format_options(path: Option<&Path>) -> anyhow::Result<FormatOptions> {
    let Some(path) = path else {
        return Ok(FormatOptions::default());
    };
    let json = fs::read_to_string(path)
        .with_context(|| format!("reading formatter options from {}", path.display()))?;
    Ok(FormatOptions::from_json(&json)?)
}

/// Read and parse every file in parallel; the result keeps argument order.
#[tracing::instrument(skip(options))]
pub(crate) fn parse_files(files: &[PathBuf], options: &ParserOptions, timings: bool) -> Vec<Parsed> {
    files
        .par_iter()
        .map(|file| {
            let now = Instant::now();
            let source = match fs::read_to_string(file) {
                Ok(source) => source,
                Err(e) => {
                    return Parsed {
                        file: file.clone(),
                        source: String::new(),
                        document: Err(anyhow::Error::new(e)
                            .context(format!("reading {}", file.display()))),
                    };
                }
            };
            let document = mdext_parser::parse(&source, options).map_err(anyhow::Error::new);
            if timings && document.is_ok() {
                tracing::info!(file = %file.display(), time = now.elapsed().pretty_print(), "parsed");
            }
            Parsed {
                file: file.clone(),
                source,
                document,
            }
        })
        .collect()
}

/// Print a report for each failure; `Err` when there was at least one.
pub(crate) fn report_failures<'a>(
    failures: impl IntoIterator<Item = (&'a Path, &'a str, &'a anyhow::Error)>,
) -> anyhow::Result<()> {
    let mut count = 0;
    for (file, source, failure) in failures {
        count += 1;
        eprintln!("\n{count}. File: {}", file.display());
        let report = error::display(failure.as_ref(), Some((file, source)));
        eprintln!("{report:?}");
    }
    if count > 0 {
        anyhow::bail!("failed to process {count} file(s)");
    }
    Ok(())
}
