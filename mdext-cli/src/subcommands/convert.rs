use std::{fs, path::PathBuf};

use anyhow::Context;
use clap::{Args as ClapArgs, ValueEnum};
use mdext_converters_core::{Converter, GeneratorMetadata, Options};
use mdext_converters_html::{HtmlOptions, Processor};
use mdext_converters_markdown::Formatter;
use rayon::prelude::*;

use super::{Parsed, format_options, parse_files, parser_options, report_failures};

#[derive(Debug, ValueEnum, Clone, Copy)]
pub enum Backend {
    Html,
    Markdown,
}

/// Convert Markdown documents to HTML or reformatted Markdown
#[derive(ClapArgs, Debug)]
pub struct Args {
    /// List of files to convert
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Backend::Html)]
    pub to: Backend,

    /// Write to stdout instead of next to each input
    #[arg(long)]
    pub stdout: bool,

    /// Show timing information
    #[arg(long)]
    pub timings: bool,

    /// JSON file with parser options
    #[arg(long, value_name = "FILE")]
    pub parser_options: Option<PathBuf>,

    /// JSON file with HTML renderer options
    #[arg(long, value_name = "FILE")]
    pub html_options: Option<PathBuf>,

    /// JSON file with Markdown formatter options
    #[arg(long, value_name = "FILE")]
    pub format_options: Option<PathBuf>,
}

pub fn run(args: &Args) -> anyhow::Result<()> {
    let options = Options::builder()
        .generator_metadata(GeneratorMetadata::new(
            env!("CARGO_BIN_NAME"),
            env!("CARGO_PKG_VERSION"),
        ))
        .timings(args.timings)
        .build();
    let parser_options = parser_options(args.parser_options.as_deref())?;
    let parsed = parse_files(&args.files, &parser_options, args.timings);

    match args.to {
        Backend::Html => {
            let html = match args.html_options.as_deref() {
                Some(path) => {
                    let json = fs::read_to_string(path)
                        .with_context(|| format!("reading HTML options from {}", path.display()))?;
                    HtmlOptions::from_json(&json)?
                }
                None => HtmlOptions::default(),
            };
            run_converter(&Processor::new(options, html), parsed, args.stdout)
        }
        Backend::Markdown => {
            let format = format_options(args.format_options.as_deref())?;
            run_converter(&Formatter::new(options, format), parsed, args.stdout)
        }
    }
}

#[tracing::instrument(skip_all, fields(backend = %converter.backend(), files = parsed.len()))]
fn run_converter<C>(converter: &C, parsed: Vec<Parsed>, stdout: bool) -> anyhow::Result<()>
where
    C: Converter + Sync,
    C::Error: std::error::Error + Send + Sync + 'static,
{
    let convert = |parsed: Parsed| {
        let result = match &parsed.document {
            Ok(doc) => {
                let file = (!stdout).then_some(parsed.file.as_path());
                converter
                    .convert(doc, file)
                    .map(|written| {
                        if let Some(path) = written {
                            tracing::debug!(destination = %path.display(), "written");
                        }
                    })
                    .map_err(anyhow::Error::new)
            }
            Err(_) => Ok(()),
        };
        (parsed, result)
    };

    // Files written next to their input can be converted in parallel; stdout
    // must see documents one after another.
    let results: Vec<(Parsed, anyhow::Result<()>)> = if stdout {
        parsed.into_iter().map(convert).collect()
    } else {
        parsed.into_par_iter().map(convert).collect()
    };

    report_failures(results.iter().filter_map(|(parsed, result)| {
        let failure = parsed.document.as_ref().err().or(result.as_ref().err())?;
        Some((parsed.file.as_path(), parsed.source.as_str(), failure))
    }))
}
