use std::{fs, io::Write, path::PathBuf};

use anyhow::Context;
use clap::Args as ClapArgs;
use mdext_converters_core::Options;
use mdext_converters_markdown::Formatter;
use mdext_parser::Document;

use super::{format_options, parse_files, parser_options, report_failures};

/// Merge Markdown documents in argument order
#[derive(ClapArgs, Debug)]
pub struct Args {
    /// Documents to merge; earlier ones keep their ids
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Write the merged document here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// JSON file with parser options
    #[arg(long, value_name = "FILE")]
    pub parser_options: Option<PathBuf>,

    /// JSON file with Markdown formatter options
    #[arg(long, value_name = "FILE")]
    pub format_options: Option<PathBuf>,
}

pub fn run(args: &Args) -> anyhow::Result<()> {
    let parser_options = parser_options(args.parser_options.as_deref())?;
    let formatter = Formatter::new(
        Options::default(),
        format_options(args.format_options.as_deref())?,
    );
    let parsed = parse_files(&args.files, &parser_options, false);
    report_failures(parsed.iter().filter_map(|parsed| {
        let failure = parsed.document.as_ref().err()?;
        Some((parsed.file.as_path(), parsed.source.as_str(), failure))
    }))?;

    let documents: Vec<&Document> = parsed
        .iter()
        .filter_map(|parsed| parsed.document.as_ref().ok())
        .collect();
    let merged = formatter.merge(&documents)?;

    if let Some(path) = &args.output {
        fs::write(path, merged).with_context(|| format!("writing {}", path.display()))?;
        tracing::info!(documents = documents.len(), destination = %path.display(), "merged");
    } else {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(merged.as_bytes())?;
        stdout.flush()?;
    }
    Ok(())
}
