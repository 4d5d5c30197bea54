//! Shared fixture generation utilities for converter integration tests.
//!
//! This module provides a `FixtureGenerator` builder that abstracts common
//! fixture generation boilerplate across all converters.
//!
//! A source fixture `name.md` may sit next to a `name.json` holding parser
//! options; missing keys keep their defaults.
//!
//! # Example
//!
//! ```ignore
//! use mdext_converters_dev::generate_fixtures::FixtureGenerator;
//!
//! FixtureGenerator::new("html", "html")
//!     .generate(|doc, output| {
//!         let processor = Processor::default();
//!         processor.write_to(doc, output, None)?;
//!         Ok(())
//!     })?;
//! ```

use std::{error::Error, fs, path::Path, path::PathBuf};

use crossterm::style::{PrintStyledContent, Stylize};
use mdext_parser::{Document, Options};

/// Parser options for a source fixture: `name.json` next to `name.md`, or the
/// defaults when there is none.
///
/// # Errors
///
/// Returns an error if the options file exists but cannot be read or parsed.
pub fn parser_options_for(source: &Path) -> Result<Options, Box<dyn Error>> {
    let options_path = source.with_extension("json");
    if !options_path.exists() {
        return Ok(Options::default());
    }
    Ok(Options::from_json(&fs::read_to_string(options_path)?)?)
}

/// Builder for generating expected fixture output files.
///
/// Handles directory scanning, Markdown parsing, error reporting, and file writing.
/// Each converter provides a closure to handle the actual conversion.
pub struct FixtureGenerator {
    converter_name: String,
    output_extension: String,
}

impl FixtureGenerator {
    /// Create a new fixture generator for a converter.
    ///
    /// # Arguments
    ///
    /// * `converter_name` - Name of the converter (e.g., "html", "markdown")
    /// * `output_extension` - File extension for output files (e.g., "html", "md")
    #[must_use]
    pub fn new(converter_name: &str, output_extension: &str) -> Self {
        Self {
            converter_name: converter_name.to_string(),
            output_extension: output_extension.to_string(),
        }
    }

    /// Generate fixture outputs using the provided conversion function.
    ///
    /// Scans `tests/fixtures/source/` for `.md` files and generates expected
    /// outputs in `tests/fixtures/expected/`.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation or file I/O fails.
    pub fn generate<F>(&self, convert_fn: F) -> Result<(), Box<dyn Error>>
    where
        F: Fn(&Document, &mut Vec<u8>) -> Result<(), Box<dyn Error>>,
    {
        let base = PathBuf::from("converters")
            .join(&self.converter_name)
            .join("tests/fixtures");
        self.generate_dir(&base.join("source"), &base.join("expected"), &convert_fn)
    }

    fn generate_dir<F>(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        convert_fn: &F,
    ) -> Result<(), Box<dyn Error>>
    where
        F: Fn(&Document, &mut Vec<u8>) -> Result<(), Box<dyn Error>>,
    {
        // Ensure output directory exists
        fs::create_dir_all(output_dir)?;

        println!(
            "Generating expected {} outputs...\n",
            self.converter_name.to_uppercase()
        );

        let mut success_count = 0;
        let mut error_count = 0;

        let mut sources: Vec<PathBuf> = input_dir
            .read_dir()?
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "md"))
            .collect();
        sources.sort();

        for input_path in sources {
            let Some(output_path) = input_path
                .file_stem()
                .map(|name| output_dir.join(name).with_extension(&self.output_extension))
            else {
                eprintln!(
                    "{} Skipping {}: unable to determine output file name",
                    PrintStyledContent("?".yellow()),
                    input_path.display()
                );
                continue;
            };

            let parsed = parser_options_for(&input_path).and_then(|options| {
                let source = fs::read_to_string(&input_path)?;
                Ok(mdext_parser::parse(&source, &options)?)
            });
            let doc = match parsed {
                Ok(doc) => doc,
                Err(e) => {
                    println!(
                        "{} Error parsing {}: {e}",
                        PrintStyledContent("❌".red()),
                        input_path.display()
                    );
                    error_count += 1;
                    continue;
                }
            };

            // Convert using the provided function
            let mut output = Vec::new();
            if let Err(e) = convert_fn(&doc, &mut output) {
                println!(
                    "{} Error converting {} to {}: {e}",
                    PrintStyledContent("❌".red()),
                    input_path.display(),
                    output_path.display()
                );
                error_count += 1;
                continue;
            }

            fs::write(&output_path, &output)?;
            success_count += 1;

            println!(
                "{} Generated {} ({} bytes)",
                PrintStyledContent("✓".green()),
                output_path.display(),
                output.len()
            );
        }

        println!();
        if error_count > 0 {
            println!(
                "⚠️  Completed with {error_count} error(s). {success_count} file(s) generated."
            );
        } else {
            println!(
                "✨ Done! {success_count} file(s) generated in {}",
                output_dir.display()
            );
        }
        println!("   Manually verify each file before using in tests.");

        Ok(())
    }
}
