use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod error;
mod subcommands;

/// Markdown with `{...}` attributes and `[^id]` footnotes
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert documents to HTML or reformatted Markdown
    Convert(subcommands::convert::Args),

    /// Merge documents into one, renaming colliding ids
    Merge(subcommands::merge::Args),
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match &cli.command {
        Commands::Convert(args) => subcommands::convert::run(args),
        Commands::Merge(args) => subcommands::merge::run(args),
    }
}
