use super::write_document;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use lectern_editor::import::detect_format;
use lectern_editor::{parse_document, parse_document_lenient};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Text, JSON or office file to import
    pub input: PathBuf,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Fail on malformed JSON instead of importing an error document
    #[arg(long)]
    pub strict: bool,
}

pub fn import(args: ImportArgs) -> Result<()> {
    let bytes =
        fs::read(&args.input).with_context(|| format!("Cannot read {}", args.input.display()))?;

    let format = detect_format(&bytes);
    eprintln!(
        "{} {} ({})",
        "📥 Importing".bright_blue().bold(),
        args.input.display(),
        format.name()
    );

    let parsed = if args.strict {
        parse_document(&bytes)?
    } else {
        parse_document_lenient(&bytes)
    };

    eprintln!(
        "  {} \"{}\" with {} chapters",
        "✓".green(),
        parsed.title,
        parsed.chapters.len()
    );

    write_document(&parsed.to_document(), args.output.as_deref())
}
