use super::read_document;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct OutlineArgs {
    /// Document file
    pub input: PathBuf,
}

pub fn outline(args: OutlineArgs) -> Result<()> {
    let doc = read_document(&args.input)?;
    let entries = doc.outline();

    println!("{}", doc.title().bright_white().bold());

    if entries.is_empty() {
        println!("  {}", "(no headings)".dimmed());
        return Ok(());
    }

    for entry in entries {
        let indent = "  ".repeat(entry.level.saturating_sub(1) as usize);
        println!("  {}{} {}", indent, format!("H{}", entry.level).cyan(), entry.text);
    }

    Ok(())
}
