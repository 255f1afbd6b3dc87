use super::read_document;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use lectern_editor::mutations::validate_kind;
use lectern_editor::{BlockKind, EditorDocument};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Document file to check
    pub input: PathBuf,
}

/// Problem found in a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub block: Option<String>,
    pub message: String,
}

pub fn findings(doc: &EditorDocument) -> Vec<Finding> {
    let mut findings: Vec<Finding> = doc
        .store()
        .duplicate_ids()
        .into_iter()
        .map(|id| Finding {
            message: format!("duplicate block id {}", id),
            block: Some(id.to_string()),
        })
        .collect();

    for block in doc.blocks() {
        if let Err(e) = validate_kind(&block.kind) {
            findings.push(Finding {
                block: Some(block.id.to_string()),
                message: e.to_string(),
            });
        }

        if let BlockKind::Qcm { qcm_data } = &block.kind {
            if let Err(e) = qcm_data.validate() {
                findings.push(Finding {
                    block: Some(block.id.to_string()),
                    message: format!("question: {}", e),
                });
            }
        }
    }

    findings
}

pub fn check(args: CheckArgs) -> Result<()> {
    println!("🔍 {} {}", "Checking".green().bold(), args.input.display());

    let doc = read_document(&args.input)?;
    let findings = findings(&doc);

    if findings.is_empty() {
        println!(
            "  {} {} blocks, no problems found",
            "✓".green(),
            doc.blocks().len()
        );
        return Ok(());
    }

    for finding in &findings {
        let location = finding.block.as_deref().unwrap_or("document");
        println!("  {} {}: {}", "✗".red(), location.bright_white(), finding.message);
    }

    Err(anyhow::anyhow!("{} problem(s) found", findings.len()))
}
