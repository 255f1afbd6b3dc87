use super::write_document;
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use lectern_editor::{BuiltinTemplates, EditorDocument};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct NewArgs {
    /// Start from a stock template (see `lectern templates`)
    #[arg(short, long)]
    pub template: Option<String>,

    /// Document title (defaults to the template's)
    #[arg(long)]
    pub title: Option<String>,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn new(args: NewArgs, config: &Config) -> Result<()> {
    let template_id = args.template.as_ref().or(config.default_template.as_ref());

    let mut doc = match template_id {
        Some(id) => {
            let catalog = BuiltinTemplates::new();
            let template = catalog.get(id).ok_or_else(|| {
                anyhow::anyhow!(
                    "Unknown template: {}. Run `lectern templates` to list them",
                    id
                )
            })?;
            eprintln!("{} {}", "📝 New document from".bright_blue().bold(), template.title);
            EditorDocument::from_template(template)
        }
        None => EditorDocument::new(),
    };

    if let Some(title) = args.title {
        doc.set_title(title);
    }

    write_document(&doc, args.output.as_deref())
}
