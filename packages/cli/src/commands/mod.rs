pub mod check;
pub mod import;
pub mod new;
pub mod outline;
pub mod templates;

pub use check::{check, CheckArgs};
pub use import::{import, ImportArgs};
pub use new::{new, NewArgs};
pub use outline::{outline, OutlineArgs};
pub use templates::templates;

use anyhow::{Context, Result};
use colored::Colorize;
use lectern_editor::{DocumentPayload, EditorDocument};
use std::fs;
use std::path::Path;

/// Read a document file (`{title, blocks, preview}` JSON)
pub fn read_document(path: &Path) -> Result<EditorDocument> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Cannot read {}", path.display()))?;
    let payload: DocumentPayload = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a Lectern document", path.display()))?;

    Ok(EditorDocument::from_blocks(payload.title, payload.blocks))
}

/// Write `doc` to `output`, or to stdout when no path is given
pub fn write_document(doc: &EditorDocument, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(&doc.payload())?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, json)?;
            println!(
                "  {} Wrote {} ({} blocks)",
                "✓".green(),
                path.display(),
                doc.blocks().len()
            );
        }
        None => println!("{}", json),
    }

    Ok(())
}
