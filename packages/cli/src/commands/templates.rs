use crate::config::Config;
use anyhow::Result;
use colored::Colorize;
use lectern_editor::BuiltinTemplates;

pub fn templates(config: &Config) -> Result<()> {
    let catalog = BuiltinTemplates::new();

    println!("{}", "Available templates".bright_blue().bold());
    println!();

    for template in catalog.all() {
        let marker = if config.default_template.as_deref() == Some(template.id.as_str()) {
            " (default)".yellow().to_string()
        } else {
            String::new()
        };

        println!(
            "  {} {}{}",
            template.id.bright_white().bold(),
            template.title,
            marker
        );
        println!(
            "      {} · {} blocks · {}",
            template.category.cyan(),
            template.blocks.len(),
            template.description.dimmed()
        );
    }

    Ok(())
}
