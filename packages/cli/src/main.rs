mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{check, import, new, outline, templates, CheckArgs, ImportArgs, NewArgs, OutlineArgs};
use config::Config;

/// Lectern CLI - offline tooling for course documents
#[derive(Parser, Debug)]
#[command(name = "lectern")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log debug output (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a new document, optionally from a template
    New(NewArgs),

    /// List the stock templates
    Templates,

    /// Convert a text, JSON or office file into a document
    Import(ImportArgs),

    /// Print the heading structure of a document
    Outline(OutlineArgs),

    /// Validate block ids, block fields and questions
    Check(CheckArgs),
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    let result = std::env::current_dir()
        .map_err(anyhow::Error::from)
        .and_then(|cwd| Config::load(&cwd.display().to_string()))
        .and_then(|config| match cli.command {
            Command::New(args) => new(args, &config),
            Command::Templates => templates(&config),
            Command::Import(args) => import(args),
            Command::Outline(args) => outline(args),
            Command::Check(args) => check(args),
        });

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
