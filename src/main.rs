//! Prompter - teleprompter script tools.
//!
//! # Usage
//!
//! ```bash
//! prompter sanitize pasted.html --detect-origin
//! prompter import script.docx
//! prompter markers script.html --json
//! prompter search script.html "act two" --reverse
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};

use prompter::config::{
    ConfigFlags, clear_config_flags, global_config_path, load_config_flags, local_override_path,
    parse_flag_tokens, save_config_flags,
};
use prompter::handler::DocumentHandler;
use prompter::import::{self, ConverterSet, ImportFormat};
use prompter::sanitize;

/// Teleprompter script tools: cue markers, paste sanitizing and import
#[derive(Parser, Debug)]
#[command(name = "prompter", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Program used to convert PDF files
    #[arg(long, global = true, value_name = "PROGRAM")]
    pdf_converter: Option<String>,

    /// Program used to convert DOCX files
    #[arg(long, global = true, value_name = "PROGRAM")]
    docx_converter: Option<String>,

    /// Seconds to wait for a converter before giving up
    #[arg(long, global = true, value_name = "SECS")]
    timeout: Option<u64>,

    /// Save current command-line flags as defaults
    #[arg(long, global = true)]
    save: bool,

    /// Clear saved defaults
    #[arg(long, global = true)]
    clear: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Filter an HTML file the way pasted content is filtered
    Sanitize {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Keep black text colours
        #[arg(long)]
        keep_black_text: bool,

        /// Pick the black-text policy from the markup's origin
        #[arg(long)]
        detect_origin: bool,
    },

    /// Convert a PDF or DOCX file with its external converter
    Import {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// List the cue markers of a script
    Markers {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Print markers as JSON
        #[arg(long)]
        json: bool,
    },

    /// Find text in a script, wrapping around at the end
    Search {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[arg(value_name = "NEEDLE")]
        needle: String,

        /// Search backward from the end
        #[arg(long)]
        reverse: bool,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);
    let converters = effective.converter_set();

    let Some(command) = cli.command else {
        if !cli.save && !cli.clear {
            Cli::command().print_help()?;
        }
        return Ok(());
    };

    match command {
        Command::Sanitize {
            file,
            keep_black_text,
            detect_origin,
        } => {
            let html = read_file(&file)?;
            let ignore_black_text = !(keep_black_text || effective.keep_black_text);
            let filtered = if detect_origin {
                sanitize::sanitize_pasted(&html, ignore_black_text)
            } else {
                sanitize::sanitize(&html, ignore_black_text)
            };
            print!("{filtered}");
        }
        Command::Import { file } => {
            if !file.exists() {
                anyhow::bail!("File not found: {}", file.display());
            }
            let format = ImportFormat::from_path(&file);
            println!("{}", import::import_external(&file, format, &converters));
        }
        Command::Markers { file, json } => {
            let mut handler = open(&file, converters)?;
            let markers = handler.markers();
            if json {
                let out = serde_json::to_string_pretty(markers)
                    .context("Failed to serialize markers")?;
                println!("{out}");
            } else {
                for marker in markers {
                    println!(
                        "{}\t{}\t{}",
                        marker.position,
                        marker.names.join(","),
                        marker.text
                    );
                }
            }
        }
        Command::Search {
            file,
            needle,
            reverse,
        } => {
            let mut handler = open(&file, converters)?;
            let Some(found) = handler.search(&needle, false, reverse) else {
                anyhow::bail!("No match for {needle:?} in {}", file.display());
            };
            println!("{}..{}", found.start, found.end);
        }
    }
    Ok(())
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn open(path: &Path, converters: ConverterSet) -> Result<DocumentHandler> {
    let mut handler = DocumentHandler::default().with_converters(converters);
    handler
        .load(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    Ok(handler)
}
