use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use quire_document::{schema, Document, SchemaViolation};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Document file or directory (defaults to the configured docDir)
    pub input: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

pub fn check(args: CheckArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let input = args.input.unwrap_or_else(|| config.get_doc_dir(cwd));

    let files = find_documents(&input)?;
    debug!(input = %input.display(), files = files.len(), "found documents");
    if args.format != "json" {
        println!("🔍 {} {} document(s)", "Checking".green().bold(), files.len());
        println!();
    }

    let mut total_violations = 0;
    let mut legacy_files = 0;
    for file in &files {
        let (violations, legacy) = check_file(file, &args.format)?;
        total_violations += violations;
        if legacy {
            legacy_files += 1;
        }
    }

    if args.format != "json" {
        println!();
        println!("   Files checked: {}", files.len());
        if legacy_files > 0 {
            println!(
                "   {} {} legacy file(s), run `quire migrate` on them",
                "Hint:".yellow(),
                legacy_files
            );
        }
        if total_violations == 0 {
            println!("   {} No issues found!", "✓".green());
        }
    }

    if total_violations > 0 {
        anyhow::bail!("{} violation(s) found", total_violations);
    }
    Ok(())
}

/// Violation count and whether the file still has bare top-level blocks
fn check_file(path: &Path, format: &str) -> Result<(usize, bool)> {
    let source = fs::read_to_string(path)?;
    let doc = match Document::from_json(&source) {
        Ok(doc) => doc,
        Err(err) => {
            warn!(path = %path.display(), %err, "unparsable document");
            eprintln!("{} Failed to parse {}: {}", "✗".red(), path.display(), err);
            return Ok((1, false));
        }
    };

    let violations = schema::check(&doc);
    if format == "json" {
        let report = serde_json::json!({
            "file": path.display().to_string(),
            "sections": doc.section_count(),
            "violations": violations.iter().map(ToString::to_string).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if violations.is_empty() {
        println!("{} {}", "✓".green(), path.display());
    } else {
        println!("{}", path.display());
        for violation in &violations {
            let label = match violation {
                SchemaViolation::DuplicateId { .. } | SchemaViolation::OrphanBlock { .. } => {
                    "warning".yellow().bold()
                }
                _ => "error".red().bold(),
            };
            println!("  {} {}", label, violation);
        }
    }

    Ok((violations.len(), doc.is_legacy()))
}

/// JSON documents at `input`, skipping the config file
pub(crate) fn find_documents(input: &Path) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.is_dir() {
        anyhow::bail!("Input path does not exist: {}", input.display());
    }

    let mut files: Vec<PathBuf> = WalkDir::new(input)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.is_file()
                && path.extension().map(|e| e == "json").unwrap_or(false)
                && path.file_name().map(|n| n != DEFAULT_CONFIG_NAME).unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}
