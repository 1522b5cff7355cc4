use super::{emit, OutputArgs};
use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use quire_document::{migrate as migrate_document, Document, IdGenerator};
use quire_editor::{identity, EditSession, EditorConfig};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Args, Debug)]
pub struct MigrateArgs {
    /// Legacy document to wrap into sections
    pub input: PathBuf,

    /// Seed for generated ids (defaults to the configured idSeed)
    #[arg(long)]
    pub seed: Option<String>,

    #[command(flatten)]
    pub output: OutputArgs,
}

pub fn migrate(args: MigrateArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let source = fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let doc = Document::from_json(&source)?;

    let seed = args.seed.or_else(|| config.editor.id_seed.clone());
    let mut ids = match &seed {
        Some(seed) => IdGenerator::from_seed(seed.clone()),
        None => IdGenerator::new(&args.input.display().to_string()),
    };
    identity::reserve_ids(&doc, &mut ids);
    debug!(seed = ids.seed(), reserved = ids.issued(), "reserved existing ids");
    let (migrated, report) = migrate_document(&doc, &mut ids);

    info!(
        wrapped = report.wrapped_blocks,
        created = report.sections_created,
        dropped = report.dropped_sections,
        filled = report.filled_columns,
        "migration finished"
    );
    if report.changed() {
        eprintln!("🔧 {} {}", "Migrated".green().bold(), args.input.display());
        eprintln!("   Blocks wrapped:   {}", report.wrapped_blocks);
        eprintln!("   Sections created: {}", report.sections_created);
        eprintln!("   Sections dropped: {}", report.dropped_sections);
        eprintln!("   Columns filled:   {}", report.filled_columns);
    } else {
        eprintln!("{} {} is already sectioned", "✓".green(), args.input.display());
    }

    // Identities for everything the migration left unnamed
    let editor = EditorConfig {
        id_seed: Some(ids.seed().to_string()),
        migrate_on_load: false,
        ..config.editor
    };
    let session = EditSession::new(args.input.display().to_string(), migrated, editor);
    session
        .validate()
        .context("Migrated document is still malformed")?;

    emit(&session, &args.input, &args.output)
}
