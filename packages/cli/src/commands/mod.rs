pub mod check;
pub mod key;
pub mod migrate;
pub mod run;

pub use check::{check, CheckArgs};
pub use key::{key, KeyArgs};
pub use migrate::{migrate, MigrateArgs};
pub use run::{run, RunArgs};

use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use quire_document::{Pos, Selection};
use quire_editor::EditSession;
use std::path::{Path, PathBuf};

/// Where an edited document goes
#[derive(Args, Debug)]
pub struct OutputArgs {
    /// Write the result back to the input file
    #[arg(short, long)]
    pub write: bool,

    /// Write the result to this file instead of stdout
    #[arg(short, long, conflicts_with = "write")]
    pub output: Option<PathBuf>,
}

/// Open `path` as an edit session with the cursor at `at`
pub(crate) fn open_session(path: &Path, config: &Config, at: Option<&Pos>) -> Result<EditSession> {
    let mut session = EditSession::load(path, config.editor.clone())
        .with_context(|| format!("Failed to load {}", path.display()))?;

    if let Some(pos) = at {
        session
            .set_selection(Selection::cursor(pos.clone()))
            .with_context(|| format!("Cannot place the cursor at {}", pos))?;
    }
    Ok(session)
}

pub(crate) fn emit(session: &EditSession, input: &Path, output: &OutputArgs) -> Result<()> {
    let target = if output.write {
        Some(input)
    } else {
        output.output.as_deref()
    };

    match target {
        Some(path) => {
            session.save(path)?;
            eprintln!("  {} Wrote {}", "✓".green(), path.display());
        }
        None => println!("{}", session.to_json()?),
    }
    Ok(())
}
