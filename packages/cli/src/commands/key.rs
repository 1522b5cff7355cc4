use super::{emit, open_session, OutputArgs};
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use quire_document::Pos;
use quire_editor::Key;
use std::path::PathBuf;
use tracing::debug;

#[derive(Args, Debug)]
pub struct KeyArgs {
    /// Document to edit
    pub input: PathBuf,

    /// Key to press (enter, backspace)
    pub key: Key,

    /// Cursor position as `path:offset`, e.g. `1.0:0`
    #[arg(short, long)]
    pub at: Option<Pos>,

    /// Press the key this many times
    #[arg(short, long, default_value_t = 1)]
    pub repeat: usize,

    #[command(flatten)]
    pub output: OutputArgs,
}

pub fn key(args: KeyArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let mut session = open_session(&args.input, &config, args.at.as_ref())?;

    for press in 1..=args.repeat {
        let version = session.version();
        debug!(key = ?args.key, press, head = %session.selection().head, "pressing key");
        if !session.handle_key(&args.key) {
            eprintln!(
                "{} {:?} #{} left to default handling",
                "→".yellow(),
                args.key,
                press
            );
        } else if session.version() == version {
            eprintln!("{} {:?} #{} consumed", "✓".green(), args.key, press);
        } else {
            eprintln!(
                "{} {:?} #{} → cursor at {}",
                "✓".green(),
                args.key,
                press,
                session.selection().head
            );
        }
    }

    emit(&session, &args.input, &args.output)
}
