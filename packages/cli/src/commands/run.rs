use super::{emit, open_session, OutputArgs};
use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use quire_document::Pos;
use quire_editor::Command;
use std::path::PathBuf;
use tracing::debug;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Document to edit
    pub input: PathBuf,

    /// Command name (`splitSection`) or JSON (`{"command":"insertColumns","count":3}`)
    pub command: String,

    /// Cursor position as `path:offset`, e.g. `0.1:3`
    #[arg(short, long)]
    pub at: Option<Pos>,

    #[command(flatten)]
    pub output: OutputArgs,
}

pub fn run(args: RunArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let command = parse_command(&args.command)?;
    debug!(?command, input = %args.input.display(), "running command");
    let mut session = open_session(&args.input, &config, args.at.as_ref())?;

    if !session.execute(&command) {
        anyhow::bail!(
            "{} does not apply at {}",
            command.name(),
            session.selection().head
        );
    }
    eprintln!(
        "{} {} → cursor at {}",
        "✓".green(),
        command.name().bold(),
        session.selection().head
    );

    emit(&session, &args.input, &args.output)
}

/// A bare name is shorthand for a command without arguments
fn parse_command(raw: &str) -> Result<Command> {
    let raw = raw.trim();
    let value = if raw.starts_with('{') {
        serde_json::from_str(raw)?
    } else {
        serde_json::json!({ "command": raw })
    };
    serde_json::from_value(value).with_context(|| format!("Unknown command: {}", raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_command_name() {
        assert_eq!(
            parse_command("splitSection").unwrap(),
            Command::SplitSection
        );
        assert_eq!(
            parse_command(" toggleColumnBorders ").unwrap(),
            Command::ToggleColumnBorders
        );
    }

    #[test]
    fn test_parse_command_with_arguments() {
        assert_eq!(
            parse_command(r#"{"command":"insertColumns","count":3}"#).unwrap(),
            Command::InsertColumns { count: 3 }
        );
        assert_eq!(
            parse_command(r#"{"command":"setColumnWidths","widths":[2.0,1.0]}"#).unwrap(),
            Command::SetColumnWidths {
                widths: Some(vec![2.0, 1.0])
            }
        );
    }

    #[test]
    fn test_parse_unknown_command() {
        assert!(parse_command("explode").is_err());
        // Arguments are required
        assert!(parse_command("insertColumns").is_err());
    }
}
