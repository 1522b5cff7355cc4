//! # Commands
//!
//! Structural edit commands. Each one inspects an [`EditorState`] and either
//! builds a [`Transaction`] or declines.
//!
//! Declining is an ordinary outcome, not an error the caller has to handle:
//! [`Command::run`] logs the reason at debug level and returns `None`, and
//! the state is left exactly as it was. [`Command::try_run`] exposes the
//! reason for callers (and tests) that want it.

mod columns;
mod paste;
pub(crate) mod sections;
mod text;

pub use columns::{
    insert_columns, remove_columns, set_column_widths, toggle_column_borders, unwrap_columns,
};
pub use paste::paste_fragment;
pub use sections::{merge_section_with_next, merge_section_with_previous, split_section};
pub use text::{insert_text, newline_in_code, split_block};

use crate::config::EditorConfig;
use crate::state::{EditorState, Transaction};
use quire_document::{IdGenerator, NodeType, ResolveError, StepError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Why a command declined to run
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    #[error("Selection is not inside a section")]
    NoSection,

    #[error("Selection is not inside a block")]
    NoBlock,

    #[error("Selection is not inside a column group")]
    NotInColumns,

    #[error("Nothing to move: split point is at the section edge")]
    NothingToMove,

    #[error("No adjacent section to merge with")]
    NoAdjacentSection,

    #[error("Column count must be between 2 and 4, got {0}")]
    InvalidColumnCount(u8),

    #[error("Invalid column widths: {0}")]
    InvalidWidths(String),

    #[error("Selection spans more than one block")]
    CrossBlockSelection,

    #[error("Selection is not inside a {0}")]
    WrongBlockType(NodeType),

    #[error("Nothing to paste")]
    EmptyFragment,

    #[error("Fragment cannot be placed here: {0}")]
    NoPlaceForFragment(String),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Step(#[from] StepError),
}

pub type CommandResult = Result<Transaction, CommandError>;

/// Resources a command may draw on besides the state itself
pub struct CommandContext<'a> {
    pub ids: &'a mut IdGenerator,
    pub config: &'a EditorConfig,
}

impl<'a> CommandContext<'a> {
    pub fn new(ids: &'a mut IdGenerator, config: &'a EditorConfig) -> Self {
        Self { ids, config }
    }
}

/// A structural command, serializable so hosts can send it over the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum Command {
    SplitSection,
    MergeSectionWithPrevious,
    MergeSectionWithNext,
    InsertColumns {
        count: u8,
    },
    /// `None` resets to equal widths
    SetColumnWidths {
        widths: Option<Vec<f64>>,
    },
    ToggleColumnBorders,
    RemoveColumns,
    UnwrapColumns,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::SplitSection => "splitSection",
            Command::MergeSectionWithPrevious => "mergeSectionWithPrevious",
            Command::MergeSectionWithNext => "mergeSectionWithNext",
            Command::InsertColumns { .. } => "insertColumns",
            Command::SetColumnWidths { .. } => "setColumnWidths",
            Command::ToggleColumnBorders => "toggleColumnBorders",
            Command::RemoveColumns => "removeColumns",
            Command::UnwrapColumns => "unwrapColumns",
        }
    }

    pub fn try_run(&self, state: &EditorState, ctx: &mut CommandContext<'_>) -> CommandResult {
        let mut tr = match self {
            Command::SplitSection => split_section(state, ctx),
            Command::MergeSectionWithPrevious => merge_section_with_previous(state),
            Command::MergeSectionWithNext => merge_section_with_next(state),
            Command::InsertColumns { count } => insert_columns(state, ctx, *count),
            Command::SetColumnWidths { widths } => set_column_widths(state, widths.as_deref()),
            Command::ToggleColumnBorders => toggle_column_borders(state),
            Command::RemoveColumns => remove_columns(state),
            Command::UnwrapColumns => unwrap_columns(state),
        }?;
        tr.set_origin(self.name());
        Ok(tr)
    }

    /// Build the transaction, or `None` when the command does not apply
    pub fn run(&self, state: &EditorState, ctx: &mut CommandContext<'_>) -> Option<Transaction> {
        match self.try_run(state, ctx) {
            Ok(tr) => Some(tr),
            Err(reason) => {
                debug!(command = self.name(), %reason, "Command declined");
                None
            }
        }
    }
}
