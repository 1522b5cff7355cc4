//! # Key Routing
//!
//! Enter and Backspace are routed through ordered handler chains. The first
//! handler that claims a key ends the chain; a key nobody claims is passed
//! through to default text handling.
//!
//! Backspace at the very start of a section is claimed even when it changes
//! nothing, so the default handler never joins across a section boundary on
//! its own.

use crate::commands::{self, sections};
use crate::state::{EditorState, Transaction};
use quire_document::{schema, BlockKind, Pos, Selection};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Key {
    Enter,
    Backspace,
    Other(String),
}

impl std::str::FromStr for Key {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "enter" | "return" => Key::Enter,
            "backspace" => Key::Backspace,
            _ => Key::Other(s.to_string()),
        })
    }
}

/// Result of routing one key event
#[derive(Debug)]
pub enum KeyOutcome {
    /// No handler claimed the key
    PassThrough,
    /// Claimed, with nothing to change
    Consumed,
    /// Claimed, with an edit to dispatch
    Edit(Transaction),
}

impl KeyOutcome {
    pub fn handled(&self) -> bool {
        !matches!(self, KeyOutcome::PassThrough)
    }
}

/// Input modes of the router. Keys are only ever routed while idle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InputState {
    #[default]
    Idle,
}

#[derive(Debug, Default)]
pub struct KeyRouter {
    state: InputState,
}

impl KeyRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> InputState {
        self.state
    }

    pub fn route(&mut self, key: &Key, state: &EditorState) -> KeyOutcome {
        match (self.state, key) {
            (InputState::Idle, Key::Enter) => enter(state),
            (InputState::Idle, Key::Backspace) => backspace(state),
            (InputState::Idle, Key::Other(_)) => KeyOutcome::PassThrough,
        }
    }
}

/// Enter: line break in code, otherwise split the textblock. Selections
/// spanning blocks are left to default handling.
fn enter(state: &EditorState) -> KeyOutcome {
    let chain: [(&str, fn(&EditorState) -> commands::CommandResult); 2] = [
        ("newline_in_code", commands::newline_in_code),
        ("split_block", commands::split_block),
    ];

    for (name, handler) in chain {
        match handler(state) {
            Ok(mut tr) => {
                tr.set_origin(name);
                return KeyOutcome::Edit(tr);
            }
            Err(reason) => debug!(handler = name, %reason, "Enter handler declined"),
        }
    }
    KeyOutcome::PassThrough
}

/// Backspace at the start of a section.
///
/// Only claims the key when the cursor is collapsed at the very start of the
/// section's first child. A non-paragraph first textblock is turned into a
/// paragraph first and nothing else happens. Otherwise the section merges
/// into the previous one and the previous section's last block is joined
/// with the moved first block when their content is compatible. In the
/// first section the key is consumed without any change.
fn backspace(state: &EditorState) -> KeyOutcome {
    if !state.selection().is_empty() {
        return KeyOutcome::PassThrough;
    }
    let Ok(section) = sections::section_context(state) else {
        return KeyOutcome::PassThrough;
    };
    let rp = &section.rp;
    let top_depth = section.top_depth;
    if !rp.at_textblock_start() || section.child_index() != 0 || !rp.at_start_of(top_depth) {
        return KeyOutcome::PassThrough;
    }

    let Some(first) = rp.node(top_depth) else {
        return KeyOutcome::PassThrough;
    };
    if first.is_textblock() && !first.is_paragraph() {
        let mut tr = state.tr();
        return match tr.set_block_kind(rp.path_to(top_depth), BlockKind::Paragraph) {
            Ok(_) => {
                tr.set_origin("backspace_reset_block");
                KeyOutcome::Edit(tr)
            }
            Err(err) => {
                debug!(error = %err, "Could not reset first block to paragraph");
                KeyOutcome::Consumed
            }
        };
    }

    let (mut tr, prev_path, prev_len) = match sections::merge_into_previous(state, &section) {
        Ok(merged) => merged,
        Err(reason) => {
            debug!(%reason, "Backspace at section start with nothing to merge into");
            return KeyOutcome::Consumed;
        }
    };
    tr.set_origin("backspace_merge_section");

    let mut moved_path = prev_path.clone();
    moved_path.push(prev_len);
    let before_join = tr.steps().len();

    if first.is_textblock() && prev_len > 0 {
        let prev_last = state
            .doc()
            .node_at(&prev_path)
            .and_then(|prev| prev.content().last());
        if prev_last.is_some_and(|last| schema::can_join(last, first)) {
            if let Err(err) = tr.join_blocks(&prev_path, prev_len) {
                debug!(error = %err, "Block join after section merge skipped");
            }
        }
    }

    let landed = tr
        .mapping()
        .slice_from(before_join)
        .map_pos(&Pos::start_of(moved_path));
    match Selection::near(tr.doc(), &landed.value) {
        Some(selection) => {
            tr.set_selection(selection);
        }
        None => debug!("No textblock near merged content"),
    }
    KeyOutcome::Edit(tr)
}
