//! # Quire Editor
//!
//! Structural editing engine on top of `quire-document`.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ host: key events, commands, clipboard       │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: EditSession                         │
//! │  - Route Enter / Backspace                  │
//! │  - Run section and column commands          │
//! │  - Commit transactions                      │
//! │  - Post-effects: identity, empty containers │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ document: tree values, steps, mapping       │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **States are values**: a transaction produces a new state, the old one
//!    stays valid
//! 2. **Declining is silent**: a command that does not apply returns
//!    `false` and changes nothing
//! 3. **Identity is self-healing**: missing or duplicate ids are fixed after
//!    every edit, never reported to the caller
//! 4. **Sections are never empty**: steps that would empty one are refused
//!
//! ## Usage
//!
//! ```rust
//! use quire_document::{Document, Node, Pos, Selection};
//! use quire_editor::{Command, EditSession, EditorConfig, Key};
//!
//! let doc = Document::new(vec![Node::section(vec![
//!     Node::paragraph("Hello"),
//!     Node::paragraph("World"),
//! ])]);
//! let mut session = EditSession::new("doc-1".to_string(), doc, EditorConfig::default());
//!
//! session.set_selection(Selection::cursor(Pos::start_of(vec![0, 1])))?;
//! assert!(session.execute(&Command::SplitSection));
//! assert_eq!(session.doc().section_count(), 2);
//!
//! // Backspace at the start of the second section merges it back
//! assert!(session.handle_key(&Key::Backspace));
//! assert_eq!(session.doc().section_count(), 1);
//! # Ok::<(), quire_editor::EditorError>(())
//! ```

pub mod commands;
mod config;
mod errors;
pub mod identity;
mod keymap;
mod post_effects;
mod session;
mod state;

pub use commands::{Command, CommandContext, CommandError};
pub use config::EditorConfig;
pub use errors::EditorError;
pub use keymap::{InputState, Key, KeyOutcome, KeyRouter};
pub use post_effects::{AssignIdentities, CollapseEmptyContainers, PostEffect, PostEffectEngine};
pub use session::EditSession;
pub use state::{EditorState, Transaction, TransactionMeta};
