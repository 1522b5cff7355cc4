//! # Quire Document
//!
//! Structural document model for the Quire rich-text editor.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ node: Document → Section → Block/Columns    │
//! │ schema: content rules + invariant checks    │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ pos/resolve/depth: path positions resolved  │
//! │ fresh against each tree value               │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ step/mapping/transform: validated edits     │
//! │ producing new tree values + position maps   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Values, not pointers**: a tree value is never mutated once built;
//!    every step yields a new one
//! 2. **Derived ancestry**: no node knows its parent; positions are paths
//!    resolved on demand
//! 3. **Closed node set**: every structural decision is an exhaustive match
//!    over [`NodeType`]
//! 4. **Atomic steps**: a step either applies in full or changes nothing
//!
//! ## Usage
//!
//! ```rust
//! use quire_document::{find_section_depth, Document, Node, Pos, Transform};
//!
//! let doc = Document::new(vec![Node::section(vec![
//!     Node::paragraph("Hello"),
//!     Node::paragraph("World"),
//! ])]);
//!
//! let rp = doc.resolve(&Pos::new(vec![0, 1], 0)).unwrap();
//! assert_eq!(find_section_depth(&rp), Some(1));
//!
//! let mut tr = Transform::new(doc);
//! tr.join_blocks(&[0], 1).unwrap();
//! assert_eq!(tr.doc().node_at(&[0, 0]).and_then(Node::text), Some("HelloWorld"));
//! ```

pub mod attrs;
mod depth;
mod error;
mod id_generator;
mod mapping;
pub mod migrate;
mod node;
mod pos;
mod resolve;
pub mod schema;
mod selection;
mod step;
mod transform;
pub mod visitor;

pub use depth::{
    find_ancestor_depth, find_column_group_depth, find_section_depth, find_top_block_depth,
};
pub use error::{format_path, PosParseError, ResolveError, StepError, StepResult};
pub use id_generator::{document_seed, IdGenerator};
pub use mapping::{Mapped, Mapping, StepMap};
pub use migrate::{migrate, MigrationReport};
pub use node::{
    byte_index, char_len, Block, BlockKind, ColumnGroupAttrs, ContentClass, Document, Node,
    NodeType, SectionAttrs, DEFAULT_COLUMN_GAP, MAX_COLUMNS, MIN_COLUMNS,
};
pub use pos::{Assoc, Pos, Slot};
pub use resolve::ResolvedPos;
pub use schema::SchemaViolation;
pub use selection::Selection;
pub use step::Step;
pub use transform::Transform;
