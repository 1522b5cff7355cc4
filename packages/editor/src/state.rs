//! # Editor State
//!
//! An [`EditorState`] is an immutable pair of tree value and selection.
//! Edits are built as a [`Transaction`] against one state and applied to
//! produce the next; the previous state is never touched.

use quire_document::{Document, Pos, ResolveError, ResolvedPos, Selection, Transform};
use std::ops::{Deref, DerefMut};
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct EditorState {
    doc: Document,
    selection: Selection,
}

impl EditorState {
    /// State with the cursor at the start of the first textblock
    pub fn new(doc: Document) -> Self {
        let selection = Selection::at_start(&doc, &[]).unwrap_or_default_cursor();
        Self { doc, selection }
    }

    /// State with `selection`, repaired if it does not resolve inside a
    /// textblock of `doc`
    pub fn with_selection(doc: Document, selection: Selection) -> Self {
        let selection = if selection.is_valid_in(&doc) {
            selection
        } else {
            Selection::near(&doc, &selection.head).unwrap_or_default_cursor()
        };
        Self { doc, selection }
    }

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Resolved selection head
    pub fn head(&self) -> Result<ResolvedPos<'_>, ResolveError> {
        self.doc.resolve(&self.selection.head)
    }

    /// Start a transaction against this state
    pub fn tr(&self) -> Transaction {
        Transaction::new(self.doc.clone())
    }

    /// Produce the state that results from `tr`.
    ///
    /// An explicit selection on the transaction wins. Otherwise the current
    /// selection is mapped through the transaction's steps, falling back to
    /// the nearest textblock when its position no longer exists.
    pub fn apply(&self, tr: &Transaction) -> EditorState {
        let doc = tr.doc().clone();
        let selection = match tr.selection() {
            Some(selection) if selection.is_valid_in(&doc) => Some(selection.clone()),
            Some(selection) => {
                warn!(
                    head = %selection.head,
                    "Explicit selection does not resolve; repairing"
                );
                Selection::near(&doc, &selection.head)
            }
            None => self.selection.map(tr.mapping(), &doc),
        };

        EditorState {
            doc,
            selection: selection.unwrap_or_default_cursor(),
        }
    }
}

trait SelectionFallback {
    fn unwrap_or_default_cursor(self) -> Selection;
}

impl SelectionFallback for Option<Selection> {
    /// A tree without textblocks has nowhere for a caret; park it at the root
    fn unwrap_or_default_cursor(self) -> Selection {
        self.unwrap_or_else(|| Selection::cursor(Pos::default()))
    }
}

/// Metadata carried alongside the steps of a transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionMeta {
    /// Name of the command or handler that built the transaction
    pub origin: Option<String>,
    /// Content came from the clipboard
    pub paste: bool,
    /// False for follow-up fixes that an undo history should fold into the
    /// edit that caused them
    pub add_to_history: bool,
}

impl Default for TransactionMeta {
    fn default() -> Self {
        Self {
            origin: None,
            paste: false,
            add_to_history: true,
        }
    }
}

/// A [`Transform`] plus the selection and metadata to commit with it
#[derive(Debug, Clone)]
pub struct Transaction {
    transform: Transform,
    selection: Option<Selection>,
    pub meta: TransactionMeta,
}

impl Transaction {
    pub fn new(doc: Document) -> Self {
        Self {
            transform: Transform::new(doc),
            selection: None,
            meta: TransactionMeta::default(),
        }
    }

    /// Explicit selection to commit, if one was set
    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn set_selection(&mut self, selection: Selection) -> &mut Self {
        self.selection = Some(selection);
        self
    }

    pub fn set_origin(&mut self, origin: impl Into<String>) -> &mut Self {
        self.meta.origin = Some(origin.into());
        self
    }
}

impl Deref for Transaction {
    type Target = Transform;

    fn deref(&self) -> &Transform {
        &self.transform
    }
}

impl DerefMut for Transaction {
    fn deref_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }
}
