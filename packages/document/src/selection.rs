//! Text selections and the default selection repair.

use crate::mapping::Mapping;
use crate::node::{Document, Node};
use crate::pos::Pos;
use serde::{Deserialize, Serialize};

/// Text selection between two textblock positions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: Pos,
    pub head: Pos,
}

impl Selection {
    pub fn new(anchor: Pos, head: Pos) -> Self {
        Self { anchor, head }
    }

    /// Collapsed selection at `pos`
    pub fn cursor(pos: Pos) -> Self {
        Self {
            anchor: pos.clone(),
            head: pos,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.anchor == self.head
    }

    pub fn from(&self) -> &Pos {
        std::cmp::min(&self.anchor, &self.head)
    }

    pub fn to(&self) -> &Pos {
        std::cmp::max(&self.anchor, &self.head)
    }

    /// Both ends inside the same textblock
    pub fn within_one_block(&self) -> bool {
        self.anchor.path == self.head.path
    }

    /// Cursor at the start of the first textblock at or below `path`
    pub fn at_start(doc: &Document, path: &[usize]) -> Option<Self> {
        let relative = match doc.node_at(path) {
            Some(node) => node.first_textblock()?,
            None if path.is_empty() => {
                let first = doc.textblock_paths().into_iter().next()?;
                return Some(Self::cursor(Pos::start_of(first)));
            }
            None => return None,
        };
        let mut full = path.to_vec();
        full.extend(relative);
        Some(Self::cursor(Pos::start_of(full)))
    }

    /// Cursor at the end of the last textblock at or below `path`
    pub fn at_end(doc: &Document, path: &[usize]) -> Option<Self> {
        let node = doc.node_at(path)?;
        let relative = node.last_textblock()?;
        let mut full = path.to_vec();
        full.extend(relative);
        let len = doc.node_at(&full).map(Node::text_len).unwrap_or(0);
        Some(Self::cursor(Pos::new(full, len)))
    }

    /// Nearest valid cursor to `pos`.
    ///
    /// Keeps `pos` if it resolves inside a textblock (clamping the offset),
    /// otherwise picks the first textblock at or after it in document order,
    /// falling back to the end of the last textblock.
    pub fn near(doc: &Document, pos: &Pos) -> Option<Self> {
        if let Some(node) = doc.node_at(&pos.path) {
            if node.is_textblock() {
                let offset = pos.offset.min(node.text_len());
                return Some(Self::cursor(Pos::new(pos.path.clone(), offset)));
            }
        }

        let paths = doc.textblock_paths();
        if let Some(path) = paths.iter().find(|p| p.as_slice() >= pos.path.as_slice()) {
            return Some(Self::cursor(Pos::start_of(path.clone())));
        }
        paths.last().map(|path| {
            let len = doc.node_at(path).map(Node::text_len).unwrap_or(0);
            Self::cursor(Pos::new(path.clone(), len))
        })
    }

    /// Carry the selection through `mapping` into `doc`, repairing it when an
    /// end was deleted or no longer resolves inside a textblock.
    pub fn map(&self, mapping: &Mapping, doc: &Document) -> Option<Self> {
        let anchor = mapping.map_pos(&self.anchor);
        let head = mapping.map_pos(&self.head);

        let valid = |pos: &Pos| {
            doc.resolve(pos)
                .map(|rp| rp.in_textblock())
                .unwrap_or(false)
        };

        if !anchor.deleted && !head.deleted && valid(&anchor.value) && valid(&head.value) {
            return Some(Self::new(anchor.value, head.value));
        }
        Self::near(doc, &head.value)
    }

    /// True when both ends resolve inside textblocks of `doc`
    pub fn is_valid_in(&self, doc: &Document) -> bool {
        [&self.anchor, &self.head].iter().all(|pos| {
            doc.resolve(pos)
                .map(|rp| rp.in_textblock())
                .unwrap_or(false)
        })
    }
}
