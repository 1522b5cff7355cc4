//! # Positions
//!
//! A [`Pos`] is a path of child indices from the document root plus a
//! character offset inside the node at the end of that path (normally a
//! textblock). A [`Slot`] names the gap before a child of some parent.
//!
//! Neither type borrows the tree. They are resolved fresh against whichever
//! tree value is current, and carried across edits by mapping them through a
//! [`Mapping`](crate::Mapping).

use crate::error::{format_path, PosParseError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub path: Vec<usize>,
    pub offset: usize,
}

impl Pos {
    pub fn new(path: Vec<usize>, offset: usize) -> Self {
        Self { path, offset }
    }

    /// Offset 0 of the node at `path`
    pub fn start_of(path: Vec<usize>) -> Self {
        Self { path, offset: 0 }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", format_path(&self.path), self.offset)
    }
}

impl FromStr for Pos {
    type Err = PosParseError;

    /// Parses `0.1:3` (path `[0, 1]`, offset 3); the offset defaults to 0.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (path_part, offset_part) = match s.split_once(':') {
            Some((path, offset)) => (path, Some(offset)),
            None => (s, None),
        };

        let path = if path_part.is_empty() || path_part == "/" {
            Vec::new()
        } else {
            path_part
                .split('.')
                .map(|seg| {
                    seg.trim()
                        .parse::<usize>()
                        .map_err(|_| PosParseError::InvalidSegment(seg.to_string()))
                })
                .collect::<Result<Vec<_>, _>>()?
        };

        let offset = match offset_part {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .map_err(|_| PosParseError::InvalidOffset(raw.to_string()))?,
            None => 0,
        };

        Ok(Self { path, offset })
    }
}

/// Insertion point before child `index` of the node at `parent`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slot {
    pub parent: Vec<usize>,
    pub index: usize,
}

impl Slot {
    pub fn new(parent: Vec<usize>, index: usize) -> Self {
        Self { parent, index }
    }

    /// Slot directly after the node at `path`
    pub fn after(path: &[usize]) -> Option<Self> {
        let (last, parent) = path.split_last()?;
        Some(Self {
            parent: parent.to_vec(),
            index: last + 1,
        })
    }

    /// Slot directly before the node at `path`
    pub fn before(path: &[usize]) -> Option<Self> {
        let (last, parent) = path.split_last()?;
        Some(Self {
            parent: parent.to_vec(),
            index: *last,
        })
    }

    /// Path of the child that currently occupies this slot
    pub fn child_path(&self) -> Vec<usize> {
        let mut path = self.parent.clone();
        path.push(self.index);
        path
    }
}

/// Which side of an insertion a mapped slot sticks to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    Before,
    After,
}
