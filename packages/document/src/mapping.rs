//! # Position Mapping
//!
//! Every applied [`Step`](crate::Step) records a [`StepMap`] describing how it
//! moved things. A [`Mapping`] chains those maps so a position computed
//! against an older tree value can be carried forward to the current one.

use crate::pos::{Assoc, Pos, Slot};

/// How one step shifted positions
#[derive(Debug, Clone, PartialEq)]
pub enum StepMap {
    /// Attribute-only change
    Identity,

    /// Children `from..to` of `parent` were replaced by `inserted` nodes
    Children {
        parent: Vec<usize>,
        from: usize,
        to: usize,
        inserted: usize,
    },

    /// Characters `from..to` of the textblock at `path` were replaced by
    /// `inserted` characters
    Text {
        path: Vec<usize>,
        from: usize,
        to: usize,
        inserted: usize,
    },

    /// The textblock at `path` was split at `offset`
    Split { path: Vec<usize>, offset: usize },

    /// Child `index` of `parent` was appended onto child `index - 1`, whose
    /// text was `first_len` characters long
    Join {
        parent: Vec<usize>,
        index: usize,
        first_len: usize,
    },
}

/// Result of mapping a value, flagging whether its target was deleted
#[derive(Debug, Clone, PartialEq)]
pub struct Mapped<T> {
    pub value: T,
    pub deleted: bool,
}

impl<T> Mapped<T> {
    fn kept(value: T) -> Self {
        Self {
            value,
            deleted: false,
        }
    }
}

/// Whether `path` runs through a child of `parent`
fn descends_from(path: &[usize], parent: &[usize]) -> bool {
    path.len() > parent.len() && path.starts_with(parent)
}

impl StepMap {
    pub fn map_pos(&self, pos: &Pos) -> Mapped<Pos> {
        let mut out = pos.clone();

        match self {
            StepMap::Identity => {}

            StepMap::Children {
                parent,
                from,
                to,
                inserted,
            } => {
                if descends_from(&pos.path, parent) {
                    let k = parent.len();
                    let i = pos.path[k];
                    if i >= *to {
                        out.path[k] = i - (to - from) + inserted;
                    } else if i >= *from {
                        out.path.truncate(k + 1);
                        out.path[k] = *from;
                        out.offset = 0;
                        return Mapped {
                            value: out,
                            deleted: true,
                        };
                    }
                }
            }

            StepMap::Text {
                path,
                from,
                to,
                inserted,
            } => {
                if pos.path == *path {
                    if pos.offset > *to {
                        out.offset = pos.offset - (to - from) + inserted;
                    } else if pos.offset >= *from {
                        out.offset = from + inserted;
                        return Mapped {
                            value: out,
                            deleted: pos.offset > *from && pos.offset < *to,
                        };
                    }
                }
            }

            StepMap::Split { path, offset } => {
                if let Some((&index, parent)) = path.split_last() {
                    let k = parent.len();
                    if pos.path == *path {
                        if pos.offset >= *offset {
                            out.path[k] = index + 1;
                            out.offset = pos.offset - offset;
                        }
                    } else if descends_from(&pos.path, parent) && pos.path[k] > index {
                        out.path[k] += 1;
                    }
                }
            }

            StepMap::Join {
                parent,
                index,
                first_len,
            } => {
                if descends_from(&pos.path, parent) {
                    let k = parent.len();
                    let i = pos.path[k];
                    if i == *index {
                        out.path[k] = index - 1;
                        if pos.path.len() == k + 1 {
                            out.offset += first_len;
                        }
                    } else if i > *index {
                        out.path[k] -= 1;
                    }
                }
            }
        }

        Mapped::kept(out)
    }

    pub fn map_slot(&self, slot: &Slot, assoc: Assoc) -> Mapped<Slot> {
        let direct_parent = match self {
            StepMap::Identity | StepMap::Text { .. } => return Mapped::kept(slot.clone()),
            StepMap::Children { parent, .. } | StepMap::Join { parent, .. } => parent.as_slice(),
            StepMap::Split { path, .. } => match path.split_last() {
                Some((_, parent)) => parent,
                None => return Mapped::kept(slot.clone()),
            },
        };

        if slot.parent != direct_parent {
            // The slot lives further down; only its parent path can move.
            let mapped = self.map_pos(&Pos::start_of(slot.parent.clone()));
            let index = if mapped.deleted { 0 } else { slot.index };
            return Mapped {
                value: Slot::new(mapped.value.path, index),
                deleted: mapped.deleted,
            };
        }

        let i = slot.index;
        let index = match self {
            StepMap::Children {
                from, to, inserted, ..
            } => {
                if i < *from {
                    i
                } else if i > *to {
                    i - (to - from) + inserted
                } else {
                    match assoc {
                        Assoc::Before => *from,
                        Assoc::After => from + inserted,
                    }
                }
            }
            StepMap::Split { path, .. } => {
                let split_index = path.last().copied().unwrap_or(0);
                if i > split_index {
                    i + 1
                } else {
                    i
                }
            }
            StepMap::Join { index, .. } => {
                if i > *index {
                    i - 1
                } else if i == *index {
                    match assoc {
                        Assoc::Before => index - 1,
                        Assoc::After => *index,
                    }
                } else {
                    i
                }
            }
            StepMap::Identity | StepMap::Text { .. } => i,
        };

        Mapped::kept(Slot::new(slot.parent.clone(), index))
    }
}

/// Ordered chain of step maps
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mapping {
    maps: Vec<StepMap>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, map: StepMap) {
        self.maps.push(map);
    }

    pub fn maps(&self) -> &[StepMap] {
        &self.maps
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    /// Mapping covering only the maps from index `start` onward
    pub fn slice_from(&self, start: usize) -> Mapping {
        Mapping {
            maps: self.maps.get(start..).map(<[_]>::to_vec).unwrap_or_default(),
        }
    }

    pub fn map_pos(&self, pos: &Pos) -> Mapped<Pos> {
        let mut deleted = false;
        let mut current = pos.clone();
        for map in &self.maps {
            let mapped = map.map_pos(&current);
            deleted |= mapped.deleted;
            current = mapped.value;
        }
        Mapped {
            value: current,
            deleted,
        }
    }

    pub fn map_slot(&self, slot: &Slot, assoc: Assoc) -> Mapped<Slot> {
        let mut deleted = false;
        let mut current = slot.clone();
        for map in &self.maps {
            let mapped = map.map_slot(&current, assoc);
            deleted |= mapped.deleted;
            current = mapped.value;
        }
        Mapped {
            value: current,
            deleted,
        }
    }
}
