//! # Transform
//!
//! Accumulates steps over a starting tree value.
//!
//! Each step is applied to the current value as soon as it is added, so later
//! steps see the result of earlier ones. Anything computed against an earlier
//! value must go through [`Transform::mapping`] before it is used.

use crate::error::StepResult;
use crate::mapping::Mapping;
use crate::node::{BlockKind, ColumnGroupAttrs, Document, Node};
use crate::pos::{Pos, Slot};
use crate::step::Step;
use tracing::trace;

#[derive(Debug, Clone)]
pub struct Transform {
    before: Document,
    doc: Document,
    steps: Vec<Step>,
    mapping: Mapping,
}

impl Transform {
    pub fn new(doc: Document) -> Self {
        Self {
            before: doc.clone(),
            doc,
            steps: Vec::new(),
            mapping: Mapping::new(),
        }
    }

    /// Tree value the transform started from
    pub fn before(&self) -> &Document {
        &self.before
    }

    /// Current tree value
    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn into_doc(self) -> Document {
        self.doc
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    pub fn doc_changed(&self) -> bool {
        !self.steps.is_empty()
    }

    /// Apply `step`; on failure nothing changes
    pub fn step(&mut self, step: Step) -> StepResult<&mut Self> {
        let (doc, map) = step.apply(&self.doc)?;
        trace!(step = step.name(), count = self.steps.len() + 1, "Applied step");
        self.doc = doc;
        self.mapping.push(map);
        self.steps.push(step);
        Ok(self)
    }

    pub fn replace_children(
        &mut self,
        parent: &[usize],
        from: usize,
        to: usize,
        nodes: Vec<Node>,
    ) -> StepResult<&mut Self> {
        self.step(Step::ReplaceChildren {
            parent: parent.to_vec(),
            from,
            to,
            nodes,
        })
    }

    pub fn insert_children(&mut self, slot: &Slot, nodes: Vec<Node>) -> StepResult<&mut Self> {
        self.replace_children(&slot.parent, slot.index, slot.index, nodes)
    }

    pub fn delete_children(
        &mut self,
        parent: &[usize],
        from: usize,
        to: usize,
    ) -> StepResult<&mut Self> {
        self.replace_children(parent, from, to, Vec::new())
    }

    pub fn replace_text(
        &mut self,
        path: &[usize],
        from: usize,
        to: usize,
        text: impl Into<String>,
    ) -> StepResult<&mut Self> {
        self.step(Step::ReplaceText {
            path: path.to_vec(),
            from,
            to,
            text: text.into(),
        })
    }

    pub fn insert_text(&mut self, pos: &Pos, text: impl Into<String>) -> StepResult<&mut Self> {
        self.replace_text(&pos.path, pos.offset, pos.offset, text)
    }

    pub fn split_block(&mut self, pos: &Pos) -> StepResult<&mut Self> {
        self.step(Step::SplitBlock {
            path: pos.path.clone(),
            offset: pos.offset,
        })
    }

    pub fn join_blocks(&mut self, parent: &[usize], index: usize) -> StepResult<&mut Self> {
        self.step(Step::JoinBlocks {
            parent: parent.to_vec(),
            index,
        })
    }

    pub fn set_block_kind(&mut self, path: &[usize], kind: BlockKind) -> StepResult<&mut Self> {
        self.step(Step::SetBlockKind {
            path: path.to_vec(),
            kind,
        })
    }

    pub fn set_column_group_attrs(
        &mut self,
        path: &[usize],
        attrs: ColumnGroupAttrs,
    ) -> StepResult<&mut Self> {
        self.step(Step::SetColumnGroupAttrs {
            path: path.to_vec(),
            attrs,
        })
    }

    pub fn set_identity(
        &mut self,
        path: &[usize],
        id: Option<String>,
        section_id: Option<String>,
    ) -> StepResult<&mut Self> {
        self.step(Step::SetIdentity {
            path: path.to_vec(),
            id,
            section_id,
        })
    }
}
