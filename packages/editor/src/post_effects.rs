//! # Post-Effect System
//!
//! Edits can leave the tree needing follow-up work that no single command
//! should be responsible for. For example:
//! - Splitting a block → the new half has no `id`
//! - Creating a section → it needs a `sectionId`
//! - Loading a hand-written document → sections or columns may be empty
//!
//! After each edit that changed the tree, the engine asks every registered
//! effect for the steps it wants and commits them as one follow-up
//! transaction that an undo history should fold into the edit.
//!
//! Post-effects are:
//! - **Deterministic**: Same tree (and generator state) always produces same steps
//! - **Idempotent**: Running again on their own output produces nothing
//! - **Minimal**: Only generate steps for nodes that need them

use crate::identity;
use crate::state::{EditorState, Transaction};
use quire_document::{Document, IdGenerator, Node, NodeType, Step};
use tracing::{debug, warn};

/// Post-effect that can be triggered by an edit
pub trait PostEffect: std::fmt::Debug {
    fn name(&self) -> &'static str;

    /// Inspect `doc` and return the steps needed to repair it
    fn analyze(&self, doc: &Document, ids: &mut IdGenerator) -> Vec<Step>;
}

/// Remove empty sections and refill empty columns.
///
/// Commands never produce these, but documents loaded without migration can
/// contain them.
#[derive(Debug)]
pub struct CollapseEmptyContainers;

impl PostEffect for CollapseEmptyContainers {
    fn name(&self) -> &'static str {
        "collapse_empty_containers"
    }

    fn analyze(&self, doc: &Document, _ids: &mut IdGenerator) -> Vec<Step> {
        let mut steps = Vec::new();

        // Highest index first, so earlier paths stay valid as steps apply
        let empty_sections: Vec<usize> = doc
            .content
            .iter()
            .enumerate()
            .filter(|(_, node)| node.node_type() == NodeType::Section && node.content().is_empty())
            .map(|(i, _)| i)
            .collect();
        let keep_one = empty_sections.len() == doc.content.len();

        for (n, &index) in empty_sections.iter().enumerate().rev() {
            if keep_one && n == 0 {
                steps.push(Step::ReplaceChildren {
                    parent: vec![index],
                    from: 0,
                    to: 0,
                    nodes: vec![Node::paragraph("")],
                });
            } else {
                steps.push(Step::ReplaceChildren {
                    parent: Vec::new(),
                    from: index,
                    to: index + 1,
                    nodes: Vec::new(),
                });
            }
        }

        for (section_index, section) in doc.content.iter().enumerate() {
            for (group_index, group) in section.content().iter().enumerate() {
                if group.node_type() != NodeType::ColumnGroup {
                    continue;
                }
                for (column_index, column) in group.content().iter().enumerate() {
                    if column.content().is_empty() {
                        steps.push(Step::ReplaceChildren {
                            parent: vec![section_index, group_index, column_index],
                            from: 0,
                            to: 0,
                            nodes: vec![Node::paragraph("")],
                        });
                    }
                }
            }
        }

        // Column fills must not be shifted by section removals queued above
        steps.sort_by_key(|step| match step {
            Step::ReplaceChildren { parent, .. } if parent.is_empty() => 1,
            _ => 0,
        });
        steps
    }
}

/// Issue `id` / `sectionId` values for nodes missing them or holding a
/// duplicate
#[derive(Debug)]
pub struct AssignIdentities;

impl PostEffect for AssignIdentities {
    fn name(&self) -> &'static str {
        "assign_identities"
    }

    fn analyze(&self, doc: &Document, ids: &mut IdGenerator) -> Vec<Step> {
        identity::assignment_steps(doc, ids)
    }
}

/// Post-effect engine that applies all registered effects
#[derive(Debug)]
pub struct PostEffectEngine {
    effects: Vec<Box<dyn PostEffect>>,
}

impl PostEffectEngine {
    /// Create engine with default effects
    pub fn new() -> Self {
        Self {
            effects: vec![Box::new(CollapseEmptyContainers), Box::new(AssignIdentities)],
        }
    }

    pub fn with_effects(effects: Vec<Box<dyn PostEffect>>) -> Self {
        Self { effects }
    }

    /// Build the follow-up transaction for `state`, or `None` when no effect
    /// has anything to do.
    ///
    /// Effects run in registration order, each seeing the tree produced by
    /// the ones before it. A step an effect asks for that cannot be applied
    /// is skipped with a warning.
    pub fn follow_up(&self, state: &EditorState, ids: &mut IdGenerator) -> Option<Transaction> {
        let mut tr = state.tr();
        tr.meta.add_to_history = false;
        tr.set_origin("post_effects");

        for effect in &self.effects {
            let steps = effect.analyze(tr.doc(), ids);
            if steps.is_empty() {
                continue;
            }
            debug!(effect = effect.name(), steps = steps.len(), "Post-effect produced steps");

            for step in steps {
                let name = step.name();
                if let Err(err) = tr.step(step) {
                    warn!(effect = effect.name(), step = name, error = %err, "Skipped post-effect step");
                }
            }
        }

        tr.doc_changed().then_some(tr)
    }
}

impl Default for PostEffectEngine {
    fn default() -> Self {
        Self::new()
    }
}
