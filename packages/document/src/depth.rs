//! Ancestor lookup by walking a resolved position upward.
//!
//! Column containers add a variable number of levels between a Section and
//! the blocks inside it, so nothing here assumes a fixed absolute depth.
//! Results are depths into the [`ResolvedPos`] they were computed from and
//! must be recomputed after every edit.

use crate::node::NodeType;
use crate::resolve::ResolvedPos;

/// Depth of the nearest enclosing Section, `None` for legacy content that
/// sits directly under the document.
pub fn find_section_depth(rp: &ResolvedPos<'_>) -> Option<usize> {
    find_ancestor_depth(rp, |node_type| node_type == NodeType::Section)
}

/// Depth of the nearest "top block": a direct child of a Section, or of the
/// document for legacy content.
pub fn find_top_block_depth(rp: &ResolvedPos<'_>) -> Option<usize> {
    (1..=rp.depth())
        .rev()
        .find(|&d| matches!(rp.node_type(d - 1), NodeType::Section | NodeType::Doc))
}

/// Depth of the nearest enclosing ColumnGroup
pub fn find_column_group_depth(rp: &ResolvedPos<'_>) -> Option<usize> {
    find_ancestor_depth(rp, |node_type| node_type == NodeType::ColumnGroup)
}

/// Nearest depth (deepest first, the root excluded) whose node type matches
pub fn find_ancestor_depth(
    rp: &ResolvedPos<'_>,
    predicate: impl Fn(NodeType) -> bool,
) -> Option<usize> {
    (1..=rp.depth()).rev().find(|&d| predicate(rp.node_type(d)))
}
