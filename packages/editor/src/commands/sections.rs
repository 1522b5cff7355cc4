//! Section commands: split at the cursor, merge with a neighbour.

use super::{CommandContext, CommandError, CommandResult};
use crate::state::{EditorState, Transaction};
use quire_document::{
    find_section_depth, find_top_block_depth, migrate, Assoc, Node, NodeType, Pos, ResolvedPos, Selection, Slot,
};
use tracing::{debug, warn};

/// The section enclosing the selection head
pub(crate) struct SectionContext<'a> {
    pub rp: ResolvedPos<'a>,
    pub depth: usize,
    /// Depth of the section child holding the head
    pub top_depth: usize,
    pub path: Vec<usize>,
    pub node: &'a Node,
}

impl SectionContext<'_> {
    /// Index of the section among its siblings
    pub fn index(&self) -> usize {
        self.path.last().copied().unwrap_or(0)
    }

    pub fn parent_path(&self) -> &[usize] {
        &self.path[..self.path.len().saturating_sub(1)]
    }

    /// Index of the section child holding the head
    pub fn child_index(&self) -> usize {
        self.rp.index(self.depth)
    }
}

pub(crate) fn section_context(state: &EditorState) -> Result<SectionContext<'_>, CommandError> {
    let rp = state.head()?;
    let depth = find_section_depth(&rp).ok_or(CommandError::NoSection)?;
    let top_depth = find_top_block_depth(&rp)
        .filter(|&top| top > depth)
        .ok_or(CommandError::NoBlock)?;
    let node = rp.node(depth).ok_or(CommandError::NoSection)?;
    let path = rp.path_to(depth).to_vec();
    Ok(SectionContext {
        rp,
        depth,
        top_depth,
        path,
        node,
    })
}

/// Carry `pos` from inside the section at `from` to the section at `to`,
/// shifting its child index by `shift`
fn relocate(pos: &Pos, from: &[usize], to: &[usize], shift: usize) -> Option<Pos> {
    if pos.path.len() <= from.len() || !pos.path.starts_with(from) {
        return None;
    }
    let k = from.len();
    let mut path = to.to_vec();
    path.push(pos.path[k] + shift);
    path.extend_from_slice(&pos.path[k + 1..]);
    Some(Pos::new(path, pos.offset))
}

fn relocate_selection(
    selection: &Selection,
    from: &[usize],
    to: &[usize],
    shift: usize,
) -> Option<Selection> {
    let head = relocate(&selection.head, from, to, shift)?;
    let anchor = relocate(&selection.anchor, from, to, shift).unwrap_or_else(|| head.clone());
    Some(Selection::new(anchor, head))
}

/// Split the enclosing section at the cursor.
///
/// Children from the split point onward move into a new section inserted
/// directly after the current one. The split point is the cursor's child when
/// the cursor sits at that child's very start, otherwise the child after it.
/// The new section's level comes from a leading heading, and the cursor lands
/// at the start of its first textblock.
pub fn split_section(state: &EditorState, ctx: &mut CommandContext<'_>) -> CommandResult {
    let section = section_context(state)?;
    let child_index = section.child_index();
    let child_count = section.node.content().len();

    let split_index = if section.rp.at_start_of(section.top_depth) {
        child_index
    } else {
        child_index + 1
    };
    if split_index == 0 || split_index >= child_count {
        return Err(CommandError::NothingToMove);
    }

    let moved = section.node.content()[split_index..].to_vec();
    let new_section = migrate::new_section(moved, ctx.ids);
    let insert_at = Slot::after(&section.path).ok_or(CommandError::NoSection)?;

    let mut tr = state.tr();
    tr.delete_children(&section.path, split_index, child_count)?;
    let slot = tr.mapping().map_slot(&insert_at, Assoc::Before).value;
    tr.insert_children(&slot, vec![new_section])?;

    let new_path = slot.child_path();
    match Selection::at_start(tr.doc(), &new_path) {
        Some(selection) => {
            tr.set_selection(selection);
        }
        None => warn!(
            section = ?new_path,
            "New section has no textblock; falling back to selection repair"
        ),
    }

    debug!(split_index, moved = child_count - split_index, "Split section");
    Ok(tr)
}

/// Append the children of the section at `ctx` onto the previous section and
/// remove it. Returns the transaction, the previous section's path, and how
/// many children it held before the merge.
pub(crate) fn merge_into_previous(
    state: &EditorState,
    section: &SectionContext<'_>,
) -> Result<(Transaction, Vec<usize>, usize), CommandError> {
    let index = section.index();
    if index == 0 {
        return Err(CommandError::NoAdjacentSection);
    }

    let mut prev_path = section.parent_path().to_vec();
    prev_path.push(index - 1);
    let prev = state
        .doc()
        .node_at(&prev_path)
        .filter(|node| node.node_type() == NodeType::Section)
        .ok_or(CommandError::NoAdjacentSection)?;
    let prev_len = prev.content().len();

    let mut tr = state.tr();
    tr.insert_children(
        &Slot::new(prev_path.clone(), prev_len),
        section.node.content().to_vec(),
    )?;
    tr.delete_children(section.parent_path(), index, index + 1)?;
    Ok((tr, prev_path, prev_len))
}

/// Merge the enclosing section into the previous one. The previous section's
/// attributes survive.
pub fn merge_section_with_previous(state: &EditorState) -> CommandResult {
    let section = section_context(state)?;
    let (mut tr, prev_path, prev_len) = merge_into_previous(state, &section)?;

    if let Some(selection) =
        relocate_selection(state.selection(), &section.path, &prev_path, prev_len)
    {
        tr.set_selection(selection);
    }
    Ok(tr)
}

/// Merge the enclosing section into the next one: its children are prepended
/// to the next section, whose attributes survive.
pub fn merge_section_with_next(state: &EditorState) -> CommandResult {
    let section = section_context(state)?;
    let index = section.index();

    let mut next_path = section.parent_path().to_vec();
    next_path.push(index + 1);
    state
        .doc()
        .node_at(&next_path)
        .filter(|node| node.node_type() == NodeType::Section)
        .ok_or(CommandError::NoAdjacentSection)?;

    let mut tr = state.tr();
    tr.insert_children(
        &Slot::new(next_path.clone(), 0),
        section.node.content().to_vec(),
    )?;
    tr.delete_children(section.parent_path(), index, index + 1)?;

    let merged_path = tr.mapping().slice_from(1).map_pos(&Pos::start_of(next_path)).value.path;
    if let Some(selection) = relocate_selection(state.selection(), &section.path, &merged_path, 0)
    {
        tr.set_selection(selection);
    }
    Ok(tr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use quire_document::{schema, Document, IdGenerator};

    fn state_at(doc: Document, pos: Pos) -> EditorState {
        EditorState::with_selection(doc, Selection::cursor(pos))
    }

    fn split(state: &EditorState) -> CommandResult {
        let mut ids = IdGenerator::from_seed("t");
        let config = EditorConfig::default();
        split_section(state, &mut CommandContext::new(&mut ids, &config))
    }

    fn hello_world() -> Document {
        Document::new(vec![Node::section(vec![
            Node::paragraph("Hello"),
            Node::paragraph("World"),
        ])])
    }

    #[test]
    fn test_split_at_start_of_second_block() {
        let state = state_at(hello_world(), Pos::start_of(vec![0, 1]));
        let next = state.apply(&split(&state).unwrap());

        assert_eq!(next.doc().section_count(), 2);
        assert_eq!(next.doc().content[0].content()[0].text(), Some("Hello"));
        assert_eq!(next.doc().content[1].content()[0].text(), Some("World"));
        assert_eq!(next.selection(), &Selection::cursor(Pos::start_of(vec![1, 0])));
        assert!(next.doc().content[1].section_id().is_some());
        assert!(schema::check(next.doc())
            .iter()
            .all(|v| !matches!(v, schema::SchemaViolation::EmptyContainer { .. })));
    }

    #[test]
    fn test_split_mid_block_moves_following_children() {
        let doc = Document::new(vec![Node::section(vec![
            Node::paragraph("Hello"),
            Node::heading(2, "Next"),
            Node::paragraph("World"),
        ])]);
        let state = state_at(doc, Pos::new(vec![0, 0], 2));
        let next = state.apply(&split(&state).unwrap());

        assert_eq!(next.doc().content[0].content().len(), 1);
        assert_eq!(next.doc().content[1].content().len(), 2);
        match &next.doc().content[1] {
            Node::Section { attrs, .. } => assert_eq!(attrs.level, Some(2)),
            other => panic!("Expected section, got {:?}", other),
        }
    }

    #[test]
    fn test_split_at_section_start_declines() {
        let state = state_at(hello_world(), Pos::start_of(vec![0, 0]));
        assert_eq!(split(&state).unwrap_err(), CommandError::NothingToMove);
    }

    #[test]
    fn test_split_in_last_block_declines() {
        let state = state_at(hello_world(), Pos::new(vec![0, 1], 3));
        assert_eq!(split(&state).unwrap_err(), CommandError::NothingToMove);
    }

    #[test]
    fn test_split_inside_columns_moves_whole_group_only_at_its_start() {
        let doc = Document::new(vec![Node::section(vec![
            Node::paragraph("Intro"),
            Node::column_group(vec![
                Node::column(vec![Node::paragraph("left")]),
                Node::column(vec![Node::paragraph("right")]),
            ]),
        ])]);

        // Start of the first column is the start of the group
        let state = state_at(doc.clone(), Pos::start_of(vec![0, 1, 0, 0]));
        let next = state.apply(&split(&state).unwrap());
        assert_eq!(next.doc().content[1].content()[0].node_type(), NodeType::ColumnGroup);

        // Start of the second column is not
        let state = state_at(doc, Pos::start_of(vec![0, 1, 1, 0]));
        assert_eq!(split(&state).unwrap_err(), CommandError::NothingToMove);
    }

    #[test]
    fn test_section_context_inside_columns() {
        let doc = Document::new(vec![Node::section(vec![
            Node::paragraph("Intro"),
            Node::column_group(vec![
                Node::column(vec![Node::blockquote(vec![Node::paragraph("deep")])]),
                Node::column(vec![Node::paragraph("right")]),
            ]),
        ])]);
        let state = state_at(doc, Pos::start_of(vec![0, 1, 0, 0, 0]));
        let section = section_context(&state).unwrap();

        assert_eq!(section.depth, 1);
        assert_eq!(section.top_depth, 2);
        assert_eq!(section.child_index(), 1);
        assert_eq!(section.path, vec![0]);
    }

    #[test]
    fn test_legacy_content_has_no_section() {
        let doc = Document::new(vec![Node::paragraph("a"), Node::paragraph("b")]);
        let state = state_at(doc, Pos::start_of(vec![1]));
        assert_eq!(split(&state).unwrap_err(), CommandError::NoSection);
    }

    #[test]
    fn test_merge_with_previous_restores_split() {
        let state = state_at(hello_world(), Pos::start_of(vec![0, 1]));
        let split_state = state.apply(&split(&state).unwrap());

        let merged = split_state.apply(&merge_section_with_previous(&split_state).unwrap());
        assert_eq!(merged.doc().section_count(), 1);
        assert_eq!(merged.doc().content[0].content().len(), 2);
        assert_eq!(merged.selection().head, Pos::start_of(vec![0, 1]));
    }

    #[test]
    fn test_merge_with_previous_in_first_section_declines() {
        let state = state_at(hello_world(), Pos::start_of(vec![0, 1]));
        assert_eq!(
            merge_section_with_previous(&state).unwrap_err(),
            CommandError::NoAdjacentSection
        );
    }

    #[test]
    fn test_merge_with_next_keeps_next_attrs() {
        let mut second = Node::section(vec![Node::paragraph("B")]);
        if let Node::Section { attrs, .. } = &mut second {
            attrs.section_id = Some("keep".to_string());
        }
        let doc = Document::new(vec![Node::section(vec![Node::paragraph("A")]), second]);
        let state = state_at(doc, Pos::new(vec![0, 0], 1));

        let next = state.apply(&merge_section_with_next(&state).unwrap());
        assert_eq!(next.doc().section_count(), 1);
        assert_eq!(next.doc().content[0].section_id(), Some("keep"));
        assert_eq!(next.doc().content[0].content()[0].text(), Some("A"));
        assert_eq!(next.doc().content[0].content()[1].text(), Some("B"));
        assert_eq!(next.selection().head, Pos::new(vec![0, 0], 1));
    }

    #[test]
    fn test_merge_with_next_in_last_section_declines() {
        let state = state_at(hello_world(), Pos::start_of(vec![0, 0]));
        assert_eq!(
            merge_section_with_next(&state).unwrap_err(),
            CommandError::NoAdjacentSection
        );
    }
}
