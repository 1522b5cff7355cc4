//! Placing a pasted fragment.
//!
//! Identity collisions are healed before the fragment gets here; this module
//! only decides where the nodes go.

use super::{CommandError, CommandResult};
use crate::state::EditorState;
use quire_document::{schema, Node, NodeType, Selection, Slot};

/// Insert `nodes` at the selection head.
///
/// A fragment of sections goes in after the section holding the cursor. Any
/// other fragment goes into the deepest container around the cursor that
/// accepts every node in it, after the cursor's block there, or in place of
/// that block when it is an empty textblock. The cursor lands at the end of
/// the last pasted node.
pub fn paste_fragment(state: &EditorState, nodes: Vec<Node>) -> CommandResult {
    if nodes.is_empty() {
        return Err(CommandError::EmptyFragment);
    }

    let rp = state.head()?;
    let sections = nodes
        .iter()
        .filter(|node| node.node_type() == NodeType::Section)
        .count();
    let count = nodes.len();

    let (parent, start, mut tr) = if sections == count {
        let root_index = rp.path().first().copied().ok_or(CommandError::NoBlock)?;
        let mut tr = state.tr();
        tr.insert_children(&Slot::new(Vec::new(), root_index + 1), nodes)?;
        (Vec::new(), root_index + 1, tr)
    } else if sections > 0 {
        return Err(CommandError::NoPlaceForFragment(
            "sections cannot be mixed with other nodes".to_string(),
        ));
    } else {
        let depth = (1..=rp.depth())
            .rev()
            .find(|&d| {
                let container = rp.node_type(d - 1);
                nodes
                    .iter()
                    .all(|node| schema::allows_child(container, node.node_type()))
            })
            .ok_or_else(|| {
                CommandError::NoPlaceForFragment("no enclosing container accepts it".to_string())
            })?;

        let target = rp.node(depth).ok_or(CommandError::NoBlock)?;
        let parent = rp.path_to(depth - 1).to_vec();
        let index = rp.index(depth - 1);

        let mut tr = state.tr();
        if target.is_empty_textblock() {
            tr.replace_children(&parent, index, index + 1, nodes)?;
            (parent, index, tr)
        } else {
            tr.insert_children(&Slot::new(parent.clone(), index + 1), nodes)?;
            (parent, index + 1, tr)
        }
    };

    let mut last = parent;
    last.push(start + count - 1);
    if let Some(selection) = Selection::at_end(tr.doc(), &last) {
        tr.set_selection(selection);
    }
    tr.meta.paste = true;
    Ok(tr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_document::{Document, Pos};

    fn state_at(doc: Document, pos: Pos) -> EditorState {
        EditorState::with_selection(doc, Selection::cursor(pos))
    }

    fn doc() -> Document {
        Document::new(vec![Node::section(vec![
            Node::paragraph("a"),
            Node::column_group(vec![
                Node::column(vec![Node::paragraph("l")]),
                Node::column(vec![Node::paragraph("")]),
            ]),
        ])])
    }

    #[test]
    fn test_paste_blocks_after_cursor_block() {
        let state = state_at(doc(), Pos::new(vec![0, 0], 1));
        let tr = paste_fragment(&state, vec![Node::paragraph("x"), Node::paragraph("yz")]).unwrap();
        assert!(tr.meta.paste);

        let next = state.apply(&tr);
        let texts: Vec<_> = next.doc().content[0]
            .content()
            .iter()
            .filter_map(Node::text)
            .collect();
        assert_eq!(texts, vec!["a", "x", "yz"]);
        assert_eq!(next.selection().head, Pos::new(vec![0, 2], 2));
    }

    #[test]
    fn test_paste_into_empty_column_paragraph_replaces_it() {
        let state = state_at(doc(), Pos::start_of(vec![0, 1, 1, 0]));
        let next = state.apply(&paste_fragment(&state, vec![Node::paragraph("x")]).unwrap());

        assert_eq!(next.doc().node_at(&[0, 1, 1]).map(|c| c.content().len()), Some(1));
        assert_eq!(next.doc().node_at(&[0, 1, 1, 0]).and_then(Node::text), Some("x"));
    }

    #[test]
    fn test_paste_columns_inside_columns_goes_to_section() {
        let state = state_at(doc(), Pos::start_of(vec![0, 1, 0, 0]));
        let fragment = vec![Node::column_group(vec![
            Node::column(vec![Node::paragraph("p")]),
            Node::column(vec![Node::paragraph("q")]),
        ])];
        let next = state.apply(&paste_fragment(&state, fragment).unwrap());

        let section = &next.doc().content[0];
        assert_eq!(section.content().len(), 3);
        assert_eq!(section.content()[2].node_type(), NodeType::ColumnGroup);
    }

    #[test]
    fn test_paste_sections_after_current_section() {
        let state = state_at(doc(), Pos::new(vec![0, 0], 1));
        let next = state.apply(
            &paste_fragment(&state, vec![Node::section(vec![Node::paragraph("s")])]).unwrap(),
        );
        assert_eq!(next.doc().section_count(), 2);
        assert_eq!(next.selection().head, Pos::new(vec![1, 0], 1));
    }

    #[test]
    fn test_paste_rejects_mixed_and_empty_fragments() {
        let state = state_at(doc(), Pos::new(vec![0, 0], 1));
        assert_eq!(
            paste_fragment(&state, Vec::new()).unwrap_err(),
            CommandError::EmptyFragment
        );
        assert!(matches!(
            paste_fragment(
                &state,
                vec![Node::section(vec![Node::paragraph("s")]), Node::paragraph("p")]
            ),
            Err(CommandError::NoPlaceForFragment(_))
        ));
    }
}
