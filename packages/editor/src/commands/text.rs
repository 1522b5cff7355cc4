//! Text-level edits inside a single textblock.

use super::{CommandError, CommandResult};
use crate::state::EditorState;
use quire_document::{char_len, Node, NodeType, Pos, Selection};

/// The textblock holding the whole selection, with the selected offsets
struct BlockRange<'a> {
    path: Vec<usize>,
    node: &'a Node,
    from: usize,
    to: usize,
}

fn block_range(state: &EditorState) -> Result<BlockRange<'_>, CommandError> {
    let selection = state.selection();
    if !selection.within_one_block() {
        return Err(CommandError::CrossBlockSelection);
    }
    let rp = state.head()?;
    let node = rp.parent().filter(|node| node.is_textblock()).ok_or(CommandError::NoBlock)?;
    Ok(BlockRange {
        path: selection.head.path.clone(),
        node,
        from: selection.from().offset,
        to: selection.to().offset,
    })
}

/// Replace the selection with `text`, leaving the cursor after it
pub fn insert_text(state: &EditorState, text: &str) -> CommandResult {
    let range = block_range(state)?;
    let mut tr = state.tr();
    tr.replace_text(&range.path, range.from, range.to, text)?;
    tr.set_selection(Selection::cursor(Pos::new(
        range.path,
        range.from + char_len(text),
    )));
    Ok(tr)
}

/// Enter inside a code block inserts a line break instead of splitting it
pub fn newline_in_code(state: &EditorState) -> CommandResult {
    let range = block_range(state)?;
    if range.node.node_type() != NodeType::CodeBlock {
        return Err(CommandError::WrongBlockType(NodeType::CodeBlock));
    }
    insert_text(state, "\n")
}

/// Delete the selection, then split the textblock at the cursor. The cursor
/// moves to the start of the second half.
pub fn split_block(state: &EditorState) -> CommandResult {
    let range = block_range(state)?;
    let mut tr = state.tr();
    if range.from != range.to {
        tr.replace_text(&range.path, range.from, range.to, "")?;
    }
    tr.split_block(&Pos::new(range.path.clone(), range.from))?;

    let mut next = range.path;
    if let Some(last) = next.last_mut() {
        *last += 1;
    }
    tr.set_selection(Selection::cursor(Pos::start_of(next)));
    Ok(tr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_document::{BlockKind, Document};

    fn state(doc: Document, anchor: Pos, head: Pos) -> EditorState {
        EditorState::with_selection(doc, Selection::new(anchor, head))
    }

    fn doc() -> Document {
        Document::new(vec![Node::section(vec![
            Node::heading(1, "Title"),
            Node::code_block("let x;"),
        ])])
    }

    #[test]
    fn test_insert_text_replaces_selection() {
        let state = state(doc(), Pos::new(vec![0, 0], 1), Pos::new(vec![0, 0], 4));
        let next = state.apply(&insert_text(&state, "é").unwrap());

        assert_eq!(next.doc().node_at(&[0, 0]).and_then(Node::text), Some("Tée"));
        assert_eq!(next.selection().head, Pos::new(vec![0, 0], 2));
    }

    #[test]
    fn test_newline_only_in_code() {
        let in_code = state(doc(), Pos::new(vec![0, 1], 6), Pos::new(vec![0, 1], 6));
        let next = in_code.apply(&newline_in_code(&in_code).unwrap());
        assert_eq!(next.doc().node_at(&[0, 1]).and_then(Node::text), Some("let x;\n"));
        assert_eq!(next.selection().head, Pos::new(vec![0, 1], 7));

        let in_heading = state(doc(), Pos::new(vec![0, 0], 1), Pos::new(vec![0, 0], 1));
        assert_eq!(
            newline_in_code(&in_heading).unwrap_err(),
            CommandError::WrongBlockType(NodeType::CodeBlock)
        );
    }

    #[test]
    fn test_split_block_at_heading_end_makes_paragraph() {
        let state = state(doc(), Pos::new(vec![0, 0], 5), Pos::new(vec![0, 0], 5));
        let next = state.apply(&split_block(&state).unwrap());

        let section = &next.doc().content[0];
        assert_eq!(section.content().len(), 3);
        assert!(section.content()[1].is_empty_textblock());
        assert_eq!(
            section.content()[1].as_block().map(|b| &b.kind),
            Some(&BlockKind::Paragraph)
        );
        assert_eq!(next.selection().head, Pos::start_of(vec![0, 1]));
    }

    #[test]
    fn test_split_block_deletes_selection_first() {
        let state = state(doc(), Pos::new(vec![0, 0], 1), Pos::new(vec![0, 0], 3));
        let next = state.apply(&split_block(&state).unwrap());

        let section = &next.doc().content[0];
        assert_eq!(section.content()[0].text(), Some("T"));
        assert_eq!(section.content()[1].text(), Some("le"));
    }

    #[test]
    fn test_cross_block_selection_declines() {
        let state = state(doc(), Pos::new(vec![0, 0], 1), Pos::new(vec![0, 1], 2));
        assert_eq!(split_block(&state).unwrap_err(), CommandError::CrossBlockSelection);
        assert_eq!(insert_text(&state, "x").unwrap_err(), CommandError::CrossBlockSelection);
    }
}
