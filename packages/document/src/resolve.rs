//! Positions resolved against a specific tree value.

use crate::error::{format_path, ResolveError};
use crate::node::{Document, Node, NodeType};
use crate::pos::Pos;

/// A [`Pos`] plus the chain of nodes it passes through.
///
/// Depth 0 is the document; depth `d` is the node at `path[..d]`, so the
/// deepest node sits at `depth()`.
#[derive(Debug, Clone)]
pub struct ResolvedPos<'a> {
    doc: &'a Document,
    pos: Pos,
    nodes: Vec<&'a Node>,
}

impl Document {
    pub fn resolve(&self, pos: &Pos) -> Result<ResolvedPos<'_>, ResolveError> {
        let mut nodes = Vec::with_capacity(pos.path.len());
        let mut children: &[Node] = &self.content;

        for (depth, &index) in pos.path.iter().enumerate() {
            let node = children.get(index).ok_or_else(|| ResolveError::PathNotFound {
                path: format_path(&pos.path[..=depth]),
            })?;
            nodes.push(node);
            children = node.content();
        }

        let (len, node_type) = match nodes.last() {
            Some(node) => (node.text_len(), node.node_type()),
            None => (0, NodeType::Doc),
        };
        if pos.offset > len {
            return Err(ResolveError::OffsetOutOfRange {
                offset: pos.offset,
                len,
                node_type,
            });
        }

        Ok(ResolvedPos {
            doc: self,
            pos: pos.clone(),
            nodes,
        })
    }
}

impl<'a> ResolvedPos<'a> {
    pub fn doc(&self) -> &'a Document {
        self.doc
    }

    pub fn pos(&self) -> &Pos {
        &self.pos
    }

    pub fn path(&self) -> &[usize] {
        &self.pos.path
    }

    pub fn depth(&self) -> usize {
        self.pos.path.len()
    }

    /// Node at `depth`; `None` for the document root
    pub fn node(&self, depth: usize) -> Option<&'a Node> {
        depth.checked_sub(1).and_then(|i| self.nodes.get(i).copied())
    }

    pub fn node_type(&self, depth: usize) -> NodeType {
        self.node(depth).map(Node::node_type).unwrap_or(NodeType::Doc)
    }

    /// Index of the child entered below `depth`
    pub fn index(&self, depth: usize) -> usize {
        self.pos.path[depth]
    }

    /// Path of the node at `depth`
    pub fn path_to(&self, depth: usize) -> &[usize] {
        &self.pos.path[..depth]
    }

    /// Deepest node, `None` when the position is the document itself
    pub fn parent(&self) -> Option<&'a Node> {
        self.nodes.last().copied()
    }

    pub fn parent_offset(&self) -> usize {
        self.pos.offset
    }

    pub fn in_textblock(&self) -> bool {
        self.parent().is_some_and(Node::is_textblock)
    }

    pub fn at_textblock_start(&self) -> bool {
        self.in_textblock() && self.pos.offset == 0
    }

    pub fn at_textblock_end(&self) -> bool {
        self.parent()
            .is_some_and(|node| node.is_textblock() && node.text_len() == self.pos.offset)
    }

    /// True when every index entered below `depth` is 0 and the offset is 0
    pub fn at_start_of(&self, depth: usize) -> bool {
        self.pos.offset == 0 && self.pos.path[depth..].iter().all(|&i| i == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        Document::new(vec![Node::section(vec![
            Node::paragraph("Hello"),
            Node::column_group(vec![
                Node::column(vec![Node::paragraph("left")]),
                Node::column(vec![Node::paragraph("right")]),
            ]),
        ])])
    }

    #[test]
    fn test_resolve_walks_nodes() {
        let doc = sample();
        let rp = doc.resolve(&Pos::new(vec![0, 1, 1, 0], 2)).unwrap();

        assert_eq!(rp.depth(), 4);
        assert_eq!(rp.node_type(0), NodeType::Doc);
        assert_eq!(rp.node_type(1), NodeType::Section);
        assert_eq!(rp.node_type(2), NodeType::ColumnGroup);
        assert_eq!(rp.node_type(3), NodeType::Column);
        assert_eq!(rp.node_type(4), NodeType::Paragraph);
        assert_eq!(rp.index(2), 1);
        assert_eq!(rp.path_to(2), &[0, 1]);
        assert_eq!(rp.parent().and_then(Node::text), Some("right"));
    }

    #[test]
    fn test_resolve_rejects_bad_paths_and_offsets() {
        let doc = sample();
        assert!(matches!(
            doc.resolve(&Pos::new(vec![0, 5], 0)),
            Err(ResolveError::PathNotFound { .. })
        ));
        assert!(matches!(
            doc.resolve(&Pos::new(vec![0, 0], 6)),
            Err(ResolveError::OffsetOutOfRange { len: 5, .. })
        ));
    }

    #[test]
    fn test_start_predicates() {
        let doc = sample();
        let start = doc.resolve(&Pos::new(vec![0, 1, 0, 0], 0)).unwrap();
        assert!(start.at_textblock_start());
        assert!(start.at_start_of(2));

        let second_column = doc.resolve(&Pos::new(vec![0, 1, 1, 0], 0)).unwrap();
        assert!(!second_column.at_start_of(2));
        assert!(second_column.at_start_of(3));
    }
}
