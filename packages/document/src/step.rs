//! # Steps
//!
//! Primitive, validated tree edits.
//!
//! A step never mutates the tree it is given. [`Step::apply`] produces a new
//! tree value plus a [`StepMap`] describing how positions moved, or fails
//! and leaves everything as it was.

use crate::error::{StepError, StepResult};
use crate::mapping::StepMap;
use crate::node::{byte_index, char_len, Block, BlockKind, ColumnGroupAttrs, Document, Node, NodeType};
use crate::schema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    /// Replace children `from..to` of the node at `parent` with `nodes`
    ReplaceChildren {
        parent: Vec<usize>,
        from: usize,
        to: usize,
        nodes: Vec<Node>,
    },

    /// Replace characters `from..to` of the textblock at `path`
    ReplaceText {
        path: Vec<usize>,
        from: usize,
        to: usize,
        text: String,
    },

    /// Split the textblock at `path` into two siblings at `offset`
    SplitBlock { path: Vec<usize>, offset: usize },

    /// Append child `index` of `parent` onto child `index - 1`
    JoinBlocks { parent: Vec<usize>, index: usize },

    /// Change the kind of the block at `path`
    SetBlockKind { path: Vec<usize>, kind: BlockKind },

    /// Replace the attributes of the column group at `path`
    SetColumnGroupAttrs {
        path: Vec<usize>,
        attrs: ColumnGroupAttrs,
    },

    /// Set identity attributes on the node at `path`; `None` leaves a value as is
    SetIdentity {
        path: Vec<usize>,
        id: Option<String>,
        section_id: Option<String>,
    },
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Step::ReplaceChildren { .. } => "replace_children",
            Step::ReplaceText { .. } => "replace_text",
            Step::SplitBlock { .. } => "split_block",
            Step::JoinBlocks { .. } => "join_blocks",
            Step::SetBlockKind { .. } => "set_block_kind",
            Step::SetColumnGroupAttrs { .. } => "set_column_group_attrs",
            Step::SetIdentity { .. } => "set_identity",
        }
    }

    /// Apply to `doc`, producing the next tree value
    pub fn apply(&self, doc: &Document) -> StepResult<(Document, StepMap)> {
        let mut next = doc.clone();
        let map = match self {
            Step::ReplaceChildren {
                parent,
                from,
                to,
                nodes,
            } => apply_replace_children(&mut next, parent, *from, *to, nodes)?,
            Step::ReplaceText {
                path,
                from,
                to,
                text,
            } => apply_replace_text(&mut next, path, *from, *to, text)?,
            Step::SplitBlock { path, offset } => apply_split(&mut next, path, *offset)?,
            Step::JoinBlocks { parent, index } => apply_join(&mut next, parent, *index)?,
            Step::SetBlockKind { path, kind } => apply_set_kind(&mut next, path, kind)?,
            Step::SetColumnGroupAttrs { path, attrs } => {
                apply_set_column_group_attrs(&mut next, path, attrs)?
            }
            Step::SetIdentity {
                path,
                id,
                section_id,
            } => apply_set_identity(&mut next, path, id, section_id)?,
        };
        Ok((next, map))
    }
}

fn apply_replace_children(
    doc: &mut Document,
    parent: &[usize],
    from: usize,
    to: usize,
    nodes: &[Node],
) -> StepResult<StepMap> {
    let parent_type = doc
        .node_type_at(parent)
        .ok_or_else(|| StepError::node_not_found(parent))?;
    let children = doc
        .children_at_mut(parent)
        .ok_or(StepError::NotAContainer(parent_type))?;
    if from > to || to > children.len() {
        return Err(StepError::RangeOutOfBounds {
            from,
            to,
            len: children.len(),
        });
    }
    children.splice(from..to, nodes.iter().cloned());

    if parent.is_empty() {
        // Legacy blocks already at the root are tolerated; new ones are not.
        if doc.content.is_empty() {
            return Err(StepError::invalid_content("document must keep at least one section"));
        }
        if let Some(node) = nodes.iter().find(|n| n.node_type() != NodeType::Section) {
            return Err(StepError::invalid_content(format!(
                "{} cannot be inserted at the document root",
                node.node_type()
            )));
        }
    } else {
        let parent_node = doc.node_at(parent);
        let children = parent_node.map(Node::content).unwrap_or(&[]);
        schema::check_children(parent_type, parent_node, children, parent)?;
    }

    for (i, node) in nodes.iter().enumerate() {
        let mut path = parent.to_vec();
        path.push(from + i);
        let mut violations = Vec::new();
        schema::check_node(node, &mut path, &mut violations);
        if let Some(violation) = violations.into_iter().next() {
            return Err(violation.into());
        }
    }

    Ok(StepMap::Children {
        parent: parent.to_vec(),
        from,
        to,
        inserted: nodes.len(),
    })
}

fn textblock_mut<'a>(doc: &'a mut Document, path: &[usize]) -> StepResult<&'a mut Block> {
    let node = doc
        .node_at_mut(path)
        .ok_or_else(|| StepError::node_not_found(path))?;
    let node_type = node.node_type();
    node.as_block_mut()
        .filter(|block| block.kind.is_textblock())
        .ok_or(StepError::NotATextblock(node_type))
}

fn apply_replace_text(
    doc: &mut Document,
    path: &[usize],
    from: usize,
    to: usize,
    text: &str,
) -> StepResult<StepMap> {
    let block = textblock_mut(doc, path)?;
    let len = char_len(&block.text);
    if from > to || to > len {
        return Err(StepError::RangeOutOfBounds { from, to, len });
    }
    let start = byte_index(&block.text, from);
    let end = byte_index(&block.text, to);
    block.text.replace_range(start..end, text);

    Ok(StepMap::Text {
        path: path.to_vec(),
        from,
        to,
        inserted: char_len(text),
    })
}

fn apply_split(doc: &mut Document, path: &[usize], offset: usize) -> StepResult<StepMap> {
    let (&index, parent) = path
        .split_last()
        .ok_or_else(|| StepError::node_not_found(path))?;

    let block = textblock_mut(doc, path)?;
    let len = char_len(&block.text);
    if offset > len {
        return Err(StepError::RangeOutOfBounds {
            from: offset,
            to: offset,
            len,
        });
    }
    let at = byte_index(&block.text, offset);
    let tail_text = block.text.split_off(at);
    let tail_kind = match &block.kind {
        BlockKind::Heading { .. } if offset == len => BlockKind::Paragraph,
        kind => kind.clone(),
    };

    let parent_type = doc
        .node_type_at(parent)
        .ok_or_else(|| StepError::node_not_found(parent))?;
    let siblings = doc
        .children_at_mut(parent)
        .ok_or(StepError::NotAContainer(parent_type))?;
    siblings.insert(
        index + 1,
        Node::Block(Block::textblock(tail_kind, tail_text)),
    );

    Ok(StepMap::Split {
        path: path.to_vec(),
        offset,
    })
}

fn apply_join(doc: &mut Document, parent: &[usize], index: usize) -> StepResult<StepMap> {
    let parent_type = doc
        .node_type_at(parent)
        .ok_or_else(|| StepError::node_not_found(parent))?;
    let children = doc
        .children_at_mut(parent)
        .ok_or(StepError::NotAContainer(parent_type))?;
    if index == 0 || index >= children.len() {
        return Err(StepError::RangeOutOfBounds {
            from: index.saturating_sub(1),
            to: index + 1,
            len: children.len(),
        });
    }
    if !schema::can_join(&children[index - 1], &children[index]) {
        return Err(StepError::IncompatibleJoin {
            first: children[index - 1].node_type(),
            second: children[index].node_type(),
        });
    }

    let second = children.remove(index);
    let first = &mut children[index - 1];
    let first_len = first.text_len();
    if let (Some(block), Some(text)) = (first.as_block_mut(), second.text()) {
        block.text.push_str(text);
    }

    Ok(StepMap::Join {
        parent: parent.to_vec(),
        index,
        first_len,
    })
}

fn apply_set_kind(doc: &mut Document, path: &[usize], kind: &BlockKind) -> StepResult<StepMap> {
    let node = doc
        .node_at_mut(path)
        .ok_or_else(|| StepError::node_not_found(path))?;
    let from = node.node_type();
    let block = node.as_block_mut().ok_or(StepError::IncompatibleKind {
        from,
        to: kind.node_type(),
    })?;
    if block.kind.is_textblock() != kind.is_textblock() {
        return Err(StepError::IncompatibleKind {
            from,
            to: kind.node_type(),
        });
    }
    block.kind = kind.clone();

    let node = doc
        .node_at(path)
        .ok_or_else(|| StepError::node_not_found(path))?;
    schema::check_children(node.node_type(), Some(node), node.content(), path)?;
    Ok(StepMap::Identity)
}

fn apply_set_column_group_attrs(
    doc: &mut Document,
    path: &[usize],
    attrs: &ColumnGroupAttrs,
) -> StepResult<StepMap> {
    let node = doc
        .node_at_mut(path)
        .ok_or_else(|| StepError::node_not_found(path))?;
    let node_type = node.node_type();
    match node {
        Node::ColumnGroup {
            attrs: current,
            content,
        } => {
            schema::check_column_group(attrs, content.len(), path)?;
            *current = attrs.clone();
            Ok(StepMap::Identity)
        }
        _ => Err(StepError::invalid_content(format!(
            "{} has no column attributes",
            node_type
        ))),
    }
}

fn apply_set_identity(
    doc: &mut Document,
    path: &[usize],
    id: &Option<String>,
    section_id: &Option<String>,
) -> StepResult<StepMap> {
    let node = doc
        .node_at_mut(path)
        .ok_or_else(|| StepError::node_not_found(path))?;
    if let Some(id) = id {
        node.set_id(Some(id.clone()));
    }
    if let (Some(value), Node::Section { attrs, .. }) = (section_id, node) {
        attrs.section_id = Some(value.clone());
    }
    Ok(StepMap::Identity)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_paragraphs() -> Document {
        Document::new(vec![Node::section(vec![
            Node::paragraph("Hello"),
            Node::paragraph("World"),
        ])])
    }

    #[test]
    fn test_apply_leaves_original_untouched() {
        let doc = two_paragraphs();
        let step = Step::ReplaceChildren {
            parent: vec![0],
            from: 1,
            to: 2,
            nodes: vec![],
        };

        let (next, map) = step.apply(&doc).unwrap();
        assert_eq!(doc.content[0].content().len(), 2);
        assert_eq!(next.content[0].content().len(), 1);
        assert_eq!(
            map,
            StepMap::Children {
                parent: vec![0],
                from: 1,
                to: 2,
                inserted: 0
            }
        );
    }

    #[test]
    fn test_cannot_empty_a_section() {
        let doc = Document::new(vec![Node::section(vec![Node::paragraph("only")])]);
        let step = Step::ReplaceChildren {
            parent: vec![0],
            from: 0,
            to: 1,
            nodes: vec![],
        };
        assert!(matches!(step.apply(&doc), Err(StepError::InvalidContent(_))));
    }

    #[test]
    fn test_root_rejects_bare_blocks() {
        let doc = two_paragraphs();
        let step = Step::ReplaceChildren {
            parent: vec![],
            from: 1,
            to: 1,
            nodes: vec![Node::paragraph("orphan")],
        };
        assert!(matches!(step.apply(&doc), Err(StepError::InvalidContent(_))));
    }

    #[test]
    fn test_replace_text_counts_chars() {
        let doc = Document::new(vec![Node::section(vec![Node::paragraph("héllo")])]);
        let step = Step::ReplaceText {
            path: vec![0, 0],
            from: 1,
            to: 2,
            text: "e".to_string(),
        };
        let (next, _) = step.apply(&doc).unwrap();
        assert_eq!(next.node_at(&[0, 0]).and_then(Node::text), Some("hello"));
    }

    #[test]
    fn test_split_heading_at_end_yields_paragraph() {
        let doc = Document::new(vec![Node::section(vec![Node::heading(1, "Title")])]);

        let (at_end, _) = Step::SplitBlock {
            path: vec![0, 0],
            offset: 5,
        }
        .apply(&doc)
        .unwrap();
        assert_eq!(at_end.node_at(&[0, 1]).map(Node::node_type), Some(NodeType::Paragraph));

        let (mid, _) = Step::SplitBlock {
            path: vec![0, 0],
            offset: 2,
        }
        .apply(&doc)
        .unwrap();
        assert_eq!(mid.node_at(&[0, 0]).and_then(Node::text), Some("Ti"));
        assert_eq!(mid.node_at(&[0, 1]).and_then(Node::text), Some("tle"));
        assert_eq!(mid.node_at(&[0, 1]).map(Node::node_type), Some(NodeType::Heading));
    }

    #[test]
    fn test_split_does_not_copy_identity() {
        let mut para = Node::paragraph("ab");
        para.set_id(Some("p1".to_string()));
        let doc = Document::new(vec![Node::section(vec![para])]);

        let (next, _) = Step::SplitBlock {
            path: vec![0, 0],
            offset: 1,
        }
        .apply(&doc)
        .unwrap();
        assert_eq!(next.node_at(&[0, 0]).and_then(Node::id), Some("p1"));
        assert_eq!(next.node_at(&[0, 1]).and_then(Node::id), None);
    }

    #[test]
    fn test_join_blocks() {
        let doc = two_paragraphs();
        let (next, map) = Step::JoinBlocks {
            parent: vec![0],
            index: 1,
        }
        .apply(&doc)
        .unwrap();

        assert_eq!(next.node_at(&[0, 0]).and_then(Node::text), Some("HelloWorld"));
        assert_eq!(next.content[0].content().len(), 1);
        assert_eq!(
            map,
            StepMap::Join {
                parent: vec![0],
                index: 1,
                first_len: 5
            }
        );
    }

    #[test]
    fn test_join_rejects_incompatible_kinds() {
        let doc = Document::new(vec![Node::section(vec![
            Node::code_block("let x;"),
            Node::paragraph("text"),
        ])]);
        let result = Step::JoinBlocks {
            parent: vec![0],
            index: 1,
        }
        .apply(&doc);
        assert!(matches!(result, Err(StepError::IncompatibleJoin { .. })));
    }

    #[test]
    fn test_set_block_kind_keeps_textblock_shape() {
        let doc = Document::new(vec![Node::section(vec![Node::heading(2, "x")])]);

        let (next, _) = Step::SetBlockKind {
            path: vec![0, 0],
            kind: BlockKind::Paragraph,
        }
        .apply(&doc)
        .unwrap();
        assert!(next.node_at(&[0, 0]).is_some_and(Node::is_paragraph));

        let bad = Step::SetBlockKind {
            path: vec![0, 0],
            kind: BlockKind::Blockquote,
        }
        .apply(&doc);
        assert!(matches!(bad, Err(StepError::IncompatibleKind { .. })));
    }

    #[test]
    fn test_set_column_group_attrs_validates_widths() {
        let doc = Document::new(vec![Node::section(vec![Node::column_group(vec![
            Node::column(vec![Node::paragraph("a")]),
            Node::column(vec![Node::paragraph("b")]),
        ])])]);

        let mut attrs = ColumnGroupAttrs::new(2);
        attrs.column_widths = Some(vec![0.3, 0.7]);
        assert!(Step::SetColumnGroupAttrs {
            path: vec![0, 0],
            attrs: attrs.clone(),
        }
        .apply(&doc)
        .is_ok());

        attrs.column_widths = Some(vec![0.3, 0.3, 0.4]);
        assert!(Step::SetColumnGroupAttrs {
            path: vec![0, 0],
            attrs,
        }
        .apply(&doc)
        .is_err());
    }
}
