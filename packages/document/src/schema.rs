//! # Content Rules
//!
//! Which node types may contain which, and whole-document validation.
//!
//! | Parent | Content |
//! |---|---|
//! | doc | section+ |
//! | section | (block except list_item \| column_group)+ |
//! | column_group | column × column_count (2–4) |
//! | column | (block except list_item)+ |
//! | blockquote, list_item | block+ |
//! | bullet_list, ordered_list | list_item+ |
//! | paragraph, heading, code_block | text |
//! | horizontal_rule | nothing |

use crate::error::format_path;
use crate::node::{
    ColumnGroupAttrs, Document, Node, NodeType, MAX_COLUMNS, MIN_COLUMNS,
};
use std::collections::HashSet;
use thiserror::Error;

const WIDTH_TOLERANCE: f64 = 1e-6;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaViolation {
    #[error("{parent} at {path} must not be empty")]
    EmptyContainer { parent: NodeType, path: String },

    #[error("{child} is not allowed inside {parent} at {path}")]
    DisallowedChild {
        parent: NodeType,
        child: NodeType,
        path: String,
    },

    #[error("Block at {path} sits directly under the document")]
    OrphanBlock { path: String },

    #[error("Column group at {path} has invalid column count {count}")]
    InvalidColumnCount { count: u8, path: String },

    #[error("Column group at {path} declares {declared} columns but holds {actual}")]
    ColumnCountMismatch {
        declared: u8,
        actual: usize,
        path: String,
    },

    #[error("Column widths at {path} are invalid: {reason}")]
    InvalidColumnWidths { reason: String, path: String },

    #[error("Heading at {path} has invalid level {level}")]
    InvalidHeadingLevel { level: u8, path: String },

    #[error("Duplicate {attr} '{value}' at {path}")]
    DuplicateId {
        attr: &'static str,
        value: String,
        path: String,
    },
}

/// Whether `child` may appear directly inside `parent`
pub fn allows_child(parent: NodeType, child: NodeType) -> bool {
    match parent {
        NodeType::Doc => child == NodeType::Section,
        NodeType::Section => {
            child == NodeType::ColumnGroup || (child.is_block() && child != NodeType::ListItem)
        }
        NodeType::ColumnGroup => child == NodeType::Column,
        NodeType::Column | NodeType::Blockquote | NodeType::ListItem => {
            child.is_block() && child != NodeType::ListItem
        }
        NodeType::BulletList | NodeType::OrderedList => child == NodeType::ListItem,
        NodeType::Paragraph
        | NodeType::Heading
        | NodeType::CodeBlock
        | NodeType::HorizontalRule => false,
    }
}

/// Whether nodes of this type must hold at least one child
pub fn requires_children(node_type: NodeType) -> bool {
    match node_type {
        NodeType::Doc
        | NodeType::Section
        | NodeType::ColumnGroup
        | NodeType::Column
        | NodeType::Blockquote
        | NodeType::BulletList
        | NodeType::OrderedList
        | NodeType::ListItem => true,
        NodeType::Paragraph
        | NodeType::Heading
        | NodeType::CodeBlock
        | NodeType::HorizontalRule => false,
    }
}

/// Whether the text of `second` can be appended onto `first`
pub fn can_join(first: &Node, second: &Node) -> bool {
    match (first.as_block(), second.as_block()) {
        (Some(a), Some(b)) => match (a.kind.content_class(), b.kind.content_class()) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
        _ => false,
    }
}

/// Validate column group attributes against the number of columns present
pub fn check_column_group(
    attrs: &ColumnGroupAttrs,
    actual: usize,
    path: &[usize],
) -> Result<(), SchemaViolation> {
    if !(MIN_COLUMNS..=MAX_COLUMNS).contains(&attrs.column_count) {
        return Err(SchemaViolation::InvalidColumnCount {
            count: attrs.column_count,
            path: format_path(path),
        });
    }
    if usize::from(attrs.column_count) != actual {
        return Err(SchemaViolation::ColumnCountMismatch {
            declared: attrs.column_count,
            actual,
            path: format_path(path),
        });
    }
    if let Some(widths) = &attrs.column_widths {
        check_widths(widths, attrs.column_count).map_err(|reason| {
            SchemaViolation::InvalidColumnWidths {
                reason,
                path: format_path(path),
            }
        })?;
    }
    Ok(())
}

/// Widths must match the count, be finite and positive, and sum to 1
pub fn check_widths(widths: &[f64], column_count: u8) -> Result<(), String> {
    if widths.len() != usize::from(column_count) {
        return Err(format!(
            "expected {} widths, got {}",
            column_count,
            widths.len()
        ));
    }
    if widths.iter().any(|w| !w.is_finite() || *w <= 0.0) {
        return Err("widths must be positive numbers".to_string());
    }
    let sum: f64 = widths.iter().sum();
    if (sum - 1.0).abs() > WIDTH_TOLERANCE {
        return Err(format!("widths sum to {}, expected 1", sum));
    }
    Ok(())
}

/// Shallow check of one node's direct children against its content rule
pub fn check_children(
    parent_type: NodeType,
    parent: Option<&Node>,
    children: &[Node],
    path: &[usize],
) -> Result<(), SchemaViolation> {
    if children.is_empty() && requires_children(parent_type) {
        return Err(SchemaViolation::EmptyContainer {
            parent: parent_type,
            path: format_path(path),
        });
    }

    for (i, child) in children.iter().enumerate() {
        let child_type = child.node_type();
        if !allows_child(parent_type, child_type) {
            let mut child_path = path.to_vec();
            child_path.push(i);
            return Err(SchemaViolation::DisallowedChild {
                parent: parent_type,
                child: child_type,
                path: format_path(&child_path),
            });
        }
    }

    if let Some(Node::ColumnGroup { attrs, .. }) = parent {
        check_column_group(attrs, children.len(), path)?;
    }
    Ok(())
}

/// Deep check of `node` and everything below it
pub fn check_node(node: &Node, path: &mut Vec<usize>, out: &mut Vec<SchemaViolation>) {
    let node_type = node.node_type();

    if let Some(level) = node.as_block().and_then(|b| b.kind.heading_level()) {
        if !(1..=6).contains(&level) {
            out.push(SchemaViolation::InvalidHeadingLevel {
                level,
                path: format_path(path),
            });
        }
    }

    if let Err(violation) = check_children(node_type, Some(node), node.content(), path) {
        out.push(violation);
    }

    for (i, child) in node.content().iter().enumerate() {
        path.push(i);
        check_node(child, path, out);
        path.pop();
    }
}

/// Every content-rule and identity violation in `doc`.
///
/// Legacy top-level blocks are reported as [`SchemaViolation::OrphanBlock`]
/// rather than a generic disallowed child.
pub fn check(doc: &Document) -> Vec<SchemaViolation> {
    let mut out = Vec::new();

    if doc.content.is_empty() {
        out.push(SchemaViolation::EmptyContainer {
            parent: NodeType::Doc,
            path: format_path(&[]),
        });
    }

    let mut path = Vec::new();
    for (i, node) in doc.content.iter().enumerate() {
        path.push(i);
        match node.node_type() {
            NodeType::Section => {}
            node_type if node_type.is_block() => out.push(SchemaViolation::OrphanBlock {
                path: format_path(&path),
            }),
            child => out.push(SchemaViolation::DisallowedChild {
                parent: NodeType::Doc,
                child,
                path: format_path(&path),
            }),
        }
        check_node(node, &mut path, &mut out);
        path.pop();
    }

    out.extend(check_unique_ids(doc));
    out
}

/// Duplicate `id` / `sectionId` values, reported at their second occurrence
pub fn check_unique_ids(doc: &Document) -> Vec<SchemaViolation> {
    fn walk(
        nodes: &[Node],
        path: &mut Vec<usize>,
        ids: &mut HashSet<String>,
        section_ids: &mut HashSet<String>,
        out: &mut Vec<SchemaViolation>,
    ) {
        for (i, node) in nodes.iter().enumerate() {
            path.push(i);
            if let Some(id) = node.id() {
                if !ids.insert(id.to_string()) {
                    out.push(SchemaViolation::DuplicateId {
                        attr: "id",
                        value: id.to_string(),
                        path: format_path(path),
                    });
                }
            }
            if let Some(section_id) = node.section_id() {
                if !section_ids.insert(section_id.to_string()) {
                    out.push(SchemaViolation::DuplicateId {
                        attr: "sectionId",
                        value: section_id.to_string(),
                        path: format_path(path),
                    });
                }
            }
            walk(node.content(), path, ids, section_ids, out);
            path.pop();
        }
    }

    let mut out = Vec::new();
    walk(
        &doc.content,
        &mut Vec::new(),
        &mut HashSet::new(),
        &mut HashSet::new(),
        &mut out,
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Block, BlockKind};

    #[test]
    fn test_valid_document_passes() {
        let doc = Document::new(vec![Node::section(vec![
            Node::heading(1, "Title"),
            Node::column_group(vec![
                Node::column(vec![Node::paragraph("a")]),
                Node::column(vec![Node::bullet_list(vec![Node::list_item(vec![
                    Node::paragraph("b"),
                ])])]),
            ]),
        ])]);

        assert_eq!(check(&doc), vec![]);
    }

    #[test]
    fn test_empty_section_and_orphan_block() {
        let doc = Document::new(vec![Node::section(vec![]), Node::paragraph("loose")]);
        let violations = check(&doc);

        assert!(violations.contains(&SchemaViolation::EmptyContainer {
            parent: NodeType::Section,
            path: "0".to_string(),
        }));
        assert!(violations.contains(&SchemaViolation::OrphanBlock {
            path: "1".to_string(),
        }));
    }

    #[test]
    fn test_columns_cannot_nest_column_groups() {
        let nested = Node::column_group(vec![
            Node::column(vec![Node::column_group(vec![
                Node::column(vec![Node::paragraph("x")]),
                Node::column(vec![Node::paragraph("y")]),
            ])]),
            Node::column(vec![Node::paragraph("z")]),
        ]);
        let doc = Document::new(vec![Node::section(vec![nested])]);

        assert!(check(&doc).iter().any(|v| matches!(
            v,
            SchemaViolation::DisallowedChild {
                parent: NodeType::Column,
                child: NodeType::ColumnGroup,
                ..
            }
        )));
    }

    #[test]
    fn test_column_count_bounds_and_widths() {
        let single = Node::column_group(vec![Node::column(vec![Node::paragraph("x")])]);
        let doc = Document::new(vec![Node::section(vec![single])]);
        assert!(check(&doc)
            .iter()
            .any(|v| matches!(v, SchemaViolation::InvalidColumnCount { count: 1, .. })));

        assert!(check_widths(&[0.25, 0.75], 2).is_ok());
        assert!(check_widths(&[0.5, 0.4], 2).is_err());
        assert!(check_widths(&[1.0], 2).is_err());
        assert!(check_widths(&[-0.5, 1.5], 2).is_err());
    }

    #[test]
    fn test_duplicate_ids_are_reported() {
        let mut a = Node::paragraph("a");
        a.set_id(Some("dup".to_string()));
        let b = a.clone();
        let doc = Document::new(vec![Node::section(vec![a, b])]);

        assert_eq!(
            check_unique_ids(&doc),
            vec![SchemaViolation::DuplicateId {
                attr: "id",
                value: "dup".to_string(),
                path: "0.1".to_string(),
            }]
        );
    }

    #[test]
    fn test_join_compatibility_follows_content_class() {
        let para = Node::paragraph("a");
        let heading = Node::heading(2, "b");
        let code = Node::code_block("c");
        let rule = Node::Block(Block::wrapper(BlockKind::HorizontalRule, vec![]));

        assert!(can_join(&para, &heading));
        assert!(can_join(&code, &Node::code_block("d")));
        assert!(!can_join(&code, &para));
        assert!(!can_join(&para, &rule));
    }
}
