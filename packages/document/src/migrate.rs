//! # Legacy Migration
//!
//! Documents written before sections existed hold blocks directly under the
//! root. Migration wraps each run of such blocks into a fresh Section and
//! repairs containers that would otherwise break the content rules.

use crate::id_generator::IdGenerator;
use crate::node::{Block, BlockKind, Document, Node, NodeType, SectionAttrs};
use crate::visitor::{walk_node_mut, walk_nodes_mut, VisitorMut};
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Top-level blocks moved into new sections
    pub wrapped_blocks: usize,
    pub sections_created: usize,
    /// Sections dropped because they were empty
    pub dropped_sections: usize,
    /// Empty columns given a placeholder paragraph
    pub filled_columns: usize,
}

impl MigrationReport {
    pub fn changed(&self) -> bool {
        self.wrapped_blocks > 0
            || self.sections_created > 0
            || self.dropped_sections > 0
            || self.filled_columns > 0
    }
}

/// New section around `content`, with a level hint taken from a leading heading
pub fn new_section(content: Vec<Node>, ids: &mut IdGenerator) -> Node {
    let level = content.first().and_then(Node::heading_level);
    Node::section_with(
        SectionAttrs {
            id: None,
            section_id: Some(ids.new_id()),
            level,
            numbering: None,
        },
        content,
    )
}

struct FillEmptyColumns {
    filled: usize,
}

impl VisitorMut for FillEmptyColumns {
    fn visit_node_mut(&mut self, node: &mut Node) {
        if let Node::Column { content, .. } = node {
            if content.is_empty() {
                content.push(Node::paragraph(""));
                self.filled += 1;
            }
        }
        walk_node_mut(self, node);
    }
}

pub fn migrate(doc: &Document, ids: &mut IdGenerator) -> (Document, MigrationReport) {
    let mut report = MigrationReport::default();
    let mut content = Vec::with_capacity(doc.content.len());
    let mut pending: Vec<Node> = Vec::new();

    let mut flush = |pending: &mut Vec<Node>, content: &mut Vec<Node>, report: &mut MigrationReport| {
        if pending.is_empty() {
            return;
        }
        report.wrapped_blocks += pending.len();
        report.sections_created += 1;
        content.push(new_section(std::mem::take(pending), ids));
    };

    for node in &doc.content {
        match node.node_type() {
            NodeType::Section => {
                flush(&mut pending, &mut content, &mut report);
                if node.content().is_empty() {
                    report.dropped_sections += 1;
                } else {
                    content.push(node.clone());
                }
            }
            NodeType::Column => pending.extend(node.content().iter().cloned()),
            NodeType::ListItem => pending.push(Node::Block(Block::wrapper(
                BlockKind::BulletList,
                vec![node.clone()],
            ))),
            NodeType::ColumnGroup
            | NodeType::Paragraph
            | NodeType::Heading
            | NodeType::CodeBlock
            | NodeType::Blockquote
            | NodeType::BulletList
            | NodeType::OrderedList
            | NodeType::HorizontalRule => pending.push(node.clone()),
            NodeType::Doc => {}
        }
    }
    flush(&mut pending, &mut content, &mut report);

    if content.is_empty() {
        debug!("Migrated document had no content; seeding an empty section");
        report.sections_created += 1;
        content.push(new_section(vec![Node::paragraph("")], ids));
    }

    let mut filler = FillEmptyColumns { filled: 0 };
    walk_nodes_mut(&mut filler, &mut content);
    report.filled_columns = filler.filled;

    if report.changed() {
        info!(
            wrapped = report.wrapped_blocks,
            created = report.sections_created,
            dropped = report.dropped_sections,
            filled = report.filled_columns,
            "Migrated legacy document"
        );
    }

    (Document::new(content), report)
}
