//! # Identity
//!
//! Every structural node carries an `id`, and every Section also carries a
//! `sectionId`. Both must be unique within the live tree.
//!
//! Two passes keep that true:
//!
//! - [`assignment_steps`] runs after each edit and issues ids for nodes that
//!   have none (fresh halves of a split, new sections) or whose id collides
//!   with an earlier node.
//! - [`dedupe_fragment`] runs on pasted content before it is inserted, so a
//!   fragment copied from the same document cannot bring its ids back in.
//!
//! Both reserve every value they see with the [`IdGenerator`] before issuing
//! anything, so a generator started on a reloaded document never hands out
//! an id the document already holds.

use quire_document::visitor::{walk_document, walk_node, walk_node_mut, walk_nodes_mut, Visitor, VisitorMut};
use quire_document::{Document, IdGenerator, Node, NodeType, Step};
use std::collections::HashSet;
use tracing::warn;

/// Identity values already in use
#[derive(Debug, Clone, Default)]
pub struct SeenIds {
    pub ids: HashSet<String>,
    pub section_ids: HashSet<String>,
}

struct IdCollector {
    seen: SeenIds,
}

impl Visitor for IdCollector {
    fn visit_node(&mut self, node: &Node, path: &[usize]) {
        if let Some(id) = node.id() {
            self.seen.ids.insert(id.to_string());
        }
        if let Some(section_id) = node.section_id() {
            self.seen.section_ids.insert(section_id.to_string());
        }
        walk_node(self, node, path);
    }
}

pub fn collect_ids(doc: &Document) -> SeenIds {
    let mut collector = IdCollector {
        seen: SeenIds::default(),
    };
    walk_document(&mut collector, doc);
    collector.seen
}

struct PathById<'a> {
    id: &'a str,
    found: Option<Vec<usize>>,
}

impl Visitor for PathById<'_> {
    fn visit_node(&mut self, node: &Node, path: &[usize]) {
        if self.found.is_some() {
            return;
        }
        if node.id() == Some(self.id) {
            self.found = Some(path.to_vec());
            return;
        }
        walk_node(self, node, path);
    }
}

/// Reserve every `id` and `sectionId` in `doc` with `ids`
pub fn reserve_ids(doc: &Document, ids: &mut IdGenerator) {
    let seen = collect_ids(doc);
    for value in seen.ids.iter().chain(&seen.section_ids) {
        ids.reserve(value);
    }
}

struct Reserve<'a> {
    ids: &'a mut IdGenerator,
}

impl VisitorMut for Reserve<'_> {
    fn visit_node_mut(&mut self, node: &mut Node) {
        if let Some(id) = node.id() {
            self.ids.reserve(id);
        }
        if let Some(section_id) = node.section_id() {
            self.ids.reserve(section_id);
        }
        walk_node_mut(self, node);
    }
}

/// Path of the first node (document order) whose `id` is `id`
pub fn find_path_by_id(doc: &Document, id: &str) -> Option<Vec<usize>> {
    let mut finder = PathById { id, found: None };
    walk_document(&mut finder, doc);
    finder.found
}

/// Nodes that need identity work, in document order
struct AssignmentScan<'a> {
    ids: &'a mut IdGenerator,
    seen: SeenIds,
    steps: Vec<Step>,
    duplicates: usize,
}

impl Visitor for AssignmentScan<'_> {
    fn visit_node(&mut self, node: &Node, path: &[usize]) {
        let id = match node.id() {
            Some(id) if self.seen.ids.insert(id.to_string()) => None,
            Some(_) => {
                self.duplicates += 1;
                Some(self.ids.new_id())
            }
            None => Some(self.ids.new_id()),
        };

        let section_id = if node.node_type() == NodeType::Section {
            match node.section_id() {
                Some(value) if self.seen.section_ids.insert(value.to_string()) => None,
                Some(_) => {
                    self.duplicates += 1;
                    Some(self.ids.new_id())
                }
                None => Some(self.ids.new_id()),
            }
        } else {
            None
        };

        if let Some(value) = &id {
            self.seen.ids.insert(value.clone());
        }
        if let Some(value) = &section_id {
            self.seen.section_ids.insert(value.clone());
        }
        if id.is_some() || section_id.is_some() {
            self.steps.push(Step::SetIdentity {
                path: path.to_vec(),
                id,
                section_id,
            });
        }

        walk_node(self, node, path);
    }
}

/// `SetIdentity` steps for every node missing an identity, and for every
/// later occurrence of a duplicated one.
///
/// The first occurrence of a value keeps it, so existing references stay
/// valid. The steps never change the tree shape and can be applied in any
/// order.
pub fn assignment_steps(doc: &Document, ids: &mut IdGenerator) -> Vec<Step> {
    reserve_ids(doc, ids);
    let mut scan = AssignmentScan {
        ids,
        seen: SeenIds::default(),
        steps: Vec::new(),
        duplicates: 0,
    };
    walk_document(&mut scan, doc);

    if scan.duplicates > 0 {
        warn!(count = scan.duplicates, "Healed duplicate identities in document");
    }
    scan.steps
}

struct Dedupe<'a> {
    seen: &'a mut SeenIds,
    ids: &'a mut IdGenerator,
    healed: usize,
}

impl VisitorMut for Dedupe<'_> {
    fn visit_node_mut(&mut self, node: &mut Node) {
        if let Some(id) = node.id().map(str::to_string) {
            if self.seen.ids.contains(&id) {
                let fresh = self.ids.new_id();
                self.seen.ids.insert(fresh.clone());
                node.set_id(Some(fresh));
                self.healed += 1;
            } else {
                self.seen.ids.insert(id);
            }
        }

        if let Node::Section { attrs, .. } = node {
            if let Some(section_id) = attrs.section_id.clone() {
                if self.seen.section_ids.contains(&section_id) {
                    let fresh = self.ids.new_id();
                    self.seen.section_ids.insert(fresh.clone());
                    attrs.section_id = Some(fresh);
                    self.healed += 1;
                } else {
                    self.seen.section_ids.insert(section_id);
                }
            }
        }

        walk_node_mut(self, node);
    }
}

/// Regenerate every `id` / `sectionId` in `nodes` that is already in `seen`,
/// depth first. Values kept or issued are added to `seen`, so duplicates
/// within the fragment itself are healed too. Returns how many were replaced.
pub fn dedupe_fragment(nodes: &mut [Node], seen: &mut SeenIds, ids: &mut IdGenerator) -> usize {
    walk_nodes_mut(&mut Reserve { ids: &mut *ids }, nodes);
    for value in seen.ids.iter().chain(&seen.section_ids) {
        ids.reserve(value);
    }

    let mut dedupe = Dedupe {
        seen,
        ids,
        healed: 0,
    };
    walk_nodes_mut(&mut dedupe, nodes);

    if dedupe.healed > 0 {
        warn!(healed = dedupe.healed, "Regenerated colliding identities in pasted content");
    }
    dedupe.healed
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_document::{schema, SectionAttrs, Transform};

    fn with_id(mut node: Node, id: &str) -> Node {
        node.set_id(Some(id.to_string()));
        node
    }

    fn section(id: &str, section_id: &str, content: Vec<Node>) -> Node {
        Node::section_with(
            SectionAttrs {
                id: Some(id.to_string()),
                section_id: Some(section_id.to_string()),
                level: None,
                numbering: None,
            },
            content,
        )
    }

    #[test]
    fn test_assigns_missing_ids() {
        let doc = Document::new(vec![Node::section(vec![
            Node::paragraph("a"),
            Node::paragraph("b"),
        ])]);
        let mut ids = IdGenerator::from_seed("t");

        let steps = assignment_steps(&doc, &mut ids);
        // Section needs both values; each paragraph needs an id
        assert_eq!(steps.len(), 3);

        let mut tr = Transform::new(doc);
        for step in steps {
            tr.step(step).unwrap();
        }
        let doc = tr.into_doc();
        assert!(schema::check(&doc).is_empty());
        assert!(doc.content[0].id().is_some());
        assert!(doc.content[0].section_id().is_some());
        assert!(doc.content[0].content()[1].id().is_some());
    }

    #[test]
    fn test_fully_identified_document_needs_no_steps() {
        let doc = Document::new(vec![section(
            "s",
            "sid",
            vec![with_id(Node::paragraph("a"), "p")],
        )]);
        let mut ids = IdGenerator::from_seed("t");
        assert!(assignment_steps(&doc, &mut ids).is_empty());
        assert_eq!(ids.issued(), 0);
    }

    #[test]
    fn test_second_occurrence_of_duplicate_is_renamed() {
        let doc = Document::new(vec![
            section("s1", "same", vec![with_id(Node::paragraph("a"), "p")]),
            section("s2", "same", vec![with_id(Node::paragraph("b"), "p")]),
        ]);
        let mut ids = IdGenerator::from_seed("t");

        let steps = assignment_steps(&doc, &mut ids);
        assert_eq!(
            steps,
            vec![
                Step::SetIdentity {
                    path: vec![1],
                    id: None,
                    section_id: Some("t-1".to_string()),
                },
                Step::SetIdentity {
                    path: vec![1, 0],
                    id: Some("t-2".to_string()),
                    section_id: None,
                },
            ]
        );
    }

    #[test]
    fn test_dedupe_fragment_against_document() {
        let doc = Document::new(vec![section(
            "s1",
            "sid1",
            vec![with_id(Node::paragraph("a"), "p1")],
        )]);
        let mut seen = collect_ids(&doc);
        let mut ids = IdGenerator::from_seed("t");

        let mut fragment = vec![section(
            "s1",
            "sid1",
            vec![
                with_id(Node::paragraph("copy"), "p1"),
                with_id(Node::paragraph("new"), "p9"),
            ],
        )];
        let healed = dedupe_fragment(&mut fragment, &mut seen, &mut ids);

        assert_eq!(healed, 3);
        assert_eq!(fragment[0].id(), Some("t-1"));
        assert_eq!(fragment[0].section_id(), Some("t-2"));
        assert_eq!(fragment[0].content()[0].id(), Some("t-3"));
        assert_eq!(fragment[0].content()[1].id(), Some("p9"));
    }

    #[test]
    fn test_assignment_skips_ids_already_in_document() {
        let doc = Document::new(vec![section(
            "t-1",
            "t-2",
            vec![with_id(Node::paragraph("a"), "t-3"), Node::paragraph("b")],
        )]);
        let mut ids = IdGenerator::from_seed("t");

        let steps = assignment_steps(&doc, &mut ids);
        assert_eq!(
            steps,
            vec![Step::SetIdentity {
                path: vec![0, 1],
                id: Some("t-4".to_string()),
                section_id: None,
            }]
        );
    }

    #[test]
    fn test_dedupe_never_issues_an_id_held_by_the_fragment() {
        let mut seen = collect_ids(&Document::new(vec![section(
            "s",
            "sid",
            vec![with_id(Node::paragraph("a"), "x")],
        )]));
        let mut ids = IdGenerator::from_seed("t");
        let mut fragment = vec![
            with_id(Node::paragraph("copy"), "x"),
            with_id(Node::paragraph("later"), "t-1"),
        ];

        assert_eq!(dedupe_fragment(&mut fragment, &mut seen, &mut ids), 1);
        assert_eq!(fragment[0].id(), Some("t-2"));
        assert_eq!(fragment[1].id(), Some("t-1"));
    }

    #[test]
    fn test_dedupe_heals_collisions_inside_fragment() {
        let mut seen = SeenIds::default();
        let mut ids = IdGenerator::from_seed("t");
        let mut fragment = vec![
            with_id(Node::paragraph("a"), "x"),
            with_id(Node::paragraph("b"), "x"),
        ];

        assert_eq!(dedupe_fragment(&mut fragment, &mut seen, &mut ids), 1);
        assert_eq!(fragment[0].id(), Some("x"));
        assert_eq!(fragment[1].id(), Some("t-1"));
    }

    #[test]
    fn test_find_path_by_id() {
        let doc = Document::new(vec![section(
            "s",
            "sid",
            vec![
                with_id(Node::paragraph("a"), "p1"),
                with_id(
                    Node::column_group(vec![
                        with_id(Node::column(vec![Node::paragraph("l")]), "c1"),
                        with_id(Node::column(vec![Node::paragraph("r")]), "c2"),
                    ]),
                    "g",
                ),
            ],
        )]);

        assert_eq!(find_path_by_id(&doc, "g"), Some(vec![0, 1]));
        assert_eq!(find_path_by_id(&doc, "c2"), Some(vec![0, 1, 1]));
        assert_eq!(find_path_by_id(&doc, "missing"), None);
    }
}
