use crate::node::{Document, Node};

/// Visitor pattern for traversing the tree immutably
///
/// Default implementations walk every node. Paths are passed alongside each
/// node so visitors can address what they find in later steps.
pub trait Visitor: Sized {
    fn visit_document(&mut self, doc: &Document) {
        walk_document(self, doc);
    }

    fn visit_node(&mut self, node: &Node, path: &[usize]) {
        walk_node(self, node, path);
    }
}

/// Mutable visitor for rewriting detached fragments in place
pub trait VisitorMut: Sized {
    fn visit_node_mut(&mut self, node: &mut Node) {
        walk_node_mut(self, node);
    }
}

pub fn walk_document<V: Visitor>(visitor: &mut V, doc: &Document) {
    for (i, node) in doc.content.iter().enumerate() {
        visitor.visit_node(node, &[i]);
    }
}

pub fn walk_node<V: Visitor>(visitor: &mut V, node: &Node, path: &[usize]) {
    let mut child_path = path.to_vec();
    for (i, child) in node.content().iter().enumerate() {
        child_path.push(i);
        visitor.visit_node(child, &child_path);
        child_path.pop();
    }
}

/// Textblocks and atoms have no children and are not descended into
pub fn walk_node_mut<V: VisitorMut>(visitor: &mut V, node: &mut Node) {
    if let Some(children) = node.content_mut() {
        for child in children.iter_mut() {
            visitor.visit_node_mut(child);
        }
    }
}

pub fn walk_nodes_mut<V: VisitorMut>(visitor: &mut V, nodes: &mut [Node]) {
    for node in nodes.iter_mut() {
        visitor.visit_node_mut(node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct PathCollector(Vec<Vec<usize>>);

    impl Visitor for PathCollector {
        fn visit_node(&mut self, node: &Node, path: &[usize]) {
            self.0.push(path.to_vec());
            walk_node(self, node, path);
        }
    }

    struct ClearIds;

    impl VisitorMut for ClearIds {
        fn visit_node_mut(&mut self, node: &mut Node) {
            node.set_id(None);
            walk_node_mut(self, node);
        }
    }

    #[test]
    fn test_visitor_reports_paths_in_document_order() {
        let doc = Document::new(vec![Node::section(vec![
            Node::paragraph("a"),
            Node::blockquote(vec![Node::paragraph("b")]),
        ])]);

        let mut collector = PathCollector(Vec::new());
        collector.visit_document(&doc);

        assert_eq!(
            collector.0,
            vec![vec![0], vec![0, 0], vec![0, 1], vec![0, 1, 0]]
        );
    }

    #[test]
    fn test_visitor_mut_rewrites_nested_nodes() {
        let mut inner = Node::paragraph("x");
        inner.set_id(Some("i".to_string()));
        let mut nodes = vec![Node::blockquote(vec![inner])];
        nodes[0].set_id(Some("q".to_string()));

        walk_nodes_mut(&mut ClearIds, &mut nodes);

        assert_eq!(nodes[0].id(), None);
        assert_eq!(nodes[0].content()[0].id(), None);
    }
}
