//! # Document Tree
//!
//! Node definitions for the structural document model.
//!
//! ```text
//! Document
//!  └─ Section+
//!      ├─ Block (paragraph, heading, code block, blockquote, list, rule)
//!      └─ ColumnGroup
//!          └─ Column{2..4}
//!              └─ Block+
//! ```
//!
//! Nodes never store parent pointers. Everything that needs ancestry derives it
//! from a [`Pos`](crate::Pos) path resolved against the current tree value.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default gap between columns, in pixels
pub const DEFAULT_COLUMN_GAP: u32 = 24;

/// Smallest and largest number of columns a group may hold
pub const MIN_COLUMNS: u8 = 2;
pub const MAX_COLUMNS: u8 = 4;

/// Root document node
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    pub content: Vec<Node>,
}

/// Attributes carried by a Section
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionAttrs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_id: Option<String>,
    /// Heading-level hint inferred from the first child
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numbering: Option<String>,
}

/// Attributes carried by a ColumnGroup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnGroupAttrs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub column_count: u8,
    /// Fractional widths summing to 1, or `None` for equal widths
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_widths: Option<Vec<f64>>,
    #[serde(default)]
    pub show_borders: bool,
    #[serde(default = "default_gap")]
    pub gap: u32,
}

fn default_gap() -> u32 {
    DEFAULT_COLUMN_GAP
}

impl ColumnGroupAttrs {
    pub fn new(column_count: u8) -> Self {
        Self {
            id: None,
            column_count,
            column_widths: None,
            show_borders: false,
            gap: DEFAULT_COLUMN_GAP,
        }
    }
}

/// Block subkind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum BlockKind {
    Paragraph,
    Heading {
        level: u8,
    },
    CodeBlock {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
    },
    Blockquote,
    BulletList,
    OrderedList {
        #[serde(default = "default_list_start")]
        start: u32,
    },
    ListItem,
    HorizontalRule,
}

fn default_list_start() -> u32 {
    1
}

/// What a textblock's text may be joined with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentClass {
    /// Paragraphs and headings
    Inline,
    /// Code blocks
    Verbatim,
}

impl BlockKind {
    pub fn node_type(&self) -> NodeType {
        match self {
            BlockKind::Paragraph => NodeType::Paragraph,
            BlockKind::Heading { .. } => NodeType::Heading,
            BlockKind::CodeBlock { .. } => NodeType::CodeBlock,
            BlockKind::Blockquote => NodeType::Blockquote,
            BlockKind::BulletList => NodeType::BulletList,
            BlockKind::OrderedList { .. } => NodeType::OrderedList,
            BlockKind::ListItem => NodeType::ListItem,
            BlockKind::HorizontalRule => NodeType::HorizontalRule,
        }
    }

    pub fn is_textblock(&self) -> bool {
        self.content_class().is_some()
    }

    /// Content class of a textblock, `None` for everything else
    pub fn content_class(&self) -> Option<ContentClass> {
        match self {
            BlockKind::Paragraph | BlockKind::Heading { .. } => Some(ContentClass::Inline),
            BlockKind::CodeBlock { .. } => Some(ContentClass::Verbatim),
            BlockKind::Blockquote
            | BlockKind::BulletList
            | BlockKind::OrderedList { .. }
            | BlockKind::ListItem
            | BlockKind::HorizontalRule => None,
        }
    }

    pub fn heading_level(&self) -> Option<u8> {
        match self {
            BlockKind::Heading { level } => Some(*level),
            _ => None,
        }
    }
}

/// Opaque content-bearing unit.
///
/// Textblocks keep their text in `text`; wrapper blocks (blockquote, lists)
/// keep nested blocks in `content`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub kind: BlockKind,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<Node>,
}

impl Block {
    pub fn textblock(kind: BlockKind, text: impl Into<String>) -> Self {
        Self {
            id: None,
            kind,
            text: text.into(),
            content: Vec::new(),
        }
    }

    pub fn wrapper(kind: BlockKind, content: Vec<Node>) -> Self {
        Self {
            id: None,
            kind,
            text: String::new(),
            content,
        }
    }
}

/// Structural node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    Section {
        #[serde(default)]
        attrs: SectionAttrs,
        content: Vec<Node>,
    },
    ColumnGroup {
        attrs: ColumnGroupAttrs,
        content: Vec<Node>,
    },
    Column {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        content: Vec<Node>,
    },
    Block(Block),
}

/// Closed set of node types, including the document root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Doc,
    Section,
    ColumnGroup,
    Column,
    Paragraph,
    Heading,
    CodeBlock,
    Blockquote,
    BulletList,
    OrderedList,
    ListItem,
    HorizontalRule,
}

impl NodeType {
    pub fn name(self) -> &'static str {
        match self {
            NodeType::Doc => "doc",
            NodeType::Section => "section",
            NodeType::ColumnGroup => "column_group",
            NodeType::Column => "column",
            NodeType::Paragraph => "paragraph",
            NodeType::Heading => "heading",
            NodeType::CodeBlock => "code_block",
            NodeType::Blockquote => "blockquote",
            NodeType::BulletList => "bullet_list",
            NodeType::OrderedList => "ordered_list",
            NodeType::ListItem => "list_item",
            NodeType::HorizontalRule => "horizontal_rule",
        }
    }

    pub fn is_textblock(self) -> bool {
        matches!(
            self,
            NodeType::Paragraph | NodeType::Heading | NodeType::CodeBlock
        )
    }

    pub fn is_block(self) -> bool {
        !matches!(
            self,
            NodeType::Doc | NodeType::Section | NodeType::ColumnGroup | NodeType::Column
        )
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Node {
    pub fn section(content: Vec<Node>) -> Self {
        Node::Section {
            attrs: SectionAttrs::default(),
            content,
        }
    }

    pub fn section_with(attrs: SectionAttrs, content: Vec<Node>) -> Self {
        Node::Section { attrs, content }
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Node::Block(Block::textblock(BlockKind::Paragraph, text))
    }

    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Node::Block(Block::textblock(BlockKind::Heading { level }, text))
    }

    pub fn code_block(text: impl Into<String>) -> Self {
        Node::Block(Block::textblock(BlockKind::CodeBlock { language: None }, text))
    }

    pub fn blockquote(content: Vec<Node>) -> Self {
        Node::Block(Block::wrapper(BlockKind::Blockquote, content))
    }

    pub fn bullet_list(items: Vec<Node>) -> Self {
        Node::Block(Block::wrapper(BlockKind::BulletList, items))
    }

    pub fn list_item(content: Vec<Node>) -> Self {
        Node::Block(Block::wrapper(BlockKind::ListItem, content))
    }

    pub fn horizontal_rule() -> Self {
        Node::Block(Block::wrapper(BlockKind::HorizontalRule, Vec::new()))
    }

    pub fn column(content: Vec<Node>) -> Self {
        Node::Column { id: None, content }
    }

    /// Column group whose declared count matches the columns given
    pub fn column_group(columns: Vec<Node>) -> Self {
        let count = u8::try_from(columns.len()).unwrap_or(u8::MAX);
        Node::ColumnGroup {
            attrs: ColumnGroupAttrs::new(count),
            content: columns,
        }
    }

    pub fn node_type(&self) -> NodeType {
        match self {
            Node::Section { .. } => NodeType::Section,
            Node::ColumnGroup { .. } => NodeType::ColumnGroup,
            Node::Column { .. } => NodeType::Column,
            Node::Block(block) => block.kind.node_type(),
        }
    }

    /// Child nodes; empty for textblocks and atoms
    pub fn content(&self) -> &[Node] {
        match self {
            Node::Section { content, .. }
            | Node::ColumnGroup { content, .. }
            | Node::Column { content, .. } => content,
            Node::Block(block) => &block.content,
        }
    }

    /// Mutable child list, `None` for nodes that cannot hold children
    pub fn content_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Section { content, .. }
            | Node::ColumnGroup { content, .. }
            | Node::Column { content, .. } => Some(content),
            Node::Block(block) => match block.kind {
                BlockKind::Blockquote
                | BlockKind::BulletList
                | BlockKind::OrderedList { .. }
                | BlockKind::ListItem => Some(&mut block.content),
                BlockKind::Paragraph
                | BlockKind::Heading { .. }
                | BlockKind::CodeBlock { .. }
                | BlockKind::HorizontalRule => None,
            },
        }
    }

    pub fn child(&self, index: usize) -> Option<&Node> {
        self.content().get(index)
    }

    pub fn as_block(&self) -> Option<&Block> {
        match self {
            Node::Block(block) => Some(block),
            _ => None,
        }
    }

    pub fn as_block_mut(&mut self) -> Option<&mut Block> {
        match self {
            Node::Block(block) => Some(block),
            _ => None,
        }
    }

    pub fn is_textblock(&self) -> bool {
        self.as_block().is_some_and(|b| b.kind.is_textblock())
    }

    /// Text of a textblock
    pub fn text(&self) -> Option<&str> {
        match self {
            Node::Block(block) if block.kind.is_textblock() => Some(&block.text),
            _ => None,
        }
    }

    /// Length in characters of a textblock's text, 0 for anything else
    pub fn text_len(&self) -> usize {
        self.text().map(char_len).unwrap_or(0)
    }

    pub fn is_empty_textblock(&self) -> bool {
        self.text().is_some_and(str::is_empty)
    }

    pub fn heading_level(&self) -> Option<u8> {
        self.as_block().and_then(|b| b.kind.heading_level())
    }

    pub fn is_paragraph(&self) -> bool {
        self.node_type() == NodeType::Paragraph
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            Node::Section { attrs, .. } => attrs.id.as_deref(),
            Node::ColumnGroup { attrs, .. } => attrs.id.as_deref(),
            Node::Column { id, .. } => id.as_deref(),
            Node::Block(block) => block.id.as_deref(),
        }
    }

    pub fn set_id(&mut self, new_id: Option<String>) {
        match self {
            Node::Section { attrs, .. } => attrs.id = new_id,
            Node::ColumnGroup { attrs, .. } => attrs.id = new_id,
            Node::Column { id, .. } => *id = new_id,
            Node::Block(block) => block.id = new_id,
        }
    }

    pub fn section_id(&self) -> Option<&str> {
        match self {
            Node::Section { attrs, .. } => attrs.section_id.as_deref(),
            _ => None,
        }
    }

    /// Path (relative to this node) of the first textblock at or below it
    pub fn first_textblock(&self) -> Option<Vec<usize>> {
        if self.is_textblock() {
            return Some(Vec::new());
        }
        self.content().iter().enumerate().find_map(|(i, child)| {
            child.first_textblock().map(|mut rest| {
                rest.insert(0, i);
                rest
            })
        })
    }

    /// Path (relative to this node) of the last textblock at or below it
    pub fn last_textblock(&self) -> Option<Vec<usize>> {
        if self.is_textblock() {
            return Some(Vec::new());
        }
        self.content().iter().enumerate().rev().find_map(|(i, child)| {
            child.last_textblock().map(|mut rest| {
                rest.insert(0, i);
                rest
            })
        })
    }
}

impl Document {
    pub fn new(content: Vec<Node>) -> Self {
        Self { content }
    }

    /// Node at `path`, `None` for the root or a dangling path
    pub fn node_at(&self, path: &[usize]) -> Option<&Node> {
        let (first, rest) = path.split_first()?;
        let mut node = self.content.get(*first)?;
        for &index in rest {
            node = node.child(index)?;
        }
        Some(node)
    }

    pub fn node_at_mut(&mut self, path: &[usize]) -> Option<&mut Node> {
        let (first, rest) = path.split_first()?;
        let mut node = self.content.get_mut(*first)?;
        for &index in rest {
            node = node.content_mut()?.get_mut(index)?;
        }
        Some(node)
    }

    /// Type of the node at `path`; the empty path is the document itself
    pub fn node_type_at(&self, path: &[usize]) -> Option<NodeType> {
        if path.is_empty() {
            Some(NodeType::Doc)
        } else {
            self.node_at(path).map(Node::node_type)
        }
    }

    pub fn children_at(&self, parent: &[usize]) -> Option<&[Node]> {
        if parent.is_empty() {
            Some(&self.content)
        } else {
            self.node_at(parent).map(Node::content)
        }
    }

    pub fn children_at_mut(&mut self, parent: &[usize]) -> Option<&mut Vec<Node>> {
        if parent.is_empty() {
            Some(&mut self.content)
        } else {
            self.node_at_mut(parent)?.content_mut()
        }
    }

    /// Paths of every textblock, in document order
    pub fn textblock_paths(&self) -> Vec<Vec<usize>> {
        fn collect(nodes: &[Node], prefix: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
            for (i, node) in nodes.iter().enumerate() {
                prefix.push(i);
                if node.is_textblock() {
                    out.push(prefix.clone());
                } else {
                    collect(node.content(), prefix, out);
                }
                prefix.pop();
            }
        }

        let mut out = Vec::new();
        collect(&self.content, &mut Vec::new(), &mut out);
        out
    }

    /// True when some top-level child is not a Section (pre-migration content)
    pub fn is_legacy(&self) -> bool {
        self.content
            .iter()
            .any(|node| node.node_type() != NodeType::Section)
    }

    pub fn section_count(&self) -> usize {
        self.content
            .iter()
            .filter(|node| node.node_type() == NodeType::Section)
            .count()
    }

    pub fn from_json(source: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(source)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Character count of `text`
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Byte index of the `char_index`-th character, clamped to the end
pub fn byte_index(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}
