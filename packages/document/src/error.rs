use crate::node::NodeType;
use thiserror::Error;

pub type StepResult<T> = Result<T, StepError>;

/// Failure to resolve a position against a tree value
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error("No node at path {path}")]
    PathNotFound { path: String },

    #[error("Offset {offset} out of range for {node_type} of length {len}")]
    OffsetOutOfRange {
        offset: usize,
        len: usize,
        node_type: NodeType,
    },
}

/// Failure to apply a step; the tree is left untouched
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StepError {
    #[error("No node at path {0}")]
    NodeNotFound(String),

    #[error("{0} cannot hold children")]
    NotAContainer(NodeType),

    #[error("{0} is not a textblock")]
    NotATextblock(NodeType),

    #[error("Range {from}..{to} out of bounds for length {len}")]
    RangeOutOfBounds { from: usize, to: usize, len: usize },

    #[error("Invalid content: {0}")]
    InvalidContent(String),

    #[error("Cannot join {first} with {second}")]
    IncompatibleJoin { first: NodeType, second: NodeType },

    #[error("Cannot change {from} into {to}")]
    IncompatibleKind { from: NodeType, to: NodeType },
}

impl StepError {
    pub fn node_not_found(path: &[usize]) -> Self {
        Self::NodeNotFound(format_path(path))
    }

    pub fn invalid_content(message: impl Into<String>) -> Self {
        Self::InvalidContent(message.into())
    }
}

impl From<crate::schema::SchemaViolation> for StepError {
    fn from(violation: crate::schema::SchemaViolation) -> Self {
        StepError::InvalidContent(violation.to_string())
    }
}

/// Failure to parse a textual position such as `0.1:3`
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PosParseError {
    #[error("Invalid path segment '{0}'")]
    InvalidSegment(String),

    #[error("Invalid offset '{0}'")]
    InvalidOffset(String),
}

/// Dotted rendering of a path, `/` for the root
pub fn format_path(path: &[usize]) -> String {
    if path.is_empty() {
        return "/".to_string();
    }
    path.iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(".")
}
