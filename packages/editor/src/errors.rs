//! Error types for the editor

use quire_document::SchemaViolation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Document violates content rules: {}", format_violations(.0))]
    Schema(Vec<SchemaViolation>),

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),
}

fn format_violations(violations: &[SchemaViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
