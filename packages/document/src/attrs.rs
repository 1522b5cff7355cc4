//! # Data Attributes
//!
//! Externally visible `data-*` attributes of structural nodes, as read by
//! storage and by the style layer.
//!
//! Parsing is forgiving in the way DOM attribute parsing is: malformed values
//! fall back to defaults instead of failing.

use crate::node::{ColumnGroupAttrs, Node, SectionAttrs, DEFAULT_COLUMN_GAP, MAX_COLUMNS, MIN_COLUMNS};
use std::collections::BTreeMap;

pub const DATA_ID: &str = "data-id";
pub const DATA_SECTION_ID: &str = "data-section-id";
pub const DATA_SECTION_LEVEL: &str = "data-section-level";
pub const DATA_NUMBERING: &str = "data-numbering";
pub const DATA_COLUMN_COUNT: &str = "data-column-count";
pub const DATA_COLUMN_WIDTHS: &str = "data-column-widths";
pub const DATA_SHOW_BORDERS: &str = "data-show-borders";
pub const DATA_GAP: &str = "data-gap";

pub type DataAttrs = BTreeMap<String, String>;

/// Render the `data-*` attributes of `node`
pub fn to_data_attrs(node: &Node) -> DataAttrs {
    let mut out = DataAttrs::new();
    if let Some(id) = node.id() {
        out.insert(DATA_ID.to_string(), id.to_string());
    }

    match node {
        Node::Section { attrs, .. } => {
            if let Some(section_id) = &attrs.section_id {
                out.insert(DATA_SECTION_ID.to_string(), section_id.clone());
            }
            if let Some(level) = attrs.level {
                out.insert(DATA_SECTION_LEVEL.to_string(), level.to_string());
            }
            if let Some(numbering) = &attrs.numbering {
                out.insert(DATA_NUMBERING.to_string(), numbering.clone());
            }
        }
        Node::ColumnGroup { attrs, .. } => {
            out.insert(
                DATA_COLUMN_COUNT.to_string(),
                attrs.column_count.to_string(),
            );
            if let Some(widths) = &attrs.column_widths {
                if let Ok(json) = serde_json::to_string(widths) {
                    out.insert(DATA_COLUMN_WIDTHS.to_string(), json);
                }
            }
            out.insert(
                DATA_SHOW_BORDERS.to_string(),
                attrs.show_borders.to_string(),
            );
            out.insert(DATA_GAP.to_string(), attrs.gap.to_string());
        }
        Node::Column { .. } | Node::Block(_) => {}
    }
    out
}

pub fn section_attrs_from_data(data: &DataAttrs) -> SectionAttrs {
    SectionAttrs {
        id: data.get(DATA_ID).cloned(),
        section_id: data.get(DATA_SECTION_ID).cloned(),
        level: data
            .get(DATA_SECTION_LEVEL)
            .and_then(|raw| raw.parse::<u8>().ok())
            .filter(|level| (1..=6).contains(level)),
        numbering: data.get(DATA_NUMBERING).cloned(),
    }
}

pub fn column_group_attrs_from_data(data: &DataAttrs) -> ColumnGroupAttrs {
    let column_count = data
        .get(DATA_COLUMN_COUNT)
        .and_then(|raw| raw.parse::<u8>().ok())
        .map(|count| count.clamp(MIN_COLUMNS, MAX_COLUMNS))
        .unwrap_or(MIN_COLUMNS);

    let column_widths = data
        .get(DATA_COLUMN_WIDTHS)
        .and_then(|raw| serde_json::from_str::<Vec<f64>>(raw).ok())
        .filter(|widths| widths.len() == usize::from(column_count));

    ColumnGroupAttrs {
        id: data.get(DATA_ID).cloned(),
        column_count,
        column_widths,
        show_borders: data.get(DATA_SHOW_BORDERS).is_some_and(|raw| raw == "true"),
        gap: data
            .get(DATA_GAP)
            .and_then(|raw| raw.parse::<u32>().ok())
            .unwrap_or(DEFAULT_COLUMN_GAP),
    }
}
