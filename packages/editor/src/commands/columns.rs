//! Column commands.
//!
//! A column group always sits directly inside a section, so every command
//! here addresses the group through its section and never nests groups.

use super::sections::section_context;
use super::{CommandContext, CommandError, CommandResult};
use crate::identity::find_path_by_id;
use crate::state::EditorState;
use quire_document::{
    find_column_group_depth, schema, ColumnGroupAttrs, Node, Pos, Selection, Slot, MAX_COLUMNS,
    MIN_COLUMNS,
};
use tracing::debug;

/// The column group enclosing the selection head
struct GroupContext<'a> {
    path: Vec<usize>,
    attrs: &'a ColumnGroupAttrs,
    columns: &'a [Node],
}

fn group_context(state: &EditorState) -> Result<GroupContext<'_>, CommandError> {
    let rp = state.head()?;
    let depth = find_column_group_depth(&rp).ok_or(CommandError::NotInColumns)?;
    match rp.node(depth) {
        Some(Node::ColumnGroup { attrs, content }) => Ok(GroupContext {
            path: rp.path_to(depth).to_vec(),
            attrs,
            columns: content,
        }),
        _ => Err(CommandError::NotInColumns),
    }
}

/// Insert a group of `count` empty columns.
///
/// An empty textblock at the cursor's top level is replaced by the group;
/// otherwise the group goes in directly after the cursor's top-level block.
/// The cursor moves into the first column.
pub fn insert_columns(
    state: &EditorState,
    ctx: &mut CommandContext<'_>,
    count: u8,
) -> CommandResult {
    if !(MIN_COLUMNS..=MAX_COLUMNS).contains(&count) {
        return Err(CommandError::InvalidColumnCount(count));
    }

    let section = section_context(state)?;
    let top_path = section.rp.path_to(section.top_depth).to_vec();
    let top = section.rp.node(section.top_depth).ok_or(CommandError::NoBlock)?;

    let columns = (0..count)
        .map(|_| {
            let mut paragraph = Node::paragraph("");
            paragraph.set_id(Some(ctx.ids.new_id()));
            let mut column = Node::column(vec![paragraph]);
            column.set_id(Some(ctx.ids.new_id()));
            column
        })
        .collect();

    let group_id = ctx.ids.new_id();
    let attrs = ColumnGroupAttrs {
        id: Some(group_id.clone()),
        show_borders: ctx.config.show_column_borders,
        gap: ctx.config.default_column_gap,
        ..ColumnGroupAttrs::new(count)
    };
    let group = Node::ColumnGroup {
        attrs,
        content: columns,
    };

    let mut tr = state.tr();
    if top.is_empty_textblock() {
        let index = section.child_index();
        tr.replace_children(&section.path, index, index + 1, vec![group])?;
    } else {
        let slot = Slot::after(&top_path).ok_or(CommandError::NoBlock)?;
        tr.insert_children(&slot, vec![group])?;
    }

    // Relocate by identity; the group's index depends on which branch ran
    let group_path = find_path_by_id(tr.doc(), &group_id).ok_or(CommandError::NotInColumns)?;
    if let Some(selection) = Selection::at_start(tr.doc(), &group_path) {
        tr.set_selection(selection);
    }

    debug!(count, group = %group_id, "Inserted column group");
    Ok(tr)
}

/// Normalize `widths` to fractions of 1
fn normalize_widths(widths: &[f64], count: u8) -> Result<Vec<f64>, CommandError> {
    if widths.len() != usize::from(count) {
        return Err(CommandError::InvalidWidths(format!(
            "expected {} widths, got {}",
            count,
            widths.len()
        )));
    }
    if widths.iter().any(|w| !w.is_finite() || *w <= 0.0) {
        return Err(CommandError::InvalidWidths(
            "widths must be positive numbers".to_string(),
        ));
    }
    let sum: f64 = widths.iter().sum();
    let normalized: Vec<f64> = widths.iter().map(|w| w / sum).collect();
    schema::check_widths(&normalized, count).map_err(CommandError::InvalidWidths)?;
    Ok(normalized)
}

/// Set the enclosing group's widths. `None` resets to equal widths.
pub fn set_column_widths(state: &EditorState, widths: Option<&[f64]>) -> CommandResult {
    let group = group_context(state)?;
    let column_widths = widths
        .map(|w| normalize_widths(w, group.attrs.column_count))
        .transpose()?;

    let attrs = ColumnGroupAttrs {
        column_widths,
        ..group.attrs.clone()
    };
    let mut tr = state.tr();
    tr.set_column_group_attrs(&group.path, attrs)?;
    Ok(tr)
}

pub fn toggle_column_borders(state: &EditorState) -> CommandResult {
    let group = group_context(state)?;
    let attrs = ColumnGroupAttrs {
        show_borders: !group.attrs.show_borders,
        ..group.attrs.clone()
    };
    let mut tr = state.tr();
    tr.set_column_group_attrs(&group.path, attrs)?;
    Ok(tr)
}

/// Delete the enclosing group and everything in it.
///
/// When the group is its section's only child it is replaced by an empty
/// paragraph so the section keeps a child.
pub fn remove_columns(state: &EditorState) -> CommandResult {
    let group = group_context(state)?;
    let (&index, parent) = group.path.split_last().ok_or(CommandError::NotInColumns)?;
    let sibling_count = state.doc().children_at(parent).map_or(0, <[Node]>::len);

    let mut tr = state.tr();
    let replacement = if sibling_count == 1 {
        vec![Node::paragraph("")]
    } else {
        Vec::new()
    };
    let inserted = replacement.len();
    tr.replace_children(parent, index, index + 1, replacement)?;

    // Prefer what now follows the group inside the section, else what preceded it
    let remaining = tr.doc().children_at(parent).map_or(0, <[Node]>::len);
    let mut target = parent.to_vec();
    let selection = if inserted > 0 || index < remaining {
        target.push(index);
        Selection::at_start(tr.doc(), &target)
    } else {
        target.push(index.saturating_sub(1));
        Selection::at_end(tr.doc(), &target)
    };
    if let Some(selection) = selection {
        tr.set_selection(selection);
    }
    Ok(tr)
}

/// Replace the enclosing group with the contents of its columns, in column
/// order, keeping the cursor on the block it was in.
pub fn unwrap_columns(state: &EditorState) -> CommandResult {
    let group = group_context(state)?;
    let (&index, parent) = group.path.split_last().ok_or(CommandError::NotInColumns)?;

    let mut starts = Vec::with_capacity(group.columns.len());
    let mut flattened = Vec::new();
    for column in group.columns {
        starts.push(flattened.len());
        flattened.extend(column.content().iter().cloned());
    }

    let mut tr = state.tr();
    tr.replace_children(parent, index, index + 1, flattened)?;

    let depth = group.path.len();
    let relocate = |pos: &Pos| -> Option<Pos> {
        let column = *pos.path.get(depth)?;
        let block = *pos.path.get(depth + 1)?;
        let mut path = parent.to_vec();
        path.push(index + starts.get(column)? + block);
        path.extend_from_slice(pos.path.get(depth + 2..)?);
        Some(Pos::new(path, pos.offset))
    };
    if let Some(head) = relocate(&state.selection().head) {
        let anchor = relocate(&state.selection().anchor).unwrap_or_else(|| head.clone());
        tr.set_selection(Selection::new(anchor, head));
    }
    Ok(tr)
}
