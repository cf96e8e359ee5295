//! Drag-and-drop resolution.
//!
//! Turns an abstract drag-end report into a concrete move plan against the
//! current snapshot. Pure: no store access, no network.

use super::models::{Board, ColumnId, DragEvent, TaskId};

/// A move the engine can apply and send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReorderPlan {
    pub from_column: ColumnId,
    pub to_column: ColumnId,
    pub task_id: TaskId,
    /// Index of the drop target in the destination column's current order.
    /// Not clamped here; the engine clamps against the post-removal length.
    pub destination_index: usize,
}

fn parse_id(raw: Option<&str>) -> Option<i64> {
    raw?.trim().parse().ok()
}

/// Resolve a drag event, returning `None` when the drag is a no-op.
pub fn resolve(event: &DragEvent, board: &Board) -> Option<ReorderPlan> {
    let from_column = parse_id(event.source_container.as_deref())?;
    let to_column = parse_id(event.destination_container.as_deref())?;
    let task_id = parse_id(event.active_id.as_deref())?;
    let over_id = parse_id(event.over_id.as_deref());

    if from_column == to_column && over_id == Some(task_id) {
        return None;
    }

    let destination_index = over_id
        .and_then(|over| board.column(to_column)?.task_index(over))
        .unwrap_or(0);

    Some(ReorderPlan {
        from_column,
        to_column,
        task_id,
        destination_index,
    })
}
