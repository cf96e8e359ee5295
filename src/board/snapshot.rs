//! Snapshot cloning and structural helpers.
//!
//! A published snapshot is never mutated. Every speculative change starts
//! from [`detach`], edits the private copy, and is then swapped into the
//! store as a whole.

use std::collections::HashSet;

use super::models::{Board, Column};

/// Deep copy of a published snapshot.
///
/// `Board` owns its columns and tasks outright, so the derived `Clone`
/// yields a copy that shares nothing with `snapshot`.
pub fn detach(snapshot: &Board) -> Board {
    snapshot.clone()
}

/// Re-derive dense zero-based positions from list order.
pub fn renumber(column: &mut Column) {
    let column_id = column.id;
    for (index, task) in column.tasks.iter_mut().enumerate() {
        task.position = index as i32;
        task.column = column_id;
    }
}

pub fn renumber_all(board: &mut Board) {
    for column in &mut board.columns {
        renumber(column);
    }
}

/// Check the structural invariants of a snapshot, returning the first
/// violation found.
pub fn check_invariants(board: &Board) -> Result<(), String> {
    let mut seen = HashSet::new();
    for column in &board.columns {
        for (index, task) in column.tasks.iter().enumerate() {
            if !seen.insert(task.id) {
                return Err(format!("task {} appears more than once", task.id));
            }
            if task.column != column.id {
                return Err(format!(
                    "task {} claims column {} but sits in column {}",
                    task.id, task.column, column.id
                ));
            }
            if task.position != index as i32 {
                return Err(format!(
                    "task {} has position {} at index {} of column {}",
                    task.id, task.position, index, column.id
                ));
            }
        }
    }
    Ok(())
}
