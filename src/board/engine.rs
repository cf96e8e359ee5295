//! Optimistic mutation engine.
//!
//! Every task mutation runs the same protocol:
//!
//! 1. **Speculate**: copy the current snapshot, apply the change to the
//!    copy, swap it into the store and keep the displaced snapshot as the
//!    rollback target.
//! 2. **Request**: call the matching `TaskGateway` operation.
//! 3. **Resolve**: on success reconcile with the server's answer; on any
//!    failure put the rollback target back.
//!
//! Each operation captures its own rollback target, so rolling back one
//! operation restores the board as it was just before *that* operation,
//! discarding any later speculative change still in flight. Responses that
//! arrive after such a rollback are applied as they come (last write wins).

use std::sync::Arc;

use rand::Rng;
use tracing::{debug, info, warn};

use super::gateway::TaskGateway;
use super::models::*;
use super::reorder::{self, ReorderPlan};
use super::snapshot;
use super::store::SnapshotStore;
use crate::errors::{GatewayError, MutationFailure, Operation, SyncError};

/// Lowest id handed out to speculative tasks. Server ids are sequential
/// database keys and stay far below this.
pub const SPECULATIVE_ID_FLOOR: TaskId = 1_000_000_000_000;
const SPECULATIVE_ID_CEIL: TaskId = 1 << 53;

pub fn speculative_task_id() -> TaskId {
    rand::rng().random_range(SPECULATIVE_ID_FLOOR..SPECULATIVE_ID_CEIL)
}

pub fn is_speculative(task_id: TaskId) -> bool {
    task_id >= SPECULATIVE_ID_FLOOR
}

/// Why a mutation was dropped before touching the store or the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    EmptyTitle,
    TitleUnchanged,
    DegenerateDrag,
    BoardNotLoaded,
    ColumnNotFound,
    TaskNotFound,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmptyTitle => "empty title",
            Self::TitleUnchanged => "title unchanged",
            Self::DegenerateDrag => "drag did not move anything",
            Self::BoardNotLoaded => "board not loaded",
            Self::ColumnNotFound => "column not on board",
            Self::TaskNotFound => "task not on board",
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an optimistic operation ended.
#[derive(Debug)]
pub enum MutationOutcome<T = ()> {
    /// Nothing happened: no store write, no request.
    Skipped(SkipReason),
    /// The server accepted the change.
    Committed(T),
    /// The request failed and the board was restored.
    RolledBack(MutationFailure),
}

impl<T> MutationOutcome<T> {
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }

    pub fn is_rolled_back(&self) -> bool {
        matches!(self, Self::RolledBack(_))
    }

    pub fn failure(&self) -> Option<&MutationFailure> {
        match self {
            Self::RolledBack(failure) => Some(failure),
            _ => None,
        }
    }
}

/// An operation in the speculating state: its change is visible in the
/// store and `rollback_target` is what the board looked like before it.
/// Consumed by exactly one of `commit` or `roll_back`.
struct Speculation {
    operation: Operation,
    board_id: BoardId,
    rollback_target: Arc<Board>,
}

impl Speculation {
    fn commit(self) {
        info!(operation = %self.operation, board_id = self.board_id, "Mutation committed");
    }

    fn roll_back(self, store: &dyn SnapshotStore, source: GatewayError) -> MutationFailure {
        warn!(
            operation = %self.operation,
            board_id = self.board_id,
            error = %source,
            "Mutation failed, restoring previous snapshot"
        );
        store.set(self.board_id, snapshot::detach(&self.rollback_target));
        MutationFailure {
            operation: self.operation,
            source,
        }
    }
}

/// Applies task mutations to the local snapshot ahead of the server.
#[derive(Clone)]
pub struct MutationEngine {
    store: Arc<dyn SnapshotStore>,
    gateway: Arc<dyn TaskGateway>,
}

impl MutationEngine {
    pub fn new(store: Arc<dyn SnapshotStore>, gateway: Arc<dyn TaskGateway>) -> Self {
        Self { store, gateway }
    }

    pub fn snapshot(&self, board_id: BoardId) -> Option<Arc<Board>> {
        self.store.get(board_id)
    }

    // ── Queries ───────────────────────────────────────────────────────

    pub async fn list_boards(&self) -> Result<Vec<BoardSummary>, SyncError> {
        Ok(self.gateway.list_boards().await?)
    }

    /// Fetch a board and make it the current snapshot.
    pub async fn load_board(&self, board_id: BoardId) -> Result<Arc<Board>, SyncError> {
        let mut board = match self.gateway.fetch_board(board_id).await {
            Ok(board) => board,
            Err(e) if e.status() == Some(404) => {
                return Err(SyncError::BoardNotFound { id: board_id });
            }
            Err(e) => return Err(e.into()),
        };
        // Server positions may be sparse; the list order is what counts.
        snapshot::renumber_all(&mut board);
        self.store.set(board_id, board);
        self.store
            .get(board_id)
            .ok_or(SyncError::BoardNotFound { id: board_id })
    }

    // ── Mutations ─────────────────────────────────────────────────────

    /// Add a task at the head of `column_id`.
    pub async fn create_task(
        &self,
        board_id: BoardId,
        column_id: ColumnId,
        title: &str,
    ) -> MutationOutcome<Task> {
        if title.trim().is_empty() {
            return self.skip(Operation::Create, SkipReason::EmptyTitle);
        }

        let mut speculative_id = speculative_task_id();
        let speculation = match self.speculate(Operation::Create, board_id, |board| {
            while board.task(speculative_id).is_some() {
                speculative_id = speculative_task_id();
            }
            let column = board
                .column_mut(column_id)
                .ok_or(SkipReason::ColumnNotFound)?;
            column
                .tasks
                .insert(0, Task::speculative(speculative_id, title, column_id));
            snapshot::renumber(column);
            Ok(())
        }) {
            Ok(s) => s,
            Err(reason) => return self.skip(Operation::Create, reason),
        };

        let request = CreateTaskRequest {
            title: title.to_string(),
            description: String::new(),
            column: column_id,
            label_ids: Vec::new(),
        };
        match self.gateway.create_task(&request).await {
            Ok(task) => {
                let task = self.reconcile_created(board_id, column_id, speculative_id, task);
                speculation.commit();
                MutationOutcome::Committed(task)
            }
            Err(e) => MutationOutcome::RolledBack(speculation.roll_back(self.store.as_ref(), e)),
        }
    }

    /// Swap the speculative task for the server's, in place. Falls back to
    /// the head of the original column if the placeholder has vanished.
    fn reconcile_created(
        &self,
        board_id: BoardId,
        column_id: ColumnId,
        speculative_id: TaskId,
        task: Task,
    ) -> Task {
        let swap = self.store.update(board_id, &mut |current| {
            let mut next = snapshot::detach(current);
            if task.id != speculative_id
                && let Some((ci, ti)) = next.locate_task(task.id)
            {
                next.columns[ci].tasks.remove(ti);
            }
            match next.locate_task(speculative_id) {
                Some((ci, ti)) => {
                    let mut replacement = task.clone();
                    replacement.column = next.columns[ci].id;
                    next.columns[ci].tasks[ti] = replacement;
                }
                None => {
                    debug!(board_id, speculative_id, "Speculative task gone, inserting server task at head");
                    let column = next.column_mut(column_id)?;
                    let mut replacement = task.clone();
                    replacement.column = column_id;
                    column.tasks.insert(0, replacement);
                }
            }
            snapshot::renumber_all(&mut next);
            Some(next)
        });
        swap.and_then(|swap| swap.current.task(task.id).cloned())
            .unwrap_or(task)
    }

    /// Rename a task. Blank or unchanged titles are ignored.
    pub async fn edit_title(
        &self,
        board_id: BoardId,
        task_id: TaskId,
        title: &str,
    ) -> MutationOutcome {
        if title.trim().is_empty() {
            return self.skip(Operation::Edit, SkipReason::EmptyTitle);
        }

        let speculation = match self.speculate(Operation::Edit, board_id, |board| {
            let task = board.task_mut(task_id).ok_or(SkipReason::TaskNotFound)?;
            if task.title == title {
                return Err(SkipReason::TitleUnchanged);
            }
            task.title = title.to_string();
            Ok(())
        }) {
            Ok(s) => s,
            Err(reason) => return self.skip(Operation::Edit, reason),
        };

        let request = UpdateTitleRequest {
            title: title.to_string(),
        };
        match self.gateway.update_title(task_id, &request).await {
            Ok(Some(server_task)) => {
                self.store.update(board_id, &mut |current| {
                    let mut next = snapshot::detach(current);
                    let (ci, ti) = next.locate_task(task_id)?;
                    let column = &mut next.columns[ci];
                    let mut replacement = server_task.clone();
                    replacement.column = column.id;
                    replacement.position = ti as i32;
                    column.tasks[ti] = replacement;
                    Some(next)
                });
                speculation.commit();
                MutationOutcome::Committed(())
            }
            Ok(None) => {
                speculation.commit();
                MutationOutcome::Committed(())
            }
            Err(e) => MutationOutcome::RolledBack(speculation.roll_back(self.store.as_ref(), e)),
        }
    }

    /// Remove a task. Callers confirm with the user before invoking this.
    pub async fn delete_task(&self, board_id: BoardId, task_id: TaskId) -> MutationOutcome {
        let speculation = match self.speculate(Operation::Delete, board_id, |board| {
            let (ci, ti) = board.locate_task(task_id).ok_or(SkipReason::TaskNotFound)?;
            let column = &mut board.columns[ci];
            column.tasks.remove(ti);
            snapshot::renumber(column);
            Ok(())
        }) {
            Ok(s) => s,
            Err(reason) => return self.skip(Operation::Delete, reason),
        };

        match self.gateway.delete_task(task_id).await {
            Ok(()) => {
                speculation.commit();
                MutationOutcome::Committed(())
            }
            Err(e) => MutationOutcome::RolledBack(speculation.roll_back(self.store.as_ref(), e)),
        }
    }

    /// Handle a drag-end event: resolve it against the current snapshot
    /// and move the task.
    pub async fn reorder(&self, board_id: BoardId, event: &DragEvent) -> MutationOutcome {
        let Some(board) = self.store.get(board_id) else {
            return self.skip(Operation::Reorder, SkipReason::BoardNotLoaded);
        };
        match reorder::resolve(event, &board) {
            Some(plan) => self.move_task(board_id, plan).await,
            None => self.skip(Operation::Reorder, SkipReason::DegenerateDrag),
        }
    }

    /// Apply a resolved move. The index is clamped locally against the
    /// destination length after removal; the server receives it unclamped.
    pub async fn move_task(&self, board_id: BoardId, plan: ReorderPlan) -> MutationOutcome {
        let speculation = match self.speculate(Operation::Reorder, board_id, |board| {
            let from = board
                .columns
                .iter()
                .position(|c| c.id == plan.from_column)
                .ok_or(SkipReason::ColumnNotFound)?;
            let to = board
                .columns
                .iter()
                .position(|c| c.id == plan.to_column)
                .ok_or(SkipReason::ColumnNotFound)?;
            let index = board.columns[from]
                .task_index(plan.task_id)
                .ok_or(SkipReason::TaskNotFound)?;

            let mut task = board.columns[from].tasks.remove(index);
            let destination = &mut board.columns[to];
            let clamped = plan.destination_index.min(destination.tasks.len());
            task.column = destination.id;
            destination.tasks.insert(clamped, task);

            snapshot::renumber(&mut board.columns[from]);
            snapshot::renumber(&mut board.columns[to]);
            Ok(())
        }) {
            Ok(s) => s,
            Err(reason) => return self.skip(Operation::Reorder, reason),
        };

        let request = ReorderRequest {
            moves: vec![TaskMove {
                task_id: plan.task_id,
                to_column: plan.to_column,
                to_position: plan.destination_index,
            }],
        };
        match self.gateway.reorder_tasks(&request).await {
            Ok(()) => {
                speculation.commit();
                MutationOutcome::Committed(())
            }
            Err(e) => MutationOutcome::RolledBack(speculation.roll_back(self.store.as_ref(), e)),
        }
    }

    // ── Helpers ───────────────────────────────────────────────────────

    /// Publish a modified copy of the current snapshot, capturing the
    /// rollback target in the same store write.
    fn speculate<F>(
        &self,
        operation: Operation,
        board_id: BoardId,
        mut apply: F,
    ) -> Result<Speculation, SkipReason>
    where
        F: FnMut(&mut Board) -> Result<(), SkipReason>,
    {
        let mut skipped = None;
        let swap = self.store.update(board_id, &mut |current| {
            let mut next = snapshot::detach(current);
            match apply(&mut next) {
                Ok(()) => Some(next),
                Err(reason) => {
                    skipped = Some(reason);
                    None
                }
            }
        });
        let swap = swap.ok_or(skipped.unwrap_or(SkipReason::BoardNotLoaded))?;
        debug!(operation = %operation, board_id, "Speculative change applied");
        Ok(Speculation {
            operation,
            board_id,
            rollback_target: swap.previous,
        })
    }

    fn skip<T>(&self, operation: Operation, reason: SkipReason) -> MutationOutcome<T> {
        debug!(operation = %operation, reason = %reason, "Mutation skipped");
        MutationOutcome::Skipped(reason)
    }
}
