use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::broadcast;

use super::models::{Board, BoardId};

/// Capacity of the change-notification channel. Slow readers skip
/// intermediate versions and simply re-read the latest snapshot.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Result of a successful read-modify-write on one board.
#[derive(Debug, Clone)]
pub struct Swap {
    /// Snapshot that was current immediately before the write.
    pub previous: Arc<Board>,
    pub current: Arc<Board>,
}

/// Keyed cache of board snapshots.
///
/// Snapshots are handed out as `Arc<Board>` and replaced wholesale, so a
/// reader either sees the old board or the new one, never a mix.
/// Real implementation: `BoardStore`. Tests may substitute their own.
pub trait SnapshotStore: Send + Sync {
    fn get(&self, board_id: BoardId) -> Option<Arc<Board>>;

    /// Replace the current snapshot, returning the one it displaced.
    fn set(&self, board_id: BoardId, board: Board) -> Option<Arc<Board>>;

    /// Derive a new snapshot from the current one and publish it.
    ///
    /// Returns `None` without writing when the board is absent or `apply`
    /// declines by returning `None`.
    fn update(
        &self,
        board_id: BoardId,
        apply: &mut dyn FnMut(&Board) -> Option<Board>,
    ) -> Option<Swap> {
        let current = self.get(board_id)?;
        let next = apply(&current)?;
        let previous = self.set(board_id, next).unwrap_or(current);
        let current = self.get(board_id)?;
        Some(Swap { previous, current })
    }
}

/// Notification sent after every snapshot swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreEvent {
    pub board_id: BoardId,
    /// Store-wide monotonically increasing write counter.
    pub version: u64,
}

/// In-memory `SnapshotStore` shared by every view of a board.
pub struct BoardStore {
    boards: RwLock<HashMap<BoardId, Arc<Board>>>,
    version: AtomicU64,
    tx: broadcast::Sender<StoreEvent>,
}

impl BoardStore {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            boards: RwLock::new(HashMap::new()),
            version: AtomicU64::new(0),
            tx,
        }
    }

    /// Receive a `StoreEvent` for every subsequent swap.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.tx.subscribe()
    }

    /// Drop the cached snapshot for a board no view depends on any more.
    pub fn evict(&self, board_id: BoardId) -> Option<Arc<Board>> {
        self.boards
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&board_id)
    }

    pub fn len(&self) -> usize {
        self.boards
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn notify(&self, board_id: BoardId) {
        let version = self.version.fetch_add(1, Ordering::SeqCst) + 1;
        // No subscribers is not an error.
        let _ = self.tx.send(StoreEvent { board_id, version });
    }
}

impl Default for BoardStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore for BoardStore {
    fn get(&self, board_id: BoardId) -> Option<Arc<Board>> {
        self.boards
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&board_id)
            .cloned()
    }

    fn set(&self, board_id: BoardId, board: Board) -> Option<Arc<Board>> {
        let previous = self
            .boards
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(board_id, Arc::new(board));
        self.notify(board_id);
        previous
    }

    fn update(
        &self,
        board_id: BoardId,
        apply: &mut dyn FnMut(&Board) -> Option<Board>,
    ) -> Option<Swap> {
        let swap = {
            let mut boards = self.boards.write().unwrap_or_else(PoisonError::into_inner);
            let previous = boards.get(&board_id)?.clone();
            let current = Arc::new(apply(&previous)?);
            boards.insert(board_id, current.clone());
            Swap { previous, current }
        };
        self.notify(board_id);
        Some(swap)
    }
}
