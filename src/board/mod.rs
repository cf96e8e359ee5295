//! Board client: optimistic local-state synchronization.
//!
//! ## Overview
//!
//! A board (columns of tasks) is cached locally as an immutable snapshot.
//! User actions change the snapshot immediately, then the change is sent
//! to the REST API; the server's answer either confirms it or the board is
//! put back the way it was.
//!
//! ## Module Map
//!
//! ```text
//! ┌────────────┐ DragEvent ┌──────────────────────────────────────────────┐
//! │  Caller    │ ────────> │ reorder.rs   resolve() → ReorderPlan         │
//! │ (CLI / UI) │           │        │                                     │
//! │            │ create /  │        v                                     │
//! │            │ edit /    │ engine.rs    MutationEngine                  │
//! │            │ delete    │   speculate ──> store.rs  (SnapshotStore)    │
//! │            │ ────────> │   request   ──> gateway.rs (TaskGateway)     │
//! │            │ <──────── │   commit / roll back ──> store.rs            │
//! └────────────┘ Outcome   └──────────────────────────────────────────────┘
//! ```
//!
//! | Module      | Responsibility                                          |
//! |-------------|---------------------------------------------------------|
//! | `models`    | `Board`, `Column`, `Task`, request payloads, `DragEvent`|
//! | `snapshot`  | Deep copy + dense position helpers                      |
//! | `store`     | `SnapshotStore` trait, `BoardStore` (`Arc<Board>` swap) |
//! | `reorder`   | Drag event → `ReorderPlan`                              |
//! | `gateway`   | `TaskGateway` trait, `HttpTaskGateway` (reqwest)        |
//! | `engine`    | `MutationEngine`: speculate → request → commit/rollback |

pub mod engine;
pub mod gateway;
pub mod models;
pub mod reorder;
pub mod snapshot;
pub mod store;

pub use engine::{MutationEngine, MutationOutcome, SkipReason};
pub use gateway::{HttpTaskGateway, Session, TaskGateway};
pub use models::{Board, BoardId, Column, ColumnId, DragEvent, Task, TaskId};
pub use reorder::ReorderPlan;
pub use store::{BoardStore, SnapshotStore, StoreEvent};
