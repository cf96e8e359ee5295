use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type BoardId = i64;
pub type ColumnId = i64;
pub type TaskId = i64;
pub type LabelId = i64;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Label {
    pub id: LabelId,
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub position: i32,
    /// Id of the column currently holding this task.
    pub column: ColumnId,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub due_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Placeholder task shown between an optimistic insert and the server's reply.
    pub fn speculative(id: TaskId, title: &str, column: ColumnId) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: title.to_string(),
            description: String::new(),
            position: 0,
            column,
            labels: Vec::new(),
            due_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Column {
    pub id: ColumnId,
    pub name: String,
    #[serde(default)]
    pub position: i32,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Column {
    pub fn task_index(&self, task_id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == task_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Board {
    pub id: BoardId,
    pub name: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub labels: Vec<Label>,
}

impl Board {
    pub fn column(&self, id: ColumnId) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == id)
    }

    pub fn column_mut(&mut self, id: ColumnId) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.id == id)
    }

    /// Locate a task anywhere on the board as `(column index, task index)`.
    pub fn locate_task(&self, task_id: TaskId) -> Option<(usize, usize)> {
        self.columns
            .iter()
            .enumerate()
            .find_map(|(ci, c)| c.task_index(task_id).map(|ti| (ci, ti)))
    }

    pub fn task(&self, task_id: TaskId) -> Option<&Task> {
        self.locate_task(task_id)
            .map(|(ci, ti)| &self.columns[ci].tasks[ti])
    }

    pub fn task_mut(&mut self, task_id: TaskId) -> Option<&mut Task> {
        self.locate_task(task_id)
            .map(|(ci, ti)| &mut self.columns[ci].tasks[ti])
    }
}

/// Entry in the board list returned by `GET /boards/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BoardSummary {
    pub id: BoardId,
    pub name: String,
}

// Gateway request payloads

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: String,
    pub column: ColumnId,
    pub label_ids: Vec<LabelId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpdateTitleRequest {
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskMove {
    pub task_id: TaskId,
    pub to_column: ColumnId,
    pub to_position: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReorderRequest {
    pub moves: Vec<TaskMove>,
}

/// Abstract drag-end report from the gesture layer.
///
/// Element and container identifiers arrive as opaque strings; the
/// reorder resolver decides whether they name real columns and tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DragEvent {
    /// Element being dragged.
    pub active_id: Option<String>,
    /// Element under the drop point (a task, or the container itself).
    pub over_id: Option<String>,
    pub source_container: Option<String>,
    pub destination_container: Option<String>,
}
