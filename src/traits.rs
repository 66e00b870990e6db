use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::StoreError;
use crate::task::{NewTask, Task, TaskId, TaskPatch, TaskStatus};

/// Which tasks a list request returns
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TaskFilter {
    /// Every task, most recently created first
    All,
    /// Tasks whose due date is within `[start, end]` (both included). No ordering is guaranteed
    DueBetween { start: NaiveDate, end: NaiveDate },
}

impl Default for TaskFilter {
    fn default() -> Self {
        TaskFilter::All
    }
}

impl TaskFilter {
    /// Whether a task is part of the result set of this filter
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            TaskFilter::All => true,
            TaskFilter::DueBetween { start, end } => match task.due_date() {
                None => false,
                Some(due) => *start <= due && due <= *end,
            },
        }
    }
}


/// A collection of tasks, usually held by a remote server.
///
/// Every call returns whole snapshots. There is no incremental diffing.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Returns the tasks matching a filter
    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, StoreError>;

    /// Insert a new task, and returns it as the store saved it (with its ID and creation time)
    async fn insert_task(&self, new_task: NewTask) -> Result<Task, StoreError>;

    /// Update the fields of a task that are set in `patch`.
    ///
    /// Returns [`StoreError::NotFound`] if there is no such task
    async fn update_task(&self, id: &TaskId, patch: &TaskPatch) -> Result<Task, StoreError>;

    /// Change the status of a task
    async fn update_task_status(&self, id: &TaskId, status: TaskStatus) -> Result<Task, StoreError> {
        self.update_task(id, &TaskPatch::status(status)).await
    }
}
