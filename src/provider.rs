//! This modules gives views a single entry point to the tasks of the signed-in user
//!
//! A [`Provider`] combines a [`TaskStore`] (usually a [`Client`](crate::client::Client)) with the
//! [`AuthContext`] of the current user, and checks requests before they leave the client.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::auth::AuthContext;
use crate::error::StoreError;
use crate::task::{NewTask, Priority, Task, TaskColor, TaskId, TaskPatch, TaskStatus};
use crate::traits::{TaskFilter, TaskStore};


/// The fields a user fills in to create a task
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    /// Defaults to [`Priority::Medium`]
    pub priority: Option<Priority>,
    pub due_date: Option<NaiveDate>,
    /// A random color is picked when this is not set
    pub color: Option<TaskColor>,
}

impl TaskForm {
    pub fn new<S: Into<String>>(title: S) -> Self {
        Self { title: title.into(), ..Self::default() }
    }

    /// Check the form and turn it into the payload to insert, owned by `owner`
    pub fn validate(&self, owner: &str) -> Result<NewTask, StoreError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(StoreError::validation("title is required"));
        }
        let description = match self.description.trim() {
            "" => None,
            d => Some(d.to_string()),
        };

        Ok(NewTask {
            title: title.to_string(),
            description,
            status: TaskStatus::Pending,
            priority: self.priority.unwrap_or_default(),
            color: self.color.clone().unwrap_or_else(TaskColor::random),
            due_date: self.due_date,
            created_by: owner.to_string(),
        })
    }
}


/// The task store, as seen by the signed-in user
pub struct Provider<S> {
    store: Arc<S>,
    auth: AuthContext,
}

impl<S> Clone for Provider<S> {
    fn clone(&self) -> Self {
        Self { store: Arc::clone(&self.store), auth: self.auth.clone() }
    }
}

impl<S: TaskStore> Provider<S> {
    pub fn new(store: Arc<S>, auth: AuthContext) -> Self {
        Self { store, auth }
    }

    pub fn store(&self) -> &Arc<S> { &self.store }
    pub fn auth(&self) -> &AuthContext { &self.auth }

    /// Fetch a snapshot of the tasks matching `filter`
    pub async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, StoreError> {
        match self.store.list_tasks(filter).await {
            Ok(tasks) => Ok(tasks),
            Err(err) => {
                log::error!("Unable to list tasks: {}", err);
                Err(err)
            },
        }
    }

    /// Create a task owned by the current user.
    ///
    /// An invalid form is rejected before anything is sent to the store
    pub async fn create_task(&self, form: &TaskForm) -> Result<Task, StoreError> {
        let new_task = form.validate(self.auth.user_id())?;
        self.store.insert_task(new_task).await
    }

    pub async fn update_task_status(&self, id: &TaskId, status: TaskStatus) -> Result<Task, StoreError> {
        log::info!("Setting task {} to {}", id, status);
        self.store.update_task_status(id, status).await
    }

    /// Mark a task completed, or back to pending if it was already completed
    pub async fn toggle_status(&self, task: &Task) -> Result<Task, StoreError> {
        self.update_task_status(task.id(), task.status().toggled()).await
    }

    /// Update any field of a task
    pub async fn update_task(&self, id: &TaskId, patch: &TaskPatch) -> Result<Task, StoreError> {
        if patch.is_empty() {
            return Err(StoreError::validation("nothing to update"));
        }
        if let Some(title) = &patch.title {
            if title.trim().is_empty() {
                return Err(StoreError::validation("title is required"));
            }
        }
        self.store.update_task(id, patch).await
    }
}
