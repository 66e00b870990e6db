//! An in-memory task store
//!
//! It behaves like the remote store (server-assigned IDs and creation times, created-at ordering,
//! not-found errors), so that it can stand in for it in tests and demos.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{Duration, Utc};

use crate::error::StoreError;
use crate::mock_behaviour::MockBehaviour;
use crate::task::{NewTask, Task, TaskId, TaskPatch};
use crate::traits::{TaskFilter, TaskStore};


/// A [`TaskStore`] that keeps its tasks in memory
#[derive(Debug, Default)]
pub struct LocalStore {
    /// In insertion order
    tasks: Mutex<Vec<Task>>,
    mock_behaviour: Option<Arc<Mutex<MockBehaviour>>>,
    n_requests: AtomicUsize,
}

impl LocalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make this store fail according to a [`MockBehaviour`]
    pub fn set_mock_behaviour(&mut self, behaviour: Option<Arc<Mutex<MockBehaviour>>>) {
        self.mock_behaviour = behaviour;
    }

    /// How many requests this store has received (including the ones that failed)
    pub fn request_count(&self) -> usize {
        self.n_requests.load(Ordering::SeqCst)
    }

    /// A copy of every task, in insertion order
    pub fn snapshot(&self) -> Vec<Task> {
        self.lock_tasks().clone()
    }

    fn lock_tasks(&self) -> MutexGuard<'_, Vec<Task>> {
        match self.tasks.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn check(&self, what: fn(&mut MockBehaviour) -> Result<(), StoreError>) -> Result<(), StoreError> {
        self.n_requests.fetch_add(1, Ordering::SeqCst);
        match &self.mock_behaviour {
            None => Ok(()),
            Some(behaviour) => match behaviour.lock() {
                Ok(mut b) => what(&mut *b),
                Err(_) => Err(StoreError::remote("poisoned mock behaviour")),
            },
        }
    }
}

#[async_trait]
impl TaskStore for LocalStore {
    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, StoreError> {
        self.check(MockBehaviour::can_list_tasks)?;

        let tasks = self.lock_tasks();
        match filter {
            TaskFilter::All => {
                // Latest insertions first in case several tasks share the same creation time
                let mut result: Vec<Task> = tasks.iter().rev().cloned().collect();
                result.sort_by(|a, b| b.created_at().cmp(a.created_at()));
                Ok(result)
            },
            TaskFilter::DueBetween { .. } => {
                Ok(tasks.iter().filter(|t| filter.matches(t)).cloned().collect())
            },
        }
    }

    async fn insert_task(&self, new_task: NewTask) -> Result<Task, StoreError> {
        self.check(MockBehaviour::can_insert_task)?;

        let mut tasks = self.lock_tasks();
        // Creation times must be strictly increasing, so that ordering is deterministic
        let mut created_at = Utc::now();
        if let Some(last) = tasks.iter().map(|t| *t.created_at()).max() {
            if created_at <= last {
                created_at = last + Duration::microseconds(1);
            }
        }
        let task = Task::from_new(TaskId::random(), new_task, created_at);
        tasks.push(task.clone());
        log::debug!("Local store: inserted {}", task.id());
        Ok(task)
    }

    async fn update_task(&self, id: &TaskId, patch: &TaskPatch) -> Result<Task, StoreError> {
        self.check(MockBehaviour::can_update_task)?;

        let mut tasks = self.lock_tasks();
        match tasks.iter_mut().find(|t| t.id() == id) {
            None => Err(StoreError::NotFound(id.to_string())),
            Some(task) => {
                task.apply_patch(patch);
                Ok(task.clone())
            },
        }
    }
}
