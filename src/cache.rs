//! This module provides a read-through cache in front of any task store
//!
//! Views fetch their own snapshots and do not share any derived state. When several views are
//! shown at once, wrapping the store in a [`QueryCache`] lets them share the fetched snapshots
//! instead. Every mutation drops the whole cache, so the next reads fetch fresh data.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::error::StoreError;
use crate::task::{NewTask, Task, TaskId, TaskPatch};
use crate::traits::{TaskFilter, TaskStore};


/// A [`TaskStore`] that remembers the snapshots returned by another store, keyed by their query parameters
#[derive(Debug)]
pub struct QueryCache<S> {
    inner: S,
    snapshots: Mutex<HashMap<TaskFilter, Vec<Task>>>,
}

impl<S: TaskStore> QueryCache<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            snapshots: Mutex::new(HashMap::new()),
        }
    }

    /// The wrapped store
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Forget every cached snapshot
    pub fn invalidate(&self) {
        log::debug!("Invalidating cached task snapshots");
        self.lock_snapshots().clear();
    }

    pub fn is_cached(&self, filter: &TaskFilter) -> bool {
        self.lock_snapshots().contains_key(filter)
    }

    fn lock_snapshots(&self) -> MutexGuard<'_, HashMap<TaskFilter, Vec<Task>>> {
        match self.snapshots.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl<S: TaskStore> TaskStore for QueryCache<S> {
    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, StoreError> {
        let cached = self.lock_snapshots().get(filter).cloned();
        if let Some(snapshot) = cached {
            log::debug!("Snapshot for {:?} is already cached.", filter);
            return Ok(snapshot);
        }

        // Note: the mutex is not held during the request. Two concurrent misses simply fetch twice
        let snapshot = self.inner.list_tasks(filter).await?;
        self.lock_snapshots().insert(*filter, snapshot.clone());
        Ok(snapshot)
    }

    async fn insert_task(&self, new_task: NewTask) -> Result<Task, StoreError> {
        let result = self.inner.insert_task(new_task).await;
        self.invalidate();
        result
    }

    async fn update_task(&self, id: &TaskId, patch: &TaskPatch) -> Result<Task, StoreError> {
        let result = self.inner.update_task(id, patch).await;
        self.invalidate();
        result
    }
}
