/// Task operations with ownership enforcement
///
/// Every operation that touches an existing task checks that the requester
/// owns it. Advancing status goes through [`TaskStatus::next`] and a
/// compare-and-set on the stored status, so a task never moves backwards
/// even when two advances race.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info};

use super::{field_error, ServiceError, ServiceResult};
use crate::{
    models::task::{CreateTask, Task},
    store::TaskStore,
};

/// Task creation input
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewTask {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,
}

/// Creates, lists and advances tasks
#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn TaskStore>,
}

impl TaskService {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    /// Creates a pending task owned by `owner_id`
    ///
    /// The title must be non-empty. An empty description is stored as
    /// absent.
    pub async fn create(&self, owner_id: i64, input: NewTask) -> ServiceResult<Task> {
        if input.title.is_empty() {
            return Err(field_error("title", "required", "Title is required").into());
        }

        let description = input.description.filter(|d| !d.is_empty());

        let task = self
            .store
            .insert_task(CreateTask {
                owner_id,
                title: input.title,
                description,
            })
            .await?;

        info!(task_id = task.id, owner_id, "Task created");

        Ok(task)
    }

    /// All tasks of one owner, newest first
    pub async fn list_by_owner(&self, owner_id: i64) -> ServiceResult<Vec<Task>> {
        Ok(self.store.list_tasks_by_owner(owner_id).await?)
    }

    /// Lists `owner_id`'s tasks on behalf of `requester_id`
    ///
    /// # Errors
    ///
    /// `Forbidden` unless the requester is the owner
    pub async fn list_for(&self, requester_id: i64, owner_id: i64) -> ServiceResult<Vec<Task>> {
        if requester_id != owner_id {
            debug!(requester_id, owner_id, "Refusing to list another user's tasks");
            return Err(ServiceError::Forbidden);
        }

        self.list_by_owner(owner_id).await
    }

    /// Fetches a task by ID
    pub async fn get(&self, task_id: i64) -> ServiceResult<Task> {
        self.store
            .find_task(task_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Task not found".to_string()))
    }

    /// Moves a task one step forward in its lifecycle
    ///
    /// `done` stays `done`. If another request advanced the task between
    /// the read and the write, the current stored record is returned
    /// instead of applying a second step.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the task doesn't exist
    /// - `Forbidden` if the requester doesn't own it
    pub async fn advance_status(&self, task_id: i64, requester_id: i64) -> ServiceResult<Task> {
        let task = self.get(task_id).await?;

        if task.owner_id != requester_id {
            debug!(task_id, requester_id, "Refusing to advance another user's task");
            return Err(ServiceError::Forbidden);
        }

        if task.status.is_terminal() {
            return Ok(task);
        }

        let next = task.status.next();

        match self
            .store
            .update_task_status(task_id, task.status, next)
            .await?
        {
            Some(updated) => {
                info!(task_id, from = %task.status, to = %next, "Task status advanced");
                Ok(updated)
            }
            None => {
                debug!(task_id, "Task changed concurrently, returning current state");
                self.get(task_id).await
            }
        }
    }
}

impl std::fmt::Debug for TaskService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskService").finish_non_exhaustive()
    }
}
