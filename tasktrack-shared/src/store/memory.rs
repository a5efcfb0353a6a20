/// In-memory store
///
/// Keeps users and tasks in process-local maps behind a `tokio` lock. It
/// mirrors the PostgreSQL schema's guarantees: sequential IDs, unique
/// emails, tasks must reference an existing user, and the status update is
/// a compare-and-set. Used by the test suites and for local experiments.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{Store, StoreError, StoreResult, TaskStore, UserStore};
use crate::models::{
    task::{CreateTask, Task, TaskStatus},
    user::{CreateUser, User},
};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    emails: HashMap<String, i64>,
    tasks: BTreeMap<i64, Task>,
    next_user_id: i64,
    next_task_id: i64,
}

/// Store implementation over in-process maps
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, data: CreateUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;

        if tables.emails.contains_key(&data.email) {
            return Err(StoreError::UniqueViolation("users_email_key".to_string()));
        }

        tables.next_user_id += 1;
        let user = User {
            id: tables.next_user_id,
            name: data.name,
            email: data.email,
            password_hash: data.password_hash,
            created_at: Utc::now(),
        };

        tables.emails.insert(user.email.clone(), user.id);
        tables.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;

        Ok(tables
            .emails
            .get(email)
            .and_then(|id| tables.users.get(id))
            .cloned())
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn insert_task(&self, data: CreateTask) -> StoreResult<Task> {
        let mut tables = self.tables.write().await;

        if !tables.users.contains_key(&data.owner_id) {
            return Err(StoreError::ForeignKeyViolation(
                "tasks_user_id_fkey".to_string(),
            ));
        }

        tables.next_task_id += 1;
        let task = Task {
            id: tables.next_task_id,
            owner_id: data.owner_id,
            title: data.title,
            description: data.description,
            status: TaskStatus::Pending,
            created_at: Utc::now(),
        };

        tables.tasks.insert(task.id, task.clone());

        Ok(task)
    }

    async fn find_task(&self, id: i64) -> StoreResult<Option<Task>> {
        Ok(self.tables.read().await.tasks.get(&id).cloned())
    }

    async fn list_tasks_by_owner(&self, owner_id: i64) -> StoreResult<Vec<Task>> {
        let tables = self.tables.read().await;

        let mut tasks: Vec<Task> = tables
            .tasks
            .values()
            .filter(|task| task.owner_id == owner_id)
            .cloned()
            .collect();

        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(tasks)
    }

    async fn update_task_status(
        &self,
        id: i64,
        from: TaskStatus,
        to: TaskStatus,
    ) -> StoreResult<Option<Task>> {
        let mut tables = self.tables.write().await;

        match tables.tasks.get_mut(&id) {
            Some(task) if task.status == from => {
                task.status = to;
                Ok(Some(task.clone()))
            }
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
