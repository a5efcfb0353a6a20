/// PostgreSQL store backed by a sqlx pool
///
/// Constraint violations reported by the database are translated into
/// [`StoreError`] variants. The `users_email_key` unique constraint is what
/// ultimately guarantees email uniqueness, even when two registrations race
/// past the directory's pre-check.

use async_trait::async_trait;
use sqlx::PgPool;

use super::{Store, StoreError, StoreResult, TaskStore, UserStore};
use crate::{
    db::pool::health_check,
    models::{
        task::{CreateTask, Task, TaskStatus},
        user::{CreateUser, User},
    },
};

/// Store implementation over a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Maps constraint violations to their dedicated variants
fn classify(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        let constraint = db_err.constraint().unwrap_or_default().to_string();

        if db_err.is_unique_violation() {
            return StoreError::UniqueViolation(constraint);
        }
        if db_err.is_foreign_key_violation() {
            return StoreError::ForeignKeyViolation(constraint);
        }
    }

    StoreError::Database(err)
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, data: CreateUser) -> StoreResult<User> {
        User::create(&self.pool, data).await.map_err(classify)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn insert_task(&self, data: CreateTask) -> StoreResult<Task> {
        Task::create(&self.pool, data).await.map_err(classify)
    }

    async fn find_task(&self, id: i64) -> StoreResult<Option<Task>> {
        Ok(Task::find_by_id(&self.pool, id).await?)
    }

    async fn list_tasks_by_owner(&self, owner_id: i64) -> StoreResult<Vec<Task>> {
        Ok(Task::list_by_owner(&self.pool, owner_id).await?)
    }

    async fn update_task_status(
        &self,
        id: i64,
        from: TaskStatus,
        to: TaskStatus,
    ) -> StoreResult<Option<Task>> {
        Ok(Task::update_status(&self.pool, id, from, to).await?)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(health_check(&self.pool).await?)
    }
}
