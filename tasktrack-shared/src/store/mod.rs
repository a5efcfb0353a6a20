/// Persistence traits
///
/// Services talk to storage through these traits rather than a concrete
/// pool, so the same user directory and task logic runs against PostgreSQL
/// in production and an in-memory store in tests.
///
/// # Backends
///
/// - [`PgStore`]: PostgreSQL via sqlx, delegates to the `models` queries
/// - [`MemoryStore`]: process-local maps with the same constraints
///
/// Both backends enforce email uniqueness and the task → user reference
/// themselves and report violations as [`StoreError`] variants, so callers
/// never rely on a pre-check alone.

use async_trait::async_trait;

use crate::models::{
    task::{CreateTask, Task, TaskStatus},
    user::{CreateUser, User},
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// A referenced row does not exist
    #[error("Foreign key violated: {0}")]
    ForeignKeyViolation(String),

    /// Any other database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Store result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// User persistence
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a user; `UniqueViolation` if the email is taken
    async fn insert_user(&self, data: CreateUser) -> StoreResult<User>;

    /// Exact-match lookup by email
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
}

/// Task persistence
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Inserts a pending task; `ForeignKeyViolation` if the owner is unknown
    async fn insert_task(&self, data: CreateTask) -> StoreResult<Task>;

    /// Looks up a task by ID
    async fn find_task(&self, id: i64) -> StoreResult<Option<Task>>;

    /// All tasks of one owner ordered by `created_at DESC, id DESC`
    async fn list_tasks_by_owner(&self, owner_id: i64) -> StoreResult<Vec<Task>>;

    /// Compare-and-set on status; `None` if the task is missing or no
    /// longer in `from`
    async fn update_task_status(
        &self,
        id: i64,
        from: TaskStatus,
        to: TaskStatus,
    ) -> StoreResult<Option<Task>>;
}

/// A complete backend
#[async_trait]
pub trait Store: UserStore + TaskStore {
    /// Checks that the backend is reachable
    async fn ping(&self) -> StoreResult<()>;
}
