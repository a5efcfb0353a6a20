/// Task model and database operations
///
/// A task belongs to exactly one user for its whole life. After creation
/// the only field that ever changes is `status`, and only forward.
///
/// # State Machine
///
/// ```text
/// pending → in_progress → done ─┐
///                          ↑    │
///                          └────┘
/// ```
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('pending', 'in_progress', 'done');
///
/// CREATE TABLE tasks (
///     id BIGSERIAL PRIMARY KEY,
///     user_id BIGINT NOT NULL REFERENCES users(id),
///     title TEXT NOT NULL,
///     description TEXT,
///     status task_status NOT NULL DEFAULT 'pending',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Task progress status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started yet
    Pending,

    /// Being worked on
    InProgress,

    /// Finished (terminal)
    Done,
}

impl TaskStatus {
    /// The status a task moves to when advanced
    ///
    /// `done` is absorbing: advancing a finished task leaves it finished.
    pub fn next(self) -> TaskStatus {
        match self {
            TaskStatus::Pending => TaskStatus::InProgress,
            TaskStatus::InProgress => TaskStatus::Done,
            TaskStatus::Done => TaskStatus::Done,
        }
    }

    /// `done` is the only terminal state
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Done)
    }

    /// Wire/database name of the status
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: i64,

    /// Owning user (column and JSON key `user_id`)
    #[sqlx(rename = "user_id")]
    #[serde(rename = "user_id")]
    pub owner_id: i64,

    /// Short title, never empty
    pub title: String,

    /// Optional longer description
    pub description: Option<String>,

    /// Current progress
    pub status: TaskStatus,

    /// When the task was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new task
#[derive(Debug, Clone)]
pub struct CreateTask {
    /// Owning user
    pub owner_id: i64,

    /// Task title
    pub title: String,

    /// Optional description
    pub description: Option<String>,
}

impl Task {
    /// Inserts a new task in `pending` state
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (user_id, title, description)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, title, description, status, created_at
            "#,
        )
        .bind(data.owner_id)
        .bind(data.title)
        .bind(data.description)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, user_id, title, description, status, created_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists a user's tasks, newest first
    ///
    /// Ties on `created_at` are broken by descending ID.
    pub async fn list_by_owner(pool: &PgPool, owner_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, user_id, title, description, status, created_at
            FROM tasks
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Moves a task from `from` to `to`
    ///
    /// The update only applies while the task is still in `from`, so two
    /// concurrent advances can never move a task backwards. Returns `None`
    /// if the task doesn't exist or is no longer in `from`.
    pub async fn update_status(
        pool: &PgPool,
        id: i64,
        from: TaskStatus,
        to: TaskStatus,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET status = $3
            WHERE id = $1 AND status = $2
            RETURNING id, user_id, title, description, status, created_at
            "#,
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }
}
