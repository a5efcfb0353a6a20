/// Task endpoints
///
/// All routes require a bearer token. Ownership is checked against the
/// token's identity: a caller only ever sees or changes their own tasks.
///
/// # Endpoints
///
/// - `POST /tasks` - Create a task for the caller
/// - `GET /tasks/:id` - List the tasks of user `:id` (must be the caller)
/// - `PUT /tasks/:id/status` - Advance task `:id` one step

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use tasktrack_shared::{auth::Identity, models::task::Task, services::NewTask};

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};

/// Create a task
///
/// # Endpoint
///
/// ```text
/// POST /tasks
/// Authorization: Bearer <token>
///
/// { "title": "Buy milk", "description": "2 litres" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Missing or blank title, malformed body
/// - `401 Unauthorized`: Missing or invalid token
pub async fn create_task(
    State(state): State<AppState>,
    identity: Identity,
    payload: Result<Json<NewTask>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let Json(input) = payload?;

    let task = state.tasks.create(identity.id, input).await?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// List a user's tasks, newest first
///
/// # Errors
///
/// - `403 Forbidden`: `:id` is not the caller's user ID (including
///   IDs that aren't numbers)
pub async fn list_tasks(
    State(state): State<AppState>,
    identity: Identity,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<Task>>> {
    let owner_id = user_id
        .parse::<i64>()
        .map_err(|_| ApiError::Forbidden("Forbidden".to_string()))?;

    let tasks = state.tasks.list_for(identity.id, owner_id).await?;

    Ok(Json(tasks))
}

/// Advance a task's status
///
/// `pending` → `in_progress` → `done`; advancing a `done` task returns it
/// unchanged.
///
/// # Errors
///
/// - `403 Forbidden`: The task belongs to someone else
/// - `404 Not Found`: No such task
pub async fn advance_status(
    State(state): State<AppState>,
    identity: Identity,
    Path(task_id): Path<String>,
) -> ApiResult<Json<Task>> {
    let task_id = task_id
        .parse::<i64>()
        .map_err(|_| ApiError::NotFound("Task not found".to_string()))?;

    let task = state.tasks.advance_status(task_id, identity.id).await?;

    Ok(Json(task))
}
