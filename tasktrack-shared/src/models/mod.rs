/// Database models for Tasktrack
///
/// # Models
///
/// - `user`: Registered accounts
/// - `task`: Per-user tasks and the status state machine
///
/// Queries here run directly against a `PgPool`; the `store` module wraps
/// them behind traits so services can also run on an in-memory backend.

pub mod task;
pub mod user;
