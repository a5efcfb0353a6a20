/// Database layer for Tasktrack
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool with a connectivity check
/// - `migrations`: Embedded sqlx migrations
///
/// Row types and their queries live in the `models` module.

pub mod migrations;
pub mod pool;
