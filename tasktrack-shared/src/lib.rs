//! # Tasktrack Shared Library
//!
//! This crate contains the domain types, authentication primitives and
//! business logic used by the Tasktrack API server.
//!
//! ## Module Organization
//!
//! - `auth`: Password hashing, bearer tokens and the request auth gate
//! - `db`: Connection pool and migrations
//! - `models`: Database models (users, tasks) and the task status machine
//! - `store`: Persistence traits with Postgres and in-memory backends
//! - `services`: User directory and task operations with ownership checks

pub mod auth;
pub mod db;
pub mod models;
pub mod services;
pub mod store;

/// Current version of the Tasktrack shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
