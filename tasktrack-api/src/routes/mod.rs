/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `users`: Registration, login, logout and the caller's profile
/// - `tasks`: Creating, listing and advancing tasks

pub mod health;
pub mod tasks;
pub mod users;
